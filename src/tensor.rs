//! Tensor Operations for the Bigram Model
//!
//! This module is the numeric-engine capability the rest of the crate is
//! written against: dense tensor allocation, matrix multiplication, reshape,
//! row-wise softmax / log-softmax, and the negative-log-likelihood reduction
//! used for cross-entropy. Values are eager — every operation materializes a
//! concrete result immediately.
//!
//! ## Core Concepts
//!
//! - **Data**: Flat `Vec<f32>` storing all elements in row-major order
//! - **Shape**: Dimensions of the tensor (e.g., `[batch, seq, vocab]`)
//!
//! ## Example
//!
//! ```rust
//! use cobweb::Tensor;
//!
//! // Create a 2x3 matrix
//! let tensor = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
//!
//! // Matrix multiplication
//! let other = Tensor::new(vec![1.0, 0.0, 0.0, 1.0, 1.0, 1.0], vec![3, 2]);
//! let result = tensor.matmul(&other).unwrap();
//! assert_eq!(result.shape, vec![2, 2]);
//! ```
//!
//! ## Error Handling
//!
//! Operations whose validity depends on runtime shapes (`matmul`, `reshape`,
//! `nll_mean`) return [`TensorError`] instead of panicking, so a malformed
//! reshape target or an incompatible multiply surfaces to the caller as an
//! explicit engine failure. Constructing a tensor with mismatched data and
//! shape is a programming error and panics.
//!
//! ## Performance
//!
//! Row-wise operations (softmax, log-softmax) and large matrix multiplies
//! are parallelized with Rayon. Small matrices use a sequential path to
//! avoid parallel overhead.

use rayon::prelude::*;
use thiserror::Error;

/// Errors reported by the tensor engine.
///
/// These are programming/data errors, not transient faults: the caller
/// passed shapes the requested operation cannot satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TensorError {
    /// The operands of a matrix multiply are not 2-D or their inner
    /// dimensions disagree.
    #[error("matmul shape mismatch: {lhs:?} @ {rhs:?}")]
    MatmulShapeMismatch { lhs: Vec<usize>, rhs: Vec<usize> },

    /// A reshape target has a different element count than the source.
    #[error("cannot reshape {from:?} into {to:?}: element count differs")]
    InvalidReshape { from: Vec<usize>, to: Vec<usize> },

    /// An operation received a companion slice of the wrong length.
    #[error("shape mismatch in {op}: expected {expected}, got {actual}")]
    ShapeMismatch {
        op: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// A multi-dimensional array of `f32` values.
///
/// Data is stored in a contiguous `Vec<f32>` using row-major (C-style)
/// layout. For shape `[2, 3]`, data is stored as:
/// `[row0_col0, row0_col1, row0_col2, row1_col0, row1_col1, row1_col2]`
#[derive(Clone, Debug, PartialEq)]
pub struct Tensor {
    /// Flat storage of all tensor elements
    pub data: Vec<f32>,
    /// Shape of the tensor (dimensions)
    pub shape: Vec<usize>,
}

impl Tensor {
    /// Create a new tensor with given data and shape.
    ///
    /// # Panics
    ///
    /// Panics if the product of shape dimensions doesn't equal data length.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use cobweb::Tensor;
    /// let tensor = Tensor::new(vec![1.0, 2.0, 3.0, 4.0], vec![2, 2]);
    /// assert_eq!(tensor.shape, vec![2, 2]);
    /// ```
    pub fn new(data: Vec<f32>, shape: Vec<usize>) -> Self {
        let expected: usize = shape.iter().product();
        assert_eq!(
            data.len(),
            expected,
            "Data length ({}) doesn't match shape {:?} (expected {})",
            data.len(),
            shape,
            expected
        );
        Self { data, shape }
    }

    /// Create a tensor filled with zeros.
    pub fn zeros(shape: Vec<usize>) -> Self {
        let size: usize = shape.iter().product();
        Self::new(vec![0.0; size], shape)
    }

    /// 2-D matrix multiplication: `[m, k] @ [k, n] -> [m, n]`.
    ///
    /// Large multiplies (>= 1K multiply-adds) parallelize over output rows;
    /// small ones run sequentially to avoid parallel overhead.
    ///
    /// # Errors
    ///
    /// [`TensorError::MatmulShapeMismatch`] if either operand is not 2-D or
    /// the inner dimensions disagree.
    pub fn matmul(&self, other: &Tensor) -> Result<Tensor, TensorError> {
        if self.shape.len() != 2 || other.shape.len() != 2 || self.shape[1] != other.shape[0] {
            return Err(TensorError::MatmulShapeMismatch {
                lhs: self.shape.clone(),
                rhs: other.shape.clone(),
            });
        }

        let m = self.shape[0];
        let k = self.shape[1];
        let n = other.shape[1];

        let mut result = vec![0.0; m * n];

        if m * n * k >= 1_000 {
            // One output row per task; the inner loop accumulates over `n`
            // sequentially so LLVM can auto-vectorize it.
            result
                .par_chunks_mut(n)
                .enumerate()
                .for_each(|(i, row_out)| {
                    for l in 0..k {
                        let a_val = self.data[i * k + l];
                        let b_row = &other.data[l * n..(l + 1) * n];
                        for (r, &b_val) in row_out.iter_mut().zip(b_row) {
                            *r += a_val * b_val;
                        }
                    }
                });
        } else {
            for i in 0..m {
                for l in 0..k {
                    let a_val = self.data[i * k + l];
                    for j in 0..n {
                        result[i * n + j] += a_val * other.data[l * n + j];
                    }
                }
            }
        }

        Ok(Tensor::new(result, vec![m, n]))
    }

    /// Reshape the tensor.
    ///
    /// # Errors
    ///
    /// [`TensorError::InvalidReshape`] if the element count changes.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use cobweb::Tensor;
    /// let tensor = Tensor::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], vec![2, 3]);
    /// let reshaped = tensor.reshape(&[3, 2]).unwrap();
    /// assert_eq!(reshaped.shape, vec![3, 2]);
    /// ```
    pub fn reshape(&self, new_shape: &[usize]) -> Result<Tensor, TensorError> {
        let new_size: usize = new_shape.iter().product();
        if self.data.len() != new_size {
            return Err(TensorError::InvalidReshape {
                from: self.shape.clone(),
                to: new_shape.to_vec(),
            });
        }
        Ok(Tensor::new(self.data.clone(), new_shape.to_vec()))
    }

    /// Multiply all elements by a scalar.
    pub fn mul_scalar(&self, scalar: f32) -> Tensor {
        let result = self.data.par_iter().map(|&x| x * scalar).collect();
        Tensor::new(result, self.shape.clone())
    }

    /// Row-wise softmax for a 2-D tensor.
    ///
    /// Each row of the result is a probability distribution summing to 1.
    /// Uses the numerically stable form: the row maximum is subtracted
    /// before exponentiation, so extreme logits cannot overflow `exp()`.
    ///
    /// # Panics
    ///
    /// Panics if the tensor is not 2-D.
    ///
    /// # Example
    ///
    /// ```rust
    /// # use cobweb::Tensor;
    /// let logits = Tensor::new(vec![1.0, 2.0, 3.0], vec![1, 3]);
    /// let probs = logits.softmax_rows();
    /// let sum: f32 = probs.data.iter().sum();
    /// assert!((sum - 1.0).abs() < 1e-6);
    /// ```
    pub fn softmax_rows(&self) -> Tensor {
        assert_eq!(self.shape.len(), 2, "softmax_rows expects a 2-D tensor");
        let rows = self.shape[0];
        let cols = self.shape[1];

        let result: Vec<f32> = (0..rows)
            .into_par_iter()
            .flat_map_iter(|i| {
                let row = &self.data[i * cols..(i + 1) * cols];

                // Find max for numerical stability
                let max = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
                let exp_values: Vec<f32> = row.iter().map(|&x| (x - max).exp()).collect();
                let sum: f32 = exp_values.iter().sum();

                exp_values.into_iter().map(move |val| val / sum)
            })
            .collect();

        Tensor::new(result, self.shape.clone())
    }

    /// Row-wise log-softmax for a 2-D tensor.
    ///
    /// Computed as `(x - max) - ln(sum(exp(x - max)))` per row, the stable
    /// log-sum-exp form. Every output value is <= 0.
    ///
    /// # Panics
    ///
    /// Panics if the tensor is not 2-D.
    pub fn log_softmax_rows(&self) -> Tensor {
        assert_eq!(self.shape.len(), 2, "log_softmax_rows expects a 2-D tensor");
        let rows = self.shape[0];
        let cols = self.shape[1];

        let result: Vec<f32> = (0..rows)
            .into_par_iter()
            .flat_map_iter(|i| {
                let row = &self.data[i * cols..(i + 1) * cols];

                let max = row.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
                let log_sum = row.iter().map(|&x| (x - max).exp()).sum::<f32>().ln();

                row.iter()
                    .map(move |&x| (x - max) - log_sum)
                    .collect::<Vec<f32>>()
            })
            .collect();

        Tensor::new(result, self.shape.clone())
    }

    /// Mean negative log-likelihood over rows of a 2-D log-probability
    /// tensor.
    ///
    /// `self` must hold log-probabilities of shape `[n, classes]` (e.g. the
    /// output of [`log_softmax_rows`](Tensor::log_softmax_rows)); `targets`
    /// selects one class per row. Returns
    /// `mean_over_n(-self[n, targets[n]])`, which is always >= 0 for valid
    /// log-probabilities.
    ///
    /// # Errors
    ///
    /// [`TensorError::ShapeMismatch`] if `targets.len()` differs from the
    /// number of rows.
    ///
    /// # Panics
    ///
    /// Panics if the tensor is not 2-D or a target index is out of range;
    /// callers are expected to validate token ids before reaching the
    /// engine.
    pub fn nll_mean(&self, targets: &[usize]) -> Result<f32, TensorError> {
        assert_eq!(self.shape.len(), 2, "nll_mean expects a 2-D tensor");
        let rows = self.shape[0];
        let cols = self.shape[1];

        if targets.len() != rows {
            return Err(TensorError::ShapeMismatch {
                op: "nll_mean",
                expected: rows,
                actual: targets.len(),
            });
        }

        let total: f32 = targets
            .iter()
            .enumerate()
            .map(|(i, &target)| {
                assert!(target < cols, "nll_mean target {} out of range", target);
                -self.data[i * cols + target]
            })
            .sum();

        Ok(total / rows as f32)
    }
}
