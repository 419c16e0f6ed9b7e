//! Character Vocabulary and Codec
//!
//! This module implements character-level tokenization: the vocabulary is
//! the set of distinct characters appearing in the training corpus, sorted
//! by Unicode code point, and each character's token id is simply its
//! position in that order.
//!
//! ## Why Character-Level?
//!
//! Character-level tokenization is the simplest scheme that makes a corpus
//! trainable: it needs no training of its own, its vocabulary is tiny, and
//! decode is trivially exact. The cost is longer sequences than subword
//! schemes like BPE — acceptable for a bigram model, whose context is a
//! single token anyway.
//!
//! ## Example
//!
//! ```rust
//! use cobweb::Vocabulary;
//!
//! let vocab = Vocabulary::from_text("hii there");
//! assert_eq!(vocab.size(), 6); // ' ', 'e', 'h', 'i', 'r', 't'
//!
//! let ids = vocab.encode("hii there").unwrap();
//! assert_eq!(ids, vec![2, 3, 3, 0, 5, 4, 1, 3, 4]);
//! assert_eq!(vocab.decode(&ids).unwrap(), "hii there");
//! ```
//!
//! ## Unknown Characters
//!
//! `encode` refuses characters outside the vocabulary with
//! [`VocabError::UnknownSymbol`] rather than silently mapping them to id 0;
//! a silent fallback would corrupt training data without any signal.

use std::collections::{BTreeSet, HashMap};
use thiserror::Error;

/// Errors produced when encoding or decoding against a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VocabError {
    /// `encode` encountered a character that is not in the vocabulary.
    #[error("unknown symbol {0:?} (not in vocabulary)")]
    UnknownSymbol(char),

    /// `decode` encountered a token id outside `[0, vocab_size)`.
    #[error("invalid token id {id} (vocab size {vocab_size})")]
    InvalidId { id: usize, vocab_size: usize },
}

/// An immutable character vocabulary with bidirectional id mapping.
///
/// Token ids are assigned by code-point order: the lexicographically
/// smallest character is id 0. This makes the mapping fully deterministic —
/// building the vocabulary twice from the same text yields identical ids.
///
/// # Fields
///
/// - `chars`: id → character (sorted, no duplicates)
/// - `ids`: character → id (inverse of `chars`)
#[derive(Clone, Debug)]
pub struct Vocabulary {
    chars: Vec<char>,
    ids: HashMap<char, usize>,
}

impl Vocabulary {
    /// Build a vocabulary from the distinct characters of `text`.
    ///
    /// Characters are collected into a `BTreeSet`, which both deduplicates
    /// and sorts by code point in one pass. Empty text yields an empty
    /// vocabulary (degenerate but valid).
    ///
    /// # Example
    ///
    /// ```rust
    /// # use cobweb::Vocabulary;
    /// let vocab = Vocabulary::from_text("abcabc");
    /// assert_eq!(vocab.size(), 3);
    /// ```
    pub fn from_text(text: &str) -> Self {
        let unique: BTreeSet<char> = text.chars().collect();
        let chars: Vec<char> = unique.into_iter().collect();
        let ids = chars.iter().enumerate().map(|(i, &c)| (c, i)).collect();
        Self { chars, ids }
    }

    /// Number of distinct characters in the vocabulary.
    pub fn size(&self) -> usize {
        self.chars.len()
    }

    /// The vocabulary characters in id order.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// The vocabulary as a single string, in id order.
    ///
    /// Used for the informational report ("vocabulary composition").
    pub fn as_string(&self) -> String {
        self.chars.iter().collect()
    }

    /// Encode `text` into token ids.
    ///
    /// # Errors
    ///
    /// [`VocabError::UnknownSymbol`] on the first character not present in
    /// the vocabulary.
    pub fn encode(&self, text: &str) -> Result<Vec<usize>, VocabError> {
        text.chars()
            .map(|c| self.ids.get(&c).copied().ok_or(VocabError::UnknownSymbol(c)))
            .collect()
    }

    /// Decode token ids back into text.
    ///
    /// Exact left inverse of [`encode`](Vocabulary::encode) for ids that
    /// came from this vocabulary.
    ///
    /// # Errors
    ///
    /// [`VocabError::InvalidId`] on the first id outside `[0, vocab_size)`.
    pub fn decode(&self, ids: &[usize]) -> Result<String, VocabError> {
        ids.iter()
            .map(|&id| {
                self.chars.get(id).copied().ok_or(VocabError::InvalidId {
                    id,
                    vocab_size: self.chars.len(),
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_is_sorted_and_unique() {
        let vocab = Vocabulary::from_text("banana");
        assert_eq!(vocab.chars(), &['a', 'b', 'n']);
    }

    #[test]
    fn test_vocabulary_deterministic() {
        let text = "To be, or not to be, that is the question.";
        let a = Vocabulary::from_text(text);
        let b = Vocabulary::from_text(text);
        assert_eq!(a.chars(), b.chars());
    }

    #[test]
    fn test_empty_text_yields_empty_vocabulary() {
        let vocab = Vocabulary::from_text("");
        assert_eq!(vocab.size(), 0);
        assert_eq!(vocab.encode("").unwrap(), Vec::<usize>::new());
        assert_eq!(vocab.decode(&[]).unwrap(), "");
    }

    #[test]
    fn test_hii_there_example() {
        let vocab = Vocabulary::from_text("hii there");
        assert_eq!(vocab.chars(), &[' ', 'e', 'h', 'i', 'r', 't']);

        let ids = vocab.encode("hii there").unwrap();
        assert_eq!(ids, vec![2, 3, 3, 0, 5, 4, 1, 3, 4]);
        assert_eq!(vocab.decode(&ids).unwrap(), "hii there");
    }

    #[test]
    fn test_roundtrip() {
        let text = "The quick brown fox jumps over the lazy dog!";
        let vocab = Vocabulary::from_text(text);
        let ids = vocab.encode(text).unwrap();
        assert_eq!(vocab.decode(&ids).unwrap(), text);
    }

    #[test]
    fn test_multibyte_characters_are_atomic() {
        let vocab = Vocabulary::from_text("héllo 日本");
        let ids = vocab.encode("日héo").unwrap();
        assert_eq!(ids.len(), 4); // four characters, not seven bytes
        assert_eq!(vocab.decode(&ids).unwrap(), "日héo");
    }

    #[test]
    fn test_unknown_symbol_is_an_error() {
        let vocab = Vocabulary::from_text("abc");
        let err = vocab.encode("abd").unwrap_err();
        assert_eq!(err, VocabError::UnknownSymbol('d'));
    }

    #[test]
    fn test_invalid_id_is_an_error() {
        let vocab = Vocabulary::from_text("abc");
        let err = vocab.decode(&[0, 7]).unwrap_err();
        assert_eq!(err, VocabError::InvalidId { id: 7, vocab_size: 3 });
    }

    #[test]
    fn test_as_string_matches_ids() {
        let vocab = Vocabulary::from_text("cab");
        assert_eq!(vocab.as_string(), "abc");
    }
}
