//! Core data model: words and counted entries
//!
//! Words are length-checked at construction so that every key flowing through
//! the protocol fits the fixed word bound. Entries pair a word with a count;
//! workers create them with a count of 1 and only the coordinator's final
//! reduce pass ever increments a count.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum word length in bytes (fits a 50-byte fixed-width field with its
/// terminator).
pub const MAX_WORD_BYTES: usize = 49;

/// A single word as read from the input stream.
///
/// Invariants: non-empty, at most [`MAX_WORD_BYTES`] bytes, contains no
/// whitespace (the input collaborator splits on whitespace before
/// construction). Ordering is byte-wise lexicographic (`str` ordering).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Word(String);

impl Word {
    /// Create a word, rejecting empty or over-long input.
    ///
    /// Validation happens here, at ingestion, rather than silently truncating
    /// further down the pipeline.
    pub fn new(s: impl Into<String>) -> Result<Self> {
        let s = s.into();
        if s.is_empty() {
            anyhow::bail!("Empty word");
        }
        if s.len() > MAX_WORD_BYTES {
            anyhow::bail!(
                "Word exceeds maximum length of {} bytes: {:?} ({} bytes)",
                MAX_WORD_BYTES,
                s,
                s.len()
            );
        }
        Ok(Self(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A (word, count) pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub word: Word,
    pub count: u64,
}

impl Entry {
    /// Create an entry for a single occurrence of `word`.
    pub fn unit(word: Word) -> Self {
        Self { word, count: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_accepts_max_length() {
        let s = "x".repeat(MAX_WORD_BYTES);
        let word = Word::new(s.clone()).unwrap();
        assert_eq!(word.as_str(), s);
    }

    #[test]
    fn test_word_rejects_over_long() {
        let s = "x".repeat(MAX_WORD_BYTES + 1);
        assert!(Word::new(s).is_err());
    }

    #[test]
    fn test_word_rejects_empty() {
        assert!(Word::new("").is_err());
    }

    #[test]
    fn test_word_ordering_is_byte_wise() {
        let a = Word::new("Zebra").unwrap();
        let b = Word::new("apple").unwrap();
        // Uppercase sorts before lowercase in byte order
        assert!(a < b);
    }

    #[test]
    fn test_unit_entry() {
        let entry = Entry::unit(Word::new("hello").unwrap());
        assert_eq!(entry.count, 1);
        assert_eq!(entry.word.as_str(), "hello");
    }
}
