//! Input collaborator: reading the token stream
//!
//! Supplies the coordinator with the full ordered word sequence before the
//! first scatter phase. Words are whitespace-delimited; length validation
//! happens here so malformed input is rejected up front instead of being
//! truncated somewhere in the pipeline.

use crate::model::Word;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Read whitespace-delimited words from a reader, in input order.
pub fn read_words<R: BufRead>(reader: R) -> Result<Vec<Word>> {
    let mut words = Vec::new();

    for (line_idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("Failed to read line {}", line_idx + 1))?;
        for raw in line.split_whitespace() {
            let word = Word::new(raw)
                .with_context(|| format!("Invalid word on line {}", line_idx + 1))?;
            words.push(word);
        }
    }

    Ok(words)
}

/// Read the word sequence from a file.
pub fn read_words_from_file(path: &Path) -> Result<Vec<Word>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open input file: {}", path.display()))?;
    read_words(BufReader::new(file))
        .with_context(|| format!("Failed to read words from {}", path.display()))
}
