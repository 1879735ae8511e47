//! Output collaborator: writing the result table
//!
//! Persists the final table exactly in the order the merge-reduce produced
//! it, one `<word> <count>` line per entry.

use crate::model::Entry;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write the result table, one `<word> <count>` line per entry.
pub fn write_table<W: Write>(mut writer: W, table: &[Entry]) -> Result<()> {
    for entry in table {
        writeln!(writer, "{} {}", entry.word, entry.count)
            .context("Failed to write table entry")?;
    }
    writer.flush().context("Failed to flush output")?;
    Ok(())
}

/// Write the result table to a file.
pub fn write_table_to_file(path: &Path, table: &[Entry]) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create output file: {}", path.display()))?;
    write_table(BufWriter::new(file), table)
        .with_context(|| format!("Failed to write table to {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Word;

    fn entry(word: &str, count: u64) -> Entry {
        Entry {
            word: Word::new(word).unwrap(),
            count,
        }
    }

    #[test]
    fn test_writes_one_line_per_entry_in_order() {
        let table = vec![entry("a", 3), entry("b", 2), entry("c", 1)];
        let mut out = Vec::new();
        write_table(&mut out, &table).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "a 3\nb 2\nc 1\n");
    }

    #[test]
    fn test_empty_table_writes_nothing() {
        let mut out = Vec::new();
        write_table(&mut out, &[]).unwrap();
        assert!(out.is_empty());
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("counts.txt");
        write_table_to_file(&path, &[entry("word", 7)]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "word 7\n");
    }
}
