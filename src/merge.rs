//! Final merge-reduce on the coordinator
//!
//! Workers return one sorted run each. The runs are merged with a k-way
//! min-heap keyed by each run's current head (O(n log k)), then a single
//! forward dedup pass collapses adjacent equal keys into one entry with
//! summed counts. A run may itself contain duplicate keys, since worker
//! partitions are split by position rather than by key; the dedup pass
//! handles those the same way.

use crate::model::{Entry, Word};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Merge `runs` (each internally sorted by word) into one sorted sequence.
///
/// Ties between runs break by run index, then position, so the merge is
/// deterministic regardless of which worker replied first. Empty runs are
/// no-ops.
pub fn merge_sorted(runs: &[Vec<Entry>]) -> Vec<Entry> {
    let total: usize = runs.iter().map(Vec::len).sum();
    let mut merged = Vec::with_capacity(total);

    // Heap of (head word, run index, position within run)
    let mut heads: BinaryHeap<Reverse<(Word, usize, usize)>> =
        BinaryHeap::with_capacity(runs.len());
    for (run, entries) in runs.iter().enumerate() {
        if let Some(first) = entries.first() {
            heads.push(Reverse((first.word.clone(), run, 0)));
        }
    }

    while let Some(Reverse((_, run, pos))) = heads.pop() {
        merged.push(runs[run][pos].clone());
        if let Some(next) = runs[run].get(pos + 1) {
            heads.push(Reverse((next.word.clone(), run, pos + 1)));
        }
    }

    merged
}

/// Collapse adjacent entries with equal words, summing their counts.
///
/// On sorted input this leaves strictly increasing words. A single forward
/// pass suffices: removal never un-sorts the remaining sequence.
pub fn reduce(merged: Vec<Entry>) -> Vec<Entry> {
    let mut table: Vec<Entry> = Vec::with_capacity(merged.len());
    for entry in merged {
        match table.last_mut() {
            Some(last) if last.word == entry.word => last.count += entry.count,
            _ => table.push(entry),
        }
    }
    table
}

/// Merge the sorted worker runs and reduce them to the final table.
pub fn merge_reduce(runs: &[Vec<Entry>]) -> Vec<Entry> {
    reduce(merge_sorted(runs))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(word: &str, count: u64) -> Entry {
        Entry {
            word: Word::new(word).unwrap(),
            count,
        }
    }

    fn units(words: &[&str]) -> Vec<Entry> {
        words.iter().map(|w| entry(w, 1)).collect()
    }

    #[test]
    fn test_two_worker_scenario() {
        // Input ["a","b","a","c","b","a"] split across 2 workers and sorted
        let runs = vec![units(&["a", "a", "b"]), units(&["a", "b", "c"])];
        let table = merge_reduce(&runs);
        assert_eq!(
            table,
            vec![entry("a", 3), entry("b", 2), entry("c", 1)]
        );
    }

    #[test]
    fn test_empty_runs_are_noops() {
        let runs = vec![Vec::new(), units(&["x"]), Vec::new()];
        assert_eq!(merge_reduce(&runs), vec![entry("x", 1)]);

        let all_empty: Vec<Vec<Entry>> = vec![Vec::new(); 3];
        assert!(merge_reduce(&all_empty).is_empty());
    }

    #[test]
    fn test_single_run_with_duplicates() {
        // One worker's run can carry duplicate keys of its own
        let runs = vec![units(&["a", "a", "b", "b", "b", "c"])];
        let table = merge_reduce(&runs);
        assert_eq!(
            table,
            vec![entry("a", 2), entry("b", 3), entry("c", 1)]
        );
    }

    #[test]
    fn test_disjoint_runs_equal_sorted_concatenation() {
        // Pairwise-disjoint, individually duplicate-free runs merge to the
        // plain sorted concatenation
        let runs = vec![units(&["b", "d"]), units(&["a", "e"]), units(&["c"])];
        let table = merge_reduce(&runs);
        assert_eq!(table, units(&["a", "b", "c", "d", "e"]));
    }

    #[test]
    fn test_count_conservation_and_sortedness() {
        let runs = vec![
            units(&["ant", "ant", "bee", "cat"]),
            units(&["ant", "bee", "bee", "dog"]),
            units(&["cat", "cat", "dog", "dog"]),
        ];
        let total: u64 = runs.iter().map(|r| r.len() as u64).sum();
        let table = merge_reduce(&runs);

        assert_eq!(table.iter().map(|e| e.count).sum::<u64>(), total);
        for pair in table.windows(2) {
            // Strictly increasing: sorted and no duplicate keys
            assert!(pair[0].word < pair[1].word);
        }
    }

    #[test]
    fn test_merge_preserves_counts_above_one() {
        // The reduce sums whatever counts arrive, not just units
        let runs = vec![vec![entry("a", 2)], vec![entry("a", 3), entry("b", 1)]];
        let table = merge_reduce(&runs);
        assert_eq!(table, vec![entry("a", 5), entry("b", 1)]);
    }
}
