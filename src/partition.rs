//! Contiguous order-preserving partitioning
//!
//! The coordinator uses the same splitter for both scatter phases: words in
//! phase 1 and entries in phase 3. Partitions are contiguous and
//! non-overlapping, so concatenating them in rank order reconstructs the
//! input exactly.

/// Split `items` into `parts` contiguous slices preserving input order.
///
/// Every slice gets `floor(len / parts)` elements except the last, which
/// absorbs the remainder. When `len < parts` the leading slices are empty and
/// the last slice carries everything; empty slices are valid partitions and
/// travel as zero-element messages.
///
/// `parts` must be at least 1.
pub fn partition<T>(items: &[T], parts: usize) -> Vec<&[T]> {
    assert!(parts > 0, "partition requires at least one part");

    let per_part = items.len() / parts;
    let mut slices = Vec::with_capacity(parts);

    for i in 0..parts {
        let start = i * per_part;
        let end = if i == parts - 1 {
            items.len() // Last part gets the remainder
        } else {
            start + per_part
        };
        slices.push(&items[start..end]);
    }

    slices
}
