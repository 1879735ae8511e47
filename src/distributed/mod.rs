//! Distributed mode implementation
//!
//! This module implements the distributed word count across a coordinator and
//! a pool of workers.
//!
//! # Architecture
//!
//! - **Coordinator**: loads the input, partitions it, drives the phase
//!   barriers, merges and reduces the sorted runs, writes the table
//! - **Worker Service**: runs on each worker, transforms and sorts the
//!   partitions it is sent
//!
//! # Modules
//!
//! - `protocol`: Message definitions, framing, and serialization
//! - `worker`: Worker service implementation
//! - `coordinator`: Coordinator implementation

pub mod coordinator;
pub mod protocol;
pub mod worker;

// Re-export key types
pub use protocol::{
    AssignMessage, EntriesMessage, ErrorMessage, Message, ReadyMessage, TokensMessage,
    PROTOCOL_VERSION,
};

pub use coordinator::Coordinator;
pub use worker::WorkerService;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::io::Write;
    use std::sync::Arc;

    /// Spawn `count` worker services on ephemeral localhost ports and return
    /// their addresses.
    async fn spawn_workers(count: usize) -> Vec<String> {
        let mut addresses = Vec::with_capacity(count);
        for _ in 0..count {
            let service = WorkerService::bind(0).await.unwrap();
            let port = service.local_addr().unwrap().port();
            addresses.push(format!("127.0.0.1:{}", port));
            tokio::spawn(service.run());
        }
        addresses
    }

    async fn run_count(input_text: &str, workers: usize) -> Vec<(String, u64)> {
        let dir = tempfile::tempdir().unwrap();
        let input_path = dir.path().join("input.txt");
        let output_path = dir.path().join("counts.txt");

        let mut input_file = std::fs::File::create(&input_path).unwrap();
        write!(input_file, "{}", input_text).unwrap();

        let config = Config {
            input: input_path,
            output: output_path.clone(),
            workers,
        };

        let addresses = spawn_workers(workers).await;
        let coordinator = Coordinator::new(Arc::new(config), addresses).unwrap();
        coordinator.run().await.unwrap();

        std::fs::read_to_string(&output_path)
            .unwrap()
            .lines()
            .map(|line| {
                let (word, count) = line.split_once(' ').unwrap();
                (word.to_string(), count.parse().unwrap())
            })
            .collect()
    }

    #[tokio::test]
    async fn test_end_to_end_two_workers() {
        let table = run_count("a b a\nc b a\n", 2).await;
        assert_eq!(
            table,
            vec![
                ("a".to_string(), 3),
                ("b".to_string(), 2),
                ("c".to_string(), 1),
            ]
        );
    }

    #[tokio::test]
    async fn test_end_to_end_empty_input_three_workers() {
        // Every partition is empty, every reply is empty, output has no lines
        let table = run_count("", 3).await;
        assert!(table.is_empty());
    }

    #[tokio::test]
    async fn test_end_to_end_single_worker() {
        // One worker receives everything in both phases; the table must still
        // come out sorted and deduplicated
        let table = run_count("pear apple pear fig apple pear", 1).await;
        assert_eq!(
            table,
            vec![
                ("apple".to_string(), 2),
                ("fig".to_string(), 1),
                ("pear".to_string(), 3),
            ]
        );
    }

    #[tokio::test]
    async fn test_end_to_end_more_workers_than_words() {
        // Leading partitions are empty; the last absorbs the remainder
        let table = run_count("only two", 4).await;
        assert_eq!(
            table,
            vec![("only".to_string(), 1), ("two".to_string(), 1)]
        );
    }

    #[tokio::test]
    async fn test_end_to_end_count_conservation() {
        let text = "the quick brown fox jumps over the lazy dog the end\n".repeat(7);
        let total_words = text.split_whitespace().count() as u64;

        let table = run_count(&text, 3).await;

        // Count conservation
        assert_eq!(table.iter().map(|(_, c)| c).sum::<u64>(), total_words);
        // Strictly increasing keys
        for pair in table.windows(2) {
            assert!(pair[0].0 < pair[1].0);
        }
    }
}
