//! Distributed coordinator
//!
//! This module implements the coordinator for distributed mode.
//! The coordinator:
//! - Loads the input word stream
//! - Connects to all workers and assigns ranks
//! - Drives the four phase barriers (scatter words, gather unit entries,
//!   re-scatter entries, gather sorted runs)
//! - Performs the final merge-reduce
//! - Writes the result table
//!
//! Every phase is a full barrier: the coordinator sends to each worker
//! exactly once and receives one reply from each worker before advancing.
//! There are no timeouts and no retries — a failed or silent worker aborts
//! the run, and a non-responding worker blocks it.

use crate::config::Config;
use crate::distributed::protocol::*;
use crate::model::{Entry, Word};
use crate::{input, merge, output, partition};
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::net::TcpStream;

/// One connected worker: rank, address, stream.
type Connection = (usize, String, TcpStream);

/// Distributed coordinator
///
/// Orchestrates a counting run across the worker pool.
pub struct Coordinator {
    /// Run configuration
    config: Arc<Config>,

    /// List of worker addresses (IP:port), rank by position
    worker_addresses: Vec<String>,
}

impl Coordinator {
    /// Create a new coordinator
    pub fn new(config: Arc<Config>, worker_addresses: Vec<String>) -> Result<Self> {
        if worker_addresses.is_empty() {
            anyhow::bail!("No workers specified for distributed mode");
        }

        Ok(Self {
            config,
            worker_addresses,
        })
    }

    /// Run the distributed count
    pub async fn run(self) -> Result<()> {
        println!("Distributed Coordinator");
        println!();

        // Load the input stream before touching the network
        println!("Loading input: {}", self.config.input.display());
        let words = input::read_words_from_file(&self.config.input)?;
        let total_words = words.len();
        println!("  ✅ {} words loaded", total_words);

        println!();
        println!("Connecting to {} workers...", self.worker_addresses.len());

        // Connect to all workers; rank is the position in the address list
        let mut connections: Vec<Connection> = Vec::new();
        for (rank, addr) in self.worker_addresses.iter().enumerate() {
            let stream = TcpStream::connect(addr)
                .await
                .with_context(|| format!("Failed to connect to {}", addr))?;
            println!("  ✅ Connected to worker {} ({})", rank, addr);
            connections.push((rank, addr.clone(), stream));
        }

        println!();
        println!("All {} workers connected!", connections.len());

        self.assign_ranks(&mut connections).await?;

        let table = self.run_phases(&mut connections, words).await?;

        // Release the pool before writing output
        for (rank, _addr, stream) in &mut connections {
            write_message(stream, &Message::Shutdown)
                .await
                .with_context(|| format!("Failed to send SHUTDOWN to worker {}", rank))?;
        }

        println!();
        println!("Writing result table: {}", self.config.output.display());
        output::write_table_to_file(&self.config.output, &table)?;

        let total_counted: u64 = table.iter().map(|e| e.count).sum();
        println!(
            "  ✅ {} distinct words, {} total occurrences",
            table.len(),
            total_counted
        );

        Ok(())
    }

    /// Assign ranks to all workers and wait for every READY.
    async fn assign_ranks(&self, connections: &mut [Connection]) -> Result<()> {
        let peer_count = connections.len();

        println!();
        println!("Assigning ranks to all workers...");

        for (rank, _addr, stream) in connections.iter_mut() {
            let assign = AssignMessage {
                protocol_version: PROTOCOL_VERSION,
                rank: *rank,
                peer_count,
            };
            write_message(stream, &Message::Assign(assign))
                .await
                .with_context(|| format!("Failed to send ASSIGN to worker {}", rank))?;
        }

        for (rank, addr, stream) in connections.iter_mut() {
            let msg = read_message(stream)
                .await
                .with_context(|| format!("Failed to read READY from worker {}", rank))?;

            match msg {
                Message::Ready(ready) => {
                    if ready.protocol_version != PROTOCOL_VERSION {
                        anyhow::bail!(
                            "Protocol version mismatch on worker {}: expected {}, got {}",
                            rank,
                            PROTOCOL_VERSION,
                            ready.protocol_version
                        );
                    }
                    if ready.rank != *rank {
                        anyhow::bail!(
                            "Rank mismatch: worker at {} acknowledged rank {}, expected {}",
                            addr,
                            ready.rank,
                            rank
                        );
                    }
                    println!("  ✅ Worker {} ready ({})", rank, ready.node_id);
                }
                Message::Error(err) => {
                    anyhow::bail!("Worker {} ({}) reported error: {}", rank, err.node_id, err.error);
                }
                other => {
                    anyhow::bail!("Expected READY from worker {}, got {:?}", rank, other);
                }
            }
        }

        Ok(())
    }

    /// Drive the four phase barriers and the final merge-reduce.
    async fn run_phases(
        &self,
        connections: &mut [Connection],
        words: Vec<Word>,
    ) -> Result<Vec<Entry>> {
        let peer_count = connections.len();

        // Phase 1: scatter word partitions
        println!();
        println!(
            "Phase 1/4: scattering {} words across {} workers...",
            words.len(),
            peer_count
        );
        self.scatter_words(connections, &words).await?;
        drop(words); // Ownership has transferred to the workers

        // Phase 2: gather unit-count entries (barrier), concatenated in rank
        // order
        println!("Phase 2/4: gathering unit-count entries...");
        let all_entries = self.gather_entries(connections).await?;
        println!("  ✅ {} entries gathered", all_entries.len());

        // Phase 3: re-scatter entries by current position, not by key
        println!("Phase 3/4: re-scattering entries for local sort...");
        self.scatter_entries(connections, &all_entries).await?;
        drop(all_entries);

        // Phase 4: gather the sorted runs (barrier)
        println!("Phase 4/4: gathering sorted runs...");
        let runs = self.gather_runs(connections).await?;

        // Final merge-reduce on the coordinator
        println!("Merging {} sorted runs...", runs.len());
        let table = merge::merge_reduce(&runs);

        Ok(table)
    }

    /// Send each worker its contiguous word partition.
    async fn scatter_words(&self, connections: &mut [Connection], words: &[Word]) -> Result<()> {
        let chunks = partition::partition(words, connections.len());

        for ((rank, _addr, stream), chunk) in connections.iter_mut().zip(chunks) {
            let msg = TokensMessage {
                rank: *rank,
                words: chunk.to_vec(),
            };
            write_message(stream, &Message::Tokens(msg))
                .await
                .with_context(|| format!("Failed to send TOKENS to worker {}", rank))?;
        }

        Ok(())
    }

    /// Send each worker its contiguous entry partition.
    async fn scatter_entries(
        &self,
        connections: &mut [Connection],
        entries: &[Entry],
    ) -> Result<()> {
        let chunks = partition::partition(entries, connections.len());

        for ((rank, _addr, stream), chunk) in connections.iter_mut().zip(chunks) {
            let msg = EntriesMessage {
                rank: *rank,
                entries: chunk.to_vec(),
            };
            write_message(stream, &Message::Entries(msg))
                .await
                .with_context(|| format!("Failed to send ENTRIES to worker {}", rank))?;
        }

        Ok(())
    }

    /// Wait for one ENTRIES reply from every worker and concatenate them in
    /// rank order.
    async fn gather_entries(&self, connections: &mut [Connection]) -> Result<Vec<Entry>> {
        let mut all_entries = Vec::new();
        for conn in connections.iter_mut() {
            all_entries.extend(expect_entries(conn).await?);
        }
        Ok(all_entries)
    }

    /// Wait for one ENTRIES reply from every worker, kept as separate runs.
    async fn gather_runs(&self, connections: &mut [Connection]) -> Result<Vec<Vec<Entry>>> {
        let mut runs = Vec::with_capacity(connections.len());
        for conn in connections.iter_mut() {
            runs.push(expect_entries(conn).await?);
        }
        Ok(runs)
    }
}

/// Read the next message from a worker and require an ENTRIES reply carrying
/// the worker's own rank. An ERROR message or anything else aborts the run.
async fn expect_entries(conn: &mut Connection) -> Result<Vec<Entry>> {
    let (rank, addr, stream) = conn;

    let msg = read_message(stream)
        .await
        .with_context(|| format!("Failed to read ENTRIES from worker {} ({})", rank, addr))?;

    match msg {
        Message::Entries(reply) => {
            if reply.rank != *rank {
                anyhow::bail!(
                    "Reply rank mismatch from worker {}: got rank {}",
                    rank,
                    reply.rank
                );
            }
            Ok(reply.entries)
        }
        Message::Error(err) => {
            anyhow::bail!(
                "Worker {} ({}) reported error: {}",
                rank,
                err.node_id,
                err.error
            );
        }
        other => {
            anyhow::bail!("Expected ENTRIES from worker {}, got {:?}", rank, other);
        }
    }
}
