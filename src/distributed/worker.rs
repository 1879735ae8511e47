//! Worker service
//!
//! This module implements the service that runs on each worker in distributed
//! mode. The worker service:
//! - Listens for a connection from the coordinator
//! - Accepts a rank assignment and acknowledges it
//! - Runs the transform stage (words → unit-count entries, order preserved)
//! - Runs the sort stage (entries sorted by word)
//! - Reports local failures to the coordinator and aborts
//!
//! Workers hold no state between phases: each stage is driven entirely by the
//! message that starts it, and the partition a stage receives is exclusively
//! owned by the worker until the reply is sent.

use crate::distributed::protocol::*;
use crate::model::{Entry, Word};
use anyhow::{Context, Result};
use tokio::net::{TcpListener, TcpStream};

/// Convert a word partition into unit-count entries, preserving order.
///
/// No sorting, no merging; one entry per word with a count of 1.
pub fn to_unit_entries(words: Vec<Word>) -> Vec<Entry> {
    words.into_iter().map(Entry::unit).collect()
}

/// Sort an entry partition by word (byte-wise lexicographic).
///
/// Stability is not required: ties only occur between literally-equal words,
/// which the coordinator's reduce pass collapses regardless of their relative
/// order.
pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_unstable_by(|a, b| a.word.cmp(&b.word));
}

/// Worker service
///
/// Runs on each worker in distributed mode, accepting commands from the
/// coordinator.
pub struct WorkerService {
    /// Bound listener
    listener: TcpListener,

    /// Worker identifier (hostname)
    node_id: String,
}

impl WorkerService {
    /// Bind the worker service to a port (0 picks an ephemeral port).
    pub async fn bind(listen_port: u16) -> Result<Self> {
        let addr = format!("0.0.0.0:{}", listen_port);
        let listener = TcpListener::bind(&addr)
            .await
            .context("Failed to bind worker service")?;
        let node_id = get_node_id()?;

        Ok(Self { listener, node_id })
    }

    /// The locally bound address (useful when bound to port 0).
    pub fn local_addr(&self) -> Result<std::net::SocketAddr> {
        self.listener
            .local_addr()
            .context("Failed to get worker listen address")
    }

    /// Run the worker service
    ///
    /// Listens for coordinator connections and serves one run per connection.
    pub async fn run(self) -> Result<()> {
        println!("Worker service listening on {}", self.local_addr()?);
        println!("Worker ID: {}", self.node_id);
        println!("Waiting for coordinator connection...");

        loop {
            let (stream, addr) = self
                .listener
                .accept()
                .await
                .context("Failed to accept connection")?;

            println!("Coordinator connected from: {}", addr);

            if let Err(e) = self.handle_run(stream).await {
                eprintln!("Run failed: {:#}", e);
            }

            println!("Run complete. Waiting for next connection...");
        }
    }

    /// Handle a single counting run over one coordinator connection.
    async fn handle_run(&self, mut stream: TcpStream) -> Result<()> {
        // Rank assignment handshake
        let assign = match read_message(&mut stream).await? {
            Message::Assign(assign) => assign,
            other => {
                self.report_error(&mut stream, format!("Expected ASSIGN, got {:?}", other))
                    .await?;
                anyhow::bail!("Expected ASSIGN as first message");
            }
        };

        if assign.protocol_version != PROTOCOL_VERSION {
            let error = format!(
                "Protocol version mismatch: coordinator={}, worker={}",
                assign.protocol_version, PROTOCOL_VERSION
            );
            self.report_error(&mut stream, error.clone()).await?;
            anyhow::bail!(error);
        }

        println!(
            "Assigned rank {} of {} workers",
            assign.rank, assign.peer_count
        );

        let ready = ReadyMessage {
            protocol_version: PROTOCOL_VERSION,
            node_id: self.node_id.clone(),
            rank: assign.rank,
        };
        write_message(&mut stream, &Message::Ready(ready)).await?;

        // Phase loop: each stage is driven by the message that starts it.
        loop {
            match read_message(&mut stream).await? {
                Message::Tokens(tokens) => {
                    // Transform stage: one unit-count entry per word, order
                    // preserved
                    println!("  Transform: {} words", tokens.words.len());
                    let reply = EntriesMessage {
                        rank: assign.rank,
                        entries: to_unit_entries(tokens.words),
                    };
                    write_message(&mut stream, &Message::Entries(reply)).await?;
                }
                Message::Entries(mut partition) => {
                    // Sort stage: order the partition by word
                    println!("  Sort: {} entries", partition.entries.len());
                    sort_entries(&mut partition.entries);
                    let reply = EntriesMessage {
                        rank: assign.rank,
                        entries: partition.entries,
                    };
                    write_message(&mut stream, &Message::Entries(reply)).await?;
                }
                Message::Shutdown => {
                    println!("Received SHUTDOWN");
                    break;
                }
                other => {
                    self.report_error(
                        &mut stream,
                        format!("Unexpected message in phase loop: {:?}", other),
                    )
                    .await?;
                    anyhow::bail!("Unexpected message in phase loop");
                }
            }
        }

        Ok(())
    }

    /// Send an error report to the coordinator.
    async fn report_error(&self, stream: &mut TcpStream, error: String) -> Result<()> {
        let msg = ErrorMessage {
            node_id: self.node_id.clone(),
            error,
        };
        write_message(stream, &Message::Error(msg)).await
    }
}

/// Get this worker's identifier (hostname).
fn get_node_id() -> Result<String> {
    let name = hostname::get().context("Failed to get hostname")?;
    Ok(name.to_string_lossy().into_owned())
}
