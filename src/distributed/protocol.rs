//! Distributed mode protocol
//!
//! This module defines the protocol for communication between the coordinator
//! and worker nodes. Messages are serialized with MessagePack (rmp-serde) and
//! framed with a 4-byte little-endian length prefix:
//!
//! ```text
//! [4 bytes: message length (little-endian u32)][N bytes: MessagePack message]
//! ```
//!
//! One `write_message` call produces exactly one receivable message, and
//! `read_message` returns whole messages only; partial frames never reach the
//! caller. Any framing or deserialization failure is fatal to the run — the
//! protocol has no notion of a degraded worker set.
//!
//! # Message Flow
//!
//! ```text
//! Coordinator                     Worker
//!     |                              |
//!     |-------- ASSIGN ------------->|
//!     |<------- READY ---------------|
//!     |                              |
//!     |-- TOKENS(word partition) --->|
//!     |<- ENTRIES(unit counts) ------|
//!     |                              |
//!     |-- ENTRIES(entry partition) ->|
//!     |<- ENTRIES(sorted) -----------|
//!     |                              |
//!     |-------- SHUTDOWN ----------->|
//! ```
//!
//! Each phase is a full barrier: the coordinator sends to each worker exactly
//! once and receives from each worker exactly once before advancing.

use crate::model::{Entry, Word};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Protocol version
///
/// Increment this when making breaking changes to the protocol.
/// Coordinator and workers must have matching protocol versions.
pub const PROTOCOL_VERSION: u32 = 1;

/// Maximum framed message size (sanity check against corrupt length fields)
const MAX_MESSAGE_BYTES: usize = 100 * 1024 * 1024;

/// Protocol message
///
/// All messages exchanged between the coordinator and worker nodes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Message {
    /// Rank assignment (Coordinator → Worker)
    ///
    /// Opens a run: carries the worker's rank and the pool size so workers
    /// never read topology from ambient state.
    Assign(AssignMessage),

    /// Ready acknowledgment (Worker → Coordinator)
    ///
    /// Sent by a worker once it has accepted its rank assignment.
    Ready(ReadyMessage),

    /// Word partition (Coordinator → Worker)
    ///
    /// Phase-1 scatter. The worker converts each word into a unit-count
    /// entry, preserving order, and replies with `Entries`.
    Tokens(TokensMessage),

    /// Entry sequence (both directions)
    ///
    /// Worker replies in the transform and sort phases, and the coordinator's
    /// phase-3 re-scatter. A worker receiving this sorts the entries by word
    /// and replies with the sorted sequence.
    Entries(EntriesMessage),

    /// End of run (Coordinator → Worker)
    ///
    /// The worker returns to waiting for the next coordinator connection.
    Shutdown,

    /// Error report (Worker → Coordinator)
    ///
    /// Any local worker failure aborts the whole run; nothing is retried.
    Error(ErrorMessage),
}

/// Rank assignment message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignMessage {
    /// Protocol version (must match)
    pub protocol_version: u32,

    /// This worker's rank (0-based position in the pool)
    pub rank: usize,

    /// Total number of workers in the pool
    pub peer_count: usize,
}

/// Ready message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReadyMessage {
    /// Protocol version
    pub protocol_version: u32,

    /// Worker identifier (hostname)
    pub node_id: String,

    /// The rank this worker was assigned
    pub rank: usize,
}

/// Word partition message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokensMessage {
    /// Destination worker rank
    pub rank: usize,

    /// Contiguous word partition, in input order (may be empty)
    pub words: Vec<Word>,
}

/// Entry sequence message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntriesMessage {
    /// Worker rank this partition belongs to
    pub rank: usize,

    /// Entry sequence (may be empty)
    pub entries: Vec<Entry>,
}

/// Error message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorMessage {
    /// Worker identifier
    pub node_id: String,

    /// Error description
    pub error: String,
}

/// Serialize a message to bytes
///
/// Uses MessagePack and prepends a 4-byte length field for framing.
pub fn serialize_message(msg: &Message) -> Result<Vec<u8>> {
    let msg_bytes = rmp_serde::to_vec(msg).context("Failed to serialize message")?;

    let msg_len = msg_bytes.len() as u32;
    let mut framed = Vec::with_capacity(4 + msg_bytes.len());
    framed.extend_from_slice(&msg_len.to_le_bytes());
    framed.extend_from_slice(&msg_bytes);

    Ok(framed)
}

/// Deserialize a message from bytes
///
/// Expects a 4-byte length prefix followed by a MessagePack message.
///
/// # Returns
///
/// Returns (message, bytes_consumed) where bytes_consumed includes the length
/// prefix.
pub fn deserialize_message(buf: &[u8]) -> Result<(Message, usize)> {
    if buf.len() < 4 {
        anyhow::bail!(
            "Buffer too small for message length (need 4 bytes, got {})",
            buf.len()
        );
    }

    let msg_len = u32::from_le_bytes([buf[0], buf[1], buf[2], buf[3]]) as usize;

    if buf.len() < 4 + msg_len {
        anyhow::bail!(
            "Incomplete message (need {} bytes, got {})",
            4 + msg_len,
            buf.len()
        );
    }

    let msg = rmp_serde::from_slice(&buf[4..4 + msg_len])
        .context("Failed to deserialize message")?;

    Ok((msg, 4 + msg_len))
}

/// Read a complete message from a TCP stream
///
/// Reads the length prefix, then reads the complete message body.
/// Handles partial reads and buffering.
pub async fn read_message(stream: &mut tokio::net::TcpStream) -> Result<Message> {
    use tokio::io::AsyncReadExt;

    // Read length field (4 bytes)
    let mut len_buf = [0u8; 4];
    stream
        .read_exact(&mut len_buf)
        .await
        .context("Failed to read message length")?;

    let msg_len = u32::from_le_bytes(len_buf) as usize;

    if msg_len > MAX_MESSAGE_BYTES {
        anyhow::bail!(
            "Message too large: {} bytes (max {} bytes)",
            msg_len,
            MAX_MESSAGE_BYTES
        );
    }

    // Read message body
    let mut msg_buf = vec![0u8; msg_len];
    stream
        .read_exact(&mut msg_buf)
        .await
        .context("Failed to read message body")?;

    let msg = rmp_serde::from_slice(&msg_buf).context("Failed to deserialize message")?;

    Ok(msg)
}

/// Write a message to a TCP stream
///
/// Serializes the message with length prefix and writes it to the stream.
pub async fn write_message(stream: &mut tokio::net::TcpStream, msg: &Message) -> Result<()> {
    use tokio::io::AsyncWriteExt;

    let framed = serialize_message(msg)?;

    stream
        .write_all(&framed)
        .await
        .context("Failed to write message")?;

    // Flush to ensure the message is sent immediately
    stream.flush().await.context("Failed to flush stream")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialize_deserialize_assign() {
        let msg = Message::Assign(AssignMessage {
            protocol_version: PROTOCOL_VERSION,
            rank: 2,
            peer_count: 4,
        });

        let bytes = serialize_message(&msg).unwrap();
        let (deserialized, consumed) = deserialize_message(&bytes).unwrap();

        assert_eq!(consumed, bytes.len());

        match deserialized {
            Message::Assign(assign) => {
                assert_eq!(assign.protocol_version, PROTOCOL_VERSION);
                assert_eq!(assign.rank, 2);
                assert_eq!(assign.peer_count, 4);
            }
            _ => panic!("Wrong message type"),
        }
    }

    #[test]
    fn test_serialize_deserialize_tokens() {
        let words = vec![Word::new("alpha").unwrap(), Word::new("beta").unwrap()];
        let msg = Message::Tokens(TokensMessage { rank: 0, words });

        let bytes = serialize_message(&msg).unwrap();
        let (deserialized, consumed) = deserialize_message(&bytes).unwrap();

        assert_eq!(consumed, bytes.len());

        match deserialized {
            Message::Tokens(tokens) => {
                assert_eq!(tokens.rank, 0);
                assert_eq!(tokens.words.len(), 2);
                assert_eq!(tokens.words[0].as_str(), "alpha");
                assert_eq!(tokens.words[1].as_str(), "beta");
            }
            _ => panic!("Wrong message type"),
        }
    }

    #[test]
    fn test_serialize_deserialize_empty_entries() {
        // Empty partitions must be transmittable as zero-element messages
        let msg = Message::Entries(EntriesMessage {
            rank: 3,
            entries: Vec::new(),
        });

        let bytes = serialize_message(&msg).unwrap();
        let (deserialized, _) = deserialize_message(&bytes).unwrap();

        match deserialized {
            Message::Entries(entries) => {
                assert_eq!(entries.rank, 3);
                assert!(entries.entries.is_empty());
            }
            _ => panic!("Wrong message type"),
        }
    }

    #[test]
    fn test_serialize_deserialize_error() {
        let msg = Message::Error(ErrorMessage {
            node_id: "node-1".to_string(),
            error: "Test error".to_string(),
        });

        let bytes = serialize_message(&msg).unwrap();
        let (deserialized, consumed) = deserialize_message(&bytes).unwrap();

        assert_eq!(consumed, bytes.len());

        match deserialized {
            Message::Error(err) => {
                assert_eq!(err.node_id, "node-1");
                assert_eq!(err.error, "Test error");
            }
            _ => panic!("Wrong message type"),
        }
    }

    #[test]
    fn test_message_framing() {
        let msg = Message::Shutdown;
        let bytes = serialize_message(&msg).unwrap();

        // Check length prefix
        assert!(bytes.len() >= 4);
        let msg_len = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize;
        assert_eq!(bytes.len(), 4 + msg_len);
    }

    #[test]
    fn test_truncated_buffer_is_rejected() {
        let msg = Message::Shutdown;
        let bytes = serialize_message(&msg).unwrap();

        assert!(deserialize_message(&bytes[..2]).is_err());
        assert!(deserialize_message(&bytes[..bytes.len() - 1]).is_err());
    }
}
