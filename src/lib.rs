//! WordPulse - Distributed word-frequency counting tool
//!
//! WordPulse counts word frequencies in large token streams by scattering the
//! work across a pool of workers and merging the results on a coordinator.
//!
//! # Architecture
//!
//! - **Three-phase protocol**: scatter words, gather and re-scatter partial
//!   counts, gather sorted runs
//! - **Coordinator merge-reduce**: k-way heap merge of the sorted runs plus
//!   an adjacent-dedup pass summing counts
//! - **Distributed mode**: coordinator and workers on separate hosts over
//!   framed TCP messages
//! - **Standalone mode**: auto-spawned localhost workers behind the same
//!   protocol

pub mod config;
pub mod distributed;
pub mod input;
pub mod merge;
pub mod model;
pub mod output;
pub mod partition;

// Re-export commonly used types
pub use config::Config;
pub use model::{Entry, Word, MAX_WORD_BYTES};

/// Result type used throughout WordPulse
pub type Result<T> = anyhow::Result<T>;
