//! Output module for reporting on harvest state
//!
//! This module handles:
//! - Queue and content statistics
//! - RSS 2.0 export of the content table

pub mod feed;
pub mod stats;

pub use feed::{export_feed, format_feed, write_feed, FeedChannel};
pub use stats::{load_statistics, print_statistics, QueueStatistics};

use crate::storage::StorageError;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
