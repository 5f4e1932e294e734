//! Queue status definitions for tracking frontier items
//!
//! Items move strictly forward: `Pending -> InProgress -> Done`. The only
//! backward edge is lease expiry, which returns a stale `InProgress` item to
//! `Pending`. The storage layer enforces these edges in its update filters.
use std::fmt;

/// Represents the current status of a frontier item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueueStatus {
    /// Discovered and waiting to be reserved by a crawl step
    Pending,

    /// Reserved by a crawl step and not yet completed
    InProgress,

    /// Processed successfully; never reprocessed
    Done,
}

impl QueueStatus {
    /// Returns true if the item still needs work (pending or in-progress)
    pub fn is_outstanding(&self) -> bool {
        matches!(self, Self::Pending | Self::InProgress)
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }

    /// Parses a status from its database string representation
    ///
    /// Returns None if the string doesn't match any known status.
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "in-progress" => Some(Self::InProgress),
            "done" => Some(Self::Done),
            _ => None,
        }
    }

    /// Returns all possible statuses
    pub fn all_statuses() -> Vec<Self> {
        vec![Self::Pending, Self::InProgress, Self::Done]
    }
}

impl fmt::Display for QueueStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}
