//! State module for tracking harvest progress
//!
//! # Components
//!
//! - `QueueStatus`: lifecycle of a frontier item (pending, in-progress, done)
//! - `LinkKind`: the two link categories the harvester follows (topic, answer)

mod link_kind;
mod queue_status;

// Re-export main types
pub use link_kind::LinkKind;
pub use queue_status::QueueStatus;
