//! Statistics generation from the harvest database
//!
//! This module provides functionality for extracting and displaying
//! frontier and content statistics from the storage layer.

use crate::state::QueueStatus;
use crate::storage::{Storage, StorageResult};

/// Frontier and content table summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStatistics {
    /// Total number of queue rows
    pub total_items: u64,

    /// Count of queue rows per status, in lifecycle order
    pub items_by_status: Vec<(QueueStatus, u64)>,

    /// Number of rows in the content table
    pub total_articles: u64,
}

impl QueueStatistics {
    /// Count for one status
    pub fn count(&self, status: QueueStatus) -> u64 {
        self.items_by_status
            .iter()
            .find(|(s, _)| *s == status)
            .map(|(_, count)| *count)
            .unwrap_or(0)
    }

    /// Items pending or in progress
    pub fn outstanding(&self) -> u64 {
        self.items_by_status
            .iter()
            .filter(|(status, _)| status.is_outstanding())
            .map(|(_, count)| count)
            .sum()
    }

    /// Share of queue rows that are done, as a percentage
    pub fn completion_rate(&self) -> f64 {
        if self.total_items == 0 {
            return 0.0;
        }
        self.count(QueueStatus::Done) as f64 / self.total_items as f64 * 100.0
    }
}

/// Loads statistics from storage
pub fn load_statistics(storage: &dyn Storage) -> StorageResult<QueueStatistics> {
    let total_items = storage.count_queue_items()?;

    let mut items_by_status = Vec::new();
    for status in QueueStatus::all_statuses() {
        items_by_status.push((status, storage.count_by_status(status)?));
    }

    let total_articles = storage.count_articles()?;

    Ok(QueueStatistics {
        total_items,
        items_by_status,
        total_articles,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &QueueStatistics) {
    println!("=== Harvest Statistics ===\n");

    println!("Frontier:");
    println!("  Total items: {}", stats.total_items);
    for (status, count) in &stats.items_by_status {
        let percentage = if stats.total_items > 0 {
            (*count as f64 / stats.total_items as f64) * 100.0
        } else {
            0.0
        };
        println!("  {}: {} ({:.1}%)", status, count, percentage);
    }
    println!("  Outstanding: {}", stats.outstanding());
    println!();

    println!("Content:");
    println!("  Articles: {}", stats.total_articles);
    println!();

    println!(
        "Completion: {:.1}% ({} / {} items done)",
        stats.completion_rate(),
        stats.count(QueueStatus::Done),
        stats.total_items
    );
}
