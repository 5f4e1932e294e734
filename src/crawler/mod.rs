//! Crawler module for help-site harvesting
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `Fetcher` trait
//! - Link extraction and answer page parsing
//! - Request pacing
//! - Seed and crawl-step coordination

mod coordinator;
mod extractor;
mod fetcher;
mod parser;
mod scheduler;

pub use coordinator::{Coordinator, SeedSummary, StepSummary, PUB_DATE_FORMAT};
pub use extractor::{ExtractedLinks, LinkExtractor};
pub use fetcher::{accept_language, build_http_client, Fetcher, HttpFetcher};
pub use parser::{parse_answer_page, render_text, ParsedAnswer, DEFAULT_TITLE};
pub use scheduler::Pacer;
