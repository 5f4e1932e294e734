//! Crawl coordinator - seed and crawl-step orchestration
//!
//! This module ties the pieces of a pass together:
//! - Seeding the frontier from a topic page
//! - Reserving a batch and dispatching each item by kind
//! - Isolating per-item failures from the rest of the batch
//! - Committing completions and reporting a summary

use crate::config::{Config, MAX_BATCH_SIZE};
use crate::crawler::extractor::{ExtractedLinks, LinkExtractor};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::parser::parse_answer_page;
use crate::crawler::scheduler::Pacer;
use crate::state::LinkKind;
use crate::storage::{Article, SqliteStorage, Storage};
use crate::url::UrlNormalizer;
use crate::HarvestError;
use chrono::{DateTime, Duration, Utc};
use std::path::Path;

/// Format of an article's `pub_date`
pub const PUB_DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

/// Result of seeding the frontier from a topic page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedSummary {
    /// Canonical form of the seed URL, itself enqueued as a topic
    pub seed_url: String,
    /// Topic links newly added to the frontier
    pub topics: usize,
    /// Answer links newly added to the frontier
    pub answers: usize,
}

/// Counts produced by one crawl step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepSummary {
    /// Answer items harvested
    pub answers: usize,
    /// Topic items expanded
    pub topics: usize,
    /// Articles appended to the content table
    pub inserted: usize,
    /// Articles overwritten in place
    pub updated: usize,
    /// Items that failed and were left in progress
    pub errors: usize,
    /// Stale reservations returned to pending before the batch
    pub requeued: usize,
    /// Items still outstanding after the step
    pub pending: u64,
}

/// Main crawl coordinator structure
pub struct Coordinator<S: Storage, F: Fetcher> {
    storage: S,
    fetcher: F,
    normalizer: UrlNormalizer,
    extractor: LinkExtractor,
    pacer: Pacer,
    max_answers: usize,
    max_topics: usize,
    lease: Option<Duration>,
}

impl Coordinator<SqliteStorage, HttpFetcher> {
    /// Opens the configured database and builds an HTTP fetcher
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - Failed to open storage or build the client
    pub fn open(config: &Config) -> Result<Self, HarvestError> {
        let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
        let fetcher = HttpFetcher::new(&config.user_agent, config.site.enforce_https)?;
        Self::new(config, storage, fetcher)
    }
}

impl<S: Storage, F: Fetcher> Coordinator<S, F> {
    /// Creates a coordinator over the given storage and fetcher
    pub fn new(config: &Config, storage: S, fetcher: F) -> Result<Self, HarvestError> {
        let normalizer = UrlNormalizer::new(&config.site)?;
        let extractor = LinkExtractor::new(normalizer.clone())?;

        Ok(Self {
            storage,
            fetcher,
            normalizer,
            extractor,
            pacer: Pacer::from_config(&config.crawler),
            max_answers: config.crawler.max_answers,
            max_topics: config.crawler.max_topics,
            lease: config
                .crawler
                .lease_timeout_secs
                .and_then(|secs| Duration::try_seconds(i64::try_from(secs).ok()?)),
        })
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn storage_mut(&mut self) -> &mut S {
        &mut self.storage
    }

    /// Seeds the frontier from a topic page
    ///
    /// Discovered topics are enqueued before answers, then the seed itself
    /// is enqueued as a topic so its links are rediscovered on a later step.
    /// A failed fetch of the seed page is returned as an error.
    pub async fn seed_from_topic(
        &mut self,
        topic_url: &str,
        lang: &str,
    ) -> Result<SeedSummary, HarvestError> {
        let seed_url = self.normalizer.normalize(topic_url, Some(lang));
        tracing::info!("Seeding from {}", seed_url);

        self.pacer.wait().await;
        let body = self.fetcher.fetch(&seed_url, lang).await?;
        let links = self
            .extractor
            .extract(&body, lang, self.max_answers, self.max_topics);

        let (topics, answers) = self.enqueue_links(&links)?;
        self.storage.enqueue(LinkKind::Topic, &seed_url)?;

        tracing::info!(
            "Seed found {} topics and {} answers ({} and {} new)",
            links.topics.len(),
            links.answers.len(),
            topics,
            answers
        );

        Ok(SeedSummary {
            seed_url,
            topics,
            answers,
        })
    }

    /// Runs one bounded crawl pass
    ///
    /// # Pass Flow
    ///
    /// 1. Return stale reservations to pending (only when a lease is set)
    /// 2. Reserve up to `batch_size` pending items, clamped to 1..=100
    /// 3. Topic: fetch, extract, enqueue every discovered link
    /// 4. Answer: fetch, parse, upsert the article
    /// 5. Mark every successful item done in one call
    ///
    /// A failed fetch is logged and counted, and its item stays in progress.
    /// Storage errors abort the pass.
    pub async fn crawl_step(
        &mut self,
        lang: &str,
        batch_size: usize,
    ) -> Result<StepSummary, HarvestError> {
        let mut summary = StepSummary::default();

        if let Some(lease) = self.lease {
            summary.requeued = self.storage.requeue_stale(stale_cutoff(lease)?)?;
            if summary.requeued > 0 {
                tracing::info!("Returned {} stale items to pending", summary.requeued);
            }
        }

        let batch_size = batch_size.clamp(1, MAX_BATCH_SIZE as usize);
        let batch = self.storage.pop_batch(batch_size)?;
        tracing::debug!("Reserved {} items", batch.len());

        let mut completed = Vec::with_capacity(batch.len());
        for item in &batch {
            self.pacer.wait().await;
            tracing::debug!("Processing {} {}", item.kind, item.url);

            let body = match self.fetcher.fetch(&item.url, lang).await {
                Ok(body) => body,
                Err(e) => {
                    tracing::error!("Error processing {} {}: {}", item.kind, item.url, e);
                    summary.errors += 1;
                    continue;
                }
            };

            match item.kind {
                LinkKind::Topic => {
                    let links =
                        self.extractor
                            .extract(&body, lang, self.max_answers, self.max_topics);
                    let (topics, answers) = self.enqueue_links(&links)?;
                    tracing::debug!(
                        "{} yielded {} new topics and {} new answers",
                        item.url,
                        topics,
                        answers
                    );
                    summary.topics += 1;
                }
                LinkKind::Answer => {
                    let article = self.build_article(&item.url, &body, lang, Utc::now());
                    let outcome = self.storage.upsert_articles(&[article])?;
                    summary.inserted += outcome.inserted;
                    summary.updated += outcome.updated;
                    summary.answers += 1;
                }
            }

            completed.push(item.row);
        }

        self.storage.mark_done(&completed)?;
        summary.pending = self.storage.count_pending()?;

        tracing::info!(
            "Step complete: {} answers, {} topics, {} inserted, {} updated, {} errors, {} pending",
            summary.answers,
            summary.topics,
            summary.inserted,
            summary.updated,
            summary.errors,
            summary.pending
        );

        Ok(summary)
    }

    /// Returns items reserved longer than `older_than` ago to pending
    ///
    /// Fails without touching storage when `older_than` reaches before the
    /// earliest time chrono can represent.
    pub fn requeue_stale(&mut self, older_than: Duration) -> Result<usize, HarvestError> {
        let requeued = self.storage.requeue_stale(stale_cutoff(older_than)?)?;
        tracing::info!("Returned {} stale items to pending", requeued);
        Ok(requeued)
    }

    /// Builds the content-table row for a fetched answer page
    pub fn build_article(&self, url: &str, body: &str, lang: &str, now: DateTime<Utc>) -> Article {
        let parsed = parse_answer_page(body, lang, &self.normalizer);
        let guid = Article::fingerprint(url, &parsed.text);

        Article {
            title: parsed.title,
            link: self.normalizer.normalize(url, Some(lang)),
            pub_date: now.format(PUB_DATE_FORMAT).to_string(),
            description: parsed.text,
            guid,
        }
    }

    /// Enqueues topics then answers, returning how many of each were new
    fn enqueue_links(&mut self, links: &ExtractedLinks) -> Result<(usize, usize), HarvestError> {
        let mut topics = 0;
        for url in &links.topics {
            if self.storage.enqueue(LinkKind::Topic, url)? {
                topics += 1;
            }
        }

        let mut answers = 0;
        for url in &links.answers {
            if self.storage.enqueue(LinkKind::Answer, url)? {
                answers += 1;
            }
        }

        Ok((topics, answers))
    }
}

/// Reservation time before which an in-progress item counts as stale
fn stale_cutoff(older_than: Duration) -> Result<DateTime<Utc>, HarvestError> {
    Utc::now()
        .checked_sub_signed(older_than)
        .ok_or(HarvestError::LeaseOutOfRange {
            seconds: older_than.num_seconds(),
        })
}
