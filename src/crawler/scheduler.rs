//! Request pacing for a crawl pass
//!
//! Fetches within a pass are sequential. The pacer enforces a fixed delay
//! between consecutive fetches so a pass never bursts against the site.

use crate::config::CrawlerConfig;
use std::time::Duration;

/// Enforces a fixed politeness delay between consecutive fetches
#[derive(Debug, Clone)]
pub struct Pacer {
    delay: Duration,
    started: bool,
}

impl Pacer {
    /// Creates a pacer with the given delay
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            started: false,
        }
    }

    /// Creates a pacer from the crawler configuration
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self::new(Duration::from_millis(config.politeness_delay_ms))
    }

    /// The delay applied between fetches
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits until the next fetch may start
    ///
    /// The first call returns immediately; every later call sleeps for the
    /// configured delay.
    pub async fn wait(&mut self) {
        if self.started && !self.delay.is_zero() {
            tracing::trace!("Pausing {:?} before next fetch", self.delay);
            tokio::time::sleep(self.delay).await;
        }
        self.started = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_from_config() {
        let config = CrawlerConfig {
            politeness_delay_ms: 250,
            ..CrawlerConfig::default()
        };
        assert_eq!(Pacer::from_config(&config).delay(), Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_first_wait_is_immediate() {
        let mut pacer = Pacer::new(Duration::from_secs(10));
        let start = Instant::now();
        pacer.wait().await;
        assert!(start.elapsed() < Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_later_waits_sleep() {
        let mut pacer = Pacer::new(Duration::from_millis(30));
        pacer.wait().await;

        let start = Instant::now();
        pacer.wait().await;
        pacer.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(60));
    }
}
