use serde::Deserialize;

/// Main configuration structure for Support-Harvest
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(rename = "user-agent", default)]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawl pass behavior
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Language code applied to every harvested link
    pub lang: String,

    /// Number of queue items processed per crawl step
    #[serde(rename = "batch-size")]
    pub batch_size: u32,

    /// Delay between consecutive item fetches (milliseconds)
    #[serde(rename = "politeness-delay-ms")]
    pub politeness_delay_ms: u64,

    /// Cap on answer links taken from one topic page
    #[serde(rename = "seed-max-answers")]
    pub max_answers: usize,

    /// Cap on topic links taken from one topic page
    #[serde(rename = "seed-max-topics")]
    pub max_topics: usize,

    /// In-progress items older than this are returned to pending
    #[serde(rename = "lease-timeout-secs")]
    pub lease_timeout_secs: Option<u64>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            lang: "ko".to_string(),
            batch_size: 20,
            politeness_delay_ms: 200,
            max_answers: 500,
            max_topics: 500,
            lease_timeout_secs: None,
        }
    }
}

/// The help site being harvested
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Origin that relative links are resolved against
    pub origin: String,

    /// Query parameter stripped from every link
    #[serde(rename = "tracking-param")]
    pub tracking_param: String,

    /// Query parameter carrying the language code
    #[serde(rename = "lang-param")]
    pub lang_param: String,

    /// Site path that `../`-prefixed links are rebased onto
    #[serde(rename = "relative-root")]
    pub relative_root: String,

    /// Rewrite http links to https
    #[serde(rename = "enforce-https")]
    pub enforce_https: bool,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            origin: "https://support.google.com".to_string(),
            tracking_param: "ref_topic".to_string(),
            lang_param: "hl".to_string(),
            relative_root: "/a/".to_string(),
            enforce_https: true,
        }
    }
}

/// HTTP identification
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// User-Agent header value
    pub agent: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            agent: "Mozilla/5.0 (compatible; support-harvest)".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path to the RSS feed written by `export-feed`
    #[serde(rename = "feed-path", default = "default_feed_path")]
    pub feed_path: String,
}

fn default_feed_path() -> String {
    "./articles.xml".to_string()
}
