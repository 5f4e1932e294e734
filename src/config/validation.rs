use crate::config::types::{Config, CrawlerConfig, OutputConfig, SiteConfig, UserAgentConfig};
use crate::ConfigError;
use url::Url;

/// Largest batch a single crawl step may reserve
pub const MAX_BATCH_SIZE: u32 = 100;

/// Longest lease an in-progress item may hold (one year)
pub const MAX_LEASE_SECS: u64 = 365 * 24 * 60 * 60;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_site_config(&config.site)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.batch_size < 1 || config.batch_size > MAX_BATCH_SIZE {
        return Err(ConfigError::Validation(format!(
            "batch_size must be between 1 and {}, got {}",
            MAX_BATCH_SIZE, config.batch_size
        )));
    }

    validate_lang(&config.lang)?;

    if config.max_answers == 0 || config.max_topics == 0 {
        return Err(ConfigError::Validation(
            "seed-max-answers and seed-max-topics must be >= 1".to_string(),
        ));
    }

    if let Some(lease) = config.lease_timeout_secs {
        if lease == 0 || lease > MAX_LEASE_SECS {
            return Err(ConfigError::Validation(format!(
                "lease_timeout_secs must be between 1 and {} when set, got {}",
                MAX_LEASE_SECS, lease
            )));
        }
    }

    Ok(())
}

/// Language codes look like `ko`, `en`, `pt-BR` or `zh-Hant`
fn validate_lang(lang: &str) -> Result<(), ConfigError> {
    if lang.is_empty() {
        return Err(ConfigError::Validation("lang cannot be empty".to_string()));
    }

    if !lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ConfigError::Validation(format!(
            "lang must contain only ASCII letters, digits, '-' or '_', got '{}'",
            lang
        )));
    }

    Ok(())
}

/// Validates site configuration
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    let origin = Url::parse(&config.origin)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid origin '{}': {}", config.origin, e)))?;

    if origin.scheme() != "http" && origin.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "origin must use http or https, got '{}'",
            config.origin
        )));
    }

    if origin.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "origin has no host: '{}'",
            config.origin
        )));
    }

    if config.tracking_param.is_empty() || config.lang_param.is_empty() {
        return Err(ConfigError::Validation(
            "tracking-param and lang-param cannot be empty".to_string(),
        ));
    }

    if !config.relative_root.starts_with('/') || !config.relative_root.ends_with('/') {
        return Err(ConfigError::Validation(format!(
            "relative-root must start and end with '/', got '{}'",
            config.relative_root
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    if config.agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user-agent agent cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.feed_path.is_empty() {
        return Err(ConfigError::Validation(
            "feed_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> Config {
        Config {
            crawler: CrawlerConfig::default(),
            site: SiteConfig::default(),
            user_agent: UserAgentConfig::default(),
            output: OutputConfig {
                database_path: "./test.db".to_string(),
                feed_path: "./feed.xml".to_string(),
            },
        }
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_batch_size_bounds() {
        let mut config = valid_config();
        config.crawler.batch_size = 1;
        assert!(validate(&config).is_ok());
        config.crawler.batch_size = 100;
        assert!(validate(&config).is_ok());
        config.crawler.batch_size = 101;
        assert!(validate(&config).is_err());
        config.crawler.batch_size = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_lang() {
        assert!(validate_lang("ko").is_ok());
        assert!(validate_lang("pt-BR").is_ok());
        assert!(validate_lang("zh_Hant").is_ok());

        assert!(validate_lang("").is_err());
        assert!(validate_lang("en&x=1").is_err());
        assert!(validate_lang("en us").is_err());
    }

    #[test]
    fn test_invalid_origin() {
        let mut config = valid_config();
        config.site.origin = "not a url".to_string();
        assert!(matches!(
            validate(&config).unwrap_err(),
            ConfigError::InvalidUrl(_)
        ));

        config.site.origin = "ftp://support.google.com".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_relative_root_shape() {
        let mut config = valid_config();
        config.site.relative_root = "a/".to_string();
        assert!(validate(&config).is_err());
        config.site.relative_root = "/a".to_string();
        assert!(validate(&config).is_err());
        config.site.relative_root = "/".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_zero_lease_rejected() {
        let mut config = valid_config();
        config.crawler.lease_timeout_secs = Some(0);
        assert!(validate(&config).is_err());
        config.crawler.lease_timeout_secs = Some(60);
        assert!(validate(&config).is_ok());
        config.crawler.lease_timeout_secs = Some(MAX_LEASE_SECS + 1);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_database_path() {
        let mut config = valid_config();
        config.output.database_path = String::new();
        assert!(validate(&config).is_err());
    }
}
