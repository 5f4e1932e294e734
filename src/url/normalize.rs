use crate::config::SiteConfig;
use crate::url::escapes::decode_entities;
use crate::{UrlError, UrlResult};
use url::Url;

/// Canonicalizes link strings found on the help site
///
/// # Normalization Steps
///
/// 1. Decode HTML entities and trim
/// 2. Rebase `../`-prefixed paths onto the site's relative root
/// 3. Give protocol-relative links (`//host/...`) an `https:` scheme
/// 4. Resolve against the site origin
/// 5. Remove the tracking query parameter
/// 6. Set (overwrite) the language query parameter when a language is given
/// 7. Rewrite `http` to `https`; other schemes such as `mailto:` keep theirs
///
/// Normalizing a canonical URL returns it unchanged.
#[derive(Debug, Clone)]
pub struct UrlNormalizer {
    origin: Url,
    tracking_param: String,
    lang_param: String,
    relative_root: String,
    enforce_https: bool,
}

impl UrlNormalizer {
    /// Creates a normalizer for the configured site
    ///
    /// # Errors
    ///
    /// Returns `UrlError::Parse` if the configured origin is not a valid URL.
    pub fn new(site: &SiteConfig) -> UrlResult<Self> {
        let origin = Url::parse(&site.origin)
            .map_err(|e| UrlError::Parse(format!("{}: {}", site.origin, e)))?;

        Ok(Self {
            origin,
            tracking_param: site.tracking_param.clone(),
            lang_param: site.lang_param.clone(),
            relative_root: site.relative_root.clone(),
            enforce_https: site.enforce_https,
        })
    }

    /// The origin relative links are resolved against
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Normalizes a link, returning the input unchanged on failure
    ///
    /// Callers that need to know whether normalization succeeded should
    /// check the result against the shape they expect, or use
    /// [`UrlNormalizer::try_normalize`].
    ///
    /// # Examples
    ///
    /// ```
    /// use support_harvest::config::SiteConfig;
    /// use support_harvest::url::UrlNormalizer;
    ///
    /// let normalizer = UrlNormalizer::new(&SiteConfig::default()).unwrap();
    /// assert_eq!(
    ///     normalizer.normalize("/a/answer/123?ref_topic=9", Some("en")),
    ///     "https://support.google.com/a/answer/123?hl=en"
    /// );
    /// ```
    pub fn normalize(&self, raw: &str, lang: Option<&str>) -> String {
        match self.try_normalize(raw, lang) {
            Ok(url) => url.to_string(),
            Err(e) => {
                tracing::debug!("Leaving link as-is: {}", e);
                raw.to_string()
            }
        }
    }

    /// Normalizes a link, reporting why it could not be normalized
    pub fn try_normalize(&self, raw: &str, lang: Option<&str>) -> UrlResult<Url> {
        let decoded = decode_entities(raw);
        let trimmed = decoded.trim();

        let candidate = if let Some(rest) = trimmed.strip_prefix("../") {
            format!("{}{}", self.relative_root, rest.trim_start_matches("../"))
        } else if trimmed.starts_with("//") {
            format!("https:{}", trimmed)
        } else {
            trimmed.to_string()
        };

        let mut url = self
            .origin
            .join(&candidate)
            .map_err(|e| UrlError::Parse(format!("{}: {}", candidate, e)))?;

        if url.query().is_some() || lang.is_some() {
            let params = rewrite_query(&url, &self.tracking_param, &self.lang_param, lang);
            if params.is_empty() {
                url.set_query(None);
            } else {
                url.query_pairs_mut().clear().extend_pairs(&params);
            }
        }

        if self.enforce_https && url.scheme() == "http" {
            url.set_scheme("https")
                .map_err(|_| UrlError::Scheme(url.to_string()))?;
        }

        Ok(url)
    }
}

/// Drops the tracking parameter and sets the language parameter in place
///
/// The first existing language parameter keeps its position; later
/// duplicates are dropped. A missing one is appended.
fn rewrite_query(
    url: &Url,
    tracking_param: &str,
    lang_param: &str,
    lang: Option<&str>,
) -> Vec<(String, String)> {
    let mut params: Vec<(String, String)> = Vec::new();
    let mut lang_written = false;

    for (key, value) in url.query_pairs() {
        if key == tracking_param {
            continue;
        }

        match lang {
            Some(lang) if key == lang_param => {
                if !lang_written {
                    params.push((key.into_owned(), lang.to_string()));
                    lang_written = true;
                }
            }
            _ => params.push((key.into_owned(), value.into_owned())),
        }
    }

    if let Some(lang) = lang {
        if !lang_written {
            params.push((lang_param.to_string(), lang.to_string()));
        }
    }

    params
}
