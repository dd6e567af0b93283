//! Affiliate link rewriting.
//!
//! Rebuilds supported Amazon URLs with the configured affiliate tag,
//! stripping known tracking parameters. URLs on unrecognized domains are
//! returned unchanged: the tag is never attached to a domain outside the
//! allow-list.

use crate::config::Config;
use tracing::{debug, warn};
use url::Url;

/// Rewrites Amazon URLs into affiliate links.
#[derive(Debug, Clone)]
pub struct LinkRewriter {
    affiliate_tag: String,
    allowed_domains: Vec<String>,
    strip_params: Vec<String>,
}

impl LinkRewriter {
    /// Creates a rewriter from the application configuration.
    pub fn new(config: &Config) -> Self {
        Self {
            affiliate_tag: config.affiliate_tag.clone(),
            allowed_domains: config.allowed_domains.clone(),
            strip_params: config.strip_params.clone(),
        }
    }

    /// Rewrites a resolved URL into an affiliate link.
    ///
    /// With a known ASIN the whole path and query are replaced by
    /// `/dp/<ASIN>?tag=<affiliate>`. Without one, the existing path and
    /// query survive minus the tracking parameters, and exactly one tag is
    /// appended. Idempotent for already-rewritten links.
    pub fn rewrite(&self, url_str: &str, asin: Option<&str>) -> String {
        let url = match Url::parse(url_str) {
            Ok(url) => url,
            Err(e) => {
                warn!("Cannot rewrite malformed URL {}: {}", url_str, e);
                return url_str.to_string();
            }
        };

        let host = match url.host_str() {
            Some(host) => host,
            None => return url_str.to_string(),
        };

        if !self.is_allowed(host) {
            warn!("Unsupported domain {}. Returning original URL.", host);
            return url_str.to_string();
        }

        let rewritten = match asin {
            Some(asin) => {
                format!("{}://{}/dp/{}?tag={}", url.scheme(), host, asin, self.affiliate_tag)
            }
            None => self.rewrite_keeping_path(&url),
        };

        debug!("Rewrote {} -> {}", url_str, rewritten);
        rewritten
    }

    /// Keeps path and query, drops tracking parameters, appends the tag.
    fn rewrite_keeping_path(&self, url: &Url) -> String {
        let kept: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(key, _)| !self.strip_params.iter().any(|p| p == key))
            .map(|(key, value)| (key.into_owned(), value.into_owned()))
            .collect();

        let mut out = url.clone();
        out.set_query(None);
        {
            let mut pairs = out.query_pairs_mut();
            for (key, value) in &kept {
                pairs.append_pair(key, value);
            }
            pairs.append_pair("tag", &self.affiliate_tag);
        }

        out.to_string()
    }

    /// Host suffix match against the allow-list, so `www.amazon.in` matches
    /// the `amazon.in` entry.
    fn is_allowed(&self, host: &str) -> bool {
        self.allowed_domains
            .iter()
            .any(|domain| host == domain || host.ends_with(&format!(".{}", domain)))
    }
}
