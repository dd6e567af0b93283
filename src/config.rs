//! Configuration management with TOML, environment variables, and CLI overrides.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Application configuration with layered loading.
///
/// Everything the pipeline needs is explicit here: the affiliate tag, the
/// domain allow-list, the tracking parameters to strip, and per-service
/// timeouts. Components receive these values at construction rather than
/// reading ambient state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Affiliate tag appended to rewritten links
    #[serde(default = "default_affiliate_tag")]
    pub affiliate_tag: String,

    /// Domains eligible for affiliate rewriting (matched by host suffix)
    #[serde(default = "default_allowed_domains")]
    pub allowed_domains: Vec<String>,

    /// Tracking query parameters removed before the tag is appended
    #[serde(default = "default_strip_params")]
    pub strip_params: Vec<String>,

    /// Timeout for page fetches and redirect resolution, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Timeout for shortener provider calls, in seconds
    #[serde(default = "default_shorten_timeout_secs")]
    pub shorten_timeout_secs: u64,

    /// Timeout for outbound Telegram calls, in seconds
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,

    /// Port for the webhook server
    #[serde(default = "default_port")]
    pub port: u16,

    /// Telegram bot token
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Optional channel that receives a copy of every reply
    #[serde(default)]
    pub channel_id: Option<String>,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,
}

fn default_affiliate_tag() -> String {
    "budgetlooks08-21".to_string()
}

fn default_allowed_domains() -> Vec<String> {
    [
        "amazon.com",
        "amazon.in",
        "amazon.co.uk",
        "amazon.ca",
        "amazon.de",
        "amazon.fr",
        "amazon.it",
        "amazon.es",
        "amzn.to",
        "a.co",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_strip_params() -> Vec<String> {
    ["tag", "ref_", "th"].iter().map(|s| s.to_string()).collect()
}

fn default_fetch_timeout_secs() -> u64 {
    20
}

fn default_shorten_timeout_secs() -> u64 {
    5
}

fn default_send_timeout_secs() -> u64 {
    15
}

fn default_port() -> u16 {
    5000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            affiliate_tag: default_affiliate_tag(),
            allowed_domains: default_allowed_domains(),
            strip_params: default_strip_params(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            shorten_timeout_secs: default_shorten_timeout_secs(),
            send_timeout_secs: default_send_timeout_secs(),
            port: default_port(),
            bot_token: None,
            channel_id: None,
            proxy: None,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        // 1. Explicit path takes precedence
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        // 2. Try current directory
        let local_config = Path::new("config.toml");
        if local_config.exists() {
            debug!("Found config.toml in current directory");
            return Self::from_file(local_config);
        }

        // 3. Try XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("amz-linkbot").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        // 4. Return default config
        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(token) = std::env::var("TELEGRAM_BOT_TOKEN") {
            if !token.is_empty() {
                self.bot_token = Some(token);
            }
        }

        if let Ok(channel) = std::env::var("CHANNEL_ID") {
            if !channel.is_empty() {
                self.channel_id = Some(channel);
            }
        }

        if let Ok(tag) = std::env::var("BOT_AFFILIATE_TAG") {
            if !tag.is_empty() {
                self.affiliate_tag = tag;
            }
        }

        if let Ok(proxy) = std::env::var("BOT_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(port) = std::env::var("PORT") {
            if let Ok(p) = port.parse() {
                self.port = p;
            }
        }

        self
    }
}
