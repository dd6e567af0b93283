//! amz-linkbot - Telegram affiliate bot for Amazon links
//!
//! Receives Telegram webhook updates, detects Amazon links, extracts
//! product details with TLS fingerprint emulation for reliable scraping,
//! and replies with shortened affiliate links.

pub mod amazon;
pub mod bot;
pub mod config;
pub mod format;
pub mod link;
pub mod server;
pub mod shorten;
pub mod telegram;

pub use amazon::ProductInfo;
pub use config::Config;
