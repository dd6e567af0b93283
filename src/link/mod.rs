//! URL-level logic: ASIN extraction and affiliate rewriting.

pub mod asin;
pub mod rewrite;

pub use asin::{extract_asin, is_valid_asin};
pub use rewrite::LinkRewriter;
