//! CSS selectors for Amazon HTML parsing.
//!
//! This file contains all CSS selectors used for parsing Amazon pages.
//! Update this file when Amazon changes their HTML structure.
//!
//! Title and price are looked up through ordered chains: the parser walks a
//! chain front to back and the first selector yielding non-empty content
//! wins. A comma list would not work here since scraper returns matches in
//! document order, not selector order.
//!
//! **Update process**: When parsing fails, capture HTML sample,
//! update selectors, and add test fixture.

use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for product detail pages.
pub mod product {
    use super::*;

    /// Title lookup chain, most specific first.
    pub static TITLE_CHAIN: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        vec![
            Selector::parse("#productTitle").unwrap(),
            Selector::parse("#title span").unwrap(),
        ]
    });

    /// Price lookup chain: legacy price block ids, then the current
    /// offscreen layout.
    pub static PRICE_CHAIN: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        vec![
            Selector::parse("#priceblock_ourprice").unwrap(),
            Selector::parse("#priceblock_dealprice").unwrap(),
            Selector::parse("#corePrice_feature_div .a-price .a-offscreen").unwrap(),
            Selector::parse(".a-price .a-offscreen").unwrap(),
        ]
    });

    /// Visible whole-number part of a split price layout.
    pub static PRICE_WHOLE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".a-price-whole").unwrap());

    /// Fractional part of a split price layout.
    pub static PRICE_FRACTION: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".a-price-fraction").unwrap());

    /// Currency symbol rendered separately from the amount.
    pub static PRICE_SYMBOL: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse(".a-price-symbol").unwrap());

    /// Main product image, direct id then wrapper fallbacks.
    pub static IMAGE_CHAIN: LazyLock<Vec<Selector>> = LazyLock::new(|| {
        vec![
            Selector::parse("#landingImage").unwrap(),
            Selector::parse("#imgTagWrapperId img").unwrap(),
            Selector::parse("#main-image").unwrap(),
        ]
    });

    /// Attribute holding a JSON map of image URL -> [width, height].
    pub static DYNAMIC_IMAGE_ATTR: &str = "data-a-dynamic-image";
}

/// Selectors for page-level metadata (general pages, meta fallbacks).
pub mod meta {
    use super::*;

    /// Open Graph title.
    pub static OG_TITLE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("meta[property='og:title']").unwrap());

    /// Open Graph image.
    pub static OG_IMAGE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("meta[property='og:image']").unwrap());

    /// Document title element.
    pub static PAGE_TITLE: LazyLock<Selector> = LazyLock::new(|| Selector::parse("title").unwrap());
}
