//! HTML parser for Amazon product and general pages.
//!
//! Each field is resolved through an ordered chain of lookups; the first
//! non-empty result wins and a missing field is logged, never an error.

use crate::amazon::models::ProductInfo;
use crate::amazon::selectors::{meta, product};
use regex_lite::Regex;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// Site-name prefix that Amazon puts in front of page titles.
static SITE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*Amazon\.[a-z.]{2,6}\s*:\s*").unwrap());

/// Title used when a general page yields nothing at all.
const FALLBACK_TITLE: &str = "Amazon Offer/Page";

/// Parser for Amazon HTML pages.
pub struct PageParser;

impl PageParser {
    /// Creates a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Extracts title, price, and image from a product detail page.
    pub fn parse_product_page(&self, html: &str) -> ProductInfo {
        let document = Html::parse_document(html);

        let title = self
            .first_text(&document, &product::TITLE_CHAIN)
            .or_else(|| self.meta_content(&document, &meta::OG_TITLE));
        if title.is_none() {
            warn!("No title found on product page");
        }

        let price = self.extract_price(&document);
        if price.is_none() {
            warn!("No price found on product page");
        }

        let image_url = self.extract_image(&document);
        if image_url.is_none() {
            warn!("No image found on product page");
        }

        debug!(?title, ?price, "Parsed product page");

        ProductInfo { title, price, image_url, is_product_link: true }
    }

    /// Extracts a best-effort title from a non-product page (offer pages,
    /// search results, storefronts).
    pub fn parse_general_page(&self, html: &str) -> ProductInfo {
        let document = Html::parse_document(html);

        let title = self
            .meta_content(&document, &meta::OG_TITLE)
            .or_else(|| self.first_text(&document, std::slice::from_ref(&*meta::PAGE_TITLE)))
            .map(|t| trim_site_prefix(&t))
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| FALLBACK_TITLE.to_string());

        debug!(%title, "Parsed general page");

        ProductInfo::general(title)
    }

    /// Walks a selector chain and returns the first non-empty text match.
    fn first_text(&self, document: &Html, chain: &[Selector]) -> Option<String> {
        for selector in chain {
            if let Some(element) = document.select(selector).next() {
                let text = element.text().collect::<String>().trim().to_string();
                if !text.is_empty() {
                    return Some(text);
                }
            }
        }
        None
    }

    /// Returns the content attribute of the first matching meta tag.
    fn meta_content(&self, document: &Html, selector: &Selector) -> Option<String> {
        document
            .select(selector)
            .next()
            .and_then(|e| e.value().attr("content"))
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
    }

    /// Price lookup: ordered chain first, then the split layout where the
    /// amount and the currency symbol are separate elements.
    fn extract_price(&self, document: &Html) -> Option<String> {
        if let Some(price) = self.first_text(document, &product::PRICE_CHAIN) {
            return Some(price);
        }

        let whole = document
            .select(&product::PRICE_WHOLE)
            .next()
            .map(|e| e.text().collect::<String>().trim().trim_end_matches('.').to_string())
            .filter(|t| !t.is_empty())?;

        let symbol = document
            .select(&product::PRICE_SYMBOL)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .unwrap_or_default();

        let fraction = document
            .select(&product::PRICE_FRACTION)
            .next()
            .map(|e| e.text().collect::<String>().trim().to_string())
            .filter(|t| !t.is_empty());

        Some(match fraction {
            Some(f) => format!("{}{}.{}", symbol, whole, f),
            None => format!("{}{}", symbol, whole),
        })
    }

    /// Image lookup: the dynamic-image JSON map on the main image element
    /// first, then its plain src, then the remaining chain, then og:image.
    fn extract_image(&self, document: &Html) -> Option<String> {
        for selector in product::IMAGE_CHAIN.iter() {
            if let Some(element) = document.select(selector).next() {
                if let Some(json) = element.value().attr(product::DYNAMIC_IMAGE_ATTR) {
                    if let Some(url) = largest_dynamic_image(json) {
                        return Some(url);
                    }
                    // Malformed map falls through to the plain attribute
                }

                if let Some(src) = element.value().attr("src") {
                    if !src.is_empty() {
                        return Some(src.to_string());
                    }
                }
            }
        }

        self.meta_content(document, &meta::OG_IMAGE)
    }
}

impl Default for PageParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Picks the URL with the largest reported dimension from a
/// `data-a-dynamic-image` JSON map (`{"url": [width, height], ...}`).
fn largest_dynamic_image(json: &str) -> Option<String> {
    let map: HashMap<String, Vec<f64>> = match serde_json::from_str(json) {
        Ok(map) => map,
        Err(e) => {
            warn!("Malformed dynamic image map: {}", e);
            return None;
        }
    };

    map.into_iter()
        .map(|(url, dims)| {
            let largest = dims.into_iter().fold(0.0_f64, f64::max);
            (url, largest)
        })
        .max_by(|(_, a), (_, b)| a.total_cmp(b))
        .map(|(url, _)| url)
}

/// Strips a leading `Amazon.<tld>:` site-name prefix from a page title.
fn trim_site_prefix(title: &str) -> String {
    SITE_PREFIX.replace(title, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // Product page extraction

    #[test]
    fn test_product_page_full() {
        let parser = PageParser::new();
        let html = r#"
            <html><body>
                <span id="productTitle">  Echo Dot (5th Gen)  </span>
                <span id="priceblock_ourprice">₹4,499</span>
                <img id="landingImage" src="https://m.media-amazon.com/images/I/echo.jpg">
            </body></html>
        "#;

        let info = parser.parse_product_page(html);
        assert_eq!(info.title.as_deref(), Some("Echo Dot (5th Gen)"));
        assert_eq!(info.price.as_deref(), Some("₹4,499"));
        assert_eq!(
            info.image_url.as_deref(),
            Some("https://m.media-amazon.com/images/I/echo.jpg")
        );
        assert!(info.is_product_link);
    }

    #[test]
    fn test_product_page_all_fields_missing() {
        let parser = PageParser::new();
        let info = parser.parse_product_page("<html><body><div id='dp'></div></body></html>");
        assert!(info.is_blank());
        assert!(info.is_product_link);
    }

    #[test]
    fn test_title_fallback_chain() {
        let parser = PageParser::new();

        // #title span is used when #productTitle is absent
        let html = r#"<div id="title"><span>Fallback Title</span></div>"#;
        let info = parser.parse_product_page(html);
        assert_eq!(info.title.as_deref(), Some("Fallback Title"));

        // og:title is the last resort
        let html = r#"<head><meta property="og:title" content="Meta Title"></head>"#;
        let info = parser.parse_product_page(html);
        assert_eq!(info.title.as_deref(), Some("Meta Title"));
    }

    #[test]
    fn test_title_skips_empty_match() {
        let parser = PageParser::new();
        let html = r#"
            <span id="productTitle">   </span>
            <div id="title"><span>Real Title</span></div>
        "#;
        let info = parser.parse_product_page(html);
        assert_eq!(info.title.as_deref(), Some("Real Title"));
    }

    // Price extraction

    #[test]
    fn test_price_legacy_id_wins() {
        let parser = PageParser::new();
        let html = r#"
            <span class="a-price"><span class="a-offscreen">$24.99</span></span>
            <span id="priceblock_ourprice">$19.99</span>
        "#;
        let info = parser.parse_product_page(html);
        assert_eq!(info.price.as_deref(), Some("$19.99"));
    }

    #[test]
    fn test_price_offscreen_fallback() {
        let parser = PageParser::new();
        let html = r#"<span class="a-price"><span class="a-offscreen">$29.99</span></span>"#;
        let info = parser.parse_product_page(html);
        assert_eq!(info.price.as_deref(), Some("$29.99"));
    }

    #[test]
    fn test_price_split_layout_concatenation() {
        let parser = PageParser::new();
        let html = r#"
            <span class="a-price">
                <span class="a-price-symbol">₹</span>
                <span class="a-price-whole">4,499</span>
            </span>
        "#;
        let info = parser.parse_product_page(html);
        assert_eq!(info.price.as_deref(), Some("₹4,499"));
    }

    #[test]
    fn test_price_split_layout_with_fraction() {
        let parser = PageParser::new();
        let html = r#"
            <span class="a-price">
                <span class="a-price-symbol">$</span>
                <span class="a-price-whole">19.</span>
                <span class="a-price-fraction">99</span>
            </span>
        "#;
        let info = parser.parse_product_page(html);
        assert_eq!(info.price.as_deref(), Some("$19.99"));
    }

    #[test]
    fn test_price_missing() {
        let parser = PageParser::new();
        let info = parser.parse_product_page("<span id='productTitle'>T</span>");
        assert!(info.price.is_none());
    }

    // Image extraction

    #[test]
    fn test_image_dynamic_map_largest_dimension() {
        let parser = PageParser::new();
        let html = r#"
            <img id="landingImage"
                 src="https://example.com/small.jpg"
                 data-a-dynamic-image='{"https://example.com/a.jpg":[300,400],"https://example.com/b.jpg":[1500,1200],"https://example.com/c.jpg":[800,600]}'>
        "#;
        let info = parser.parse_product_page(html);
        assert_eq!(info.image_url.as_deref(), Some("https://example.com/b.jpg"));
    }

    #[test]
    fn test_image_malformed_map_falls_back_to_src() {
        let parser = PageParser::new();
        let html = r#"
            <img id="landingImage"
                 src="https://example.com/plain.jpg"
                 data-a-dynamic-image='{not json'>
        "#;
        let info = parser.parse_product_page(html);
        assert_eq!(info.image_url.as_deref(), Some("https://example.com/plain.jpg"));
    }

    #[test]
    fn test_image_wrapper_fallback() {
        let parser = PageParser::new();
        let html = r#"
            <div id="imgTagWrapperId">
                <img src="https://example.com/wrapped.jpg">
            </div>
        "#;
        let info = parser.parse_product_page(html);
        assert_eq!(info.image_url.as_deref(), Some("https://example.com/wrapped.jpg"));
    }

    #[test]
    fn test_image_og_fallback() {
        let parser = PageParser::new();
        let html = r#"<head><meta property="og:image" content="https://example.com/og.jpg"></head>"#;
        let info = parser.parse_product_page(html);
        assert_eq!(info.image_url.as_deref(), Some("https://example.com/og.jpg"));
    }

    #[test]
    fn test_largest_dynamic_image_empty_dims() {
        // An entry without dimensions counts as zero, not a panic
        let json = r#"{"https://example.com/a.jpg":[],"https://example.com/b.jpg":[10,20]}"#;
        assert_eq!(largest_dynamic_image(json), Some("https://example.com/b.jpg".to_string()));
    }

    #[test]
    fn test_largest_dynamic_image_malformed() {
        assert_eq!(largest_dynamic_image("not json at all"), None);
        assert_eq!(largest_dynamic_image(r#"{"url": "no-dims"}"#), None);
    }

    // General pages

    #[test]
    fn test_general_page_og_title() {
        let parser = PageParser::new();
        let html = r#"
            <head>
                <meta property="og:title" content="Great Indian Festival">
                <title>Something Else</title>
            </head>
        "#;
        let info = parser.parse_general_page(html);
        assert_eq!(info.title.as_deref(), Some("Great Indian Festival"));
        assert!(info.price.is_none());
        assert!(info.image_url.is_none());
        assert!(!info.is_product_link);
    }

    #[test]
    fn test_general_page_title_tag_fallback() {
        let parser = PageParser::new();
        let html = "<head><title>Prime Day Deals</title></head>";
        let info = parser.parse_general_page(html);
        assert_eq!(info.title.as_deref(), Some("Prime Day Deals"));
    }

    #[test]
    fn test_general_page_site_prefix_trimmed() {
        let parser = PageParser::new();
        let html = r#"<head><meta property="og:title" content="Amazon.in: Prime Rewards"></head>"#;
        let info = parser.parse_general_page(html);
        assert_eq!(info.title.as_deref(), Some("Prime Rewards"));

        let html = "<head><title>Amazon.co.uk: Daily Deals</title></head>";
        let info = parser.parse_general_page(html);
        assert_eq!(info.title.as_deref(), Some("Daily Deals"));
    }

    #[test]
    fn test_general_page_fallback_title() {
        let parser = PageParser::new();
        let info = parser.parse_general_page("<html><body></body></html>");
        assert_eq!(info.title.as_deref(), Some("Amazon Offer/Page"));
    }

    #[test]
    fn test_trim_site_prefix() {
        assert_eq!(trim_site_prefix("Amazon.in: Deals"), "Deals");
        assert_eq!(trim_site_prefix("Amazon.com : Deals"), "Deals");
        assert_eq!(trim_site_prefix("No prefix here"), "No prefix here");
        // Only a leading prefix is trimmed
        assert_eq!(trim_site_prefix("Deals on Amazon.in: stuff"), "Deals on Amazon.in: stuff");
    }
}
