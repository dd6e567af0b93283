//! Data model for extracted page information.

use serde::{Deserialize, Serialize};

/// Best-effort information extracted from an Amazon page.
///
/// Every field is optional: extraction is a chain of fallbacks and a missing
/// field is a warning, never an error. An instance lives for a single
/// request/response cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductInfo {
    /// Product or page title
    pub title: Option<String>,
    /// Displayed price, kept as text (currency formatting varies by store)
    pub price: Option<String>,
    /// Main product image URL
    pub image_url: Option<String>,
    /// True when the source URL carried a product identifier
    pub is_product_link: bool,
}

impl ProductInfo {
    /// Creates an empty result for a page of the given kind.
    ///
    /// Used when the fetch itself fails: the classification survives but all
    /// fields stay absent.
    pub fn empty(is_product_link: bool) -> Self {
        Self { is_product_link, ..Self::default() }
    }

    /// Creates a general-page result carrying only a title.
    pub fn general(title: impl Into<String>) -> Self {
        Self { title: Some(title.into()), ..Self::default() }
    }

    /// Returns true if no field was extracted.
    pub fn is_blank(&self) -> bool {
        self.title.is_none() && self.price.is_none() && self.image_url.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_keeps_classification() {
        let info = ProductInfo::empty(true);
        assert!(info.is_product_link);
        assert!(info.is_blank());

        let info = ProductInfo::empty(false);
        assert!(!info.is_product_link);
        assert!(info.is_blank());
    }

    #[test]
    fn test_general_has_only_title() {
        let info = ProductInfo::general("Great Deals");
        assert_eq!(info.title.as_deref(), Some("Great Deals"));
        assert!(info.price.is_none());
        assert!(info.image_url.is_none());
        assert!(!info.is_product_link);
        assert!(!info.is_blank());
    }

    #[test]
    fn test_is_blank() {
        let mut info = ProductInfo::default();
        assert!(info.is_blank());

        info.price = Some("₹499".to_string());
        assert!(!info.is_blank());
    }

    #[test]
    fn test_serde() {
        let info = ProductInfo {
            title: Some("Echo Dot".to_string()),
            price: Some("$49.99".to_string()),
            image_url: Some("https://m.media-amazon.com/images/I/abc.jpg".to_string()),
            is_product_link: true,
        };

        let json = serde_json::to_string(&info).unwrap();
        assert!(json.contains("Echo Dot"));

        let parsed: ProductInfo = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.title, info.title);
        assert_eq!(parsed.price, info.price);
        assert!(parsed.is_product_link);
    }
}
