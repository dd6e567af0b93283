//! Reply formatting for Telegram (Markdown).

use crate::amazon::ProductInfo;

/// Captions longer than this get truncated with an ellipsis.
pub const MAX_TITLE_LEN: usize = 100;

const FOOTER: &str = "Copy link and always open in browser";

/// Builds the reply text for an extracted page plus its shortened link.
pub fn reply_text(info: &ProductInfo, link: &str) -> String {
    if info.is_product_link {
        product_reply(info, link)
    } else {
        general_reply(info, link)
    }
}

fn product_reply(info: &ProductInfo, link: &str) -> String {
    let title = truncate_title(info.title.as_deref().unwrap_or("Amazon Product"), MAX_TITLE_LEN);

    let mut reply = format!("**{}**\n\n", title);
    if let Some(price) = &info.price {
        reply.push_str(&format!("**Price:** {}\n\n", price));
    }
    reply.push_str(&format!("[Buy Link]({})\n\n{}", link, FOOTER));
    reply
}

fn general_reply(info: &ProductInfo, link: &str) -> String {
    let title = info.title.as_deref().unwrap_or("Amazon Offer/Page");
    format!("**{}**\n\n[Link]({})\n\n{}", title, link, FOOTER)
}

/// Truncates a title to at most `max` characters, ellipsis included.
/// Counts chars, not bytes, so multi-byte titles cannot split a code point.
pub fn truncate_title(title: &str, max: usize) -> String {
    if title.chars().count() <= max {
        return title.to_string();
    }

    let cut: String = title.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", cut)
}
