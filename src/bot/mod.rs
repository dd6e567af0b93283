//! Message routing and the link-processing pipeline.

use crate::amazon::{AmazonClient, PageFetch, PageParser, ProductInfo};
use crate::config::Config;
use crate::format;
use crate::link::{extract_asin, LinkRewriter};
use crate::shorten::{Shorten, UrlShortener};
use crate::telegram::{ChatSend, TelegramClient};
use anyhow::{Context, Result};
use regex_lite::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{info, warn};

static URL_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://[^\s]+").unwrap());

static AMAZON_HOST: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://(?:www\.)?(?:amazon\.[a-z.]{2,6}|amzn\.to|a\.co)(?:[/?#]|$)").unwrap()
});

const WELCOME: &str = "*Welcome to the Amazon Affiliate Bot!*\n\n\
    Send me any Amazon link (product, offer, or shortened) and I will reply \
    with the product details and a shortened affiliate link.";

const HELP: &str = "*Help & Instructions*\n\n\
    Supported links:\n\
    - Product links: `amazon.in/dp/...`, `amzn.to/...`\n\
    - Offer and page links: `amazon.in/deals`, `amazon.in/amazonprime`\n\n\
    Just paste a link into the chat and I will process it.";

const PROCESSING: &str = "Processing your link, one moment...";

const EXTRACTION_FAILED: &str = "Sorry, I could not extract any information from that page. \
    Are you sure it is a valid Amazon link?";

/// Extracted page info plus the final shortened affiliate link.
#[derive(Debug, Clone)]
pub struct LinkReply {
    pub info: ProductInfo,
    pub link: String,
}

/// The resolve -> classify -> extract -> rewrite -> shorten pipeline.
///
/// Every step degrades instead of failing: an unresolvable URL is treated
/// as canonical, a failed fetch yields empty fields, and a failed shorten
/// falls back to the unshortened affiliate link.
pub struct LinkPipeline {
    fetcher: Arc<dyn PageFetch>,
    shortener: Arc<dyn Shorten>,
    parser: PageParser,
    rewriter: LinkRewriter,
}

impl LinkPipeline {
    /// Creates a pipeline with real HTTP clients.
    pub fn new(config: &Config) -> Result<Self> {
        let fetcher = Arc::new(AmazonClient::new(config).context("Failed to create HTTP client")?);
        let shortener = Arc::new(
            UrlShortener::new(config.shorten_timeout_secs)
                .context("Failed to create shortener client")?,
        );
        Ok(Self::from_parts(fetcher, shortener, config))
    }

    /// Assembles a pipeline from pre-built components (for testing).
    pub fn from_parts(
        fetcher: Arc<dyn PageFetch>,
        shortener: Arc<dyn Shorten>,
        config: &Config,
    ) -> Self {
        Self { fetcher, shortener, parser: PageParser::new(), rewriter: LinkRewriter::new(config) }
    }

    /// Runs the full pipeline on one URL.
    pub async fn process(&self, url: &str) -> LinkReply {
        let resolved = self.fetcher.resolve(url).await;
        let asin = extract_asin(&resolved);
        info!("Resolved {} (asin: {:?})", resolved, asin);

        let info = match self.fetcher.fetch(&resolved).await {
            Ok(html) => {
                if asin.is_some() {
                    self.parser.parse_product_page(&html)
                } else {
                    self.parser.parse_general_page(&html)
                }
            }
            Err(e) => {
                warn!("Error fetching {}: {}", resolved, e);
                ProductInfo::empty(asin.is_some())
            }
        };

        let affiliate = self.rewriter.rewrite(&resolved, asin.as_deref());
        let link = self.shortener.shorten(&affiliate).await;

        LinkReply { info, link }
    }
}

/// The bot: routes inbound messages and sends replies.
pub struct Bot {
    chat: Arc<dyn ChatSend>,
    pipeline: LinkPipeline,
    channel_id: Option<String>,
}

impl Bot {
    /// Creates a bot with real Telegram and HTTP clients.
    pub fn new(config: &Config) -> Result<Self> {
        let token = config.bot_token.as_deref().context("Bot token is not configured")?;
        let chat = Arc::new(
            TelegramClient::new(token, config.send_timeout_secs)
                .context("Failed to create Telegram client")?,
        );
        Ok(Self::from_parts(chat, LinkPipeline::new(config)?, config.channel_id.clone()))
    }

    /// Assembles a bot from pre-built components (for testing).
    pub fn from_parts(
        chat: Arc<dyn ChatSend>,
        pipeline: LinkPipeline,
        channel_id: Option<String>,
    ) -> Self {
        Self { chat, pipeline, channel_id }
    }

    /// Routes one inbound message.
    pub async fn handle_message(&self, chat_id: i64, user_id: i64, text: &str) {
        info!("Processing message from user {} (chat {})", user_id, chat_id);
        let chat_id = chat_id.to_string();

        if text.starts_with("/start") {
            self.chat.send_message(&chat_id, WELCOME).await;
        } else if text.starts_with("/help") {
            self.chat.send_message(&chat_id, HELP).await;
        } else if let Some(url) = find_amazon_url(text) {
            self.handle_link(&chat_id, &url).await;
        } else {
            self.chat.send_message(&chat_id, general_response(text)).await;
        }
    }

    /// Runs the pipeline and delivers the reply, mirroring to the channel
    /// when one is configured.
    async fn handle_link(&self, chat_id: &str, url: &str) {
        info!("Processing Amazon URL: {}", url);
        self.chat.send_message(chat_id, PROCESSING).await;

        let reply = self.pipeline.process(url).await;

        if reply.info.is_product_link && reply.info.is_blank() {
            self.chat.send_message(chat_id, EXTRACTION_FAILED).await;
            return;
        }

        let text = format::reply_text(&reply.info, &reply.link);

        let photo = if reply.info.is_product_link { reply.info.image_url.as_deref() } else { None };

        match photo {
            Some(photo_url) => {
                let sent = self.chat.send_photo(chat_id, photo_url, &text).await;
                if !sent {
                    // Photo sends can fail on stale image URLs; the text
                    // reply still carries the link
                    self.chat.send_message(chat_id, &text).await;
                }

                if let Some(channel) = &self.channel_id {
                    if sent {
                        self.chat.send_photo(channel, photo_url, &text).await;
                    } else {
                        self.chat.send_message(channel, &text).await;
                    }
                }
            }
            None => {
                self.chat.send_message(chat_id, &text).await;
                if let Some(channel) = &self.channel_id {
                    self.chat.send_message(channel, &text).await;
                }
            }
        }
    }
}

/// Finds the first Amazon URL in a message, if any.
pub fn find_amazon_url(text: &str) -> Option<String> {
    for token in URL_TOKEN.find_iter(text) {
        let candidate = token.as_str().trim_end_matches(['.', ',', ')', ']', '>']);
        if AMAZON_HOST.is_match(candidate) {
            return Some(candidate.to_string());
        }
    }
    None
}

/// Keyword-matched canned reply for non-link conversation.
fn general_response(text: &str) -> &'static str {
    let lower = text.to_lowercase();

    if ["hello", "hi", "hey", "namaste"].iter().any(|w| lower.contains(w)) {
        "Hey there! I am the Amazon affiliate bot. Send me any Amazon product link!"
    } else if ["thanks", "thank you"].iter().any(|w| lower.contains(w)) {
        "You're welcome! Send another Amazon link whenever you need one."
    } else if ["how", "help", "what"].iter().any(|w| lower.contains(w)) {
        "Send me an Amazon link and I will reply with product details, \
         an affiliate link, and a shortened URL. Try it!"
    } else if lower.contains("amazon") {
        "Yes, Amazon links are my thing! Paste one like `amazon.in/dp/PRODUCT_ID`."
    } else {
        "I only handle Amazon links. Send one like `amazon.in/dp/PRODUCT_ID` \
         or `amzn.to/...` and I will build an affiliate link for you."
    }
}
