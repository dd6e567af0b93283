//! amz-linkbot - Telegram affiliate bot for Amazon links
//!
//! A Rust implementation with TLS fingerprint emulation for reliable scraping.

use amz_linkbot::bot::LinkPipeline;
use amz_linkbot::config::Config;
use amz_linkbot::{format, server};
use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "amz-linkbot",
    version,
    about = "Telegram affiliate bot for Amazon links",
    long_about = "Receives Telegram webhooks, extracts Amazon product details, and replies with shortened affiliate links."
)]
struct Cli {
    /// Proxy URL (e.g., socks5://host:port)
    #[arg(long, global = true, env = "BOT_PROXY")]
    proxy: Option<String>,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook server
    #[command(alias = "run")]
    Serve {
        /// Port to listen on
        #[arg(short, long, env = "PORT")]
        port: Option<u16>,
    },

    /// Process a single Amazon link and print the reply (no Telegram)
    #[command(alias = "l")]
    Link {
        /// URL to process
        url: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new(Level::DEBUG.to_string())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();

    // Load config with layered overrides
    let mut config = Config::load(cli.config.as_deref())?.with_env();

    if let Some(proxy) = cli.proxy {
        config.proxy = Some(proxy);
    }

    match cli.command {
        Commands::Serve { port } => {
            if let Some(port) = port {
                config.port = port;
            }
            server::serve(&config).await?;
        }

        Commands::Link { url } => {
            let pipeline = LinkPipeline::new(&config)?;
            let reply = pipeline.process(&url).await;
            println!("{}", format::reply_text(&reply.info, &reply.link));
        }
    }

    Ok(())
}
