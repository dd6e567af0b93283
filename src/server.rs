//! Webhook HTTP server.
//!
//! Exposes `POST /webhook` for Telegram updates and `GET /health` for
//! liveness checks. Updates are acknowledged immediately; malformed ones
//! (a message without a chat or sender) get a 400 so Telegram does not
//! retry them forever.

use crate::bot::Bot;
use crate::config::Config;
use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::telegram::Update;

#[derive(Clone)]
struct AppState {
    bot: Arc<Bot>,
    bot_token_set: bool,
}

/// JSON body returned for every webhook acknowledgement.
#[derive(Debug, Serialize)]
struct Ack {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<&'static str>,
}

impl Ack {
    fn ok() -> Json<Self> {
        Json(Self { status: "ok", message: None })
    }

    fn ignored(message: &'static str) -> Json<Self> {
        Json(Self { status: "ok", message: Some(message) })
    }
}

/// Errors reported back to the webhook caller.
#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error("Update message has no chat")]
    MissingChat,

    #[error("Update message has no sender")]
    MissingSender,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        warn!("Rejecting webhook update: {}", self);
        let body = serde_json::json!({
            "status": "error",
            "message": self.to_string(),
        });
        (StatusCode::BAD_REQUEST, Json(body)).into_response()
    }
}

/// Builds the router over a ready bot.
pub fn router(bot: Arc<Bot>, bot_token_set: bool) -> Router {
    Router::new()
        .route("/webhook", post(webhook))
        .route("/health", get(health))
        .with_state(AppState { bot, bot_token_set })
}

/// Starts the webhook server on `0.0.0.0:{config.port}`. Runs until the
/// process is killed.
pub async fn serve(config: &Config) -> Result<()> {
    let bot = Arc::new(Bot::new(config)?);
    let app = router(bot, config.bot_token.is_some());

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("Webhook server listening on {}", addr);
    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}

async fn webhook(
    State(state): State<AppState>,
    Json(update): Json<Update>,
) -> Result<Json<Ack>, ApiError> {
    let Some(message) = update.message else {
        return Ok(Ack::ignored("No message in update"));
    };

    let chat = message.chat.ok_or(ApiError::MissingChat)?;
    let sender = message.from.ok_or(ApiError::MissingSender)?;

    let Some(text) = message.text else {
        // Stickers, photos, joins - nothing for us to do
        return Ok(Ack::ignored("No text in message"));
    };

    state.bot.handle_message(chat.id, sender.id, &text).await;
    Ok(Ack::ok())
}

async fn health(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "bot_token_set": state.bot_token_set,
    }))
}
