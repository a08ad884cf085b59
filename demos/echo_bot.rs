//! Echo bot.
//!
//! Demonstrates:
//! - Building a bot from environment tokens
//! - Handling `app_mention` events with a cloned Web API client
//! - Replying in thread with `chat.postMessage`
//! - Stopping the event loop on Ctrl+C
//!
//! Usage:
//!   SLACK_BOT_TOKEN=xoxb-... SLACK_APP_TOKEN=xapp-... cargo run --example echo_bot
//!   cargo run --example echo_bot -- --debug

// ============================================================================
// Imports
// ============================================================================

use serde_json::{Value, json};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use socket_mode_bot::{ApiClient, Bot, Envelope, Error, Result};

// ============================================================================
// Constants
// ============================================================================

const BOT_TOKEN_VAR: &str = "SLACK_BOT_TOKEN";
const APP_TOKEN_VAR: &str = "SLACK_APP_TOKEN";

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() {
    let debug = std::env::args().any(|a| a == "--debug");
    init_logging(debug);

    if let Err(e) = run(debug).await {
        eprintln!("\n[ERROR] {e}");
        std::process::exit(1);
    }
}

async fn run(debug: bool) -> Result<()> {
    let token = env_token(BOT_TOKEN_VAR)?;
    let app_token = env_token(APP_TOKEN_VAR)?;

    let api = ApiClient::new(token.as_str())?;

    let mut bot = Bot::builder()
        .name("echo")
        .token(token)
        .app_token(app_token)
        .debug(debug)
        .handler(move |envelope: Envelope| {
            let api = api.clone();
            async move {
                echo(&api, &envelope).await;
                None::<Value>
            }
        })
        .build()
        .await?;

    info!(user = bot.canonical_name(), user_id = bot.user_id(), "Echo bot ready");
    println!("Mention the bot in a channel. Press Ctrl+C to exit...");

    tokio::select! {
        result = bot.run() => result,
        _ = tokio::signal::ctrl_c() => {
            println!("\nShutting down");
            Ok(())
        }
    }
}

// ============================================================================
// Functions
// ============================================================================

/// Replies in thread to every `app_mention`.
async fn echo(api: &ApiClient, envelope: &Envelope) {
    let Some(event) = envelope.payload.as_ref().and_then(|p| p.get("event")) else {
        return;
    };
    if event.get("type").and_then(Value::as_str) != Some("app_mention") {
        return;
    }

    let channel = &event["channel"];
    let thread_ts = event.get("thread_ts").unwrap_or(&event["ts"]);
    let text = event.get("text").and_then(Value::as_str).unwrap_or_default();

    let reply = json!({
        "channel": channel,
        "thread_ts": thread_ts,
        "text": format!("echo: {text}"),
    });

    if let Err(e) = api.say(&reply).await {
        warn!(error = %e, "Failed to reply");
    }
}

fn env_token(var: &str) -> Result<String> {
    std::env::var(var).map_err(|_| Error::config(format!("{var} is not set")))
}

fn init_logging(debug: bool) {
    let filter = if debug {
        "socket_mode_bot=debug,echo_bot=debug"
    } else {
        "socket_mode_bot=info,echo_bot=info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .init();
}
