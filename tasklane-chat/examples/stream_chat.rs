//! Example: stream one assistant reply from the AI gateway.
//!
//! Requires TASKLANE_API_KEY. TASKLANE_GATEWAY_URL, TASKLANE_MODEL and
//! TASKLANE_TIMEOUT_SECS are optional.
//!
//! Run with:
//!
//! ```sh
//! TASKLANE_API_KEY=... cargo run --example stream_chat -p tasklane-chat -- "Summarise my week"
//! ```

use std::io::Write;
use std::sync::Arc;

use futures::StreamExt;
use tasklane_chat::{
    ChatMessage, DecodeEvent, EnvCredential, GatewayClient, GatewayConfig, StreamOutcome,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let prompt = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "What should I work on first today?".to_string());

    let config = GatewayConfig::from_env()?;
    println!("Model: {} via {}", config.model, config.base_url);
    let client = GatewayClient::from_config(config, Arc::new(EnvCredential::default()));

    let mut stream = match client.stream_chat(&[ChatMessage::user(prompt)]).await {
        Ok(stream) => stream,
        Err(err) => {
            eprintln!("{}", err.notice());
            return Err(err.into());
        }
    };

    // Updates carry the whole reply so far; print only the new suffix.
    let mut printed = 0;
    while let Some(event) = stream.receiver.next().await {
        match event {
            DecodeEvent::Update(text) => {
                print!("{}", &text[printed..]);
                std::io::stdout().flush()?;
                printed = text.len();
            }
            DecodeEvent::Finished { outcome, message } => {
                println!();
                match outcome {
                    StreamOutcome::Completed => println!("[done, {} bytes]", message.len()),
                    StreamOutcome::Exhausted => println!("[stream ended without terminator]"),
                    StreamOutcome::Failed(err) => println!("[interrupted: {err}]"),
                }
            }
        }
    }

    Ok(())
}
