#![deny(missing_docs)]
//! Streaming AI-assistant chat for Tasklane.
//!
//! [`GatewayClient`] sends the running conversation to the AI gateway's
//! OpenAI-compatible `/v1/chat/completions` endpoint with `stream: true` and
//! decodes the Server-Sent-Events reply with [`tasklane_stream`].
//! [`ChatSession`] adds conversation history, live update callbacks, and
//! persistence of each finished exchange through a [`TranscriptStore`].
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use tasklane_chat::{ChatSession, EnvCredential, GatewayClient, GatewayConfig, TranscriptStore};
//!
//! # async fn run(store: Arc<dyn TranscriptStore>) -> Result<(), Box<dyn std::error::Error>> {
//! let client = GatewayClient::from_config(GatewayConfig::from_env()?, Arc::new(EnvCredential::default()));
//! let mut session = ChatSession::open("project-42", client, store).await?;
//! let reply = session
//!     .send("Which tasks are at risk this sprint?", |text| println!("{text}"))
//!     .await?;
//! println!("final: {}", reply.content);
//! # Ok(())
//! # }
//! ```
//!
//! # Errors
//!
//! [`ChatError::RateLimited`] and [`ChatError::PaymentRequired`] are reported
//! as soon as the gateway answers 429 or 402. A reply stream that breaks off
//! yields [`ChatError::Transport`] carrying the partial reply text; use
//! [`ChatError::notice`] for the user-facing message.

pub mod client;
pub mod config;
pub mod credentials;
pub mod error;
pub mod session;
pub mod store;
pub mod types;

pub use client::{ChatStream, GatewayClient};
pub use config::GatewayConfig;
pub use credentials::{CredentialSource, EnvCredential, StaticCredential};
pub use error::{ChatError, ConfigError, StoreError};
pub use session::ChatSession;
pub use store::TranscriptStore;
pub use types::{ChatMessage, ChatReply, ReplyOutcome, Role};

// Re-export the decoder types that appear in this crate's API.
pub use tasklane_stream::{DecodeEvent, DecoderConfig, StreamOutcome};
