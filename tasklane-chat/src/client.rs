//! Gateway client struct and builder.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use futures::Stream;
use tasklane_stream::{DecodeEvent, DecoderConfig, decode_stream_with_cancel};
use tokio_util::sync::CancellationToken;

use crate::config::GatewayConfig;
use crate::credentials::CredentialSource;
use crate::error::{ChatError, map_http_status, rejects_without_body};
use crate::types::{ChatMessage, ChatRequestBody};

/// Handle to a streaming chat reply.
pub struct ChatStream {
    /// The decoded events. Consume with `StreamExt::next()`.
    pub receiver: Pin<Box<dyn Stream<Item = DecodeEvent> + Send>>,
}

/// Client for the AI gateway's streaming chat completions endpoint.
///
/// # Example
///
/// ```no_run
/// use tasklane_chat::{GatewayClient, StaticCredential};
///
/// let client = GatewayClient::new(StaticCredential::new("jwt-..."))
///     .base_url("https://ai.gateway.tasklane.dev")
///     .model("google/gemini-2.5-flash");
/// ```
pub struct GatewayClient {
    /// Source of the bearer token, consulted before every request.
    pub(crate) credentials: Arc<dyn CredentialSource>,
    /// Gateway base URL (override for testing or proxies).
    pub(crate) base_url: String,
    /// Model identifier sent with every request.
    pub(crate) model: String,
    /// Optional whole-request timeout.
    pub(crate) timeout: Option<Duration>,
    /// Decoder tuning for reply streams.
    pub(crate) decoder: DecoderConfig,
    /// Shared HTTP client.
    pub(crate) client: reqwest::Client,
}

impl GatewayClient {
    /// Create a client with default settings and the given credential source.
    #[must_use]
    pub fn new(credentials: impl CredentialSource + 'static) -> Self {
        Self::from_config(GatewayConfig::default(), Arc::new(credentials))
    }

    /// Create a client from a loaded [`GatewayConfig`].
    #[must_use]
    pub fn from_config(config: GatewayConfig, credentials: Arc<dyn CredentialSource>) -> Self {
        Self {
            credentials,
            base_url: config.base_url,
            model: config.model,
            timeout: config.timeout,
            decoder: config.decoder,
            client: reqwest::Client::new(),
        }
    }

    /// Override the gateway base URL.
    ///
    /// Useful for testing with a local mock server.
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Override the model.
    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set a whole-request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the stream decoder settings.
    #[must_use]
    pub fn decoder_config(mut self, config: DecoderConfig) -> Self {
        self.decoder = config;
        self
    }

    /// Build the chat completions endpoint URL.
    pub(crate) fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url)
    }

    /// Start a streaming reply for `messages`.
    pub async fn stream_chat(&self, messages: &[ChatMessage]) -> Result<ChatStream, ChatError> {
        self.stream_chat_with_cancel(messages, CancellationToken::new())
            .await
    }

    /// Start a streaming reply that is abandoned when `cancel` fires.
    ///
    /// Fails with [`ChatError::AuthRequired`] before any network activity if
    /// no credential is available. A 429 or 402 response fails immediately
    /// without reading the body. If `cancel` fires before the response
    /// headers arrive, the request is dropped and [`ChatError::Cancelled`]
    /// is returned.
    pub async fn stream_chat_with_cancel(
        &self,
        messages: &[ChatMessage],
        cancel: CancellationToken,
    ) -> Result<ChatStream, ChatError> {
        let Some(token) = self.credentials.bearer_token().await else {
            tracing::debug!("no credential available, not sending chat request");
            return Err(ChatError::AuthRequired);
        };

        let url = self.completions_url();
        let body = ChatRequestBody {
            model: &self.model,
            messages,
            stream: true,
        };

        tracing::debug!(
            url = %url,
            model = %self.model,
            messages = messages.len(),
            "sending streaming chat request"
        );

        let mut request = self
            .client
            .post(&url)
            .bearer_auth(&token)
            .header("content-type", "application/json")
            .json(&body);
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(abandoned()),
            response = request.send() => response?,
        };
        let status = response.status();

        if !status.is_success() {
            if rejects_without_body(status) {
                tracing::warn!(status = status.as_u16(), "gateway rejected chat request");
                return Err(map_http_status(status, ""));
            }
            let body_text = tokio::select! {
                biased;
                () = cancel.cancelled() => return Err(abandoned()),
                text = response.text() => text?,
            };
            tracing::warn!(status = status.as_u16(), "gateway returned an error");
            return Err(map_http_status(status, &body_text));
        }

        let events = decode_stream_with_cancel(response.bytes_stream(), self.decoder.clone(), cancel);
        Ok(ChatStream {
            receiver: Box::pin(events),
        })
    }
}

fn abandoned() -> ChatError {
    tracing::debug!("chat request abandoned before the reply started");
    ChatError::Cancelled {
        partial: String::new(),
    }
}
