//! A chat conversation: running history, live updates, and persistence.

use std::sync::Arc;

use futures::StreamExt;
use tasklane_stream::{DecodeEvent, StreamOutcome};
use tokio_util::sync::CancellationToken;

use crate::client::GatewayClient;
use crate::error::ChatError;
use crate::store::TranscriptStore;
use crate::types::{ChatMessage, ChatReply, ReplyOutcome};

/// One conversation with the assistant.
///
/// Sends the running history with every prompt, reports each cumulative reply
/// update to the caller, and persists the `user`/`assistant` pair once the
/// reply stream ends normally.
pub struct ChatSession {
    conversation: String,
    history: Vec<ChatMessage>,
    client: GatewayClient,
    store: Arc<dyn TranscriptStore>,
}

impl ChatSession {
    /// Open a conversation, loading its saved history.
    pub async fn open(
        conversation: impl Into<String>,
        client: GatewayClient,
        store: Arc<dyn TranscriptStore>,
    ) -> Result<Self, ChatError> {
        let conversation = conversation.into();
        let history = store.load(&conversation).await?;
        tracing::debug!(
            conversation = %conversation,
            messages = history.len(),
            "opened chat session"
        );
        Ok(Self {
            conversation,
            history,
            client,
            store,
        })
    }

    /// Conversation identifier.
    pub fn conversation(&self) -> &str {
        &self.conversation
    }

    /// Messages exchanged so far, oldest first.
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    /// Send `prompt` and stream the reply, calling `on_update` with the full
    /// reply text after every fragment.
    pub async fn send<F>(&mut self, prompt: impl Into<String>, on_update: F) -> Result<ChatReply, ChatError>
    where
        F: FnMut(&str) + Send,
    {
        self.send_with_cancel(prompt, on_update, CancellationToken::new())
            .await
    }

    /// Like [`send`](Self::send), but abandoned when `cancel` fires.
    ///
    /// An abandoned or failed reply is not added to the history or persisted;
    /// the text assembled so far is carried in the error.
    pub async fn send_with_cancel<F>(
        &mut self,
        prompt: impl Into<String>,
        mut on_update: F,
        cancel: CancellationToken,
    ) -> Result<ChatReply, ChatError>
    where
        F: FnMut(&str) + Send,
    {
        let user = ChatMessage::user(prompt);
        let mut outbound = self.history.clone();
        outbound.push(user.clone());

        let mut stream = self
            .client
            .stream_chat_with_cancel(&outbound, cancel)
            .await?;

        let mut latest = String::new();
        while let Some(event) = stream.receiver.next().await {
            match event {
                DecodeEvent::Update(text) => {
                    on_update(&text);
                    latest = text;
                }
                DecodeEvent::Finished { outcome, message } => {
                    let outcome = match outcome {
                        StreamOutcome::Completed => ReplyOutcome::Completed,
                        StreamOutcome::Exhausted => ReplyOutcome::Exhausted,
                        StreamOutcome::Failed(source) => {
                            tracing::warn!(
                                conversation = %self.conversation,
                                error = %source,
                                partial_len = message.len(),
                                "chat reply interrupted"
                            );
                            return Err(ChatError::Transport {
                                partial: message,
                                source,
                            });
                        }
                    };
                    return self.commit(user, message, outcome).await;
                }
            }
        }

        // The decoder only ends without a `Finished` event when abandoned.
        tracing::debug!(conversation = %self.conversation, "chat reply cancelled");
        Err(ChatError::Cancelled { partial: latest })
    }

    async fn commit(
        &mut self,
        user: ChatMessage,
        content: String,
        outcome: ReplyOutcome,
    ) -> Result<ChatReply, ChatError> {
        let exchange = [user, ChatMessage::assistant(content.clone())];
        self.history.extend_from_slice(&exchange);
        self.store.append(&self.conversation, &exchange).await?;

        tracing::info!(
            conversation = %self.conversation,
            outcome = ?outcome,
            reply_len = content.len(),
            "chat reply stored"
        );
        Ok(ChatReply { content, outcome })
    }
}
