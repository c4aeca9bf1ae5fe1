//! Durable storage for finished chat exchanges.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::types::ChatMessage;

/// Persists chat transcripts, one ordered message list per conversation.
///
/// Implementations must keep messages in the order they were appended.
#[async_trait]
pub trait TranscriptStore: Send + Sync {
    /// Append messages to the end of a conversation.
    async fn append(&self, conversation: &str, messages: &[ChatMessage]) -> Result<(), StoreError>;

    /// Load a conversation in order. Unknown conversations are empty.
    async fn load(&self, conversation: &str) -> Result<Vec<ChatMessage>, StoreError>;
}
