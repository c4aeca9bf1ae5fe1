#![deny(missing_docs)]
//! In-memory implementation of tasklane-chat's [`TranscriptStore`] trait.
//!
//! Uses a `HashMap` keyed by conversation id behind a `RwLock` for concurrent
//! access. Each conversation keeps its messages in append order.

use std::collections::HashMap;

use async_trait::async_trait;
use tasklane_chat::{ChatMessage, StoreError, TranscriptStore};
use tokio::sync::RwLock;

/// In-memory transcript store backed by a `HashMap` behind a `RwLock`.
///
/// Suitable for testing, prototyping, and single-process use cases
/// where persistence across restarts is not required.
pub struct MemoryTranscriptStore {
    conversations: RwLock<HashMap<String, Vec<ChatMessage>>>,
}

impl MemoryTranscriptStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            conversations: RwLock::new(HashMap::new()),
        }
    }

    /// Ids of all conversations that have at least one message.
    pub async fn conversations(&self) -> Vec<String> {
        let data = self.conversations.read().await;
        data.keys().cloned().collect()
    }
}

impl Default for MemoryTranscriptStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TranscriptStore for MemoryTranscriptStore {
    async fn append(&self, conversation: &str, messages: &[ChatMessage]) -> Result<(), StoreError> {
        if messages.is_empty() {
            return Ok(());
        }
        let mut data = self.conversations.write().await;
        data.entry(conversation.to_string())
            .or_default()
            .extend_from_slice(messages);
        Ok(())
    }

    async fn load(&self, conversation: &str) -> Result<Vec<ChatMessage>, StoreError> {
        let data = self.conversations.read().await;
        Ok(data.get(conversation).cloned().unwrap_or_default())
    }
}
