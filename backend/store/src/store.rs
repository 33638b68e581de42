//! In-memory conversation store.
//!
//! A shared map from conversation id to version history, scoped to process
//! lifetime. Locks are held only across map access, never across remote-API
//! awaits, so two concurrent edits of the same conversation may interleave
//! and lose an update. Known limitation; single-editor use is assumed.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use pageforge_core::ForgeError;

use crate::conversation::{Conversation, ConversationSummary};

/// Shared handle to the conversation map.
#[derive(Clone, Default)]
pub struct ConversationStore {
    inner: Arc<RwLock<HashMap<String, Conversation>>>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.inner.read().await.contains_key(id)
    }

    /// Insert a new conversation with a single-element history.
    pub async fn create(
        &self,
        id: &str,
        name: impl Into<String>,
        original_prompt: Option<String>,
        initial_snapshot: impl Into<String>,
    ) -> Result<(), ForgeError> {
        let mut map = self.inner.write().await;
        if map.contains_key(id) {
            return Err(ForgeError::ConversationExists(id.to_string()));
        }
        map.insert(
            id.to_string(),
            Conversation::new(name, original_prompt, initial_snapshot),
        );
        Ok(())
    }

    /// Append a snapshot to an existing conversation.
    pub async fn append(&self, id: &str, snapshot: impl Into<String>) -> Result<(), ForgeError> {
        let mut map = self.inner.write().await;
        let convo = map
            .get_mut(id)
            .ok_or_else(|| ForgeError::ConversationNotFound(id.to_string()))?;
        convo.push(snapshot.into());
        Ok(())
    }

    /// Overwrite the final history element in place.
    pub async fn replace_last(
        &self,
        id: &str,
        snapshot: impl Into<String>,
    ) -> Result<(), ForgeError> {
        let mut map = self.inner.write().await;
        let convo = map
            .get_mut(id)
            .ok_or_else(|| ForgeError::ConversationNotFound(id.to_string()))?;
        convo.replace_last(snapshot.into());
        Ok(())
    }

    /// Remove the most recent snapshot and return the one before it.
    ///
    /// With only one snapshot left the conversation is deleted instead, so a
    /// live conversation never has an empty history. Unknown ids and deleted
    /// conversations both yield an empty string.
    pub async fn undo(&self, id: &str) -> String {
        let mut map = self.inner.write().await;
        match map.get_mut(id) {
            Some(convo) if convo.len() > 1 => {
                convo.pop();
                convo.current().to_string()
            }
            _ => {
                map.remove(id);
                String::new()
            }
        }
    }

    /// The current (last) snapshot, if the conversation exists.
    pub async fn read_current(&self, id: &str) -> Option<String> {
        self.inner
            .read()
            .await
            .get(id)
            .map(|c| c.current().to_string())
    }

    /// All snapshots concatenated in order; empty for unknown ids.
    pub async fn read_concatenated(&self, id: &str) -> String {
        self.inner
            .read()
            .await
            .get(id)
            .map(Conversation::concatenated)
            .unwrap_or_default()
    }

    /// The initiating prompt, if one was recorded at creation.
    pub async fn original_prompt(&self, id: &str) -> Option<String> {
        self.inner
            .read()
            .await
            .get(id)
            .and_then(|c| c.original_prompt().map(str::to_string))
    }

    /// `(id, name)` pairs for every live conversation, order unspecified.
    pub async fn list(&self) -> Vec<ConversationSummary> {
        self.inner
            .read()
            .await
            .iter()
            .map(|(id, convo)| ConversationSummary {
                id: id.clone(),
                name: convo.name().to_string(),
            })
            .collect()
    }

    /// Drop every conversation.
    pub async fn reset(&self) {
        self.inner.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}
