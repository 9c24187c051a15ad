//! Conversation membership lookup.
//!
//! The hub does not own conversations; whoever persists them implements
//! [`ConversationDirectory`] so typing indicators reach only the people in
//! the conversation.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;

use chathub_core::config::DirectoryConfig;
use chathub_core::{AppError, AppResult};

/// Resolves the participants of a conversation.
#[async_trait]
pub trait ConversationDirectory: Send + Sync + std::fmt::Debug {
    /// Returns the user IDs participating in `conversation_id`.
    async fn participants(&self, conversation_id: &str) -> AppResult<Vec<String>>;
}

/// Directory backed by a map. Suitable for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    conversations: RwLock<HashMap<String, Vec<String>>>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory holding the conversations listed in configuration.
    pub fn from_config(config: &DirectoryConfig) -> Self {
        let directory = Self::new();
        for entry in &config.conversations {
            directory.set_participants(entry.id.clone(), entry.participants.iter().cloned());
        }
        directory
    }

    /// Number of known conversations.
    pub fn len(&self) -> usize {
        self.conversations.read().len()
    }

    /// Whether no conversation is known.
    pub fn is_empty(&self) -> bool {
        self.conversations.read().is_empty()
    }

    /// Sets the participant list of a conversation.
    pub fn set_participants<I, S>(&self, conversation_id: impl Into<String>, participants: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conversations.write().insert(
            conversation_id.into(),
            participants.into_iter().map(Into::into).collect(),
        );
    }

    /// Forgets a conversation.
    pub fn remove(&self, conversation_id: &str) -> bool {
        self.conversations.write().remove(conversation_id).is_some()
    }
}

#[async_trait]
impl ConversationDirectory for InMemoryDirectory {
    async fn participants(&self, conversation_id: &str) -> AppResult<Vec<String>> {
        self.conversations
            .read()
            .get(conversation_id)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("Conversation {conversation_id} not found")))
    }
}
