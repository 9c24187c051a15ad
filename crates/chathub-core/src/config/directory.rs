//! Conversation directory configuration.

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Static conversation membership for standalone deployments.
///
/// When ChatHub runs next to a messaging service, that service supplies
/// membership and this section stays empty. Without any entries typing
/// indicators have no audience and are dropped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Conversations known at startup.
    #[serde(default)]
    pub conversations: Vec<ConversationEntry>,
}

/// One conversation and its participants.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationEntry {
    /// Conversation ID as sent in typing frames.
    pub id: String,
    /// Participating user IDs.
    #[serde(default)]
    pub participants: Vec<String>,
}

impl DirectoryConfig {
    /// Rejects blank IDs and duplicate conversations.
    pub fn validate(&self) -> Result<(), AppError> {
        let mut seen = std::collections::HashSet::new();
        for entry in &self.conversations {
            if entry.id.trim().is_empty() {
                return Err(AppError::configuration(
                    "directory.conversations: id must not be empty",
                ));
            }
            if entry.participants.iter().any(|p| p.trim().is_empty()) {
                return Err(AppError::configuration(format!(
                    "directory.conversations[{}]: participant IDs must not be empty",
                    entry.id
                )));
            }
            if !seen.insert(entry.id.as_str()) {
                return Err(AppError::configuration(format!(
                    "directory.conversations: duplicate conversation {}",
                    entry.id
                )));
            }
        }
        Ok(())
    }
}
