//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod auth;
pub mod directory;
pub mod logging;
pub mod realtime;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::auth::AuthConfig;
pub use self::directory::{ConversationEntry, DirectoryConfig};
pub use self::logging::LoggingConfig;
pub use self::realtime::{ReconnectPolicy, RealtimeConfig};

use crate::error::AppError;

/// Root application configuration.
///
/// Top-level deserialization target for the merged TOML configuration
/// files (default.toml + environment overlay) and `CHATHUB__*` variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Token validation settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Real-time hub settings.
    #[serde(default)]
    pub realtime: RealtimeConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Static conversation membership.
    #[serde(default)]
    pub directory: DirectoryConfig,
}

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml` with an environment-specific overlay
    /// and environment variables prefixed with `CHATHUB__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("CHATHUB")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        app.validate()?;
        Ok(app)
    }

    /// Checks cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<(), AppError> {
        self.realtime.validate()?;
        self.directory.validate()?;

        if self.auth.jwt_secret.is_empty() {
            return Err(AppError::configuration("auth.jwt_secret must not be empty"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.realtime.queue_capacity, 256);
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_empty_secret_rejected() {
        let mut config = AppConfig::default();
        config.auth.jwt_secret.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let raw = r#"
            [realtime]
            queue_capacity = 8
            reconnect_policy = "close_previous"
        "#;
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("deserialize");

        assert_eq!(config.realtime.queue_capacity, 8);
        assert_eq!(config.realtime.reconnect_policy, ReconnectPolicy::ClosePrevious);
        assert_eq!(config.realtime.read_timeout_seconds, 60);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_conversations_from_toml() {
        let raw = r#"
            [[directory.conversations]]
            id = "Team-Room"
            participants = ["Alice", "bob"]

            [[directory.conversations]]
            id = "empty"
        "#;
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(raw, config::FileFormat::Toml))
            .build()
            .and_then(|c| c.try_deserialize())
            .expect("deserialize");

        assert!(config.validate().is_ok());
        let rooms = &config.directory.conversations;
        assert_eq!(rooms.len(), 2);
        assert_eq!(rooms[0].id, "Team-Room");
        assert_eq!(rooms[0].participants, vec!["Alice", "bob"]);
        assert!(rooms[1].participants.is_empty());
    }

    #[test]
    fn test_duplicate_conversation_rejected() {
        let mut config = AppConfig::default();
        let entry = ConversationEntry {
            id: "c1".to_string(),
            participants: vec!["alice".to_string()],
        };
        config.directory.conversations = vec![entry.clone(), entry];
        assert!(config.validate().is_err());
    }
}
