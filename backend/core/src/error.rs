use thiserror::Error;

/// Top-level error type for the PageForge runtime.
#[derive(Debug, Error)]
pub enum ForgeError {
    #[error("conversation not found: {0}")]
    ConversationNotFound(String),

    #[error("conversation already exists: {0}")]
    ConversationExists(String),

    #[error("remote API error ({provider}): {message}")]
    RemoteApi { provider: String, message: String },

    #[error("invalid image payload: {0}")]
    InvalidImage(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
