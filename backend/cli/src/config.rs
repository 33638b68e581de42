use serde::Deserialize;

/// PageForge runtime configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// HTTP server bind address
    pub bind_address: String,
    /// HTTP server port
    pub port: u16,
    /// Remote generative API key
    pub api_key: Option<String>,
    /// Remote generative API base URL
    pub api_base_url: Option<String>,
    /// Chat/vision model used for generation and image description
    pub chat_model: String,
    /// Model used for background-image generation
    pub image_model: String,
    /// Log level
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1".to_string(),
            port: 5000,
            api_key: None,
            api_base_url: None,
            chat_model: "gpt-4o".to_string(),
            image_model: "dall-e-3".to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables with sensible defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: std::env::var("PAGEFORGE_BIND")
                .unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: std::env::var("PAGEFORGE_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(5000),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            api_base_url: std::env::var("OPENAI_BASE_URL").ok(),
            chat_model: std::env::var("PAGEFORGE_CHAT_MODEL")
                .unwrap_or_else(|_| "gpt-4o".to_string()),
            image_model: std::env::var("PAGEFORGE_IMAGE_MODEL")
                .unwrap_or_else(|_| "dall-e-3".to_string()),
            log_level: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        }
    }
}
