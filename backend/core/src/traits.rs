use async_trait::async_trait;

use crate::error::ForgeError;

/// A single chat-completion request against the remote generative API.
#[derive(Debug, Clone)]
pub struct ChatPrompt {
    pub system: String,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// Boundary trait over the remote generative API.
///
/// The HTML generator only needs three remote capabilities: plain chat
/// completion, vision-based image description, and image generation. Keeping
/// them behind one trait lets tests script the remote side.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Provider name (e.g., "openai").
    fn name(&self) -> &str;

    /// Send a chat completion request and return the response text.
    async fn complete(&self, prompt: &ChatPrompt) -> Result<String, ForgeError>;

    /// Describe raw image bytes with a vision-capable model.
    async fn describe_image(&self, image: &[u8], prompt: &str) -> Result<String, ForgeError>;

    /// Generate an image for `prompt` and return its URL.
    async fn generate_image(&self, prompt: &str, size: &str) -> Result<String, ForgeError>;
}
