//! OpenAI-style backend for chat, vision, and image generation.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use pageforge_core::{ChatPrompt, ForgeError, GenerativeBackend};

const PROVIDER: &str = "openai";

/// Remote generative-API client. One reqwest client shared across all calls.
pub struct OpenAiBackend {
    client: Client,
    api_key: String,
    base_url: String,
    chat_model: String,
    image_model: String,
}

impl OpenAiBackend {
    pub fn new(
        api_key: impl Into<String>,
        chat_model: impl Into<String>,
        image_model: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            chat_model: chat_model.into(),
            image_model: image_model.into(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn remote_err(&self, message: impl Into<String>) -> ForgeError {
        ForgeError::RemoteApi {
            provider: PROVIDER.to_string(),
            message: message.into(),
        }
    }

    async fn post_chat(&self, body: &serde_json::Value) -> Result<String, ForgeError> {
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| self.remote_err(format!("chat request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(self.remote_err(format!("chat returned {status}: {error_body}")));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| self.remote_err(format!("failed to parse chat response: {e}")))?;

        Ok(chat
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default())
    }
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: String,
}

#[derive(Deserialize)]
struct ImageResponse {
    data: Vec<ImageDatum>,
}

#[derive(Deserialize)]
struct ImageDatum {
    url: Option<String>,
}

#[async_trait]
impl GenerativeBackend for OpenAiBackend {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn complete(&self, prompt: &ChatPrompt) -> Result<String, ForgeError> {
        let mut messages = Vec::new();
        if !prompt.system.is_empty() {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: prompt.system.clone(),
            });
        }
        messages.push(ChatMessage {
            role: "user".to_string(),
            content: prompt.user.clone(),
        });

        let body = serde_json::json!({
            "model": self.chat_model,
            "messages": messages,
            "max_tokens": prompt.max_tokens,
            "temperature": prompt.temperature,
        });

        debug!(model = %self.chat_model, "sending chat completion request");
        self.post_chat(&body).await
    }

    async fn describe_image(&self, image: &[u8], prompt: &str) -> Result<String, ForgeError> {
        let b64 = STANDARD.encode(image);
        let body = serde_json::json!({
            "model": self.chat_model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": prompt },
                    { "type": "image_url",
                      "image_url": { "url": format!("data:image/jpeg;base64,{b64}") } }
                ]
            }],
            "max_tokens": 300,
        });

        debug!(model = %self.chat_model, bytes = image.len(), "sending vision request");
        self.post_chat(&body).await
    }

    async fn generate_image(&self, prompt: &str, size: &str) -> Result<String, ForgeError> {
        let body = serde_json::json!({
            "model": self.image_model,
            "prompt": prompt,
            "size": size,
            "n": 1,
        });

        debug!(model = %self.image_model, size, "sending image generation request");
        let response = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.remote_err(format!("image request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(self.remote_err(format!("image returned {status}: {error_body}")));
        }

        let images: ImageResponse = response
            .json()
            .await
            .map_err(|e| self.remote_err(format!("failed to parse image response: {e}")))?;

        images
            .data
            .first()
            .and_then(|d| d.url.clone())
            .ok_or_else(|| self.remote_err("image response contained no url"))
    }
}
