//! The generation gateway: prompt assembly, remote calls, post-processing.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tracing::warn;

use pageforge_core::{ChatPrompt, ForgeError, GenerativeBackend};

use crate::prompts;

const CREATE_MAX_TOKENS: u32 = 3000;
const CREATE_TEMPERATURE: f32 = 0.8;
const EDIT_MAX_TOKENS: u32 = 2000;
const EDIT_TEMPERATURE: f32 = 0.4;

/// Portrait size suited to full-page backgrounds.
const BACKGROUND_IMAGE_SIZE: &str = "1024x1792";

/// Returned when image analysis yields nothing to generate from.
const IMAGE_FAILURE_PLACEHOLDER: &str =
    "<div>Failed to generate HTML: Image analysis failed.</div>";

/// Result of the best-effort background-image pass.
///
/// Background generation never fails a request; the degraded branch is a
/// value, not a swallowed exception.
#[derive(Debug)]
pub enum BackgroundOutcome {
    /// Background generated and injected into the document head.
    Applied(String),
    /// Generation failed; the input markup is returned untouched.
    Unchanged { markup: String, reason: String },
}

impl BackgroundOutcome {
    pub fn into_markup(self) -> String {
        match self {
            BackgroundOutcome::Applied(markup) => markup,
            BackgroundOutcome::Unchanged { markup, .. } => markup,
        }
    }
}

/// High-level HTML generation over a [`GenerativeBackend`].
#[derive(Clone)]
pub struct HtmlGenerator {
    backend: Arc<dyn GenerativeBackend>,
}

impl HtmlGenerator {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        Self { backend }
    }

    /// Generate the initial document for a new conversation.
    pub async fn generate_initial(&self, instruction: &str) -> Result<String, ForgeError> {
        let raw = self
            .backend
            .complete(&ChatPrompt {
                system: prompts::CREATE_SYSTEM.to_string(),
                user: prompts::create_prompt(instruction),
                max_tokens: CREATE_MAX_TOKENS,
                temperature: CREATE_TEMPERATURE,
            })
            .await?;
        Ok(pageforge_markup::process_generated(&strip_code_fences(&raw)))
    }

    /// Apply a free-text change to the current document.
    pub async fn apply_change(
        &self,
        current_markup: &str,
        instruction: &str,
    ) -> Result<String, ForgeError> {
        let raw = self
            .backend
            .complete(&ChatPrompt {
                system: prompts::EDIT_SYSTEM.to_string(),
                user: prompts::edit_prompt(current_markup, instruction),
                max_tokens: EDIT_MAX_TOKENS,
                temperature: EDIT_TEMPERATURE,
            })
            .await?;
        Ok(pageforge_markup::process_edited(&strip_code_fences(&raw)))
    }

    /// Describe raw image bytes with the vision model.
    pub async fn describe_image(&self, image: &[u8]) -> Result<String, ForgeError> {
        self.backend
            .describe_image(image, prompts::VISION_PROMPT)
            .await
    }

    /// Generate a document seeded from an image description.
    pub async fn generate_from_description(
        &self,
        description: &str,
    ) -> Result<String, ForgeError> {
        let raw = self
            .backend
            .complete(&ChatPrompt {
                system: prompts::DESCRIBE_SYSTEM.to_string(),
                user: prompts::description_prompt(description),
                max_tokens: CREATE_MAX_TOKENS,
                temperature: CREATE_TEMPERATURE,
            })
            .await?;
        Ok(pageforge_markup::process_generated(&strip_code_fences(&raw)))
    }

    /// Best-effort: generate a background image for `description` and inject
    /// it into the document head. Failures degrade to the unchanged input.
    pub async fn add_background_image(
        &self,
        markup: &str,
        description: &str,
    ) -> BackgroundOutcome {
        let image_prompt = prompts::background_image_prompt(description);
        match self
            .backend
            .generate_image(&image_prompt, BACKGROUND_IMAGE_SIZE)
            .await
        {
            Ok(url) => {
                BackgroundOutcome::Applied(pageforge_markup::set_body_background(markup, &url))
            }
            Err(e) => {
                warn!(error = %e, "background image generation failed, keeping markup unchanged");
                BackgroundOutcome::Unchanged {
                    markup: markup.to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    /// Composite flow: decode the image, describe it, then generate a document
    /// from the description. An empty or failed description yields a fixed
    /// placeholder document rather than an error.
    pub async fn image_to_html(&self, image_b64: &str) -> Result<String, ForgeError> {
        let image = STANDARD
            .decode(image_b64.trim())
            .map_err(|e| ForgeError::InvalidImage(e.to_string()))?;

        let description = match self.describe_image(&image).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "image analysis failed");
                String::new()
            }
        };

        if description.trim().is_empty() {
            return Ok(IMAGE_FAILURE_PLACEHOLDER.to_string());
        }
        self.generate_from_description(&description).await
    }
}

/// Remove a surrounding markdown code fence, if the model added one.
fn strip_code_fences(raw: &str) -> String {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed.to_string();
    };
    let rest = rest.strip_prefix("html").unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Scripted remote side: canned chat replies, one description, one image.
    #[derive(Default)]
    struct ScriptedBackend {
        completions: Mutex<VecDeque<String>>,
        description: Mutex<Option<Result<String, String>>>,
        image_url: Mutex<Option<Result<String, String>>>,
        seen_prompts: Mutex<Vec<ChatPrompt>>,
    }

    impl ScriptedBackend {
        fn with_completion(reply: &str) -> Self {
            let backend = Self::default();
            backend.completions.lock().unwrap().push_back(reply.to_string());
            backend
        }

        fn err(message: &str) -> ForgeError {
            ForgeError::RemoteApi {
                provider: "scripted".to_string(),
                message: message.to_string(),
            }
        }
    }

    #[async_trait]
    impl GenerativeBackend for ScriptedBackend {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, prompt: &ChatPrompt) -> Result<String, ForgeError> {
            self.seen_prompts.lock().unwrap().push(prompt.clone());
            self.completions
                .lock()
                .unwrap()
                .pop_front()
                .ok_or_else(|| Self::err("no scripted completion"))
        }

        async fn describe_image(&self, _image: &[u8], _prompt: &str) -> Result<String, ForgeError> {
            match self.description.lock().unwrap().clone() {
                Some(Ok(text)) => Ok(text),
                Some(Err(message)) => Err(Self::err(&message)),
                None => Err(Self::err("no scripted description")),
            }
        }

        async fn generate_image(&self, _prompt: &str, _size: &str) -> Result<String, ForgeError> {
            match self.image_url.lock().unwrap().clone() {
                Some(Ok(url)) => Ok(url),
                Some(Err(message)) => Err(Self::err(&message)),
                None => Err(Self::err("no scripted image")),
            }
        }
    }

    fn generator(backend: ScriptedBackend) -> (HtmlGenerator, Arc<ScriptedBackend>) {
        let backend = Arc::new(backend);
        (HtmlGenerator::new(backend.clone()), backend)
    }

    #[tokio::test]
    async fn generate_initial_post_processes_model_output() {
        let (gen, backend) = generator(ScriptedBackend::with_completion(
            "```html\n<html><body><button>Go</button></body></html>\n```",
        ));
        let html = gen.generate_initial("Make a red button.").await.unwrap();

        assert!(html.contains("generated-content"));
        assert!(html.contains("<button contenteditable=\"true\">"));

        let prompts = backend.seen_prompts.lock().unwrap();
        assert!(prompts[0].user.starts_with("Make a red button."));
        assert!(prompts[0].user.contains("single wrapper div"));
        assert_eq!(prompts[0].max_tokens, 3000);
    }

    #[tokio::test]
    async fn apply_change_embeds_current_markup_and_skips_layout() {
        let (gen, backend) = generator(ScriptedBackend::with_completion(
            "<html><body><p>changed</p></body></html>",
        ));
        let html = gen
            .apply_change("<html><body><p>old</p></body></html>", "change the text")
            .await
            .unwrap();

        assert!(html.contains("<p>changed</p>"));
        // edits do not re-wrap the body
        assert!(!html.contains("generated-content"));

        let prompts = backend.seen_prompts.lock().unwrap();
        assert!(prompts[0].user.contains("<p>old</p>"));
        assert!(prompts[0].user.ends_with("change the text"));
        assert_eq!(prompts[0].temperature, 0.4);
    }

    #[tokio::test]
    async fn remote_failure_propagates_from_generate() {
        let (gen, _) = generator(ScriptedBackend::default());
        let err = gen.generate_initial("anything").await.unwrap_err();
        assert!(matches!(err, ForgeError::RemoteApi { .. }));
    }

    #[tokio::test]
    async fn background_success_injects_style() {
        let backend = ScriptedBackend::default();
        *backend.image_url.lock().unwrap() = Some(Ok("https://img.example/bg.png".to_string()));
        let (gen, _) = generator(backend);

        let outcome = gen
            .add_background_image("<html><head></head><body></body></html>", "a sunset")
            .await;
        match outcome {
            BackgroundOutcome::Applied(html) => {
                assert!(html.contains("background-image: url(\"https://img.example/bg.png\")"));
            }
            other => panic!("expected Applied, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn background_failure_returns_input_unchanged() {
        let backend = ScriptedBackend::default();
        *backend.image_url.lock().unwrap() = Some(Err("quota exceeded".to_string()));
        let (gen, _) = generator(backend);

        let input = "<html><head></head><body><p>x</p></body></html>";
        match gen.add_background_image(input, "a sunset").await {
            BackgroundOutcome::Unchanged { markup, reason } => {
                assert_eq!(markup, input);
                assert!(reason.contains("quota exceeded"));
            }
            other => panic!("expected Unchanged, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn image_to_html_generates_from_description() {
        let backend =
            ScriptedBackend::with_completion("<html><body><p>blue form</p></body></html>");
        *backend.description.lock().unwrap() = Some(Ok("a blue form".to_string()));
        let (gen, backend) = generator(backend);

        let b64 = STANDARD.encode(b"not really an image");
        let html = gen.image_to_html(&b64).await.unwrap();
        assert!(html.contains("generated-content"));
        assert!(html.contains("blue form"));

        let prompts = backend.seen_prompts.lock().unwrap();
        assert!(prompts[0].user.contains("a blue form"));
    }

    #[tokio::test]
    async fn image_to_html_placeholder_when_analysis_fails() {
        let backend = ScriptedBackend::default();
        *backend.description.lock().unwrap() = Some(Err("timeout".to_string()));
        let (gen, _) = generator(backend);

        let b64 = STANDARD.encode(b"bytes");
        let html = gen.image_to_html(&b64).await.unwrap();
        assert_eq!(html, IMAGE_FAILURE_PLACEHOLDER);
    }

    #[tokio::test]
    async fn image_to_html_placeholder_when_description_empty() {
        let backend = ScriptedBackend::default();
        *backend.description.lock().unwrap() = Some(Ok("   ".to_string()));
        let (gen, _) = generator(backend);

        let b64 = STANDARD.encode(b"bytes");
        let html = gen.image_to_html(&b64).await.unwrap();
        assert_eq!(html, IMAGE_FAILURE_PLACEHOLDER);
    }

    #[tokio::test]
    async fn image_to_html_rejects_bad_base64() {
        let (gen, _) = generator(ScriptedBackend::default());
        let err = gen.image_to_html("&&&not-base64&&&").await.unwrap_err();
        assert!(matches!(err, ForgeError::InvalidImage(_)));
    }

    #[test]
    fn code_fences_are_stripped() {
        assert_eq!(strip_code_fences("```html\n<p>x</p>\n```"), "<p>x</p>");
        assert_eq!(strip_code_fences("```\n<p>x</p>\n```"), "<p>x</p>");
        assert_eq!(strip_code_fences("<p>x</p>"), "<p>x</p>");
    }
}
