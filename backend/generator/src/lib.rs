pub mod generator;
pub mod openai;
pub mod prompts;

pub use generator::{BackgroundOutcome, HtmlGenerator};
pub use openai::OpenAiBackend;
