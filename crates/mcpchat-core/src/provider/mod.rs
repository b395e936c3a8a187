//! Completion provider trait.
//!
//! Defines the `LlmProvider` trait the chat session talks to. The `openai`
//! module provides an OpenAI-compatible implementation that covers Groq and
//! any other backend exposing `/chat/completions`.

pub mod openai;
pub mod types;

use async_trait::async_trait;
use types::{ChatMessage, LlmResponse};

/// Trait for completion backends.
///
/// The provider owns model selection, authentication and transport. Callers
/// hand it an ordered message list and get back exactly one assistant reply.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send a chat completion request.
    ///
    /// # Arguments
    /// * `messages` - Ordered messages, system instruction first
    /// * `model` - Model identifier override (None = use default)
    /// * `max_tokens` - Maximum response tokens
    /// * `temperature` - Sampling temperature
    async fn chat(
        &self,
        messages: &[ChatMessage],
        model: Option<&str>,
        max_tokens: u32,
        temperature: f32,
    ) -> anyhow::Result<LlmResponse>;

    /// Get the default model identifier.
    fn default_model(&self) -> &str;
}
