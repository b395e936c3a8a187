//! Session construction.
//!
//! Order matters: the config file is read first (never fatal), then the API
//! key is resolved (fatal when missing, before any prompt is shown), then the
//! provider and MCP client are built. A failing MCP client leaves the session
//! without tools.

use reqwest::Client;
use tracing::{info, warn};

use super::console::Console;
use super::ChatSession;
use crate::config::{self, ModelSettings, SessionConfig, StartupError};
use crate::provider::openai::OpenAiProvider;
use crate::provider::LlmProvider;
use crate::tools::McpClient;

/// Build a session backed by the OpenAI-compatible HTTP provider.
pub fn bootstrap<C, F>(
    settings: SessionConfig,
    model: ModelSettings,
    lookup: F,
    console: &mut C,
) -> Result<ChatSession, StartupError>
where
    C: Console + ?Sized,
    F: Fn(&str) -> Option<String>,
{
    bootstrap_with(settings, model, lookup, console, |api_key, model| {
        Box::new(OpenAiProvider::new(
            &model.provider,
            api_key,
            model.api_base.as_deref(),
            &model.model,
            Client::new(),
        ))
    })
}

/// Build a session with a caller-supplied provider factory.
pub fn bootstrap_with<C, F, P>(
    settings: SessionConfig,
    model: ModelSettings,
    lookup: F,
    console: &mut C,
    make_provider: P,
) -> Result<ChatSession, StartupError>
where
    C: Console + ?Sized,
    F: Fn(&str) -> Option<String>,
    P: FnOnce(&str, &ModelSettings) -> Box<dyn LlmProvider>,
{
    let (raw, status) = config::load_raw(settings.config_path());
    console.write_line(&status.diagnostic(settings.config_path()))?;

    let api_key = config::resolve_api_key(lookup)?;
    let provider = make_provider(&api_key, &model);
    console.write_line(&format!(
        "✓ {} LLM initialized ({})",
        display_provider(&model.provider),
        provider.default_model()
    ))?;

    let tools = match McpClient::from_config(&raw) {
        Ok(client) => {
            info!(servers = client.len(), "MCP client initialized");
            console.write_line(&format!(
                "✓ MCP Client initialized ({} server(s))",
                client.len()
            ))?;
            Some(client)
        }
        Err(e) => {
            warn!(error = %e, "MCP client unavailable, continuing without tools");
            console.write_line(&format!("✗ Failed to initialize MCP Client: {}", e))?;
            None
        }
    };

    Ok(ChatSession::new(settings, model, provider, tools))
}

fn display_provider(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
