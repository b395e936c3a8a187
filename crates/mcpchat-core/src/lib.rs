//! mcpchat-core: building blocks for the mcpchat terminal assistant.
//!
//! - [`config`] — JSON config loading, session and model settings, API key lookup
//! - [`provider`] — LLM provider trait and OpenAI-compatible (Groq) implementation
//! - [`tools`] — MCP client built from the `mcpServers` config section
//! - [`agent`] — conversation memory, console abstraction and the chat loop
//!
//! # Quick Start
//!
//! ```no_run
//! use mcpchat_core::agent::bootstrap::bootstrap;
//! use mcpchat_core::agent::console::StdConsole;
//! use mcpchat_core::config::{ModelSettings, SessionConfig};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let settings = SessionConfig::new("Browser_mcp.json", 10, true)?;
//! let mut console = StdConsole::new();
//! let mut session = bootstrap(
//!     settings,
//!     ModelSettings::default(),
//!     |var| std::env::var(var).ok(),
//!     &mut console,
//! )?;
//! let summary = session.run(&mut console).await;
//! println!("{} steps", summary.steps);
//! # Ok(())
//! # }
//! ```

pub mod agent;
pub mod config;
pub mod provider;
pub mod tools;
