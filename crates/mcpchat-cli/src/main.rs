//! mcpchat CLI — interactive chat and status commands.
//!
//! Usage:
//!   mcpchat [chat]          — Start an interactive chat session
//!   mcpchat status          — Show configuration, credential and MCP servers

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use mcpchat_core::agent::bootstrap::bootstrap;
use mcpchat_core::agent::console::StdConsole;
use mcpchat_core::config::{self, ModelSettings, SessionConfig, StartupError};
use mcpchat_core::tools::{McpClient, McpServer};

#[derive(Parser)]
#[command(
    name = "mcpchat",
    version,
    about = "A minimal terminal chat client with conversation memory",
    long_about = "mcpchat — chat with a Groq-hosted model from the terminal.\n\nKeeps a short window of recent turns as context and loads MCP server settings from a JSON file."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    chat: ChatArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat(ChatArgs),

    /// Show configuration status without starting a session
    Status {
        /// Path to the MCP configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args, Clone)]
struct ChatArgs {
    /// Path to the MCP configuration file (default: Browser_mcp.json)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Maximum number of queries answered before the session ends
    #[arg(long, default_value_t = 10, value_parser = clap::value_parser!(u32).range(1..))]
    max_steps: u32,

    /// Disable conversation memory
    #[arg(long)]
    no_memory: bool,

    /// Model to use
    #[arg(short, long)]
    model: Option<String>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f32>,

    /// Maximum response tokens
    #[arg(long)]
    max_tokens: Option<u32>,

    /// Custom OpenAI-compatible base URL
    #[arg(long)]
    api_base: Option<String>,
}

impl ChatArgs {
    fn model_settings(&self) -> ModelSettings {
        let defaults = ModelSettings::default();
        ModelSettings {
            model: self.model.clone().unwrap_or(defaults.model),
            temperature: self.temperature.unwrap_or(defaults.temperature),
            max_tokens: self.max_tokens.unwrap_or(defaults.max_tokens),
            api_base: self.api_base.clone().or(defaults.api_base),
            provider: defaults.provider,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so they stay out of the chat transcript.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Chat(args)) => cmd_chat(&args).await,
        Some(Commands::Status { config }) => cmd_status(config.as_deref()),
        None => cmd_chat(&cli.chat).await,
    }

    Ok(())
}

// ── Chat Command ────────────────────────────────────────────────────

async fn cmd_chat(args: &ChatArgs) {
    if let Err(e) = run_chat(args).await {
        tracing::debug!(error = ?e, "Startup failed");
        match &e {
            StartupError::MissingCredential { .. } => {
                println!("Configuration Error: {}", e);
                println!();
                for line in config::credential_help() {
                    println!("{}", line);
                }
            }
            _ => println!("Fatal Error: {}", e),
        }
    }
}

async fn run_chat(args: &ChatArgs) -> Result<(), StartupError> {
    let config_path = config::resolve_config_path(args.config.as_deref());
    let settings = SessionConfig::new(config_path, args.max_steps, !args.no_memory)?;

    let mut console = StdConsole::new();
    let mut session = bootstrap(
        settings,
        args.model_settings(),
        |var| std::env::var(var).ok(),
        &mut console,
    )?;

    session.run(&mut console).await;
    Ok(())
}

// ── Status Command ──────────────────────────────────────────────────

fn cmd_status(config_override: Option<&std::path::Path>) {
    let path = config::resolve_config_path(config_override);
    let (raw, status) = config::load_raw(&path);

    println!();
    println!("  mcpchat status");
    println!("  ─────────────────────────────────────");
    println!("  {}", status.diagnostic(&path));
    if !status.is_loaded() {
        println!("    (sessions start with an empty configuration)");
    }

    match config::api_key_from_env() {
        Ok(_) => println!("  ✓ {} is set", config::API_KEY_ENV),
        Err(_) => println!("  ✗ {} is not set", config::API_KEY_ENV),
    }

    let defaults = ModelSettings::default();
    println!("  Model:    {} ({})", defaults.model, defaults.provider);

    match McpClient::from_config(&raw) {
        Ok(client) if client.is_empty() => println!("  MCP:      no servers configured"),
        Ok(client) => {
            println!("  MCP:      {} server(s)", client.len());
            for name in client.server_names() {
                match client.server(name) {
                    Some(McpServer::Stdio { command, args, .. }) => {
                        println!("     • {} → {} {}", name, command, args.join(" "))
                    }
                    Some(McpServer::Remote { url }) => println!("     • {} → {}", name, url),
                    None => {}
                }
            }
        }
        Err(e) => println!("  MCP:      ✗ {}", e),
    }

    println!();
}
