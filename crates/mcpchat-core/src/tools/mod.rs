//! MCP tool client.
//!
//! Builds an `McpClient` from the `mcpServers` section of the raw JSON
//! configuration. Each entry describes either a stdio server (`command`,
//! `args`, `env`) or a remote one (`url`). The client only validates and
//! holds these descriptions; servers are never spawned from the chat loop.

use serde::Deserialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;
use tracing::debug;

use crate::config::RawConfig;

const SERVERS_KEY: &str = "mcpServers";

#[derive(Debug, Error)]
pub enum ToolClientError {
    #[error("`mcpServers` must be an object mapping server names to settings")]
    InvalidServers,

    #[error("server `{name}`: {reason}")]
    InvalidServer { name: String, reason: String },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
struct ServerEntry {
    command: Option<String>,
    args: Vec<String>,
    env: HashMap<String, String>,
    url: Option<String>,
}

/// How to reach one MCP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum McpServer {
    Stdio {
        command: String,
        args: Vec<String>,
        env: HashMap<String, String>,
    },
    Remote {
        url: String,
    },
}

impl McpServer {
    fn from_value(name: &str, value: &Value) -> Result<Self, ToolClientError> {
        let invalid = |reason: String| ToolClientError::InvalidServer {
            name: name.to_string(),
            reason,
        };

        let entry: ServerEntry =
            serde_json::from_value(value.clone()).map_err(|e| invalid(e.to_string()))?;

        match (entry.command, entry.url) {
            (Some(command), _) if !command.trim().is_empty() => Ok(McpServer::Stdio {
                command,
                args: entry.args,
                env: entry.env,
            }),
            (_, Some(url)) if !url.trim().is_empty() => Ok(McpServer::Remote { url }),
            _ => Err(invalid("expected a `command` or a `url`".into())),
        }
    }
}

/// Handle to the configured MCP servers.
#[derive(Debug, Clone, Default)]
pub struct McpClient {
    servers: BTreeMap<String, McpServer>,
}

impl McpClient {
    /// Build a client from the raw configuration.
    ///
    /// A configuration without `mcpServers` yields a client with no servers.
    pub fn from_config(config: &RawConfig) -> Result<Self, ToolClientError> {
        let Some(section) = config.get(SERVERS_KEY) else {
            debug!("No MCP servers configured");
            return Ok(Self::default());
        };

        let entries = section.as_object().ok_or(ToolClientError::InvalidServers)?;

        let mut servers = BTreeMap::new();
        for (name, value) in entries {
            let server = McpServer::from_value(name, value)?;
            debug!(server = %name, ?server, "Registered MCP server");
            servers.insert(name.clone(), server);
        }

        Ok(Self { servers })
    }

    /// Configured server names, sorted.
    pub fn server_names(&self) -> Vec<&str> {
        self.servers.keys().map(|s| s.as_str()).collect()
    }

    pub fn server(&self, name: &str) -> Option<&McpServer> {
        self.servers.get(name)
    }

    pub fn len(&self) -> usize {
        self.servers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }
}
