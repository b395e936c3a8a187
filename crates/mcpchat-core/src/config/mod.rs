//! Configuration module for mcpchat.
//!
//! Three kinds of settings feed a session:
//! - the raw JSON document at `config_path`, forwarded untouched to the MCP client,
//! - `SessionConfig` (step budget, memory toggle) fixed at startup,
//! - `ModelSettings` for the completion provider, plus the API key from the environment.
//!
//! A missing or malformed JSON file never stops the program: the loader
//! substitutes an empty mapping and reports a `ConfigStatus` instead.

use serde_json::{Map, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// File name looked up when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "Browser_mcp.json";

/// Environment variable holding the completion API key.
pub const API_KEY_ENV: &str = "GROQ_API_KEY";

/// Arbitrary JSON object loaded from disk. No schema is enforced here.
pub type RawConfig = Map<String, Value>;

/// Errors that abort startup before the interactive loop runs.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("{var} environment variable not set. Please set it before running the agent.")]
    MissingCredential { var: &'static str },

    #[error("invalid session settings: {0}")]
    InvalidSettings(String),

    #[error("console error: {0}")]
    Console(#[from] std::io::Error),
}

/// Outcome of reading the JSON configuration file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigStatus {
    Loaded,
    NotFound,
    Invalid(String),
}

impl ConfigStatus {
    pub fn is_loaded(&self) -> bool {
        matches!(self, ConfigStatus::Loaded)
    }

    /// One-line console diagnostic for this status.
    pub fn diagnostic(&self, path: &Path) -> String {
        match self {
            ConfigStatus::Loaded => format!("✓ Configuration loaded from {}", path.display()),
            ConfigStatus::NotFound => {
                format!("✗ Configuration file not found: {}", path.display())
            }
            ConfigStatus::Invalid(reason) => {
                format!("✗ Invalid JSON in {} ({})", path.display(), reason)
            }
        }
    }
}

/// Load the raw configuration mapping from `path`.
///
/// Returns an empty mapping together with a non-`Loaded` status when the
/// file is missing, unreadable, not valid JSON, or not a JSON object.
pub fn load_raw(path: &Path) -> (RawConfig, ConfigStatus) {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!(path = %path.display(), "Configuration file not found, using empty config");
            return (RawConfig::new(), ConfigStatus::NotFound);
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read configuration file");
            return (RawConfig::new(), ConfigStatus::Invalid(e.to_string()));
        }
    };

    match serde_json::from_str::<Value>(&content) {
        Ok(Value::Object(map)) => {
            debug!(path = %path.display(), keys = map.len(), "Loaded configuration");
            (map, ConfigStatus::Loaded)
        }
        Ok(_) => {
            warn!(path = %path.display(), "Configuration is not a JSON object");
            (
                RawConfig::new(),
                ConfigStatus::Invalid("top level must be an object".into()),
            )
        }
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Invalid JSON in configuration file");
            (RawConfig::new(), ConfigStatus::Invalid(e.to_string()))
        }
    }
}

/// Resolve which configuration file to read.
///
/// An explicit path is used as given. Otherwise `DEFAULT_CONFIG_FILE` in the
/// working directory wins, then `~/.mcpchat/DEFAULT_CONFIG_FILE`. When neither
/// exists the working-directory path is returned so the diagnostic names it.
pub fn resolve_config_path(explicit: Option<&Path>) -> PathBuf {
    if let Some(path) = explicit {
        return path.to_path_buf();
    }

    let local = PathBuf::from(DEFAULT_CONFIG_FILE);
    if local.exists() {
        return local;
    }

    let home = config_dir().join(DEFAULT_CONFIG_FILE);
    if home.exists() {
        debug!(path = %home.display(), "Using configuration from home directory");
        return home;
    }

    local
}

/// Get the per-user config directory (`~/.mcpchat`).
pub fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mcpchat")
}

/// Read the API key through `lookup`. Empty values count as missing.
pub fn resolve_api_key<F>(lookup: F) -> Result<String, StartupError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(API_KEY_ENV) {
        Some(key) if !key.trim().is_empty() => Ok(key),
        _ => Err(StartupError::MissingCredential { var: API_KEY_ENV }),
    }
}

/// Read the API key from the process environment.
pub fn api_key_from_env() -> Result<String, StartupError> {
    resolve_api_key(|var| std::env::var(var).ok())
}

/// Remediation lines printed when the API key is missing.
pub fn credential_help() -> Vec<String> {
    vec![
        format!("Please set {} environment variable:", API_KEY_ENV),
        format!("  Windows (PowerShell): $env:{}='your-api-key'", API_KEY_ENV),
        format!("  Windows (CMD): set {}=your-api-key", API_KEY_ENV),
        format!("  Linux/Mac: export {}='your-api-key'", API_KEY_ENV),
    ]
}

// ── Session Configuration ───────────────────────────────────────────

/// Settings fixed for the lifetime of one chat session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    config_path: PathBuf,
    max_steps: u32,
    memory_enabled: bool,
}

impl SessionConfig {
    pub fn new(
        config_path: impl Into<PathBuf>,
        max_steps: u32,
        memory_enabled: bool,
    ) -> Result<Self, StartupError> {
        if max_steps == 0 {
            return Err(StartupError::InvalidSettings(
                "max steps must be at least 1".into(),
            ));
        }
        Ok(Self {
            config_path: config_path.into(),
            max_steps,
            memory_enabled,
        })
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn max_steps(&self) -> u32 {
        self.max_steps
    }

    pub fn memory_enabled(&self) -> bool {
        self.memory_enabled
    }
}

impl fmt::Display for SessionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "config={} max_steps={} memory={}",
            self.config_path.display(),
            self.max_steps,
            self.memory_enabled
        )
    }
}

// ── Model Configuration ─────────────────────────────────────────────

/// Completion provider settings.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub provider: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub api_base: Option<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            provider: "groq".into(),
            model: "llama-3.3-70b-versatile".into(),
            temperature: 0.7,
            max_tokens: 1024,
            api_base: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_valid_object() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"mcpServers": {{"browser": {{"command": "npx"}}}}}}"#).unwrap();

        let (raw, status) = load_raw(file.path());
        assert_eq!(status, ConfigStatus::Loaded);
        assert!(status.is_loaded());
        assert!(raw.contains_key("mcpServers"));
    }

    #[test]
    fn test_missing_file_yields_empty_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let (raw, status) = load_raw(&dir.path().join("absent.json"));
        assert_eq!(status, ConfigStatus::NotFound);
        assert!(!status.is_loaded());
        assert!(raw.is_empty());
    }

    #[test]
    fn test_malformed_json_yields_empty_mapping() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let (raw, status) = load_raw(file.path());
        assert!(matches!(status, ConfigStatus::Invalid(_)));
        assert!(raw.is_empty());
    }

    #[test]
    fn test_non_object_json_is_invalid() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[1, 2, 3]").unwrap();

        let (raw, status) = load_raw(file.path());
        assert!(matches!(status, ConfigStatus::Invalid(_)));
        assert!(raw.is_empty());
    }

    #[test]
    fn test_diagnostic_glyphs() {
        let path = Path::new("Browser_mcp.json");
        assert!(ConfigStatus::Loaded.diagnostic(path).starts_with('✓'));
        assert!(ConfigStatus::NotFound.diagnostic(path).starts_with('✗'));
        assert!(ConfigStatus::NotFound
            .diagnostic(path)
            .contains("Browser_mcp.json"));
    }

    #[test]
    fn test_explicit_config_path_is_kept() {
        let path = resolve_config_path(Some(Path::new("/tmp/custom.json")));
        assert_eq!(path, PathBuf::from("/tmp/custom.json"));
    }

    #[test]
    fn test_missing_api_key() {
        let err = resolve_api_key(|_| None).unwrap_err();
        assert!(matches!(err, StartupError::MissingCredential { var } if var == API_KEY_ENV));
        assert!(err.to_string().contains("GROQ_API_KEY"));
    }

    #[test]
    fn test_blank_api_key_counts_as_missing() {
        assert!(resolve_api_key(|_| Some("   ".into())).is_err());
    }

    #[test]
    fn test_api_key_lookup_uses_env_name() {
        let key = resolve_api_key(|var| (var == "GROQ_API_KEY").then(|| "gsk_123".into())).unwrap();
        assert_eq!(key, "gsk_123");
    }

    #[test]
    fn test_zero_step_budget_is_rejected() {
        assert!(SessionConfig::new("x.json", 0, true).is_err());
        let cfg = SessionConfig::new("x.json", 3, false).unwrap();
        assert_eq!(cfg.max_steps(), 3);
        assert!(!cfg.memory_enabled());
    }

    #[test]
    fn test_default_model_settings() {
        let settings = ModelSettings::default();
        assert_eq!(settings.provider, "groq");
        assert_eq!(settings.model, "llama-3.3-70b-versatile");
        assert!((settings.temperature - 0.7).abs() < f32::EPSILON);
    }
}
