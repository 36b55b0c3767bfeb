//! Configuration file support

use lyra_agent::{OptimizationMode, TargetAi};
use lyra_ai::providers::google::API_KEY_ENV_VARS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for lyra
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Gemini model to use
    pub model: Option<String>,
    /// Default target platform
    pub target: Option<TargetAi>,
    /// Default optimization mode
    pub mode: Option<OptimizationMode>,
    /// Whether to use TUI mode by default
    pub tui: Option<bool>,
    /// API key (environment variables take precedence)
    pub api_key: Option<String>,
}

impl Config {
    /// Get the config directory
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("lyra")
    }

    /// Get the config file path
    pub fn config_path() -> PathBuf {
        // Check for LYRA_CONFIG_PATH env var first
        if let Ok(path) = std::env::var("LYRA_CONFIG_PATH") {
            return PathBuf::from(path);
        }
        Self::config_dir().join("config.toml")
    }

    /// Load config from the default location
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from a file; problems are reported and the defaults used
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match fs::read_to_string(path) {
            Ok(content) => match Self::parse(&content) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("Warning: Failed to parse config file: {}", e);
                    Self::default()
                }
            },
            Err(e) => {
                eprintln!("Warning: Failed to read config file: {}", e);
                Self::default()
            }
        }
    }

    /// Parse TOML config content
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Save config to a file
    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }

        let content = toml::to_string_pretty(self).map_err(std::io::Error::other)?;
        fs::write(path, content)
    }

    /// Create a default config file if it doesn't exist
    pub fn init() -> std::io::Result<PathBuf> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(path);
        }

        fs::create_dir_all(path.parent().unwrap_or(Path::new(".")))?;
        fs::write(&path, example_config())?;
        Ok(path)
    }

    /// Resolve the credential: environment first, then the config file
    pub fn api_key(&self) -> Option<String> {
        resolve_api_key(|var| std::env::var(var).ok(), self.api_key.as_deref())
    }
}

/// Pick the first non-blank key from the environment lookup, then `configured`
fn resolve_api_key(
    env: impl Fn(&str) -> Option<String>,
    configured: Option<&str>,
) -> Option<String> {
    API_KEY_ENV_VARS
        .iter()
        .filter_map(|var| env(var))
        .chain(configured.map(str::to_string))
        .find(|key| !key.trim().is_empty())
}

/// Generate example config content
pub fn example_config() -> &'static str {
    r#"# lyra configuration file
# Place at ~/.config/lyra/config.toml (Linux/Mac) or %APPDATA%\lyra\config.toml (Windows)

# Gemini model to use
model = "gemini-2.5-flash"

# Default target platform (chatgpt, claude, gemini, other)
target = "chatgpt"

# Default optimization mode (basic, detail)
mode = "basic"

# Whether to use TUI mode by default (true by default)
# Set to false for simple stdin/stdout mode
tui = true

# API key (optional - API_KEY, GEMINI_API_KEY or GOOGLE_API_KEY take precedence)
# api_key = "..."
"#
}
