//! Configuration management for gpr-hub.
//!
//! Configuration is loaded from `~/.config/gpr-hub/config.toml`. Every field
//! has a default, so a missing file means a fully working setup; API keys may
//! also come from the environment or an interactive prompt at session entry.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Groq chat provider.
    #[serde(default)]
    pub groq: GroqConfig,
    /// Gemini chat provider.
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Release check settings.
    #[serde(default)]
    pub update: UpdateConfig,
}

/// Groq (OpenAI-compatible) provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroqConfig {
    /// Chat completions endpoint.
    #[serde(default = "default_groq_endpoint")]
    pub endpoint: String,
    /// Model id (default: llama-3.3-70b-versatile).
    #[serde(default = "default_groq_model")]
    pub model: String,
    /// API key (prefer GROQ_API_KEY env var).
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            endpoint: default_groq_endpoint(),
            model: default_groq_model(),
            api_key: None,
        }
    }
}

/// Gemini provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API base; `models/<model>:generateContent` is appended per request.
    #[serde(default = "default_gemini_endpoint")]
    pub endpoint: String,
    /// Model id (default: gemini-2.5-flash).
    #[serde(default = "default_gemini_model")]
    pub model: String,
    /// API key (prefer GEMINI_API_KEY env var).
    #[serde(default)]
    pub api_key: Option<String>,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            endpoint: default_gemini_endpoint(),
            model: default_gemini_model(),
            api_key: None,
        }
    }
}

/// Release check settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// GitHub `owner/repo` whose latest release tag is compared at startup.
    #[serde(default = "default_update_repo")]
    pub repo: String,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            repo: default_update_repo(),
        }
    }
}

fn default_groq_endpoint() -> String {
    "https://api.groq.com/openai/v1/chat/completions".to_string()
}

fn default_groq_model() -> String {
    "llama-3.3-70b-versatile".to_string()
}

fn default_gemini_endpoint() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-2.5-flash".to_string()
}

fn default_update_repo() -> String {
    "codemaster-ar/gpr-hub-cli".to_string()
}

impl Config {
    /// Get the config directory path.
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("gpr-hub"))
            .context("Could not determine config directory")
    }

    /// Get the config file path.
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from the default path, using defaults if not found.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from an explicit path, using defaults if not found.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default path.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }
}
