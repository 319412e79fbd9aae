//! Configuration system (layered: defaults < TOML file < environment).

use std::fmt;
use std::path::{Path, PathBuf};

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::error::TurnkitError;

pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_TEMPERATURE: f64 = 0.1;
pub const DEFAULT_IMAGE_MODEL: &str = "dall-e-3";

/// File looked up in the working directory before the per-user config dir.
pub const LOCAL_CONFIG_FILE: &str = "turnkit.toml";

const DEFAULT_SYSTEM_PROMPT: &str = "You are a friendly assistant that can call tools. \
Call a tool only when it clearly helps with the request, otherwise answer directly. \
Never put real celebrity names into image prompts; describe generic character traits instead.";

/// Settings for the model invoker and the built-in tools.
#[derive(Clone, Builder, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Chat model id.
    #[builder(default = DEFAULT_MODEL.to_string(), into)]
    pub model: String,
    #[builder(default = DEFAULT_TEMPERATURE)]
    pub temperature: f64,
    /// Prepended to every model request; never stored in the conversation.
    #[builder(default = DEFAULT_SYSTEM_PROMPT.to_string(), into)]
    pub system_prompt: String,
    #[builder(into)]
    pub openai_api_key: Option<String>,
    #[builder(into)]
    pub openai_base_url: Option<String>,
    #[builder(default = DEFAULT_IMAGE_MODEL.to_string(), into)]
    pub image_model: String,
    #[builder(into)]
    pub reddit_base_url: Option<String>,
    #[builder(into)]
    pub dad_joke_base_url: Option<String>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for AgentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentConfig")
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("system_prompt", &self.system_prompt)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| ".."))
            .field("openai_base_url", &self.openai_base_url)
            .field("image_model", &self.image_model)
            .field("reddit_base_url", &self.reddit_base_url)
            .field("dad_joke_base_url", &self.dad_joke_base_url)
            .finish()
    }
}

impl AgentConfig {
    /// Parse a TOML document; missing keys fall back to defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, TurnkitError> {
        toml::from_str(raw).map_err(|e| TurnkitError::Configuration(format!("invalid config: {e}")))
    }

    /// Load a TOML config file.
    pub fn load(path: &Path) -> Result<Self, TurnkitError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            TurnkitError::Configuration(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&raw)
    }

    /// Per-user config file, e.g. `~/.config/turnkit/config.toml` on Linux.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "turnkit")
            .map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Resolve the full layered configuration.
    ///
    /// An explicit path must exist. Otherwise `./turnkit.toml`, then the
    /// per-user file, then built-in defaults. Environment variables (with
    /// `.env` loaded first) override whatever the file set.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, TurnkitError> {
        let _ = dotenvy::dotenv();

        let base = match explicit {
            Some(path) => Self::load(path)?,
            None => {
                let mut candidates = std::iter::once(PathBuf::from(LOCAL_CONFIG_FILE))
                    .chain(Self::default_path());
                match candidates.find(|p| p.is_file()) {
                    Some(path) => {
                        tracing::debug!(path = %path.display(), "loading config file");
                        Self::load(&path)?
                    }
                    None => Self::default(),
                }
            }
        };

        base.with_env(|key| std::env::var(key).ok())
    }

    /// Apply environment overrides read through `lookup`.
    pub fn with_env<F>(mut self, lookup: F) -> Result<Self, TurnkitError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.openai_api_key = Some(key);
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            self.openai_base_url = Some(url);
        }
        if let Some(model) = lookup("TURNKIT_MODEL") {
            self.model = model;
        }
        if let Some(raw) = lookup("TURNKIT_TEMPERATURE") {
            self.temperature = raw.trim().parse().map_err(|_| {
                TurnkitError::Configuration(format!("TURNKIT_TEMPERATURE is not a number: {raw}"))
            })?;
        }
        Ok(self)
    }

    /// The OpenAI key, or an authentication error naming the env var to set.
    pub fn require_api_key(&self) -> Result<&str, TurnkitError> {
        self.openai_api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| TurnkitError::Authentication("Missing OPENAI_API_KEY".into()))
    }
}
