use anyhow::Context;
use fs_err as fs;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::errors::CouncilError;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub model: String,
    pub api_base: String,
    pub timeout_secs: u64,
    /// Upper bound on a serialized prior result embedded in a tool prompt.
    pub max_prompt_bytes: usize,
    /// Environment variables checked in order for the API key.
    pub api_key_env: Vec<String>,
    /// Inline key from the config file. Environment wins when both are set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".into(),
            api_base: "https://generativelanguage.googleapis.com/v1beta".into(),
            timeout_secs: 120,
            max_prompt_bytes: 200_000,
            api_key_env: vec!["API_KEY".into(), "GEMINI_API_KEY".into()],
            api_key: None,
        }
    }
}

impl Config {
    /// Load from a TOML file; missing keys take their defaults.
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path)?;
        toml::from_str(&raw).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => Ok(Self::default()),
        }
    }

    /// First non-empty key found in the environment, then the file.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.resolve_api_key_with(|name| std::env::var(name).ok())
    }

    fn resolve_api_key_with(&self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        self.api_key_env
            .iter()
            .filter_map(|name| lookup(name))
            .chain(self.api_key.clone())
            .map(|k| k.trim().to_string())
            .find(|k| !k.is_empty())
    }

    pub fn missing_key_error(&self) -> CouncilError {
        CouncilError::Configuration(format!(
            "no API key configured; set one of {}",
            self.api_key_env.join(", ")
        ))
    }
}
