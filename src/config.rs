//! Startup configuration read from the environment (and `.env`, loaded in `main`).

use crate::ai::groq::GROQ_DEFAULT_BASE_URL;
use crate::ai::openai::OPENAI_DEFAULT_BASE_URL;
use crate::chat::{GenerationConfig, ModelAlias};
use std::str::FromStr;
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub groq_api_key: Option<String>,
    pub openai_api_key: Option<String>,
    pub groq_base_url: String,
    pub openai_base_url: String,
    pub llm_proxy: Option<String>,
    pub default_model: ModelAlias,
    pub generation: GenerationConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} is not a valid number: {value}")]
    InvalidNumber { key: &'static str, value: String },
    #[error("BESTIE_MODEL: unknown model nickname {0}")]
    UnknownModel(String),
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let default_model = match get("BESTIE_MODEL") {
            Some(nick) => {
                ModelAlias::from_str(&nick).map_err(|_| ConfigError::UnknownModel(nick))?
            }
            None => ModelAlias::default(),
        };

        let mut generation = GenerationConfig::default();
        if let Some(raw) = get("BESTIE_TEMPERATURE") {
            let t = raw.parse::<f32>().map_err(|_| ConfigError::InvalidNumber {
                key: "BESTIE_TEMPERATURE",
                value: raw.clone(),
            })?;
            generation.set_temperature(t);
        }
        if let Some(raw) = get("BESTIE_MAX_TOKENS") {
            let n = raw.parse::<u32>().map_err(|_| ConfigError::InvalidNumber {
                key: "BESTIE_MAX_TOKENS",
                value: raw.clone(),
            })?;
            generation.set_max_output_tokens(n);
        }
        generation.set_system_prompt(get("BESTIE_SYSTEM_PROMPT").unwrap_or_default());

        Ok(Self {
            groq_api_key: get("GROQ_API_KEY"),
            openai_api_key: get("OPENAI_API_KEY"),
            groq_base_url: get("GROQ_BASE_URL").unwrap_or_else(|| GROQ_DEFAULT_BASE_URL.to_string()),
            openai_base_url: get("OPENAI_BASE_URL")
                .unwrap_or_else(|| OPENAI_DEFAULT_BASE_URL.to_string()),
            llm_proxy: get("LLM_PROXY"),
            default_model,
            generation,
        })
    }

    /// Lines for the startup log panel. Keys are never echoed.
    pub fn summary(&self) -> Vec<String> {
        let key_line = |name: &str, key: &Option<String>| {
            if key.is_some() {
                format!("✓ {} configured", name)
            } else {
                format!("⚠ {} not set, requests to that provider will fail", name)
            }
        };
        let mut lines = vec![
            key_line("GROQ_API_KEY", &self.groq_api_key),
            key_line("OPENAI_API_KEY", &self.openai_api_key),
            format!("groq endpoint: {}", self.groq_base_url),
            format!("openai endpoint: {}", self.openai_base_url),
        ];
        if let Some(ref proxy) = self.llm_proxy {
            lines.push(format!("proxy: {}", proxy));
        }
        lines
    }
}
