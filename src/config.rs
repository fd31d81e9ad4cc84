use std::env;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};
use thiserror::Error;

/// Bundled Twekee FAQ prompt, used when `SYSTEM_PROMPT_FILE` is not set.
pub const DEFAULT_SYSTEM_PROMPT: &str = include_str!("../prompts/twekee_faq.txt");

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "meta-llama/llama-3.1-8b-instruct";
pub const DEFAULT_TEMPERATURE: f32 = 0.2;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} must be a number, got {value:?}")]
    InvalidNumber { name: &'static str, value: String },
    #[error("could not read system prompt from {path}: {source}")]
    PromptFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Everything the chat proxy needs to build a completion request.
#[derive(Debug, Clone)]
pub struct ProxySettings {
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: f32,
    pub system_prompt: Arc<str>,
}

impl ProxySettings {
    pub fn new(api_key: Option<String>, system_prompt: impl Into<Arc<str>>) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            temperature: DEFAULT_TEMPERATURE,
            system_prompt: system_prompt.into(),
        }
    }
}

/// Connection details for the upstream completion API.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub base_url: String,
    pub referer: Option<String>,
    pub title: Option<String>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            referer: None,
            title: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub templates_dir: String,
    pub static_dir: String,
    pub proxy: ProxySettings,
    pub provider: ProviderSettings,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds the config from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = var("OPENROUTER_API_KEY");
        if api_key.is_none() {
            warn!("OPENROUTER_API_KEY is not set; chat requests will fail with 500");
        }

        let system_prompt: Arc<str> = match var("SYSTEM_PROMPT_FILE") {
            Some(path) => {
                let path = PathBuf::from(path);
                let text = fs::read_to_string(&path)
                    .map_err(|source| ConfigError::PromptFile { path: path.clone(), source })?;
                info!("Loaded system prompt from {}", path.display());
                Arc::from(text.trim())
            }
            None => Arc::from(DEFAULT_SYSTEM_PROMPT.trim()),
        };

        let temperature = match var("TEMPERATURE") {
            Some(v) => v
                .parse::<f32>()
                .map_err(|_| ConfigError::InvalidNumber { name: "TEMPERATURE", value: v })?,
            None => DEFAULT_TEMPERATURE,
        };

        let port = match var("PORT") {
            Some(v) => v
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidNumber { name: "PORT", value: v })?,
            None => 8080,
        };

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            templates_dir: var("TEMPLATES_DIR").unwrap_or_else(|| "templates".to_string()),
            static_dir: var("STATIC_DIR").unwrap_or_else(|| "./static".to_string()),
            proxy: ProxySettings {
                api_key,
                model: var("OPENROUTER_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                temperature,
                system_prompt,
            },
            provider: ProviderSettings {
                base_url: var("OPENROUTER_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
                referer: var("OPENROUTER_REFERER"),
                title: var("OPENROUTER_TITLE"),
            },
        })
    }
}
