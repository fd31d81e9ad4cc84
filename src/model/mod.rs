use async_trait::async_trait;
use log::{debug, info};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ProviderSettings;
use crate::web::models::ChatTurn;

#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub messages: Vec<ChatTurn>,
    pub temperature: f32,
}

// Every level is optional; a missing piece means "no content", not a decode error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Choice {
    #[serde(default)]
    pub message: Option<ChoiceMessage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl CompletionResponse {
    /// Content of the first choice, if there is any non-empty text.
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .and_then(|choice| choice.message.as_ref())
            .and_then(|message| message.content.as_deref())
            .filter(|content| !content.is_empty())
    }
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("request to provider failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("could not decode provider response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("API key is not a valid header value")]
    InvalidApiKey,
}

#[async_trait]
pub trait CompletionProvider: Send + Sync {
    async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError>;
}

// Client for the OpenRouter chat-completion API (or any OpenAI-compatible server)
pub struct OpenRouterClient {
    endpoint: String,
    client: Client,
    extra_headers: HeaderMap,
}

impl OpenRouterClient {
    pub fn new(settings: &ProviderSettings) -> anyhow::Result<Self> {
        let endpoint = format!("{}/chat/completions", settings.base_url.trim_end_matches('/'));
        info!("Using completion endpoint: {}", endpoint);

        let mut extra_headers = HeaderMap::new();
        if let Some(referer) = &settings.referer {
            extra_headers.insert("http-referer", HeaderValue::from_str(referer)?);
        }
        if let Some(title) = &settings.title {
            extra_headers.insert("x-title", HeaderValue::from_str(title)?);
        }

        Ok(Self {
            endpoint,
            client: Client::new(),
            extra_headers,
        })
    }
}

#[async_trait]
impl CompletionProvider for OpenRouterClient {
    async fn complete(
        &self,
        api_key: &str,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ProviderError> {
        debug!(
            "Sending {} messages to {} (model: {})",
            request.messages.len(),
            self.endpoint,
            request.model
        );

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", api_key))
            .map_err(|_| ProviderError::InvalidApiKey)?;
        auth.set_sensitive(true);

        let response = self
            .client
            .post(&self.endpoint)
            .headers(self.extra_headers.clone())
            .header(AUTHORIZATION, auth)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ProviderError::Status { status: status.as_u16(), body });
        }

        debug!("Response body: {}", body);
        Ok(serde_json::from_str(&body)?)
    }
}
