use std::sync::Arc;

use log::{debug, error};
use serde_json::Value;
use uuid::Uuid;

use crate::config::ProxySettings;
use crate::model::{CompletionProvider, CompletionRequest, ProviderError};
use crate::web::error::ApiError;
use crate::web::models::{ChatProxyRequest, ChatTurn, Message};

pub const FALLBACK_REPLY: &str =
    "I’m Twekee. I had trouble generating a response just now. Please try again.";

/// Shared, read-only state behind the chat endpoints.
pub struct ChatProxy {
    settings: ProxySettings,
    provider: Arc<dyn CompletionProvider>,
}

impl ChatProxy {
    pub fn new(settings: ProxySettings, provider: Arc<dyn CompletionProvider>) -> Self {
        Self { settings, provider }
    }

    pub fn api_key(&self) -> Result<&str, ApiError> {
        self.settings.api_key.as_deref().ok_or_else(|| {
            error!("OPENROUTER_API_KEY is not set on the server");
            ApiError::Misconfigured
        })
    }

    /// System prompt, then the caller's history, then the new user turn.
    pub fn build_request(&self, request: ChatProxyRequest) -> CompletionRequest {
        let mut messages = Vec::with_capacity(request.history.len() + 2);
        messages.push(Message::system(&*self.settings.system_prompt).into());
        messages.extend(request.history);
        messages.push(Message::user(request.message).into());

        CompletionRequest {
            model: self.settings.model.clone(),
            messages,
            temperature: self.settings.temperature,
        }
    }

    pub async fn reply(
        &self,
        request_id: Uuid,
        api_key: &str,
        request: ChatProxyRequest,
    ) -> Result<String, ApiError> {
        let completion = self.build_request(request);
        debug!("[{}] Forwarding {} messages", request_id, completion.messages.len());

        let response = self
            .provider
            .complete(api_key, &completion)
            .await
            .map_err(|e| match e {
                ProviderError::Status { status, body } => {
                    error!("[{}] OpenRouter error ({}): {}", request_id, status, body);
                    ApiError::Upstream
                }
                other => {
                    error!("[{}] Twekee backend error: {}", request_id, other);
                    ApiError::Internal
                }
            })?;

        match response.first_content() {
            Some(content) => {
                debug!("[{}] Reply length: {} characters", request_id, content.len());
                Ok(content.to_string())
            }
            None => {
                debug!("[{}] Provider returned no content, using fallback", request_id);
                Ok(FALLBACK_REPLY.to_string())
            }
        }
    }
}

/// Validates a raw chat body. `message` must be a non-empty string. `history`
/// may be absent or null; otherwise it must be an array, whose entries are
/// forwarded as they are.
pub fn parse_request(body: &[u8]) -> Result<ChatProxyRequest, ApiError> {
    let value: Value = serde_json::from_slice(body).map_err(|_| ApiError::MissingMessage)?;

    let message = match value.get("message") {
        Some(Value::String(message)) if !message.is_empty() => message.clone(),
        _ => return Err(ApiError::MissingMessage),
    };

    let history = match value.get("history") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(entries)) => {
            entries.iter().cloned().map(ChatTurn::from_value).collect()
        }
        Some(_) => return Err(ApiError::InvalidHistory),
    };

    Ok(ChatProxyRequest { message, history })
}
