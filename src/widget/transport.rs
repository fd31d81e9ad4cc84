use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use thiserror::Error;

use crate::web::models::{ChatProxyRequest, ChatProxyResponse};

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("chat proxy answered with status {0}")]
    Status(u16),
    #[error("network error: {0}")]
    Network(String),
}

/// How a widget reaches the chat proxy.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn post_chat(&self, request: &ChatProxyRequest)
        -> Result<ChatProxyResponse, TransportError>;
}

pub struct HttpChatTransport {
    endpoint: String,
    client: Client,
}

impl HttpChatTransport {
    /// `base_url` is the site root, e.g. `http://127.0.0.1:8080`.
    pub fn new(base_url: &str) -> Self {
        Self {
            endpoint: format!("{}/api/chat-proxy", base_url.trim_end_matches('/')),
            client: Client::new(),
        }
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn post_chat(
        &self,
        request: &ChatProxyRequest,
    ) -> Result<ChatProxyResponse, TransportError> {
        debug!("POST {} ({} history messages)", self.endpoint, request.history.len());

        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TransportError::Status(response.status().as_u16()));
        }

        response
            .json::<ChatProxyResponse>()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))
    }
}
