use std::pin::Pin;

use async_trait::async_trait;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::common::ChatMessage;

/// Raw body chunks of a streaming reply.
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>, ApiError>> + Send>>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("network error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Streaming not supported")]
    StreamUnsupported,
    #[error("Empty response from server")]
    EmptyResponse,
}

/// Body of `/chat` and `/chat/stream`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub message: String,
    pub ai_role: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatReply {
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub role_name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryReply {
    #[serde(default)]
    pub ai_role: Option<String>,
    #[serde(default)]
    pub history: Option<Vec<ChatMessage>>,
}

/// The chat server as seen by the widget.
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError>;
    async fn open_stream(&self, request: &ChatRequest) -> Result<ByteStream, ApiError>;
    async fn clear_chat(&self) -> Result<(), ApiError>;
    async fn get_history(&self) -> Result<HistoryReply, ApiError>;
}

/// reqwest client for the chat server. Cookies are kept so the server-side
/// session (and with it `/get_history`) follows this widget.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    log::warn!("Chat server returned {status}: {body}");
    Err(ApiError::Status {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, ApiError> {
        log::info!("POST /chat (role={})", request.ai_role);
        let response = self
            .http
            .post(self.url("/chat"))
            .json(request)
            .send()
            .await?;
        let response = error_for_status(response).await?;
        Ok(response.json::<ChatReply>().await?)
    }

    async fn open_stream(&self, request: &ChatRequest) -> Result<ByteStream, ApiError> {
        log::info!("POST /chat/stream (role={})", request.ai_role);
        let response = self
            .http
            .post(self.url("/chat/stream"))
            .json(request)
            .send()
            .await?;
        if !response.status().is_success() {
            log::warn!("Stream request rejected with {}", response.status());
            return Err(ApiError::StreamUnsupported);
        }
        let chunks = response
            .bytes_stream()
            .map(|chunk| chunk.map(|bytes| bytes.to_vec()).map_err(ApiError::from));
        Ok(chunks.boxed())
    }

    async fn clear_chat(&self) -> Result<(), ApiError> {
        let response = self.http.post(self.url("/clear_chat")).send().await?;
        error_for_status(response).await?;
        Ok(())
    }

    async fn get_history(&self) -> Result<HistoryReply, ApiError> {
        let response = self.http.get(self.url("/get_history")).send().await?;
        let response = error_for_status(response).await?;
        Ok(response.json::<HistoryReply>().await?)
    }
}
