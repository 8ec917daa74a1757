//! Test doubles shared by the widget and worker tests.

use std::sync::Mutex;

use async_trait::async_trait;
use futures::{StreamExt, stream};

use crate::network::api::{ApiError, ByteStream, ChatBackend, ChatReply, ChatRequest, HistoryReply};

/// Scripted server: each endpoint returns whatever the test queued.
#[derive(Default)]
pub struct FakeBackend {
    pub stream_body: Mutex<Option<Vec<Result<Vec<u8>, ApiError>>>>,
    pub chat_reply: Mutex<Option<ChatReply>>,
    pub clear_fails: bool,
    pub history: Mutex<Option<HistoryReply>>,
    pub calls: Mutex<Vec<&'static str>>,
}

impl FakeBackend {
    pub fn streaming(records: &[&str]) -> Self {
        let body = records
            .iter()
            .map(|record| Ok(record.as_bytes().to_vec()))
            .collect();
        Self {
            stream_body: Mutex::new(Some(body)),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatBackend for FakeBackend {
    async fn chat(&self, _request: &ChatRequest) -> Result<ChatReply, ApiError> {
        self.calls.lock().unwrap().push("chat");
        self.chat_reply.lock().unwrap().take().ok_or(ApiError::Status {
            status: 500,
            body: "Internal server error".into(),
        })
    }

    async fn open_stream(&self, _request: &ChatRequest) -> Result<ByteStream, ApiError> {
        self.calls.lock().unwrap().push("stream");
        let body = self.stream_body.lock().unwrap().take();
        match body {
            Some(body) => Ok(stream::iter(body).boxed()),
            None => Err(ApiError::StreamUnsupported),
        }
    }

    async fn clear_chat(&self) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push("clear");
        if self.clear_fails {
            Err(ApiError::Status {
                status: 500,
                body: String::new(),
            })
        } else {
            Ok(())
        }
    }

    async fn get_history(&self) -> Result<HistoryReply, ApiError> {
        self.calls.lock().unwrap().push("history");
        let history = self.history.lock().unwrap().take();
        Ok(history.unwrap_or_default())
    }
}
