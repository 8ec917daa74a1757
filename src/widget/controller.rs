use thiserror::Error;

use crate::common::{ChatMessage, Theme};
use crate::format::format_message;
use crate::network::api::{ApiError, ChatBackend, ChatRequest};
use crate::network::decoder::RecordReader;
use crate::storage::{self, HistoryCache, KeyValueStore};

use super::view::ChatView;

pub const USER_SENDER: &str = "You";
pub const DEFAULT_SENDER: &str = "AI Assistant";
pub const FALLBACK_REPLY: &str = "I apologize, but I encountered an error. Please try again.";
pub const CLEAR_FAILED_NOTICE: &str = "Failed to clear chat. Please try again.";

/// Reasons a send is refused before any request goes out.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum WidgetError {
    #[error("message is empty")]
    EmptyMessage,
    #[error("a reply is still in progress")]
    Busy,
}

#[derive(Debug, Clone)]
pub struct WidgetOptions {
    pub default_role: String,
    pub streaming: bool,
}

/// One chat widget instance: the selected role, theme and cache, plus the
/// backend it talks to. All handlers take it explicitly.
pub struct ChatWidget<B, S> {
    backend: B,
    cache: HistoryCache<S>,
    ai_role: String,
    theme: Theme,
    streaming: bool,
    loading: bool,
}

impl<B: ChatBackend, S: KeyValueStore> ChatWidget<B, S> {
    pub fn new(backend: B, store: S, options: WidgetOptions) -> Self {
        let theme = storage::load_theme(&store);
        Self {
            backend,
            cache: HistoryCache::new(store),
            ai_role: options.default_role,
            theme,
            streaming: options.streaming,
            loading: false,
        }
    }

    pub fn ai_role(&self) -> &str {
        &self.ai_role
    }

    pub fn theme(&self) -> Theme {
        self.theme
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn cache(&self) -> &HistoryCache<S> {
        &self.cache
    }

    /// Send `text` and render the reply. Transport failures are shown to the
    /// user as a fallback reply plus a notice; only refused input errors out.
    pub async fn send_message(
        &mut self,
        text: &str,
        view: &mut impl ChatView,
    ) -> Result<(), WidgetError> {
        let message = text.trim();
        if message.is_empty() {
            return Err(WidgetError::EmptyMessage);
        }
        if self.loading {
            return Err(WidgetError::Busy);
        }

        log::info!(
            "Sending message ({} chars, role={}, streaming={})",
            message.chars().count(),
            self.ai_role,
            self.streaming
        );
        self.set_loading(true, view).await;
        self.add_message(ChatMessage::user(message), USER_SENDER, view).await;

        let request = ChatRequest {
            message: message.to_string(),
            ai_role: self.ai_role.clone(),
        };
        let result = if self.streaming {
            self.stream_chat(&request, view).await
        } else {
            self.post_chat(&request, view).await
        };

        if let Err(err) = result {
            log::warn!("Chat error: {err}");
            self.add_message(ChatMessage::ai(FALLBACK_REPLY), DEFAULT_SENDER, view).await;
            view.on_notice(&format!("Failed to send message: {err}")).await;
        }

        self.set_loading(false, view).await;
        Ok(())
    }

    async fn post_chat(
        &mut self,
        request: &ChatRequest,
        view: &mut impl ChatView,
    ) -> Result<(), ApiError> {
        let reply = self.backend.chat(request).await?;
        let text = reply
            .response
            .filter(|text| !text.is_empty())
            .ok_or(ApiError::EmptyResponse)?;
        let sender = reply
            .role_name
            .unwrap_or_else(|| DEFAULT_SENDER.to_string());
        self.add_message(ChatMessage::ai(text), &sender, view).await;
        Ok(())
    }

    /// Consume `/chat/stream` until `done`, an `error` record, or end of body.
    async fn stream_chat(
        &mut self,
        request: &ChatRequest,
        view: &mut impl ChatView,
    ) -> Result<(), ApiError> {
        let chunks = self.backend.open_stream(request).await?;
        view.on_stream_started().await;
        view.scroll_to_bottom().await;

        let mut reader = RecordReader::new(chunks);
        let mut full = String::new();
        while let Some(record) = reader.next_record().await {
            let payload = record?;

            if let Some(error) = payload.error {
                log::warn!("Chat server reported a stream error: {error}");
                view.on_error(&error).await;
                return Ok(());
            }
            if let Some(delta) = payload.delta.filter(|delta| !delta.is_empty()) {
                full.push_str(&delta);
                view.on_delta_text(&format_message(&full)).await;
                view.scroll_to_bottom().await;
            }
            if payload.done {
                self.finish_stream(payload.response, payload.role_name, full, view).await;
                return Ok(());
            }
        }

        log::info!(
            "Stream closed without a done record; finalizing {} chars",
            full.len()
        );
        self.finish_stream(None, None, full, view).await;
        Ok(())
    }

    /// Commit the streamed reply: one ai message, one cache write.
    async fn finish_stream(
        &mut self,
        response: Option<String>,
        role_name: Option<String>,
        full: String,
        view: &mut impl ChatView,
    ) {
        let text = response.filter(|text| !text.is_empty()).unwrap_or(full);
        let sender = role_name.unwrap_or_else(|| DEFAULT_SENDER.to_string());
        let message = ChatMessage::ai(text);
        log::info!("Stream completed: final_len={}", message.content.len());

        self.cache.append(message.clone(), Some(self.ai_role.as_str()));
        view.on_final_message(&message, &sender).await;
        view.scroll_to_bottom().await;
    }

    /// Clear local and server history. Nothing happens unless `confirmed`.
    pub async fn clear_chat(&mut self, confirmed: bool, view: &mut impl ChatView) {
        if !confirmed {
            log::info!("Clear chat cancelled");
            return;
        }

        match self.backend.clear_chat().await {
            Ok(()) => {
                self.cache.clear();
                view.on_cleared().await;
                log::info!("Chat history cleared");
            }
            Err(err) => {
                log::warn!("Clear chat error: {err}");
                view.on_notice(CLEAR_FAILED_NOTICE).await;
            }
        }
    }

    /// Restore the conversation, local cache first, server second.
    pub async fn load_history(&mut self, view: &mut impl ChatView) {
        if let Some(cached) = self.cache.load()
            && !cached.messages.is_empty()
        {
            log::info!("Loading {} messages from local cache", cached.messages.len());
            if let Some(role) = cached.ai_role.filter(|role| !role.is_empty()) {
                self.select_role(role, view).await;
            }
            view.on_history(&cached.messages).await;
            view.scroll_to_bottom().await;
            return;
        }

        let reply = match self.backend.get_history().await {
            Ok(reply) => reply,
            Err(err) => {
                log::warn!("Failed to load chat history: {err}");
                return;
            }
        };

        if let Some(role) = reply.ai_role.filter(|role| !role.is_empty()) {
            self.select_role(role, view).await;
        }
        let history = reply.history.unwrap_or_default();
        if history.is_empty() {
            log::info!("No chat history found on server");
            return;
        }
        log::info!("Loading {} messages from server", history.len());
        view.on_history(&history).await;
        view.scroll_to_bottom().await;
        self.cache.save(&history, Some(self.ai_role.as_str()));
    }

    /// Switch persona and announce it in the conversation.
    pub async fn change_role(&mut self, role: &str, label: &str, view: &mut impl ChatView) {
        self.select_role(role.to_string(), view).await;
        let announcement =
            format!("I've switched to {label} mode. How can I help you in this capacity?");
        self.add_message(ChatMessage::ai(announcement), DEFAULT_SENDER, view).await;
    }

    pub async fn toggle_theme(&mut self, view: &mut impl ChatView) {
        self.theme = self.theme.toggled();
        storage::save_theme(self.cache.store(), self.theme);
        view.on_theme(self.theme).await;
    }

    async fn select_role(&mut self, role: String, view: &mut impl ChatView) {
        log::info!("AI role set to {role}");
        view.on_role(&role).await;
        self.ai_role = role;
    }

    async fn add_message(
        &mut self,
        message: ChatMessage,
        sender: &str,
        view: &mut impl ChatView,
    ) {
        view.on_message(&message, sender).await;
        self.cache.append(message, Some(self.ai_role.as_str()));
        view.scroll_to_bottom().await;
    }

    async fn set_loading(&mut self, loading: bool, view: &mut impl ChatView) {
        self.loading = loading;
        view.on_loading(loading).await;
    }
}
