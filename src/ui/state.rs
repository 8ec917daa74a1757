use chrono::{DateTime, Local};

use crate::common::{ChatMessage, Role, Theme, WidgetEvent};
use crate::widget::controller::{DEFAULT_SENDER, USER_SENDER};

pub const CHAR_WARNING_AT: usize = 1500;
pub const CHAR_LIMIT_AT: usize = 1800;

/// One rendered bubble.
#[derive(Debug, Clone)]
pub struct DisplayMessage {
    pub message: ChatMessage,
    pub sender: String,
    pub shown_at: DateTime<Local>,
}

impl DisplayMessage {
    fn new(message: ChatMessage, sender: String) -> Self {
        Self {
            message,
            sender,
            shown_at: Local::now(),
        }
    }

    fn from_history(message: ChatMessage) -> Self {
        let sender = match message.role {
            Role::User => USER_SENDER,
            Role::Ai => DEFAULT_SENDER,
        };
        Self::new(message, sender.to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharCountLevel {
    Normal,
    Warning,
    Limit,
}

/// Local UI state, updated only from worker events and user input.
pub struct AppState {
    pub messages: Vec<DisplayMessage>,
    /// Markup of the reply being streamed; empty while waiting for the first delta.
    pub live_reply: Option<String>,
    pub input_text: String,
    pub is_loading: bool,
    pub ai_role: String,
    pub theme: Theme,
    pub notice: Option<String>,
    pub confirm_clear_open: bool,
    pub scroll_pending: bool,
}

impl AppState {
    pub fn new(ai_role: impl Into<String>) -> Self {
        Self {
            messages: Vec::new(),
            live_reply: None,
            input_text: String::new(),
            is_loading: false,
            ai_role: ai_role.into(),
            theme: Theme::default(),
            notice: None,
            confirm_clear_open: false,
            scroll_pending: false,
        }
    }

    pub fn apply(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::MessageAdded { message, sender } => {
                self.messages.push(DisplayMessage::new(message, sender));
            }
            WidgetEvent::StreamStarted => self.live_reply = Some(String::new()),
            WidgetEvent::StreamDelta(markup) => self.live_reply = Some(markup),
            WidgetEvent::StreamFinished { message, sender } => {
                self.live_reply = None;
                self.messages.push(DisplayMessage::new(message, sender));
            }
            WidgetEvent::StreamFailed(error) => {
                // Shown in place of the reply; never cached.
                self.live_reply = None;
                self.messages.push(DisplayMessage::new(
                    ChatMessage::ai(format!("Error: {error}")),
                    DEFAULT_SENDER.to_string(),
                ));
            }
            WidgetEvent::Notice(text) => self.notice = Some(text),
            WidgetEvent::Loading(loading) => {
                self.is_loading = loading;
                if !loading {
                    self.live_reply = None;
                }
            }
            WidgetEvent::HistoryLoaded(history) => {
                self.messages = history.into_iter().map(DisplayMessage::from_history).collect();
            }
            WidgetEvent::HistoryCleared => self.messages.clear(),
            WidgetEvent::RoleSelected(role) => self.ai_role = role,
            WidgetEvent::ThemeChanged(theme) => self.theme = theme,
            WidgetEvent::ScrollToBottom => self.scroll_pending = true,
        }
    }

    pub fn can_send(&self) -> bool {
        !self.is_loading && !self.input_text.trim().is_empty()
    }

    /// Take the input for sending and lock the send control until the worker
    /// reports the exchange finished.
    pub fn take_input(&mut self) -> Option<String> {
        if !self.can_send() {
            return None;
        }
        self.is_loading = true;
        Some(std::mem::take(&mut self.input_text))
    }

    /// Undo [`AppState::take_input`] when the worker never got the message.
    pub fn restore_input(&mut self, text: String) {
        self.is_loading = false;
        if self.input_text.is_empty() {
            self.input_text = text;
        }
        self.notice = Some("Failed to send message: chat worker is not running".to_string());
    }

    pub fn char_count(&self) -> usize {
        self.input_text.chars().count()
    }

    pub fn char_count_level(&self) -> CharCountLevel {
        match self.char_count() {
            count if count > CHAR_LIMIT_AT => CharCountLevel::Limit,
            count if count > CHAR_WARNING_AT => CharCountLevel::Warning,
            _ => CharCountLevel::Normal,
        }
    }
}
