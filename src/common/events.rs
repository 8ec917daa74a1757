use super::types::{ChatMessage, Theme};

/// Events the chat worker sends up to the UI.
#[derive(Debug, Clone)]
pub enum WidgetEvent {
    MessageAdded { message: ChatMessage, sender: String },
    StreamStarted,
    /// Formatted markup of everything received so far.
    StreamDelta(String),
    StreamFinished { message: ChatMessage, sender: String },
    StreamFailed(String),
    Notice(String),
    Loading(bool),
    HistoryLoaded(Vec<ChatMessage>),
    HistoryCleared,
    RoleSelected(String),
    ThemeChanged(Theme),
    ScrollToBottom,
}
