use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::common::{ChatMessage, Theme, WidgetEvent};

/// Everything the widget shows goes through here; a renderer plugs in behind it.
#[async_trait]
pub trait ChatView: Send {
    /// A complete message bubble.
    async fn on_message(&mut self, message: &ChatMessage, sender: &str);
    /// The placeholder bubble for a streamed reply.
    async fn on_stream_started(&mut self) {}
    /// Formatted markup of the streamed reply so far.
    async fn on_delta_text(&mut self, markup: &str);
    async fn on_final_message(&mut self, message: &ChatMessage, sender: &str);
    /// Error state of the streamed reply.
    async fn on_error(&mut self, error: &str);
    /// Dismissible notification.
    async fn on_notice(&mut self, notice: &str);
    async fn on_loading(&mut self, _loading: bool) {}
    async fn on_history(&mut self, messages: &[ChatMessage]);
    async fn on_cleared(&mut self);
    async fn on_role(&mut self, _role: &str) {}
    async fn on_theme(&mut self, _theme: Theme) {}
    async fn scroll_to_bottom(&mut self) {}
}

/// Forwards view callbacks to the UI thread as [`WidgetEvent`]s.
pub struct ChannelView {
    event_sender: mpsc::Sender<WidgetEvent>,
}

impl ChannelView {
    pub fn new(event_sender: mpsc::Sender<WidgetEvent>) -> Self {
        Self { event_sender }
    }

    /// Waits for room in the channel; only a closed UI loses events.
    async fn emit(&self, event: WidgetEvent) {
        if let Err(err) = self.event_sender.send(event).await {
            log::warn!("UI is gone; dropping widget event: {err}");
        }
    }
}

#[async_trait]
impl ChatView for ChannelView {
    async fn on_message(&mut self, message: &ChatMessage, sender: &str) {
        self.emit(WidgetEvent::MessageAdded {
            message: message.clone(),
            sender: sender.to_string(),
        })
        .await;
    }

    async fn on_stream_started(&mut self) {
        self.emit(WidgetEvent::StreamStarted).await;
    }

    async fn on_delta_text(&mut self, markup: &str) {
        self.emit(WidgetEvent::StreamDelta(markup.to_string())).await;
    }

    async fn on_final_message(&mut self, message: &ChatMessage, sender: &str) {
        self.emit(WidgetEvent::StreamFinished {
            message: message.clone(),
            sender: sender.to_string(),
        })
        .await;
    }

    async fn on_error(&mut self, error: &str) {
        self.emit(WidgetEvent::StreamFailed(error.to_string())).await;
    }

    async fn on_notice(&mut self, notice: &str) {
        self.emit(WidgetEvent::Notice(notice.to_string())).await;
    }

    async fn on_loading(&mut self, loading: bool) {
        self.emit(WidgetEvent::Loading(loading)).await;
    }

    async fn on_history(&mut self, messages: &[ChatMessage]) {
        self.emit(WidgetEvent::HistoryLoaded(messages.to_vec())).await;
    }

    async fn on_cleared(&mut self) {
        self.emit(WidgetEvent::HistoryCleared).await;
    }

    async fn on_role(&mut self, role: &str) {
        self.emit(WidgetEvent::RoleSelected(role.to_string())).await;
    }

    async fn on_theme(&mut self, theme: Theme) {
        self.emit(WidgetEvent::ThemeChanged(theme)).await;
    }

    async fn scroll_to_bottom(&mut self) {
        self.emit(WidgetEvent::ScrollToBottom).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn callbacks_arrive_as_events_in_order() {
        let (tx, mut rx) = mpsc::channel(8);
        let mut view = ChannelView::new(tx);

        view.on_stream_started().await;
        view.on_delta_text("Hi").await;
        view.on_final_message(&ChatMessage::ai("Hi"), "Tutor").await;

        assert!(matches!(rx.try_recv(), Ok(WidgetEvent::StreamStarted)));
        assert!(matches!(rx.try_recv(), Ok(WidgetEvent::StreamDelta(text)) if text == "Hi"));
        match rx.try_recv() {
            Ok(WidgetEvent::StreamFinished { message, sender }) => {
                assert_eq!(message.content, "Hi");
                assert_eq!(sender, "Tutor");
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn full_channel_waits_for_the_ui_instead_of_dropping() {
        let (tx, mut rx) = mpsc::channel(1);
        let mut view = ChannelView::new(tx);

        let producer = async move {
            view.on_loading(true).await;
            view.on_loading(false).await;
        };
        let consumer = async {
            let mut seen = Vec::new();
            while let Some(event) = rx.recv().await {
                if let WidgetEvent::Loading(loading) = event {
                    seen.push(loading);
                }
            }
            seen
        };
        let ((), seen) = tokio::join!(producer, consumer);

        assert_eq!(seen, vec![true, false]);
    }

    #[tokio::test]
    async fn closed_ui_does_not_panic() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let mut view = ChannelView::new(tx);
        view.on_notice("nobody listening").await;
    }
}
