use tokio::sync::mpsc;

use crate::common::{WidgetCommand, WidgetEvent};
use crate::storage::KeyValueStore;
use crate::widget::{ChannelView, ChatView, ChatWidget};

use super::api::ChatBackend;

/// Background task owning the widget. Commands are handled one at a time, so
/// a second send can never start while a reply is still streaming.
pub struct ChatWorker<B, S> {
    widget: ChatWidget<B, S>,
    view: ChannelView,
    command_receiver: mpsc::Receiver<WidgetCommand>,
}

impl<B: ChatBackend, S: KeyValueStore> ChatWorker<B, S> {
    pub fn new(
        widget: ChatWidget<B, S>,
        event_sender: mpsc::Sender<WidgetEvent>,
        command_receiver: mpsc::Receiver<WidgetCommand>,
    ) -> Self {
        Self {
            widget,
            view: ChannelView::new(event_sender),
            command_receiver,
        }
    }

    pub async fn run(mut self) {
        log::info!("Chat worker started (role={})", self.widget.ai_role());
        self.view.on_theme(self.widget.theme()).await;
        let role = self.widget.ai_role().to_string();
        self.view.on_role(&role).await;
        self.widget.load_history(&mut self.view).await;

        while let Some(command) = self.command_receiver.recv().await {
            self.handle_command(command).await;
        }

        log::info!("Command channel closed; chat worker stopping");
    }

    async fn handle_command(&mut self, command: WidgetCommand) {
        match command {
            WidgetCommand::SendMessage(text) => {
                if let Err(err) = self.widget.send_message(&text, &mut self.view).await {
                    log::warn!("Message not sent: {err}");
                }
            }
            WidgetCommand::ClearChat { confirmed } => {
                self.widget.clear_chat(confirmed, &mut self.view).await;
            }
            WidgetCommand::ChangeRole { role, label } => {
                self.widget.change_role(&role, &label, &mut self.view).await;
            }
            WidgetCommand::ToggleTheme => self.widget.toggle_theme(&mut self.view).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Theme;
    use crate::storage::KvDatabase;
    use crate::widget::WidgetOptions;
    use crate::widget::testing::FakeBackend;

    async fn run_worker(backend: FakeBackend, commands: Vec<WidgetCommand>) -> Vec<WidgetEvent> {
        let widget = ChatWidget::new(backend, KvDatabase::in_memory().unwrap(), WidgetOptions {
            default_role: "helpful_assistant".into(),
            streaming: true,
        });
        let (cmd_tx, cmd_rx) = mpsc::channel(16);
        // Far smaller than a streamed reply, so the worker has to wait on the UI.
        let (event_tx, mut event_rx) = mpsc::channel(8);
        for command in commands {
            cmd_tx.send(command).await.unwrap();
        }
        drop(cmd_tx);

        let drain = async {
            let mut events = Vec::new();
            while let Some(event) = event_rx.recv().await {
                events.push(event);
            }
            events
        };
        let ((), events) = tokio::join!(ChatWorker::new(widget, event_tx, cmd_rx).run(), drain);
        events
    }

    #[tokio::test]
    async fn startup_reports_theme_role_then_history() {
        let events = run_worker(FakeBackend::default(), vec![]).await;

        assert!(matches!(events[0], WidgetEvent::ThemeChanged(Theme::Light)));
        assert!(matches!(&events[1], WidgetEvent::RoleSelected(role) if role == "helpful_assistant"));
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn commands_run_in_order_and_exchange_completes_before_next() {
        let backend = FakeBackend::streaming(&[
            "data: {\"delta\":\"Hi\"}\n\n",
            "data: {\"done\":true}\n\n",
        ]);
        let events = run_worker(backend, vec![
            WidgetCommand::SendMessage("Hello".into()),
            WidgetCommand::ToggleTheme,
        ])
        .await;

        let finished = events
            .iter()
            .position(|event| matches!(event, WidgetEvent::StreamFinished { .. }))
            .unwrap();
        let idle = events
            .iter()
            .position(|event| matches!(event, WidgetEvent::Loading(false)))
            .unwrap();
        let theme = events
            .iter()
            .rposition(|event| matches!(event, WidgetEvent::ThemeChanged(Theme::Dark)))
            .unwrap();
        assert!(finished < idle);
        assert!(idle < theme);
    }

    #[tokio::test]
    async fn long_single_chunk_reply_reaches_the_ui_intact() {
        let mut body = String::new();
        for _ in 0..300 {
            body.push_str("data: {\"delta\":\"x\"}\n\n");
        }
        body.push_str("data: {\"done\":true}\n\n");
        let backend = FakeBackend::streaming(&[body.as_str()]);

        let events = run_worker(backend, vec![WidgetCommand::SendMessage("Hello".into())]).await;

        let deltas = events
            .iter()
            .filter(|event| matches!(event, WidgetEvent::StreamDelta(_)))
            .count();
        let finals: Vec<_> = events
            .iter()
            .filter_map(|event| match event {
                WidgetEvent::StreamFinished { message, .. } => Some(message.content.clone()),
                _ => None,
            })
            .collect();
        assert_eq!(deltas, 300);
        assert_eq!(finals, vec!["x".repeat(300)]);
        assert!(matches!(events.last(), Some(WidgetEvent::Loading(false))));
    }

    #[tokio::test]
    async fn declined_clear_emits_nothing() {
        let events = run_worker(FakeBackend::default(), vec![WidgetCommand::ClearChat {
            confirmed: false,
        }])
        .await;

        assert!(
            !events
                .iter()
                .any(|event| matches!(event, WidgetEvent::HistoryCleared))
        );
    }
}
