use eframe::egui;
use tokio::sync::mpsc;

use crate::common::{Theme, WidgetCommand, WidgetEvent};
use crate::config::AppConfig;

use super::components::{chat_area, confirm_dialog, input_bar, notice, toolbar};
use super::state::AppState;

pub struct ChatApp {
    state: AppState,
    config: AppConfig,
    command_sender: mpsc::Sender<WidgetCommand>,
    event_receiver: mpsc::Receiver<WidgetEvent>,
    applied_theme: Option<Theme>,
}

impl ChatApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        command_sender: mpsc::Sender<WidgetCommand>,
        event_receiver: mpsc::Receiver<WidgetEvent>,
    ) -> Self {
        Self {
            state: AppState::new(config.default_role.clone()),
            config,
            command_sender,
            event_receiver,
            applied_theme: None,
        }
    }

    fn handle_widget_events(&mut self) {
        while let Ok(event) = self.event_receiver.try_recv() {
            self.state.apply(event);
        }
    }

    /// Hands the command back when the worker could not take it.
    fn send_command(&self, command: WidgetCommand) -> Option<WidgetCommand> {
        match self.command_sender.try_send(command) {
            Ok(()) => None,
            Err(err) => {
                log::warn!("Failed to send command to chat worker: {err}");
                Some(err.into_inner())
            }
        }
    }

    fn sync_theme(&mut self, ctx: &egui::Context) {
        if self.applied_theme == Some(self.state.theme) {
            return;
        }
        ctx.set_visuals(match self.state.theme {
            Theme::Light => egui::Visuals::light(),
            Theme::Dark => egui::Visuals::dark(),
        });
        self.applied_theme = Some(self.state.theme);
    }
}

impl eframe::App for ChatApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.handle_widget_events();
        self.sync_theme(ctx);

        let actions = egui::TopBottomPanel::top("toolbar")
            .show(ctx, |ui| toolbar::render(ui, &mut self.state, &self.config))
            .inner;
        if let Some(role) = actions.role_change {
            self.send_command(WidgetCommand::ChangeRole {
                role: role.key,
                label: role.name,
            });
        }
        if actions.clear_requested {
            self.state.confirm_clear_open = true;
        }
        if actions.toggle_theme {
            self.send_command(WidgetCommand::ToggleTheme);
        }

        notice::render(ctx, &mut self.state.notice);

        let submitted = egui::TopBottomPanel::bottom("input_bar")
            .show(ctx, |ui| {
                ui.add_space(4.0);
                let text = input_bar::render(ui, &mut self.state);
                ui.add_space(4.0);
                text
            })
            .inner;
        if let Some(text) = submitted
            && let Some(WidgetCommand::SendMessage(text)) =
                self.send_command(WidgetCommand::SendMessage(text))
        {
            self.state.restore_input(text);
        }

        egui::CentralPanel::default().show(ctx, |ui| {
            chat_area::render(ui, &mut self.state);
        });

        if let Some(confirmed) = confirm_dialog::render(ctx, &mut self.state.confirm_clear_open) {
            self.send_command(WidgetCommand::ClearChat { confirmed });
        }

        ctx.request_repaint();
    }
}
