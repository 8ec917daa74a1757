use eframe::egui;

use crate::format::format_message;
use crate::ui::state::AppState;
use crate::widget::controller::DEFAULT_SENDER;

use super::rich_text;

const WELCOME_TEXT: &str =
    "Hello! I'm your AI assistant. Pick a role above and ask me anything.";

pub fn render(ui: &mut egui::Ui, state: &mut AppState) {
    egui::ScrollArea::vertical()
        .auto_shrink([false, false])
        .stick_to_bottom(true)
        .show(ui, |ui| {
            // The welcome bubble is not part of the history and survives clears.
            bubble(ui, DEFAULT_SENDER, "", &format_message(WELCOME_TEXT));

            for entry in &state.messages {
                let time = entry.shown_at.format("%H:%M").to_string();
                bubble(ui, &entry.sender, &time, &format_message(&entry.message.content));
            }

            match state.live_reply.as_deref() {
                Some("") => {
                    ui.weak("Thinking...");
                }
                Some(markup) => bubble(ui, DEFAULT_SENDER, "", markup),
                None if state.is_loading => {
                    ui.weak("AI is typing...");
                }
                None => {}
            }

            if state.scroll_pending {
                ui.scroll_to_cursor(Some(egui::Align::BOTTOM));
                state.scroll_pending = false;
            }
        });
}

fn bubble(ui: &mut egui::Ui, sender: &str, time: &str, markup: &str) {
    egui::Frame::group(ui.style()).show(ui, |ui| {
        ui.horizontal(|ui| {
            ui.strong(sender);
            if !time.is_empty() {
                ui.weak(time);
            }
        });
        let job = rich_text::layout_job(markup, ui.style(), ui.available_width());
        ui.label(job);
    });
}
