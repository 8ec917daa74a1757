use eframe::egui;

use crate::ui::state::{AppState, CharCountLevel};

/// Returns the text to send when the user submits.
/// Enter sends; Shift+Enter inserts a newline.
pub fn render(ui: &mut egui::Ui, state: &mut AppState) -> Option<String> {
    let input_id = ui.make_persistent_id("message_input");
    let mut send = false;

    // Claim a bare Enter before the text edit turns it into a newline.
    if ui.memory(|memory| memory.has_focus(input_id)) {
        send |= ui.input_mut(|input| input.consume_key(egui::Modifiers::NONE, egui::Key::Enter));
    }

    ui.horizontal(|ui| {
        ui.add(
            egui::TextEdit::multiline(&mut state.input_text)
                .id(input_id)
                .desired_rows(2)
                .desired_width(ui.available_width() - 90.0)
                .hint_text("Type your message..."),
        );

        ui.vertical(|ui| {
            let label = if state.is_loading { "Sending..." } else { "Send" };
            if ui
                .add_enabled(state.can_send(), egui::Button::new(label))
                .clicked()
            {
                send = true;
            }

            let color = match state.char_count_level() {
                CharCountLevel::Limit => ui.visuals().error_fg_color,
                CharCountLevel::Warning => ui.visuals().warn_fg_color,
                CharCountLevel::Normal => ui.visuals().weak_text_color(),
            };
            ui.colored_label(color, state.char_count().to_string());
        });
    });

    if send { state.take_input() } else { None }
}
