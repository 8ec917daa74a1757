use eframe::egui;

/// Yes/no prompt shown before clearing history. Returns the answer once given.
pub fn render(ctx: &egui::Context, open: &mut bool) -> Option<bool> {
    if !*open {
        return None;
    }

    let mut answer = None;
    egui::Window::new("Clear chat history")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
        .show(ctx, |ui| {
            ui.label("Are you sure you want to clear the chat history?");
            ui.horizontal(|ui| {
                if ui.button("Yes").clicked() {
                    answer = Some(true);
                }
                if ui.button("No").clicked() {
                    answer = Some(false);
                }
            });
        });

    if answer.is_some() {
        *open = false;
    }
    answer
}
