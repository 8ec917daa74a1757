use eframe::egui;

/// Dismissible error strip along the bottom of the window.
pub fn render(ctx: &egui::Context, notice: &mut Option<String>) {
    let Some(text) = notice.clone() else {
        return;
    };

    let mut dismissed = false;
    egui::TopBottomPanel::bottom("error_notice").show(ctx, |ui| {
        ui.horizontal(|ui| {
            let color = ui.visuals().error_fg_color;
            ui.colored_label(color, text);
            if ui.button("Dismiss").clicked() {
                dismissed = true;
            }
        });
    });

    if dismissed {
        *notice = None;
    }
}
