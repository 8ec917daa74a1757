use eframe::egui;

use crate::common::Theme;
use crate::config::{AppConfig, RoleOption};
use crate::ui::state::AppState;

#[derive(Default)]
pub struct ToolbarActions {
    pub role_change: Option<RoleOption>,
    pub clear_requested: bool,
    pub toggle_theme: bool,
}

pub fn render(ui: &mut egui::Ui, state: &mut AppState, config: &AppConfig) -> ToolbarActions {
    let mut actions = ToolbarActions::default();

    ui.horizontal(|ui| {
        ui.heading("AI Chat Assistant");

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            let theme_label = match state.theme {
                Theme::Light => "Dark mode",
                Theme::Dark => "Light mode",
            };
            if ui.button(theme_label).clicked() {
                actions.toggle_theme = true;
            }
            if ui.button("Clear chat").clicked() {
                actions.clear_requested = true;
            }

            let current = config.role_name(&state.ai_role).to_string();
            let mut selected = state.ai_role.clone();
            egui::ComboBox::from_id_salt("ai_role_select")
                .selected_text(current)
                .show_ui(ui, |ui| {
                    for role in &config.roles {
                        ui.selectable_value(&mut selected, role.key.clone(), role.name.as_str());
                    }
                });

            if selected != state.ai_role {
                state.ai_role = selected.clone();
                actions.role_change = config
                    .roles
                    .iter()
                    .find(|role| role.key == selected)
                    .cloned();
            }
        });
    });

    actions
}
