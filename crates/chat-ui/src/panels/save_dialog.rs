//! Modal dialog for naming a conversation before saving it to the archive.

use egui::{self, RichText, Vec2};

use crate::theme::*;

/// What the caller should do after rendering the save dialog
pub enum SaveDialogAction {
    /// User confirmed with this (non-blank) name
    Confirm(String),
    /// User cancelled
    Cancel,
}

/// Render the save dialog as a floating window. `name` is the draft name.
pub fn save_dialog(ctx: &egui::Context, name: &mut String) -> Option<SaveDialogAction> {
    let mut action = None;

    egui::Window::new("Save conversation")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, Vec2::ZERO)
        .show(ctx, |ui| {
            ui.label(RichText::new("Name").color(TEXT_SECONDARY).small());
            let response = ui.text_edit_singleline(name);

            ui.add_space(8.0);
            ui.horizontal(|ui| {
                let confirm_enabled = !name.trim().is_empty();
                let save_btn = ui.add_enabled(
                    confirm_enabled,
                    egui::Button::new(RichText::new("Save").color(TEXT_PRIMARY))
                        .fill(if confirm_enabled { ACCENT } else { BG_SURFACE })
                        .corner_radius(PANEL_ROUNDING),
                );
                if save_btn.clicked()
                    || (response.lost_focus()
                        && ui.input(|i| i.key_pressed(egui::Key::Enter))
                        && confirm_enabled)
                {
                    action = Some(SaveDialogAction::Confirm(name.trim().to_string()));
                }
                if ui.button("Cancel").clicked() {
                    action = Some(SaveDialogAction::Cancel);
                }
            });
        });

    action
}
