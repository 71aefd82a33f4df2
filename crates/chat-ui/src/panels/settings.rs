//! Settings panel — provider config, API key input, system prompt editor.
//! Includes an explicit Save button with visual feedback.

use chat_types::config::{ChatConfig, Provider, DEFAULT_SYSTEM_INSTRUCTION};
use egui::{self, RichText, Vec2};

use crate::theme::*;

/// What the caller should do after rendering the settings panel
pub enum SettingsAction {
    /// Nothing changed
    None,
    /// A field was changed (not yet persisted)
    Changed,
    /// The user clicked the explicit Save button
    SaveClicked,
}

/// Save feedback passed in from the app layer
#[derive(Clone)]
pub struct SaveFeedback {
    pub message: String,
    pub success: bool,
}

/// Render the settings panel. `instruction` is the draft of the durable
/// system prompt; the caller applies it on SaveClicked.
pub fn settings_panel(
    ui: &mut egui::Ui,
    config: &mut ChatConfig,
    instruction: &mut String,
    save_feedback: Option<&SaveFeedback>,
) -> SettingsAction {
    let mut changed = false;
    let mut save_clicked = false;

    egui::Frame::default()
        .fill(BG_SECONDARY)
        .inner_margin(PANEL_PADDING)
        .corner_radius(PANEL_ROUNDING)
        .show(ui, |ui| {
            ui.heading(RichText::new("Settings").color(TEXT_PRIMARY));
            ui.separator();

            // ── Provider Section ─────────────────────────────
            ui.label(RichText::new("Provider").color(ACCENT).strong());
            ui.add_space(2.0);

            egui::ComboBox::from_id_salt("chat_provider")
                .selected_text(config.provider.label())
                .show_ui(ui, |ui| {
                    for p in Provider::all() {
                        if ui
                            .selectable_value(&mut config.provider, *p, p.label())
                            .changed()
                        {
                            changed = true;
                        }
                    }
                });

            ui.add_space(4.0);

            // Model
            ui.label(RichText::new("Model").color(TEXT_SECONDARY).small());
            if ui.text_edit_singleline(&mut config.model).changed() {
                changed = true;
            }

            ui.add_space(4.0);

            // API Key (masked)
            ui.label(RichText::new("API Key").color(TEXT_SECONDARY).small());
            let api_key_edit = egui::TextEdit::singleline(&mut config.api_key)
                .password(true)
                .hint_text("sk-...");
            if ui.add(api_key_edit).changed() {
                changed = true;
            }

            ui.add_space(4.0);

            // Custom base URL
            ui.label(
                RichText::new("API Base URL (optional)")
                    .color(TEXT_SECONDARY)
                    .small(),
            );
            let mut base_url = config.api_base.clone().unwrap_or_default();
            if ui
                .add(
                    egui::TextEdit::singleline(&mut base_url)
                        .hint_text(config.provider.default_base_url()),
                )
                .changed()
            {
                config.api_base = if base_url.is_empty() {
                    None
                } else {
                    Some(base_url)
                };
                changed = true;
            }

            ui.add_space(4.0);

            // Temperature
            ui.label(RichText::new("Temperature").color(TEXT_SECONDARY).small());
            if ui
                .add(egui::Slider::new(&mut config.temperature, 0.0..=2.0))
                .changed()
            {
                changed = true;
            }

            // Max tokens
            ui.label(RichText::new("Max Tokens").color(TEXT_SECONDARY).small());
            if ui
                .add(egui::Slider::new(&mut config.max_tokens, 256..=32768))
                .changed()
            {
                changed = true;
            }

            ui.add_space(12.0);
            ui.separator();
            ui.add_space(4.0);

            // ── System Prompt Section ────────────────────────
            ui.label(RichText::new("System Prompt").color(ACCENT).strong());
            ui.add_space(2.0);

            if ui
                .add(
                    egui::TextEdit::multiline(instruction)
                        .desired_rows(4)
                        .desired_width(f32::INFINITY),
                )
                .changed()
            {
                changed = true;
            }
            if ui.small_button("Reset to default").clicked() {
                *instruction = DEFAULT_SYSTEM_INSTRUCTION.to_string();
                changed = true;
            }

            // ── Save Button ──────────────────────────────────
            ui.add_space(16.0);
            ui.separator();
            ui.add_space(8.0);

            ui.horizontal(|ui| {
                let btn = ui.add(
                    egui::Button::new(
                        RichText::new("Save Settings").color(TEXT_PRIMARY).strong(),
                    )
                    .fill(ACCENT)
                    .corner_radius(PANEL_ROUNDING)
                    .min_size(Vec2::new(120.0, 28.0)),
                );
                if btn.clicked() {
                    save_clicked = true;
                }

                if let Some(fb) = save_feedback {
                    let color = if fb.success { SUCCESS } else { ERROR };
                    ui.label(RichText::new(&fb.message).color(color).small());
                }
            });
        });

    if save_clicked {
        SettingsAction::SaveClicked
    } else if changed {
        SettingsAction::Changed
    } else {
        SettingsAction::None
    }
}
