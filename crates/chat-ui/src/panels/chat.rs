//! Chat panel — conversation transcript, error banner, toolbar and input field.

use chat_types::message::{Message, Role};
use egui::{self, Align, Layout, RichText, ScrollArea, Vec2};

use crate::state::UiState;
use crate::theme::*;

/// What the caller should do after rendering the chat panel
pub enum ChatAction {
    /// User submitted a message to send
    Send(String),
    /// User asked to start a fresh conversation
    NewConversation,
    /// User asked to save the current conversation
    OpenSaveDialog,
    /// User asked to export the current conversation as a file
    Export,
}

/// Render the chat panel. Messages are the visible (non-system) transcript.
pub fn chat_panel(
    ui: &mut egui::Ui,
    state: &mut UiState,
    messages: &[Message],
) -> Option<ChatAction> {
    let mut action = None;

    egui::Frame::default()
        .fill(BG_PRIMARY)
        .inner_margin(PANEL_PADDING)
        .show(ui, |ui| {
            ui.vertical(|ui| {
                // Header + toolbar
                ui.horizontal(|ui| {
                    ui.heading(RichText::new("Chat").color(TEXT_PRIMARY).strong());
                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        let status_color = if state.is_busy() { WARNING } else { SUCCESS };
                        ui.label(
                            RichText::new(&state.status_text)
                                .color(status_color)
                                .small(),
                        );
                        if ui.button("Settings").clicked() {
                            state.show_settings = !state.show_settings;
                        }
                        if ui.button("History").clicked() {
                            state.show_history = !state.show_history;
                        }
                        let has_transcript = !messages.is_empty();
                        if ui
                            .add_enabled(has_transcript, egui::Button::new("Export"))
                            .clicked()
                        {
                            action = Some(ChatAction::Export);
                        }
                        if ui
                            .add_enabled(
                                has_transcript && !state.is_busy(),
                                egui::Button::new("Save"),
                            )
                            .clicked()
                        {
                            action = Some(ChatAction::OpenSaveDialog);
                        }
                        if ui
                            .add_enabled(!state.is_busy(), egui::Button::new("New"))
                            .clicked()
                        {
                            action = Some(ChatAction::NewConversation);
                        }
                    });
                });

                ui.separator();

                // Error banner
                if let Some(message) = state.error.clone() {
                    egui::Frame::default()
                        .fill(ERROR_BG)
                        .corner_radius(PANEL_ROUNDING)
                        .inner_margin(8.0)
                        .show(ui, |ui| {
                            ui.horizontal(|ui| {
                                ui.label(RichText::new(&message).color(ERROR));
                                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                                    if ui.small_button("Dismiss").clicked() {
                                        state.dismiss_error();
                                    }
                                });
                            });
                        });
                    ui.add_space(4.0);
                }

                // Transcript
                let available_height = ui.available_height() - 60.0;
                ScrollArea::vertical()
                    .max_height(available_height)
                    .auto_shrink([false, false])
                    .stick_to_bottom(true)
                    .show(ui, |ui| {
                        let last = messages.len().saturating_sub(1);
                        for (index, message) in messages.iter().enumerate() {
                            let streaming = state.is_busy()
                                && index == last
                                && message.role == Role::Assistant;
                            render_message(ui, message, streaming);
                            ui.add_space(4.0);
                        }
                    });

                ui.add_space(8.0);

                // Input area
                ui.horizontal(|ui| {
                    let input = egui::TextEdit::singleline(&mut state.input_text)
                        .hint_text("Type a message...")
                        .desired_width(ui.available_width() - 70.0)
                        .font(egui::FontId::proportional(14.0));

                    let response = ui.add(input);

                    let send_enabled = !state.input_text.trim().is_empty() && !state.is_busy();
                    let send_btn = ui.add_enabled(
                        send_enabled,
                        egui::Button::new(RichText::new("Send").color(TEXT_PRIMARY))
                            .fill(if send_enabled { ACCENT } else { BG_SURFACE })
                            .corner_radius(PANEL_ROUNDING)
                            .min_size(Vec2::new(60.0, 0.0)),
                    );

                    // Submit on Enter or button click
                    if (response.lost_focus()
                        && ui.input(|i| i.key_pressed(egui::Key::Enter))
                        && send_enabled)
                        || send_btn.clicked()
                    {
                        let text = state.input_text.trim().to_string();
                        action = Some(ChatAction::Send(text));
                        state.input_text.clear();
                        response.request_focus();
                    }
                });
            });
        });

    action
}

fn render_message(ui: &mut egui::Ui, message: &Message, streaming: bool) {
    let (label, label_color) = match message.role {
        Role::User => ("You", ACCENT),
        Role::Assistant => ("Assistant", ASSISTANT),
        Role::System => ("System", TEXT_SECONDARY),
    };

    egui::Frame::default()
        .fill(BG_SECONDARY)
        .corner_radius(PANEL_ROUNDING)
        .inner_margin(8.0)
        .show(ui, |ui| {
            ui.label(RichText::new(label).color(label_color).strong().small());
            ui.horizontal_wrapped(|ui| {
                ui.label(RichText::new(&message.content).color(TEXT_PRIMARY));
                if streaming {
                    ui.label(RichText::new("▌").color(ACCENT).strong());
                }
            });
        });
}
