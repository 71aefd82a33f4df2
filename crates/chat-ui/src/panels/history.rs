//! History drawer — lists archived conversations with load and delete controls.

use chat_types::archive::ArchivedConversation;
use egui::{self, Align, Layout, RichText, ScrollArea};

use crate::theme::*;

/// What the caller should do after rendering the history drawer
pub enum HistoryAction {
    /// Load the archived conversation with this id
    Select(String),
    /// Delete the archived conversation with this id
    Delete(String),
    /// Close the drawer
    Close,
}

/// Render the history drawer over the given archive entries.
pub fn history_panel(
    ui: &mut egui::Ui,
    entries: &[ArchivedConversation],
) -> Option<HistoryAction> {
    let mut action = None;

    egui::Frame::default()
        .fill(BG_SECONDARY)
        .inner_margin(PANEL_PADDING)
        .corner_radius(PANEL_ROUNDING)
        .show(ui, |ui| {
            ui.horizontal(|ui| {
                ui.heading(RichText::new("History").color(TEXT_PRIMARY));
                ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                    if ui.small_button("Close").clicked() {
                        action = Some(HistoryAction::Close);
                    }
                });
            });
            ui.separator();

            if entries.is_empty() {
                ui.label(
                    RichText::new("No saved conversations yet.")
                        .color(TEXT_SECONDARY)
                        .italics(),
                );
                return;
            }

            ScrollArea::vertical()
                .auto_shrink([false, true])
                .show(ui, |ui| {
                    for entry in entries {
                        egui::Frame::default()
                            .fill(BG_SURFACE)
                            .corner_radius(PANEL_ROUNDING)
                            .inner_margin(8.0)
                            .show(ui, |ui| {
                                ui.horizontal(|ui| {
                                    ui.vertical(|ui| {
                                        ui.label(
                                            RichText::new(&entry.name)
                                                .color(TEXT_PRIMARY)
                                                .strong(),
                                        );
                                        ui.label(
                                            RichText::new(format_timestamp(&entry.created_at))
                                                .color(TEXT_SECONDARY)
                                                .small(),
                                        );
                                    });
                                    ui.with_layout(
                                        Layout::right_to_left(Align::Center),
                                        |ui| {
                                            if ui.small_button("Delete").clicked() {
                                                action = Some(HistoryAction::Delete(
                                                    entry.id.clone(),
                                                ));
                                            }
                                            if ui.small_button("Load").clicked() {
                                                action = Some(HistoryAction::Select(
                                                    entry.id.clone(),
                                                ));
                                            }
                                        },
                                    );
                                });
                            });
                        ui.add_space(4.0);
                    }
                });
        });

    action
}

fn format_timestamp(rfc3339: &str) -> String {
    match chrono::DateTime::parse_from_rfc3339(rfc3339) {
        Ok(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        Err(_) => rfc3339.to_string(),
    }
}
