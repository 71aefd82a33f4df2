//! egui panels and view state for the chat client.

pub mod panels;
pub mod state;
pub mod theme;
