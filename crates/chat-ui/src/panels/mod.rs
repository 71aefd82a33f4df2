pub mod chat;
pub mod history;
pub mod save_dialog;
pub mod settings;
