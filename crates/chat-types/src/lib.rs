pub mod message;
pub mod archive;
pub mod config;
pub mod event;
pub mod error;


pub use error::ChatError;
pub type Result<T> = std::result::Result<T, ChatError>;
