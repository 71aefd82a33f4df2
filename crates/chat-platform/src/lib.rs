pub mod download;
pub mod llm;
pub mod store;
