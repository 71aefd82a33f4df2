pub mod openai_compat;
pub mod sse;

pub use openai_compat::OpenAiCompatClient;
