use serde::{Deserialize, Serialize};

/// Client configuration, persisted as a single JSON record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    pub provider: Provider,
    pub model: String,
    /// Opaque bearer credential, stored browser-local only.
    pub api_key: String,
    pub api_base: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            provider: Provider::DeepSeek,
            model: "deepseek-chat".to_string(),
            api_key: String::new(),
            api_base: None,
            temperature: 0.7,
            max_tokens: 4000,
        }
    }
}

impl ChatConfig {
    pub fn base_url(&self) -> String {
        self.api_base
            .clone()
            .unwrap_or_else(|| self.provider.default_base_url().to_string())
    }

    pub fn has_credential(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Provider {
    DeepSeek,
    OpenAI,
    Custom,
}

impl Provider {
    pub fn default_base_url(&self) -> &str {
        match self {
            Provider::DeepSeek => "https://api.deepseek.com",
            Provider::OpenAI => "https://api.openai.com",
            Provider::Custom => "",
        }
    }

    pub fn all() -> &'static [Provider] {
        &[Provider::DeepSeek, Provider::OpenAI, Provider::Custom]
    }

    pub fn label(&self) -> &str {
        match self {
            Provider::DeepSeek => "DeepSeek",
            Provider::OpenAI => "OpenAI",
            Provider::Custom => "Custom",
        }
    }
}

/// Instruction used for the leading system message when the user has not
/// set their own.
pub const DEFAULT_SYSTEM_INSTRUCTION: &str =
    "You are a helpful AI assistant. Answer the user's questions as \
     concisely and accurately as possible.";
