//! OpenAI-compatible chat completion client.
//!
//! Works with DeepSeek, OpenAI, and any provider using the OpenAI chat
//! completions API format. Uses browser `fetch()` via gloo-net; the
//! streamed response body is consumed through its `ReadableStream`
//! reader one chunk at a time.

use std::collections::VecDeque;

use async_trait::async_trait;
use futures::stream;
use gloo_net::http::Request;
use js_sys::Uint8Array;
use serde::Deserialize;
use serde_json::{json, Value};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::ReadableStreamDefaultReader;

use chat_core::ports::{ChatRequest, ChatResponse, CompletionPort, ReplyStream, StreamEvent, TokenUsage};
use chat_types::config::ChatConfig;
use chat_types::message::{Message, Role};
use chat_types::{ChatError, Result};

use super::sse::{self, LineBuffer, SsePayload};

/// Client speaking the OpenAI chat completions protocol.
pub struct OpenAiCompatClient {
    config: ChatConfig,
    base_url: String,
}

impl OpenAiCompatClient {
    pub fn new(config: ChatConfig) -> Self {
        let base_url = config.base_url();
        Self { config, base_url }
    }

    fn build_request_body(&self, req: &ChatRequest, streaming: bool) -> Value {
        let mut body = json!({
            "model": req.model,
            "messages": req.messages,
            "temperature": req.temperature,
            "max_tokens": req.max_tokens,
        });
        if streaming {
            body["stream"] = json!(true);
        }
        body
    }

    async fn post(&self, body: &Value) -> Result<gloo_net::http::Response> {
        let url = format!("{}/v1/chat/completions", self.base_url);
        let response = Request::post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", &format!("Bearer {}", self.config.api_key))
            .json(body)
            .map_err(|e| ChatError::Transport(e.to_string()))?
            .send()
            .await
            .map_err(|e| ChatError::Transport(e.to_string()))?;

        if !response.ok() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ChatError::Transport(server_error_message(status, &text)));
        }
        Ok(response)
    }
}

#[async_trait(?Send)]
impl CompletionPort for OpenAiCompatClient {
    async fn stream_chat(&self, req: ChatRequest) -> Result<ReplyStream> {
        let body = self.build_request_body(&req, true);
        let response = self.post(&body).await?;

        let stream = response
            .body()
            .ok_or_else(|| ChatError::Transport("response has no body".to_string()))?;
        let reader: ReadableStreamDefaultReader = stream
            .get_reader()
            .dyn_into()
            .map_err(|_| ChatError::Transport("response body is not readable".to_string()))?;

        Ok(Box::pin(reply_stream(reader)))
    }

    async fn chat_completion(&self, req: ChatRequest) -> Result<ChatResponse> {
        let body = self.build_request_body(&req, false);
        let response = self.post(&body).await?;

        let data: ApiResponse = response
            .json()
            .await
            .map_err(|e| ChatError::Decode(e.to_string()))?;

        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChatError::Decode("no choices in response".to_string()))?;

        let usage = data.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(ChatResponse {
            message: parse_api_message(choice.message),
            usage,
        })
    }
}

struct ReaderState {
    reader: ReadableStreamDefaultReader,
    lines: LineBuffer,
    ready: VecDeque<StreamEvent>,
    finished: bool,
}

/// Turn the byte reader into an ordered event stream. All lines decoded
/// from one network chunk are queued in the order received; a malformed
/// event payload is logged and skipped without ending the stream.
fn reply_stream(reader: ReadableStreamDefaultReader) -> impl futures::Stream<Item = StreamEvent> {
    let state = ReaderState {
        reader,
        lines: LineBuffer::new(),
        ready: VecDeque::new(),
        finished: false,
    };

    stream::unfold(state, |mut st| async move {
        loop {
            if let Some(event) = st.ready.pop_front() {
                if matches!(event, StreamEvent::Done | StreamEvent::Error(_)) {
                    st.finished = true;
                    st.ready.clear();
                }
                return Some((event, st));
            }
            if st.finished {
                return None;
            }

            match JsFuture::from(st.reader.read()).await {
                Ok(result) => {
                    let done = js_sys::Reflect::get(&result, &JsValue::from_str("done"))
                        .ok()
                        .and_then(|v| v.as_bool())
                        .unwrap_or(true);
                    if done {
                        // connection closed cleanly without a sentinel
                        st.ready.push_back(StreamEvent::Done);
                        continue;
                    }
                    let value = js_sys::Reflect::get(&result, &JsValue::from_str("value"))
                        .unwrap_or(JsValue::UNDEFINED);
                    let bytes = Uint8Array::new(&value).to_vec();
                    for line in st.lines.push(&bytes) {
                        match sse::parse_line(&line) {
                            Ok(SsePayload::Delta(text)) => {
                                st.ready.push_back(StreamEvent::Delta(text));
                            }
                            Ok(SsePayload::Done) => {
                                st.ready.push_back(StreamEvent::Done);
                                break;
                            }
                            Ok(SsePayload::Ignored) => {}
                            Err(e) => {
                                log::warn!("skipping malformed stream event: {}", e);
                            }
                        }
                    }
                }
                Err(e) => {
                    st.ready.push_back(StreamEvent::Error(format!(
                        "stream read failed: {:?}",
                        e
                    )));
                }
            }
        }
    })
}

/// Derive a user-facing message from an error response: the server's
/// `error.message` payload when present, else the status line.
fn server_error_message(status: u16, body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<Value>(body) {
        if let Some(message) = value["error"]["message"].as_str() {
            return message.to_string();
        }
    }
    if body.trim().is_empty() {
        format!("HTTP {}: check your API key and network connection", status)
    } else {
        format!("HTTP {}: {}", status, body)
    }
}

// ─── API response types ──────────────────────────────────────

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<ApiChoice>,
    usage: Option<ApiUsage>,
}

#[derive(Deserialize)]
struct ApiChoice {
    message: ApiMessage,
}

#[derive(Deserialize)]
struct ApiMessage {
    role: String,
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct ApiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

fn parse_api_message(api: ApiMessage) -> Message {
    let role = match api.role.as_str() {
        "system" => Role::System,
        "user" => Role::User,
        _ => Role::Assistant,
    };
    Message {
        role,
        content: api.content.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_message_prefers_server_payload() {
        let body = r#"{"error":{"message":"Invalid API key"}}"#;
        assert_eq!(server_error_message(401, body), "Invalid API key");
    }

    #[test]
    fn error_message_falls_back_to_status() {
        let msg = server_error_message(502, "");
        assert!(msg.contains("502"));
    }

    #[test]
    fn error_message_includes_opaque_body() {
        let msg = server_error_message(500, "upstream exploded");
        assert!(msg.contains("upstream exploded"));
    }

    #[test]
    fn api_message_decodes_null_content() {
        let api: ApiMessage =
            serde_json::from_str(r#"{"role":"assistant","content":null}"#).unwrap();
        let msg = parse_api_message(api);
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.content.is_empty());
    }
}
