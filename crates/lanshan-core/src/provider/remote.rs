//! Hosted OpenAI-compatible chat completions adapter.
//!
//! Works with SiliconFlow, DeepSeek, OpenAI and any provider streaming the
//! chat completions protocol as `text/event-stream`. Reasoning and answer
//! arrive pre-split per delta, so answer fragments are appended directly.

use std::rc::Rc;
use async_trait::async_trait;
use futures::StreamExt;
use serde::Deserialize;
use serde_json::{json, Value};

use lanshan_types::{
    ChatError, Result,
    config::ChatSettings,
    event::UpdateEvent,
    message::ChatMessage,
};
use crate::codec::SseDecoder;
use crate::ports::{HttpPort, HttpRequest};
use crate::provider::{GenerationParams, ProviderAdapter};
use crate::sink::UpdateSink;

pub const DONE_SENTINEL: &str = "[DONE]";

pub const MISSING_KEY_MESSAGE: &str =
    "API key for the remote model is not set. Please fill it in the settings.";
pub const INVALID_KEY_MESSAGE: &str =
    "HTTP 401 Unauthorized: API key is invalid or expired. Please check your settings.";

pub struct RemoteAdapter {
    http: Rc<dyn HttpPort>,
    base_url: String,
    api_key: String,
    params: GenerationParams,
}

impl RemoteAdapter {
    pub fn new(http: Rc<dyn HttpPort>, settings: &ChatSettings) -> Self {
        Self {
            http,
            base_url: settings.remote_base_url.trim_end_matches('/').to_string(),
            api_key: settings.api_key.trim().to_string(),
            params: GenerationParams {
                model: settings.remote_model.clone(),
                temperature: settings.temperature,
                max_tokens: settings.max_tokens,
            },
        }
    }

    fn build_request_body(&self, context: &[ChatMessage]) -> Value {
        json!({
            "model": self.params.model,
            "messages": context,
            "stream": true,
            "max_tokens": self.params.max_tokens,
            "temperature": self.params.temperature,
        })
    }
}

#[async_trait(?Send)]
impl ProviderAdapter for RemoteAdapter {
    fn method(&self) -> String {
        format!("remote:{}", self.params.model)
    }

    async fn stream_answer(&self, context: Vec<ChatMessage>, sink: &mut UpdateSink) -> Result<()> {
        if self.api_key.is_empty() {
            return Err(ChatError::Auth(MISSING_KEY_MESSAGE.to_string()));
        }

        let url = format!("{}/v1/chat/completions", self.base_url);
        let req = HttpRequest::post(url, self.build_request_body(&context))
            .header("Accept", "text/event-stream")
            .header("Authorization", format!("Bearer {}", self.api_key));

        let response = self.http.post_streaming(req).await?;
        if response.status == 401 {
            return Err(ChatError::Auth(INVALID_KEY_MESSAGE.to_string()));
        }
        if !response.ok() {
            return Err(ChatError::http(response.status, &response.status_text));
        }

        let mut body = response.body;
        let mut decoder = SseDecoder::new();
        let mut parser = RemoteFrameParser::new(self.method());

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            for data in decoder.push(&chunk) {
                if parser.handle_data(&data, sink) {
                    return Ok(());
                }
            }
        }
        if let Some(data) = decoder.finish() {
            if parser.handle_data(&data, sink) {
                return Ok(());
            }
        }

        log::debug!("remote stream closed without [DONE]");
        sink.start(&parser.method);
        sink.emit(UpdateEvent::Done);
        Ok(())
    }
}

pub struct RemoteFrameParser {
    method: String,
}

impl RemoteFrameParser {
    pub fn new(method: String) -> Self {
        Self { method }
    }

    /// Handle one `data:` payload. Returns true once the stream is complete.
    pub fn handle_data(&mut self, data: &str, sink: &mut UpdateSink) -> bool {
        if data.trim() == DONE_SENTINEL {
            sink.start(&self.method);
            sink.emit(UpdateEvent::Done);
            return true;
        }

        let frame: CompletionChunk = match serde_json::from_str(data) {
            Ok(f) => f,
            Err(e) => {
                log::warn!("skipping malformed remote frame ({}): {}", e, data);
                return false;
            }
        };
        let Some(delta) = frame.choices.into_iter().next().map(|c| c.delta) else {
            return false;
        };

        sink.start(&self.method);
        if let Some(reasoning) = delta.reasoning_content.filter(|r| !r.is_empty()) {
            sink.emit(UpdateEvent::Thinking(reasoning));
        }
        if let Some(content) = delta.content.filter(|c| !c.is_empty()) {
            sink.emit(UpdateEvent::Answer(content));
        }
        false
    }
}

// ─── Wire types ──────────────────────────────────────────────

#[derive(Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<ChunkChoice>,
}

#[derive(Deserialize)]
struct ChunkChoice {
    #[serde(default)]
    delta: ChunkDelta,
}

#[derive(Deserialize, Default)]
struct ChunkDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    reasoning_content: Option<String>,
}
