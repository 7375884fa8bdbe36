//! Local inference server adapter (Ollama-style `/api/chat`).
//!
//! The body is newline-delimited JSON. The model interleaves reasoning and
//! answer in one text stream, so the whole accumulated text is re-split on
//! every frame and the message is updated to match the new split.

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
use crate::codec::NdjsonDecoder;
use crate::ports::{HttpPort, HttpRequest};
use crate::provider::{GenerationParams, ProviderAdapter};
use crate::sink::UpdateSink;
use crate::splitter::split_content;

pub struct LocalAdapter {
    http: Rc<dyn HttpPort>,
    base_url: String,
    params: GenerationParams,
}

impl LocalAdapter {
    pub fn new(http: Rc<dyn HttpPort>, settings: &ChatSettings) -> Self {
        Self {
            http,
            base_url: settings.local_base_url.trim_end_matches('/').to_string(),
            params: GenerationParams {
                model: settings.local_model.clone(),
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
            "options": {
                "temperature": self.params.temperature,
                "num_predict": self.params.max_tokens,
            },
        })
    }

    /// Names of the models installed on the local server.
    pub async fn list_models(&self) -> Result<Vec<String>> {
        let url = format!("{}/api/tags", self.base_url);
        let response = self.http.get(&url).await?;
        if !response.ok() {
            return Err(ChatError::http(response.status, &response.status_text));
        }
        let tags: TagsResponse = serde_json::from_str(&response.body)?;
        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }
}

#[async_trait(?Send)]
impl ProviderAdapter for LocalAdapter {
    fn method(&self) -> String {
        format!("local:{}", self.params.model)
    }

    async fn stream_answer(&self, context: Vec<ChatMessage>, sink: &mut UpdateSink) -> Result<()> {
        let url = format!("{}/api/chat", self.base_url);
        let req = HttpRequest::post(url, self.build_request_body(&context));
        let response = self.http.post_streaming(req).await?;
        if !response.ok() {
            return Err(ChatError::http(response.status, &response.status_text));
        }

        let mut body = response.body;
        let mut decoder = NdjsonDecoder::new();
        let mut parser = LocalFrameParser::new(self.method());

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            for line in decoder.push(&chunk) {
                if parser.handle_line(&line, sink) {
                    return Ok(());
                }
            }
        }
        if let Some(line) = decoder.finish() {
            if parser.handle_line(&line, sink) {
                return Ok(());
            }
        }

        log::debug!("local stream closed without a done frame");
        sink.start(&parser.method);
        sink.emit(UpdateEvent::Done);
        Ok(())
    }
}

/// Per-stream state: the raw accumulator and what was last emitted.
pub struct LocalFrameParser {
    method: String,
    raw: String,
    thinking: String,
    answer: String,
}

impl LocalFrameParser {
    pub fn new(method: String) -> Self {
        Self {
            method,
            raw: String::new(),
            thinking: String::new(),
            answer: String::new(),
        }
    }

    /// Handle one NDJSON line. Returns true once the stream is complete.
    pub fn handle_line(&mut self, line: &str, sink: &mut UpdateSink) -> bool {
        let frame: ChatFrame = match serde_json::from_str(line) {
            Ok(f) => f,
            Err(e) => {
                log::warn!("skipping malformed local frame ({}): {}", e, line);
                return false;
            }
        };

        if let Some(text) = frame.message.map(|m| m.content).filter(|c| !c.is_empty()) {
            self.raw.push_str(&text);
            sink.start(&self.method);
            self.emit_split(sink);
        }

        if frame.done {
            sink.start(&self.method);
            sink.emit(UpdateEvent::Done);
            return true;
        }
        false
    }

    fn emit_split(&mut self, sink: &mut UpdateSink) {
        let split = split_content(&self.raw);

        // Starts empty, so the AnswerStart status line survives until real
        // reasoning shows up; after that an emptied split clears it.
        if split.thinking != self.thinking {
            sink.emit(UpdateEvent::Thinking(split.thinking.clone()));
        }
        self.thinking = split.thinking;

        if split.answer != self.answer {
            match split.answer.strip_prefix(self.answer.as_str()) {
                Some(delta) => sink.emit(UpdateEvent::Answer(delta.to_string())),
                None => sink.emit(UpdateEvent::ReplaceAnswer(split.answer.clone())),
            };
            self.answer = split.answer;
        }
    }

    /// Accumulated raw model output so far
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

// ─── Wire types ──────────────────────────────────────────────

#[derive(Deserialize)]
struct ChatFrame {
    #[serde(default)]
    message: Option<FrameMessage>,
    #[serde(default)]
    done: bool,
}

#[derive(Deserialize)]
struct FrameMessage {
    #[serde(default)]
    content: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<TagModel>,
}

#[derive(Deserialize)]
struct TagModel {
    name: String,
}
