//! Knowledge-base retrieval and the synthetic streamed answer built from it.

use std::fmt::Write as _;
use std::rc::Rc;
use serde::Deserialize;
use serde_json::json;

use lanshan_types::{
    config::ChatSettings,
    document::RetrievedDocument,
    event::UpdateEvent,
};
use crate::ports::{HttpPort, HttpRequest, TimerPort};
use crate::sink::UpdateSink;

pub const SIMILARITY_THRESHOLD: f64 = 0.65;
/// Characters per streamed chunk
pub const CHUNK_CHARS: usize = 15;
/// Pause after each streamed chunk
pub const CHUNK_INTERVAL_MS: u32 = 30;
pub const KNOWLEDGE_METHOD: &str = "knowledge_base";

/// Outcome of a retrieval. A failed request is a miss, not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum Retrieval {
    Found(Vec<RetrievedDocument>),
    Miss,
}

pub struct KnowledgeRetriever {
    http: Rc<dyn HttpPort>,
    timer: Rc<dyn TimerPort>,
    base_url: String,
    collection: String,
    top_k: u32,
}

impl KnowledgeRetriever {
    pub fn new(http: Rc<dyn HttpPort>, timer: Rc<dyn TimerPort>, settings: &ChatSettings) -> Self {
        Self {
            http,
            timer,
            base_url: settings.knowledge_base_url.trim_end_matches('/').to_string(),
            collection: settings.knowledge_collection.clone(),
            top_k: settings.search_top_k,
        }
    }

    pub async fn retrieve(&self, question: &str) -> Retrieval {
        let url = format!("{}/retrieve", self.base_url);
        let req = HttpRequest::post(
            url,
            json!({
                "query": question,
                "collection_name": self.collection,
                "top_k": self.top_k,
                "similarity_threshold": SIMILARITY_THRESHOLD,
            }),
        );

        let response = match self.http.post(req).await {
            Ok(r) => r,
            Err(e) => {
                log::warn!("knowledge retrieval failed: {}", e);
                return Retrieval::Miss;
            }
        };
        if !response.ok() {
            log::warn!("knowledge retrieval returned HTTP {}", response.status);
            return Retrieval::Miss;
        }
        let parsed: RetrieveResponse = match serde_json::from_str(&response.body) {
            Ok(p) => p,
            Err(e) => {
                log::warn!("knowledge retrieval body undecodable: {}", e);
                return Retrieval::Miss;
            }
        };

        let documents: Vec<RetrievedDocument> = parsed
            .documents
            .unwrap_or_default()
            .into_iter()
            .filter(|d| d.score.map_or(true, |s| s >= SIMILARITY_THRESHOLD))
            .collect();
        log::info!("knowledge base returned {} document(s)", documents.len());
        if documents.is_empty() {
            Retrieval::Miss
        } else {
            Retrieval::Found(documents)
        }
    }

    /// Stream a formatted answer for `documents` into `sink`, ending in `Done`.
    pub async fn stream_answer(
        &self,
        question: &str,
        documents: &[RetrievedDocument],
        sink: &mut UpdateSink,
    ) {
        sink.start(KNOWLEDGE_METHOD);
        sink.emit(UpdateEvent::Sources(
            documents.iter().map(|d| d.title.clone()).collect(),
        ));

        let answer = format_answer(question, documents);
        for chunk in chunk_text(&answer, CHUNK_CHARS) {
            if !sink.emit(UpdateEvent::Answer(chunk)) {
                return;
            }
            self.timer.sleep(CHUNK_INTERVAL_MS).await;
        }
        sink.emit(UpdateEvent::Done);
    }
}

/// Render retrieved documents as the knowledge-base answer text.
pub fn format_answer(question: &str, documents: &[RetrievedDocument]) -> String {
    let mut answer = format!(
        "【Knowledge Base】Based on your question「{}」, found the following:\n\n",
        question
    );
    for (i, doc) in documents.iter().enumerate() {
        let _ = writeln!(answer, "**{}. {}**", i + 1, doc.title);
        let _ = write!(answer, "> {}\n\n", doc.content.replace('\n', "\n> "));
        if let Some(score) = doc.score {
            let _ = write!(answer, "*(similarity: {:.4})*\n\n", score);
        }
    }
    answer
}

/// Split into pieces of at most `size` characters, never inside a character.
pub fn chunk_text(text: &str, size: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(size.max(1))
        .map(|c| c.iter().collect())
        .collect()
}

#[derive(Deserialize)]
struct RetrieveResponse {
    #[serde(default)]
    documents: Option<Vec<RetrievedDocument>>,
}
