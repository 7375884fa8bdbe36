use serde::{Deserialize, Serialize};

/// Status shown while an answer streams in.
pub const STATUS_GENERATING: &str = "Generating answer...";
/// Status written when a generation fails.
pub const STATUS_FAILED: &str = "failed";
/// Method recorded when a generation finished without announcing one.
pub const UNKNOWN_METHOD: &str = "unknown";

/// Incremental update to the assistant message being generated.
///
/// Produced by the answer pipeline, applied in order by the session store.
/// `AnswerStart` comes at most once and before any answer/terminal event;
/// nothing is applied after `Done` or `Error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "snake_case")]
pub enum UpdateEvent {
    /// Replace the reasoning trace
    Thinking(String),
    /// Backend/model about to stream
    AnswerStart(String),
    /// Append to the answer
    Answer(String),
    /// Replace the whole answer (re-split of a reasoning model's output)
    ReplaceAnswer(String),
    /// Replace the sources list
    Sources(Vec<String>),
    /// Generation finished successfully
    Done,
    /// Generation failed; the message becomes the answer text
    Error(String),
}

impl UpdateEvent {
    pub fn is_terminal(&self) -> bool {
        matches!(self, UpdateEvent::Done | UpdateEvent::Error(_))
    }
}

/// Final status line for a completed answer.
pub fn completed_status(method: Option<&str>) -> String {
    format!("completed ({})", method.unwrap_or(UNKNOWN_METHOD))
}

/// Notifications published for the UI layer.
/// The UI drains these on each frame and re-reads the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChatEvent {
    /// A generation opened a placeholder message
    GenerationStarted { session_id: String, message_index: usize },
    /// An update was applied to a message
    Update {
        session_id: String,
        message_index: usize,
        event: UpdateEvent,
    },
    /// The session may accept a new send
    GenerationFinished { session_id: String },
    /// Sessions were created, deleted, switched or cleared
    SessionsChanged,
}
