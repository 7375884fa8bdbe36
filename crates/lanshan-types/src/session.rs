use serde::{Deserialize, Serialize};
use crate::message::Message;

/// Maximum title length in characters before truncation
pub const TITLE_MAX_CHARS: usize = 20;

/// A persisted conversation session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    /// Derived from the first question; empty until then
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub created_at: String,
    pub updated_at: String,
    /// Generation in flight. Never persisted: a reload always starts idle.
    #[serde(skip)]
    pub generating: bool,
}

impl Session {
    pub fn new() -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: String::new(),
            messages: Vec::new(),
            created_at: now.clone(),
            updated_at: now,
            generating: false,
        }
    }

    pub fn touch(&mut self) {
        self.updated_at = chrono::Utc::now().to_rfc3339();
    }

    /// Set the title from the first question if none was derived yet.
    pub fn derive_title(&mut self, question: &str) {
        if self.title.is_empty() {
            self.title = title_from(question);
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// First 20 characters of the question, with "..." when it was longer.
pub fn title_from(question: &str) -> String {
    if question.chars().count() > TITLE_MAX_CHARS {
        let head: String = question.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        question.to_string()
    }
}

/// Summary of a session for listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: String,
    pub title: String,
    pub updated_at: String,
    pub message_count: usize,
    pub generating: bool,
}

impl From<&Session> for SessionSummary {
    fn from(s: &Session) -> Self {
        Self {
            id: s.id.clone(),
            title: s.title.clone(),
            updated_at: s.updated_at.clone(),
            message_count: s.messages.len(),
            generating: s.generating,
        }
    }
}

/// Snapshot written by the persistence repository
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersistedState {
    #[serde(default)]
    pub sessions: Vec<Session>,
    #[serde(default)]
    pub current_index: usize,
}
