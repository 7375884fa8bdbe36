//! Session store: the conversation list and the message state machine.
//!
//! Mutation is synchronous; streaming code borrows the store only for the
//! duration of a single `apply_update`, so the UI can read it in between.
//! A generation addresses its session by id, never by index.

use std::rc::Rc;
use lanshan_types::{
    ChatError, Result,
    event::{completed_status, UpdateEvent, STATUS_FAILED, STATUS_GENERATING},
    message::Message,
    session::{PersistedState, Session, SessionSummary},
};
use crate::ports::SessionRepository;

/// Whether a send appends the question as a new user message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendMode {
    AppendUser,
    /// Regeneration: the question is already the last user message
    NoAppend,
}

/// Handle for one in-flight answer.
#[derive(Debug, Clone)]
pub struct Generation {
    pub session_id: String,
    /// Index of the placeholder within the session
    pub message_index: usize,
    pub question: String,
    pub mode: SendMode,
    /// Session messages at the start, placeholder included
    pub history: Vec<Message>,
    finished: bool,
}

impl Generation {
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

pub struct SessionStore {
    sessions: Vec<Session>,
    current: usize,
    repository: Rc<dyn SessionRepository>,
}

impl SessionStore {
    /// Load persisted sessions; any failure starts from one fresh session.
    pub async fn open(repository: Rc<dyn SessionRepository>) -> Self {
        let state = match repository.load_sessions().await {
            Ok(Some(state)) => state,
            Ok(None) => PersistedState::default(),
            Err(e) => {
                log::warn!("failed to load sessions ({}), starting empty", e);
                PersistedState::default()
            }
        };
        Self::with_state(repository, state)
    }

    pub fn with_state(repository: Rc<dyn SessionRepository>, state: PersistedState) -> Self {
        let mut store = Self {
            sessions: state.sessions,
            current: state.current_index,
            repository,
        };
        if store.sessions.is_empty() {
            store.sessions.push(Session::new());
        }
        if store.current >= store.sessions.len() {
            store.current = 0;
        }
        store
    }

    // ─── Queries ─────────────────────────────────────────────

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn summaries(&self) -> Vec<SessionSummary> {
        self.sessions.iter().map(SessionSummary::from).collect()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current_session(&self) -> &Session {
        &self.sessions[self.current]
    }

    pub fn session(&self, id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    pub fn is_generating(&self) -> bool {
        self.current_session().generating
    }

    pub fn snapshot(&self) -> PersistedState {
        PersistedState {
            sessions: self.sessions.clone(),
            current_index: self.current,
        }
    }

    // ─── Session list ────────────────────────────────────────

    /// Prepend an empty session and make it current. Returns its id.
    pub fn create_session(&mut self) -> String {
        let session = Session::new();
        let id = session.id.clone();
        self.sessions.insert(0, session);
        self.current = 0;
        self.persist();
        id
    }

    pub fn switch_session(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        self.current = index;
        self.persist();
        Ok(())
    }

    pub fn delete_session(&mut self, index: usize) -> Result<()> {
        self.check_index(index)?;
        let removed = self.sessions.remove(index);
        if removed.generating {
            log::warn!("deleted session {} while it was generating", removed.id);
        }

        if self.sessions.is_empty() {
            self.sessions.push(Session::new());
            self.current = 0;
        } else if self.current == index {
            self.current = 0;
        } else if self.current > index {
            self.current -= 1;
        }
        self.persist();
        Ok(())
    }

    pub fn clear_current_messages(&mut self) -> Result<()> {
        let session = &mut self.sessions[self.current];
        if session.generating {
            return Err(ChatError::Busy);
        }
        session.messages.clear();
        session.touch();
        self.persist();
        Ok(())
    }

    // ─── Generation lifecycle ────────────────────────────────

    /// Append the question and an assistant placeholder to the current
    /// session and mark it generating.
    pub fn begin_generation(&mut self, question: &str) -> Result<Generation> {
        if question.trim().is_empty() {
            return Err(ChatError::Validation("Please enter your question".to_string()));
        }
        let session = &mut self.sessions[self.current];
        if session.generating {
            return Err(ChatError::Busy);
        }

        session.messages.push(Message::user(question));
        session.derive_title(question);
        let generation = open_generation(session, question, SendMode::AppendUser);
        self.persist();
        Ok(generation)
    }

    /// Drop the assistant answer at `index` and reopen a generation for the
    /// user message before it. Invalid targets leave the session untouched.
    pub fn begin_regeneration(&mut self, index: usize) -> Result<Generation> {
        let session = &mut self.sessions[self.current];
        if session.generating {
            return Err(ChatError::Busy);
        }
        let question = regeneration_question(&session.messages, index)?;

        session.messages.remove(index);
        let generation = open_generation(session, &question, SendMode::NoAppend);
        self.persist();
        Ok(generation)
    }

    /// Apply one update to the generation's placeholder.
    /// Returns false if nothing was applied.
    pub fn apply_update(&mut self, generation: &mut Generation, event: UpdateEvent) -> bool {
        if generation.finished {
            return false;
        }
        let Some(session) = self.sessions.iter_mut().find(|s| s.id == generation.session_id) else {
            log::debug!("session {} is gone, dropping update", generation.session_id);
            return false;
        };
        let Some(message) = session
            .messages
            .get_mut(generation.message_index)
            .filter(|m| m.is_assistant())
        else {
            log::debug!("placeholder {} is gone, dropping update", generation.message_index);
            return false;
        };

        if event.is_terminal() {
            generation.finished = true;
        }
        apply_event(message, event);
        true
    }

    /// Clear the generating flag and persist the final message.
    pub fn finish_generation(&mut self, generation: &Generation) {
        if let Some(session) = self.sessions.iter_mut().find(|s| s.id == generation.session_id) {
            session.generating = false;
            session.touch();
        }
        self.persist();
    }

    // ─── Internals ───────────────────────────────────────────

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.sessions.len() {
            Ok(())
        } else {
            Err(ChatError::Config(format!(
                "session index {} out of range (have {})",
                index,
                self.sessions.len()
            )))
        }
    }

    fn persist(&self) {
        if let Err(e) = self.repository.save_sessions(&self.snapshot()) {
            log::warn!("failed to save sessions: {}", e);
        }
    }
}

fn open_generation(session: &mut Session, question: &str, mode: SendMode) -> Generation {
    session.messages.push(Message::placeholder());
    session.generating = true;
    session.touch();
    Generation {
        session_id: session.id.clone(),
        message_index: session.messages.len() - 1,
        question: question.to_string(),
        mode,
        history: session.messages.clone(),
        finished: false,
    }
}

fn regeneration_question(messages: &[Message], index: usize) -> Result<String> {
    let target = messages.get(index);
    let previous = index.checked_sub(1).and_then(|i| messages.get(i));
    match (target, previous) {
        (Some(t), Some(p)) if t.is_assistant() && p.is_user() && !p.content.trim().is_empty() => {
            Ok(p.content.clone())
        }
        _ => Err(ChatError::Config(format!(
            "message {} is not an assistant answer to a question",
            index
        ))),
    }
}

/// The message reducer.
pub fn apply_event(message: &mut Message, event: UpdateEvent) {
    match event {
        UpdateEvent::Thinking(text) => message.thinking = text,
        UpdateEvent::AnswerStart(method) => {
            message.method = Some(method);
            message.thinking = STATUS_GENERATING.to_string();
        }
        UpdateEvent::Answer(delta) => message.content.push_str(&delta),
        UpdateEvent::ReplaceAnswer(text) => message.content = text,
        UpdateEvent::Sources(sources) => message.sources = sources,
        UpdateEvent::Done => message.thinking = completed_status(message.method.as_deref()),
        UpdateEvent::Error(text) => {
            message.content = text;
            message.thinking = STATUS_FAILED.to_string();
        }
    }
}
