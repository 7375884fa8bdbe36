//! Port traits: the hexagonal architecture boundary.
//!
//! These traits are defined here in `lanshan-core` (pure Rust).
//! Implementations live in `lanshan-platform` (browser adapters).
//! The pipeline never imports platform code; it only depends on these traits.

use std::pin::Pin;
use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;
use lanshan_types::{
    Result,
    config::ChatSettings,
    session::PersistedState,
};

// ─── HTTP Port ───────────────────────────────────────────────

/// A JSON POST request
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Value,
}

impl HttpRequest {
    pub fn post(url: impl Into<String>, body: Value) -> Self {
        Self {
            url: url.into(),
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body,
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// A fully buffered response
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub status_text: String,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Raw body chunks in the order they arrived on the wire
pub type ByteStream = Pin<Box<dyn Stream<Item = Result<Vec<u8>>>>>;

/// A response whose body is read incrementally
pub struct StreamingResponse {
    pub status: u16,
    pub status_text: String,
    pub body: ByteStream,
}

impl StreamingResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[async_trait(?Send)]
pub trait HttpPort {
    /// POST and buffer the whole response body
    async fn post(&self, req: HttpRequest) -> Result<HttpResponse>;

    /// POST and hand back the body as a chunk stream
    async fn post_streaming(&self, req: HttpRequest) -> Result<StreamingResponse>;

    /// GET and buffer the whole response body
    async fn get(&self, url: &str) -> Result<HttpResponse>;
}

// ─── Timer Port ──────────────────────────────────────────────

#[async_trait(?Send)]
pub trait TimerPort {
    /// Suspend the current task for `ms` milliseconds
    async fn sleep(&self, ms: u32);
}

// ─── Storage Port ────────────────────────────────────────────

#[async_trait(?Send)]
pub trait StoragePort {
    /// Get a value by key
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Set a value
    async fn set(&self, key: &str, value: &[u8]) -> Result<()>;

    /// Name of this backend (for logging/debug)
    fn backend_name(&self) -> &str;
}

// ─── Repository Port ─────────────────────────────────────────

/// Best-effort persistence of sessions and settings.
///
/// Loads happen once at startup. Saves are snapshots taken after a mutation;
/// an implementation may complete the write in the background.
#[async_trait(?Send)]
pub trait SessionRepository {
    async fn load_sessions(&self) -> Result<Option<PersistedState>>;

    async fn load_settings(&self) -> Result<Option<ChatSettings>>;

    fn save_sessions(&self, state: &PersistedState) -> Result<()>;

    fn save_settings(&self, settings: &ChatSettings) -> Result<()>;
}
