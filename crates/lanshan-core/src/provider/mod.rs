//! Model backends. Each adapter turns one provider's streaming transport
//! into the uniform update protocol.

pub mod local;
pub mod remote;

use async_trait::async_trait;
use lanshan_types::{Result, message::ChatMessage};
use crate::sink::UpdateSink;

pub use local::LocalAdapter;
pub use remote::RemoteAdapter;

/// Model and sampling parameters for one call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationParams {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait(?Send)]
pub trait ProviderAdapter {
    /// Identifier recorded on the answer, e.g. `local:deepseek-r1:1.5b`
    fn method(&self) -> String;

    /// Stream one answer into `sink`.
    ///
    /// On `Ok` the adapter has emitted `Done`. On `Err` nothing terminal was
    /// emitted and the caller reports the failure.
    async fn stream_answer(&self, context: Vec<ChatMessage>, sink: &mut UpdateSink) -> Result<()>;
}
