use serde::{Deserialize, Serialize};
use crate::{ChatError, Result};

/// User-tunable settings for the answer pipeline.
///
/// Every field falls back to its default on load, so a record saved by an
/// older build (or edited by hand) still deserializes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatSettings {
    /// Use the local inference server instead of the hosted API
    pub use_local_model: bool,
    pub local_model: String,
    pub local_base_url: String,

    pub remote_model: String,
    pub remote_base_url: String,
    pub api_key: String,

    pub temperature: f32,
    pub max_tokens: u32,

    /// Query the knowledge base before any model
    pub use_knowledge_base: bool,
    pub knowledge_base_url: String,
    pub knowledge_collection: String,
    pub search_top_k: u32,

    pub system_prompt: String,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            use_local_model: true,
            local_model: "deepseek-r1:1.5b".to_string(),
            local_base_url: "/api/ollama".to_string(),
            remote_model: "deepseek-ai/DeepSeek-R1-0528-Qwen3-8B".to_string(),
            remote_base_url: "https://api.siliconflow.cn".to_string(),
            api_key: String::new(),
            temperature: 0.7,
            max_tokens: 2000,
            use_knowledge_base: true,
            knowledge_base_url: "/api/knowledge".to_string(),
            knowledge_collection: "default".to_string(),
            search_top_k: 5,
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
        }
    }
}

impl ChatSettings {
    /// Reject values no endpoint would accept.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ChatError::Config(format!(
                "temperature must be within 0.0..=2.0, got {}",
                self.temperature
            )));
        }
        if self.max_tokens == 0 {
            return Err(ChatError::Config("max_tokens must be positive".to_string()));
        }
        if self.use_knowledge_base && self.search_top_k == 0 {
            return Err(ChatError::Config("search_top_k must be positive".to_string()));
        }
        let model = if self.use_local_model { &self.local_model } else { &self.remote_model };
        if model.trim().is_empty() {
            return Err(ChatError::Config("no model selected".to_string()));
        }
        Ok(())
    }

    /// Model id used for the active backend
    pub fn active_model(&self) -> &str {
        if self.use_local_model {
            &self.local_model
        } else {
            &self.remote_model
        }
    }
}

pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a professional AI assistant. Answer the user's question based on the information provided.";
