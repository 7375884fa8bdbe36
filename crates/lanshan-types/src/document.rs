use serde::{Deserialize, Serialize};

/// A knowledge-base hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedDocument {
    pub title: String,
    #[serde(default)]
    pub content: String,
    /// Similarity in 0..1, when the endpoint reports one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}
