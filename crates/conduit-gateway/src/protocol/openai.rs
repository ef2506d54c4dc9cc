//! OpenAI-compatible wire format types

use serde::{Deserialize, Serialize};

/// `GET /v1/models` response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelList {
    /// Always "list"
    pub object: String,
    pub data: Vec<ModelObject>,
}

/// One entry of the model list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelObject {
    /// Client-facing model key
    pub id: String,
    /// Always "model"
    pub object: String,
    /// Unix timestamp (seconds) at listing time
    pub created: u64,
    pub owned_by: String,
}
