//! Axum route handlers for the OpenAI-compatible endpoints

use std::time::{SystemTime, UNIX_EPOCH};

use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, routing};
use http::HeaderMap;

use crate::protocol::openai::{ModelList, ModelObject};
use crate::registry::ProviderRegistry;
use crate::state::GatewayState;

/// Build the gateway router with all endpoints
pub fn gateway_router(state: GatewayState) -> Router {
    Router::new()
        .route("/v1/chat/completions", routing::post(chat_completions))
        .route("/v1/models", routing::get(list_models))
        .with_state(state)
}

/// Handle `POST /v1/chat/completions`
///
/// The body is taken raw so malformed JSON is reported in the gateway's
/// own error shape.
async fn chat_completions(State(state): State<GatewayState>, headers: HeaderMap, body: Bytes) -> Response {
    state.handle(&headers, &body).await
}

/// Handle `GET /v1/models`
async fn list_models(State(state): State<GatewayState>) -> Response {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    Json(model_list(state.registry(), now)).into_response()
}

/// One entry per registered key, in configuration order
pub fn model_list(registry: &ProviderRegistry, created: u64) -> ModelList {
    let data = registry
        .keys()
        .map(|key| ModelObject {
            id: key.to_owned(),
            object: "model".to_owned(),
            created,
            owned_by: "proxy".to_owned(),
        })
        .collect();

    ModelList {
        object: "list".to_owned(),
        data,
    }
}
