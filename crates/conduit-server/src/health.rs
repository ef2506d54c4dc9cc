use axum::response::IntoResponse;
use http::StatusCode;

/// Liveness text returned by the health route
pub const LIVENESS_TEXT: &str = "Conduit gateway is running";

/// Liveness handler
pub async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, LIVENESS_TEXT)
}
