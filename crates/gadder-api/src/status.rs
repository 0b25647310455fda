use axum::{Json, response::IntoResponse};
use serde_json::json;
use tracing::debug;

pub async fn ping() -> impl IntoResponse {
    debug!("ping");
    Json(json!({
        "pong": "true",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
