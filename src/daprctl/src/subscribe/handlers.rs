use crate::subscribe::state::EndpointState;
use axum::body::Bytes;
use axum::extract::{MatchedPath, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::Value;
use tracing::{debug, warn};

pub(super) async fn subscribe(State(state): State<EndpointState>) -> impl IntoResponse {
    debug!("subscription probe");
    Json([state.descriptor().clone()])
}

/// Accepts anything. Bodies that are not JSON are logged and dropped.
pub(super) async fn events(
    State(state): State<EndpointState>,
    path: MatchedPath,
    body: Bytes,
) -> StatusCode {
    match serde_json::from_slice::<Value>(&body) {
        Ok(event) => state.sink().deliver(path.as_str(), event),
        Err(e) => warn!(route = path.as_str(), "dropping undecodable event: {}", e),
    }

    StatusCode::OK
}
