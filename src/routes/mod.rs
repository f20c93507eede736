//! HTTP surface — Pub/Sub push endpoint and health probe.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::config::BadgeConfig;
use crate::models::event::{BuildEvent, PushEnvelope};
use crate::services::badge_service::{self, BadgeOutcome};
use crate::services::storage_service::StorageClient;

/// Shared state for route handlers.
#[derive(Clone)]
pub struct BadgeRouterState {
    pub config: BadgeConfig,
    pub storage: Arc<StorageClient>,
}

/// Build the badge updater's Axum router.
pub fn badge_router(state: BadgeRouterState) -> Router {
    Router::new()
        .route("/pubsub/push", post(push_handler))
        .route("/healthz", get(healthz))
        .with_state(state)
}

async fn healthz() -> &'static str {
    "ok"
}

type HmacSha256 = Hmac<Sha256>;

/// Verify the shared push token in constant time. Both sides are mapped
/// through an HMAC tag so the comparison never short-circuits on the first
/// differing byte.
fn verify_push_token(expected: &str, presented: &str) -> bool {
    if expected.is_empty() {
        tracing::warn!("Push token not configured, skipping validation");
        return true;
    }

    let tag = match HmacSha256::new_from_slice(expected.as_bytes()) {
        Ok(mut mac) => {
            mac.update(presented.as_bytes());
            mac.finalize().into_bytes()
        }
        Err(_) => return false,
    };

    let mut mac = match HmacSha256::new_from_slice(expected.as_bytes()) {
        Ok(m) => m,
        Err(_) => return false,
    };
    mac.update(expected.as_bytes());

    mac.verify_slice(&tag).is_ok()
}

/// Handle one Pub/Sub push delivery.
///
/// Response contract: 2xx acks the message; any other status makes the
/// delivery framework apply its own retry policy. A gate miss is a deliberate
/// no-op and acks.
async fn push_handler(
    State(state): State<BadgeRouterState>,
    Query(params): Query<HashMap<String, String>>,
    Json(envelope): Json<PushEnvelope>,
) -> Result<StatusCode, StatusCode> {
    // Shared-token endpoint protection, when configured.
    let token = params.get("token").map(String::as_str).unwrap_or("");
    if !verify_push_token(&state.config.push_token, token) {
        tracing::warn!("Push token mismatch");
        return Err(StatusCode::UNAUTHORIZED);
    }

    crate::metrics::push_received();

    let message_id = envelope.message.message_id.as_deref().unwrap_or("unknown");
    let data = envelope.message.data.as_deref().unwrap_or("");

    let event = match BuildEvent::from_push_data(data) {
        Ok(ev) => ev,
        Err(e) => {
            tracing::warn!(message_id, "Rejecting malformed build event: {e}");
            crate::metrics::event_malformed();
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    crate::metrics::event_received(event.status.as_str());

    match badge_service::handle_event(&state.config, &state.storage, &event).await {
        Ok(BadgeOutcome::Copied { .. }) => {
            crate::metrics::badge_copied(event.status.as_str());
            Ok(StatusCode::OK)
        }
        Ok(BadgeOutcome::Skipped { reason }) => {
            crate::metrics::event_skipped(reason);
            Ok(StatusCode::OK)
        }
        Err(e) => {
            tracing::error!(message_id, "Badge update failed: {e}");
            crate::metrics::copy_failed();
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
