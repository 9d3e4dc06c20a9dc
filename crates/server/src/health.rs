use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use betty_core::classify::Classify;
use chrono::Utc;
use serde::Serialize;

#[derive(Clone)]
pub struct HealthState {
    classifier: Arc<dyn Classify>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub classifier: HealthCheck,
    pub checked_at: String,
}

pub fn router(classifier: Arc<dyn Classify>) -> Router {
    Router::new().route("/health", get(health)).with_state(HealthState { classifier })
}

pub async fn health(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let classifier = classifier_check(state.classifier.as_ref()).await;
    let ready = classifier.status == "ready";

    let payload = HealthResponse {
        status: if ready { "ready" } else { "degraded" },
        service: HealthCheck {
            status: "ready",
            detail: "betty-server runtime initialized".to_string(),
        },
        classifier,
        checked_at: Utc::now().to_rfc3339(),
    };

    let status_code = if ready { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (status_code, Json(payload))
}

/// Probes the sentiment judgment so the check exercises the real inference
/// path rather than a literal shortcut.
async fn classifier_check(classifier: &dyn Classify) -> HealthCheck {
    match classifier.sentiment("health probe").await {
        Ok(_) => HealthCheck {
            status: "ready",
            detail: "classification probe succeeded".to_string(),
        },
        Err(error) => HealthCheck {
            status: "degraded",
            detail: format!("classification probe failed: {error}"),
        },
    }
}
