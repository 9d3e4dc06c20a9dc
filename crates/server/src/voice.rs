//! Conversation routes for the triage dialogue.
//!
//! Endpoints:
//! - `POST /voice/session/`              — open a fresh session at the greeting
//! - `POST /voice/session/{id}/reset`    — put a session back at the greeting
//! - `GET  /voice/{block}/`              — read the current prompt for a block
//! - `POST /voice/{block}/`              — answer the current prompt
//!
//! Conversation endpoints take an optional `?session=<uuid>` parameter; when
//! absent they operate on the implicit session, so a single-caller client
//! never has to manage session ids. A turn must echo the (block, section) it
//! answers; a stale echo is rejected without consuming the turn.

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use betty_core::classify::Classify;
use betty_core::dialogue::engine::{EngineError, TriageEngine};
use betty_core::dialogue::states::{Block, ConversationState, Turn};
use betty_core::session::{SessionHandle, SessionId, SessionStore};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

const REQUIRED_DATA_MISSING: &str = "Required data not present.";

#[derive(Clone)]
pub struct VoiceState {
    store: Arc<SessionStore>,
    classifier: Arc<dyn Classify>,
    engine: TriageEngine,
}

#[derive(Debug, Deserialize, Default)]
pub struct SessionQuery {
    pub session: Option<SessionId>,
}

#[derive(Debug, Serialize)]
pub struct VoiceError {
    pub error: String,
}

#[derive(Debug, Serialize)]
pub struct SessionCreated {
    pub session: SessionId,
    pub state: ConversationState,
}

pub fn router(
    store: Arc<SessionStore>,
    classifier: Arc<dyn Classify>,
    engine: TriageEngine,
) -> Router {
    Router::new()
        .route("/voice/session/", post(create_session))
        .route("/voice/session/{session}/reset", post(reset_session))
        .route("/voice/{block}/", get(current_prompt).post(advance))
        .with_state(VoiceState { store, classifier, engine })
}

// ---------------------------------------------------------------------------
// Session management
// ---------------------------------------------------------------------------

async fn create_session(State(state): State<VoiceState>) -> (StatusCode, Json<SessionCreated>) {
    let correlation_id = new_correlation_id();
    let (session, conversation) = state.store.create().await;

    info!(
        event_name = "voice.session.created",
        correlation_id = %correlation_id,
        session = %session,
        "conversation session opened"
    );

    (StatusCode::CREATED, Json(SessionCreated { session, state: conversation }))
}

async fn reset_session(
    Path(session): Path<SessionId>,
    State(state): State<VoiceState>,
) -> Result<Json<ConversationState>, (StatusCode, Json<VoiceError>)> {
    let correlation_id = new_correlation_id();
    let conversation = state.store.reset(session).await.ok_or_else(|| unknown_session(session))?;

    info!(
        event_name = "voice.session.reset",
        correlation_id = %correlation_id,
        session = %session,
        "conversation session reset to the greeting"
    );

    Ok(Json(conversation))
}

// ---------------------------------------------------------------------------
// Conversation
// ---------------------------------------------------------------------------

/// Returns the stored prompt when the conversation is in the requested block.
async fn current_prompt(
    Path(block): Path<String>,
    Query(query): Query<SessionQuery>,
    State(state): State<VoiceState>,
) -> Result<Json<ConversationState>, (StatusCode, Json<VoiceError>)> {
    let block = resolve_block(&block)?;
    let session = query.session.unwrap_or_default();
    let conversation =
        state.store.snapshot(session).await.ok_or_else(|| unknown_session(session))?;

    if conversation.block != block {
        return Err((
            StatusCode::CONFLICT,
            Json(VoiceError { error: format!("server not in {block} block") }),
        ));
    }

    Ok(Json(conversation))
}

/// Answers the current prompt. The session lock is held across classification
/// and the state write, so concurrent turns serialize and the loser fails the
/// echo check instead of clobbering the winner's transition.
async fn advance(
    Path(block): Path<String>,
    Query(query): Query<SessionQuery>,
    State(state): State<VoiceState>,
    Json(turn): Json<Turn>,
) -> Result<Json<ConversationState>, (StatusCode, Json<VoiceError>)> {
    let block = resolve_block(&block)?;
    if turn.block != block {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(VoiceError { error: REQUIRED_DATA_MISSING.to_string() }),
        ));
    }

    let correlation_id = new_correlation_id();
    let session = query.session.unwrap_or_default();
    let handle: SessionHandle =
        state.store.session(session).await.ok_or_else(|| unknown_session(session))?;

    let mut conversation = handle.lock().await;
    let next = state
        .engine
        .step(&conversation, &turn, state.classifier.as_ref())
        .await
        .map_err(|error| engine_error(session, &correlation_id, error))?;
    *conversation = next.clone();
    drop(conversation);

    info!(
        event_name = "voice.turn.advanced",
        correlation_id = %correlation_id,
        session = %session,
        from_block = %turn.block,
        from_section = turn.section,
        to_block = %next.block,
        to_section = next.section,
        action = ?next.action,
        "conversation advanced one turn"
    );

    Ok(Json(next))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parses the path segment into a block. Exit has no endpoint: a terminated
/// conversation only continues through a reset.
fn resolve_block(raw: &str) -> Result<Block, (StatusCode, Json<VoiceError>)> {
    match Block::from_str(raw) {
        Ok(block) if !block.is_terminal() => Ok(block),
        Ok(block) => Err((
            StatusCode::NOT_FOUND,
            Json(VoiceError { error: format!("no conversation endpoint for the {block} block") }),
        )),
        Err(error) => {
            Err((StatusCode::NOT_FOUND, Json(VoiceError { error: error.to_string() })))
        }
    }
}

fn unknown_session(session: SessionId) -> (StatusCode, Json<VoiceError>) {
    (StatusCode::NOT_FOUND, Json(VoiceError { error: format!("unknown session `{session}`") }))
}

fn engine_error(
    session: SessionId,
    correlation_id: &str,
    error: EngineError,
) -> (StatusCode, Json<VoiceError>) {
    match error {
        EngineError::InvalidTransition { .. } => {
            warn!(
                event_name = "voice.turn.stale",
                correlation_id = %correlation_id,
                session = %session,
                error = %error,
                "turn rejected by the echo check"
            );
            (StatusCode::CONFLICT, Json(VoiceError { error: REQUIRED_DATA_MISSING.to_string() }))
        }
        EngineError::RequiredDataMissing { .. } => (
            StatusCode::BAD_REQUEST,
            Json(VoiceError { error: REQUIRED_DATA_MISSING.to_string() }),
        ),
        EngineError::Classification(source) => {
            warn!(
                event_name = "voice.turn.classifier_unavailable",
                correlation_id = %correlation_id,
                session = %session,
                error = %source,
                "turn failed because classification was unavailable"
            );
            (StatusCode::SERVICE_UNAVAILABLE, Json(VoiceError { error: source.to_string() }))
        }
    }
}

/// One id per inbound request, so the log lines of a single turn correlate.
fn new_correlation_id() -> String {
    Uuid::new_v4().simple().to_string()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use betty_classify::{FailingClassifier, ScriptedClassifier, StaticClassifier};
    use betty_core::classify::Classify;
    use betty_core::dialogue::engine::TriageEngine;
    use betty_core::dialogue::states::{Block, ConversationState, Status};
    use betty_core::session::{SessionId, SessionStore};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::voice::router;

    fn app(classifier: impl Classify + 'static) -> (Router, Arc<SessionStore>) {
        let store = Arc::new(SessionStore::new());
        let router = router(Arc::clone(&store), Arc::new(classifier), TriageEngine::new());
        (router, store)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("request")
    }

    fn post(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("response body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    fn turn(block: &str, section: u32, text: &str) -> Value {
        json!({ "block": block, "section": section, "text": text })
    }

    #[tokio::test]
    async fn answering_the_greeting_advances_the_implicit_session() {
        let (app, store) = app(StaticClassifier::all(true));

        let response = app
            .oneshot(post("/voice/greeting/", turn("greeting", 1, "I feel great")))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["block"], "greeting");
        assert_eq!(body["section"], 2);
        assert_eq!(body["status"], "active");
        assert_eq!(body["action"], "talk");

        let stored = store.snapshot(SessionId::implicit()).await.expect("implicit");
        assert_eq!(stored.section, 2, "the transition is persisted");
    }

    #[tokio::test]
    async fn a_stale_echo_is_rejected_without_consuming_the_turn() {
        let (app, store) = app(StaticClassifier::all(true));

        let response = app
            .oneshot(post("/voice/greeting/", turn("greeting", 3, "yes")))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Required data not present.");

        let stored = store.snapshot(SessionId::implicit()).await.expect("implicit");
        assert_eq!(stored, ConversationState::initial(), "state is untouched");
    }

    #[tokio::test]
    async fn a_classifier_outage_preserves_the_state() {
        let (app, store) = app(FailingClassifier);

        let response = app
            .oneshot(post("/voice/greeting/", turn("greeting", 1, "I feel fine")))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let stored = store.snapshot(SessionId::implicit()).await.expect("implicit");
        assert_eq!(stored, ConversationState::initial());
    }

    #[tokio::test]
    async fn a_body_answering_a_different_block_is_a_bad_request() {
        let (app, _store) = app(StaticClassifier::all(true));

        let response = app
            .oneshot(post("/voice/greeting/", turn("syn_covid", 1, "yes")))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Required data not present.");
    }

    #[tokio::test]
    async fn unknown_and_terminal_blocks_have_no_endpoint() {
        let (app, _store) = app(StaticClassifier::all(true));

        let response =
            app.clone().oneshot(get("/voice/lobby/")).await.expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app.oneshot(get("/voice/exit/")).await.expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reading_a_block_the_conversation_is_not_in_conflicts() {
        let (app, _store) = app(StaticClassifier::all(true));

        let response = app.clone().oneshot(get("/voice/greeting/")).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["text"], ConversationState::initial().text);

        let response = app.oneshot(get("/voice/syn_covid/")).await.expect("response");
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let body = body_json(response).await;
        assert_eq!(body["error"], "server not in syn_covid block");
    }

    #[tokio::test]
    async fn created_sessions_advance_independently_of_the_implicit_one() {
        let (app, store) = app(StaticClassifier::all(false));

        let response =
            app.clone().oneshot(post("/voice/session/", json!({}))).await.expect("response");
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = body_json(response).await;
        let session = body["session"].as_str().expect("session id").to_string();
        assert_eq!(body["state"]["block"], "greeting");

        let response = app
            .oneshot(post(
                &format!("/voice/greeting/?session={session}"),
                turn("greeting", 1, "awful"),
            ))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["section"], 3, "a negative greeting goes to the severe-symptom check");

        let implicit = store.snapshot(SessionId::implicit()).await.expect("implicit");
        assert_eq!(implicit, ConversationState::initial());
    }

    #[tokio::test]
    async fn an_unknown_session_is_not_found() {
        let (app, _store) = app(StaticClassifier::all(true));
        let missing = SessionId::new();

        let response = app
            .clone()
            .oneshot(get(&format!("/voice/greeting/?session={missing}")))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = app
            .oneshot(post(&format!("/voice/session/{missing}/reset"), json!({})))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn reset_is_the_only_way_out_of_a_terminated_conversation() {
        // sentiment negative, then "yes" to severe symptoms: straight to 911.
        let (app, _store) = app(ScriptedClassifier::new([false, true]));

        let response = app
            .clone()
            .oneshot(post("/voice/greeting/", turn("greeting", 1, "terrible")))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(post("/voice/greeting/", turn("greeting", 3, "yes")))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["block"], "exit");
        assert_eq!(body["status"], "terminated");
        assert_eq!(body["action"], "call_911");

        // The terminated conversation accepts no further turns.
        let response = app
            .clone()
            .oneshot(post("/voice/greeting/", turn("greeting", 1, "hello again")))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let implicit = SessionId::implicit();
        let response = app
            .oneshot(post(&format!("/voice/session/{implicit}/reset"), json!({})))
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["block"], "greeting");
        assert_eq!(body["section"], 1);
        assert_eq!(body["status"], "active");
    }

    #[test]
    fn correlation_ids_are_unique_per_request() {
        let first = super::new_correlation_id();
        let second = super::new_correlation_id();
        assert!(!first.is_empty());
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn an_all_no_walk_ends_without_an_assessment() {
        let (app, store) = app(StaticClassifier::all(false));

        let mut current = ConversationState::initial();
        while current.status == Status::Active {
            let response = app
                .clone()
                .oneshot(post(
                    &format!("/voice/{}/", current.block),
                    turn(current.block.wire_name(), current.section, "no"),
                ))
                .await
                .expect("response");
            assert_eq!(response.status(), StatusCode::OK);
            current = store.snapshot(SessionId::implicit()).await.expect("implicit");
        }

        assert_eq!(current.block, Block::Exit);
        assert!(current.text.contains("don’t need an assessment"));
    }
}
