use axum::{
    extract::{Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
};
use serde_json::{Value, json};

use super::{AppState, EnableQuery, SharedSecretQuery};
use crate::actions::{Action, ActionEnvelope, is_secure_packet};
use crate::error::{ActionError, PlatformError};
use crate::packet::{ENCRYPTED_PATHS, quickstart_packet};
use crate::platform::{constant_time_eq, verify_enable_signature};

/// GET /health — always public (no secrets leaked)
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "enabled_users": state.store.list_enabled().len(),
    }))
}

/// POST /trigger — broadcast the quickstart packet to every enabled user.
pub(super) async fn handle_trigger(
    State(state): State<AppState>,
    Query(query): Query<SharedSecretQuery>,
) -> Response {
    if !secret_matches(&state, query.shared_secret.as_deref()) {
        tracing::warn!("trigger rejected: shared secret missing or mismatched");
        return StatusCode::UNAUTHORIZED.into_response();
    }

    match broadcast(&state).await {
        Ok(published) => {
            (StatusCode::OK, Json(json!({"status": "ok", "published": published})))
                .into_response()
        }
        Err(e) => {
            tracing::error!("broadcast aborted: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "failed to publish packet"})),
            )
                .into_response()
        }
    }
}

/// Broadcast to all enabled users. The first failed key fetch, seal, or
/// publish aborts delivery to every not-yet-processed user.
async fn broadcast(state: &AppState) -> Result<usize, PlatformError> {
    let users = state.store.list_enabled();
    tracing::info!(count = users.len(), "broadcasting to enabled users");

    let packet = serde_json::to_value(quickstart_packet())
        .map_err(|e| PlatformError::Crypto(format!("serializing packet: {e}")))?;

    for user_id in &users {
        tracing::info!(user_id = %user_id, "publishing secure packet");
        let keys = state.keys.device_keys(user_id, &state.integration_id).await?;
        let sealed = state.crypto.encrypt_packet(&packet, &ENCRYPTED_PATHS, &keys)?;
        state.publisher.publish_to_user(user_id, &sealed).await?;
    }

    Ok(users.len())
}

/// GET /enable — signed redirect bridging the platform's enable flow.
/// Always answers with a redirect, valid signature or not.
pub(super) async fn handle_enable(
    State(state): State<AppState>,
    Query(query): Query<EnableQuery>,
) -> Response {
    let signature = query.signature.as_deref().unwrap_or("");
    let token = query.state.as_deref().unwrap_or("");
    let timestamp = query.timestamp.as_deref().unwrap_or("");

    if !verify_enable_signature(&state.shared_secret, token, timestamp, signature) {
        tracing::warn!("enable request signature verification failed");
        return found(state.enable_urls.invalid_state_url().as_str());
    }

    state.store.mark_pending(token);
    tracing::info!("enable flow started, awaiting validation callback");
    found(state.enable_urls.continue_url(token).as_str())
}

/// POST /action — terminal point for platform action webhooks.
pub(super) async fn handle_action(
    State(state): State<AppState>,
    Query(query): Query<SharedSecretQuery>,
    body: Result<Json<ActionEnvelope>, axum::extract::rejection::JsonRejection>,
) -> Response {
    // Reject before inspecting the payload.
    if !secret_matches(&state, query.shared_secret.as_deref()) {
        tracing::warn!("action rejected: shared secret missing or mismatched");
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid shared secret"})),
        )
            .into_response();
    }

    let Json(envelope) = match body {
        Ok(b) => b,
        Err(e) => {
            let err = json!({
                "error": format!("Invalid JSON: {e}. Expected: {{\"type\": ..., \"body\": ...}}")
            });
            return (StatusCode::BAD_REQUEST, Json(err)).into_response();
        }
    };

    match dispatch_action(&state, envelope) {
        Ok(()) => (StatusCode::OK, Json(json!({"status": "ok"}))).into_response(),
        Err(err) => action_error_response(&err).into_response(),
    }
}

/// Decrypt secure payloads, classify the action, and apply it to the store.
fn dispatch_action(state: &AppState, envelope: ActionEnvelope) -> Result<(), ActionError> {
    let ActionEnvelope { kind, mut body } = envelope;

    if let Some(ref b) = body
        && is_secure_packet(b)
    {
        let opened = state.crypto.decrypt_packet(b).map_err(|e| {
            tracing::error!("unexpected error while decrypting action packet: {e}");
            ActionError::Decryption(e.to_string())
        })?;
        body = Some(opened);
    }

    match Action::classify(&kind, body.as_ref())? {
        Action::Validate { state: token, user_id } => {
            if !state.store.promote(&token, &user_id) {
                return Err(ActionError::StaleValidation { state: token });
            }
            tracing::info!(user_id = %user_id, "user validated and enabled");
            Ok(())
        }
        Action::Disable { user_id } => {
            state.store.disable(&user_id);
            tracing::info!(user_id = %user_id, "user disabled");
            Ok(())
        }
        Action::Unrecognized(kind) => Err(ActionError::Unrecognized(kind)),
    }
}

/// Map action errors onto status codes at the handler boundary. Internal
/// details go to the log, not the caller.
fn action_error_response(err: &ActionError) -> (StatusCode, Json<Value>) {
    match err {
        ActionError::StaleValidation { state } => {
            tracing::warn!(state = %state, "validation rejected: token missing or stale");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "validation window expired"})),
            )
        }
        ActionError::Unrecognized(kind) => {
            tracing::warn!(action_type = %kind, "unrecognized action");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "unrecognized action type"})),
            )
        }
        ActionError::Unauthorized => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"error": "invalid shared secret"})),
        ),
        ActionError::Malformed(_) | ActionError::Decryption(_) => {
            tracing::error!("action processing failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "internal error"})),
            )
        }
    }
}

fn secret_matches(state: &AppState, provided: Option<&str>) -> bool {
    provided.is_some_and(|s| constant_time_eq(s, &state.shared_secret))
}

/// 302 redirect, matching the platform's enable-flow contract.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_owned())]).into_response()
}
