//! Dialog endpoint.
//!
//! `POST /dialog` accepts a platform dialog event and returns the routed
//! response envelope. Each turn is written to the conversation log as
//! `processing` before routing and settled afterwards. A turn that cannot be
//! recorded is refused up front; a settlement write that fails after routing
//! is logged and the response is served anyway, since the user already paid
//! for the completion call.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use serde::Serialize;
use uuid::Uuid;

use salesdesk_agent::router::IntentRouter;
use salesdesk_core::dialog::types::{DialogEvent, DialogResponse, FulfillmentState};
use salesdesk_core::errors::ApplicationError;
use salesdesk_db::{ConversationRepository, ConversationTurn};

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<IntentRouter>,
    pub conversations: Arc<dyn ConversationRepository>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub status: &'static str,
    pub error: String,
}

impl ErrorBody {
    fn new(message: &str) -> Self {
        Self { status: "ERROR", error: message.to_string() }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new().route("/dialog", post(handle_dialog)).with_state(state)
}

pub async fn handle_dialog(
    State(state): State<AppState>,
    Json(event): Json<DialogEvent>,
) -> Result<Json<DialogResponse>, (StatusCode, Json<ErrorBody>)> {
    let correlation_id = Uuid::new_v4().to_string();

    let request_json = serde_json::to_string(&event).unwrap_or_else(|_| "{}".to_string());
    let turn = ConversationTurn::begin(
        event.session_id.clone(),
        event.intent_name().to_string(),
        request_json,
    );
    let turn_id = turn.id.clone();

    if let Err(error) = state.conversations.record_turn(turn).await {
        let interface = ApplicationError::Persistence(error.to_string())
            .into_interface(correlation_id.clone());
        tracing::error!(
            event_name = "dialog.turn_record_failed",
            correlation_id = correlation_id.as_str(),
            error = %error,
            "failed to record incoming turn"
        );
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorBody::new(interface.user_message())),
        ));
    }

    let response = state.router.route(&event).await;

    let settlement = match response.fulfillment_state() {
        FulfillmentState::Failed => state.conversations.fail_turn(&turn_id).await,
        _ => {
            let response_json =
                serde_json::to_string(&response).unwrap_or_else(|_| "{}".to_string());
            state.conversations.complete_turn(&turn_id, &response_json).await
        }
    };
    if let Err(error) = settlement {
        tracing::warn!(
            event_name = "dialog.turn_settle_failed",
            correlation_id = correlation_id.as_str(),
            turn_id = turn_id.as_str(),
            error = %error,
            "failed to settle turn record, serving the response anyway"
        );
    }

    Ok(Json(response))
}
