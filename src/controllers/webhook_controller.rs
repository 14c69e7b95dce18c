use axum::{
    Json,
    body::Bytes,
    extract::{State, rejection::BytesRejection},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::{
    AppState,
    services::intake_service::{self, ContentHint, ParseOutcome},
};

fn ack() -> Response {
    (StatusCode::OK, Json(json!({ "success": true }))).into_response()
}

// POST /webhook
//
// Always acknowledges once past the auth layer. Parse problems and trade
// results only ever show up in the logs.
pub async fn receive_webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Response {
    // oversized or unreadable bodies are still acknowledged
    let body = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(
                error = %rejection,
                "webhook body could not be read, not dispatching"
            );
            return ack();
        }
    };

    let hint = ContentHint::from_content_type(
        headers
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok()),
    );

    match intake_service::parse(&body, hint) {
        Ok(alert) => {
            let fields = serde_json::to_value(&alert).unwrap_or_default();
            tracing::info!(alert = %fields, "webhook received, dispatching trade");
            state.dispatcher.dispatch(alert);
        }
        Err(ParseOutcome::Malformed { record, hint }) => {
            if hint == ContentHint::Json {
                tracing::warn!(
                    payload = %record,
                    "webhook declared json but body did not parse"
                );
            } else {
                tracing::info!(payload = %record, "webhook received non-json body");
            }
        }
        Err(ParseOutcome::Incomplete { record, missing }) => {
            tracing::warn!(
                payload = %record,
                %missing,
                "webhook alert incomplete, not dispatching"
            );
        }
    }

    ack()
}
