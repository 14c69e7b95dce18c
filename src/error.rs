use std::process::ExitStatus;
use std::time::Duration;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Unauthorized")]
    Unauthorized,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "success": false, "error": self.to_string() }));
        (StatusCode::UNAUTHORIZED, body).into_response()
    }
}

/// Everything that can go wrong between spawning the trade script and
/// collecting its exit status. Only ever logged.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to collect trade script output: {0}")]
    Wait(#[source] std::io::Error),

    #[error("trade script exited with {status}")]
    Exited {
        status: ExitStatus,
        stdout: String,
        stderr: String,
    },

    #[error("trade script timed out after {0:?}")]
    TimedOut(Duration),
}
