//! Errors returned by the REST handlers.
//!
//! Each variant maps to one status code; the body is a small JSON object
//! `{ "error": <message>, "status": <code> }`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use scenecast_types::ParseCategoryError;

/// Handler failure.
#[derive(Debug, thiserror::Error)]
pub enum ObserverError {
    /// The path names an entity category that does not exist.
    #[error(transparent)]
    UnknownCategory(#[from] ParseCategoryError),

    /// The cached payload is not valid JSON.
    #[error("cached payload unreadable: {0}")]
    Payload(#[from] serde_json::Error),
}

impl ObserverError {
    /// HTTP status for this error.
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::UnknownCategory(_) => StatusCode::NOT_FOUND,
            Self::Payload(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ObserverError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = serde_json::json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        });
        (status, Json(body)).into_response()
    }
}
