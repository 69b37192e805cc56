//! HTTP error mapping shared by all bots.
//!
//! Handlers return `Result<_, ApiError>`. Clients only ever see a generic
//! `{"detail": ...}` body; internal causes are logged, never echoed.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Malformed or invalid request. The message is safe to show clients.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The named resource does not exist.
    #[error("{0} not found")]
    NotFound(&'static str),

    /// Provider or I/O failure. `public` is shown, `cause` is only logged.
    #[error("{public}: {cause}")]
    Internal { public: &'static str, cause: String },
}

impl ApiError {
    pub fn internal(public: &'static str, cause: impl std::fmt::Display) -> Self {
        Self::Internal { public, cause: cause.to_string() }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorBody {
    pub detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let detail = match self {
            Self::BadRequest(msg) => msg,
            Self::NotFound(what) => format!("{what} not found"),
            Self::Internal { public, cause } => {
                tracing::error!(error = %cause, "{public}");
                public.to_string()
            }
        };
        (status, Json(ErrorBody { detail })).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "request body rejected");
        Self::BadRequest("invalid request body".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn status_mapping() {
        assert_eq!(ApiError::BadRequest("x".into()).status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::NotFound("Audio").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::internal("failed", "boom").status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn internal_hides_cause() {
        let response = ApiError::internal("Voice generation failed", "upstream 401: bad key").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!({ "detail": "Voice generation failed" }));
    }

    #[tokio::test]
    async fn not_found_names_resource() {
        let body = body_json(ApiError::NotFound("Audio").into_response()).await;
        assert_eq!(body["detail"], "Audio not found");
    }
}
