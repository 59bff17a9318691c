//! Error envelope shared by every catalog endpoint

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use time::{format_description::well_known::Rfc3339, OffsetDateTime};
use uuid::Uuid;

/// Body of the `error` member in every error response
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
    pub details: Vec<serde_json::Value>,
    pub trace_id: String,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

/// Failures a handler reports to the client
#[derive(Error, Debug)]
pub enum AppError {
    /// Field-level violations, one JSON object per entry in `details`
    #[error("validation error: {message}")]
    Validation {
        details: Vec<serde_json::Value>,
        message: String,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn validation(details: Vec<serde_json::Value>, message: impl Into<String>) -> Self {
        Self::Validation {
            details,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden(message.into())
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    /// HTTP status this error is reported with
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code placed in the envelope
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound(_) => "not_found",
            AppError::Forbidden(_) => "forbidden",
            AppError::BadRequest(_) => "bad_request",
            AppError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.code();
        let trace_id = Uuid::now_v7();
        let timestamp = OffsetDateTime::now_utc()
            .format(&Rfc3339)
            .unwrap_or_default();

        if status.is_server_error() {
            tracing::error!(trace_id = %trace_id, error_code = code, status_code = status.as_u16(), error = %self, "request failed");
        } else {
            tracing::warn!(trace_id = %trace_id, error_code = code, status_code = status.as_u16(), "request rejected");
        }

        let (message, details) = match self {
            AppError::Validation { details, message } => (message, details),
            AppError::NotFound(message)
            | AppError::Forbidden(message)
            | AppError::BadRequest(message) => (message, Vec::new()),
            // Internal details stay in the logs for release builds
            AppError::Internal(_) if cfg!(not(debug_assertions)) => {
                ("An internal server error occurred".to_string(), Vec::new())
            }
            AppError::Internal(err) => (format!("{err:#}"), Vec::new()),
        };

        let envelope = ErrorEnvelope {
            error: ErrorBody {
                code,
                message,
                details,
                trace_id: trace_id.to_string(),
                timestamp,
            },
        };

        (status, Json(envelope)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn statuses_follow_the_variant() {
        let cases = [
            (AppError::validation(vec![], "invalid"), StatusCode::BAD_REQUEST),
            (AppError::bad_request("page must be at least 1"), StatusCode::BAD_REQUEST),
            (AppError::not_found("book 3 not found"), StatusCode::NOT_FOUND),
            (AppError::forbidden("missing role"), StatusCode::FORBIDDEN),
            (
                AppError::Internal(anyhow::anyhow!("store unavailable")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (error, status) in cases {
            assert_eq!(error.into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn envelope_carries_code_details_and_trace() {
        let details = vec![serde_json::json!({"field": "title", "error": "must not be blank"})];
        let response = AppError::validation(details, "Book is invalid").into_response();
        let body = body_json(response).await;

        let error = &body["error"];
        assert_eq!(error["code"], "validation_error");
        assert_eq!(error["message"], "Book is invalid");
        assert_eq!(error["details"][0]["field"], "title");
        assert!(Uuid::parse_str(error["trace_id"].as_str().unwrap()).is_ok());
        assert!(OffsetDateTime::parse(error["timestamp"].as_str().unwrap(), &Rfc3339).is_ok());
    }

    #[tokio::test]
    async fn errors_without_details_send_an_empty_list() {
        let body = body_json(AppError::forbidden("ROLE_ADMIN required").into_response()).await;
        assert_eq!(body["error"]["code"], "forbidden");
        assert_eq!(body["error"]["details"], serde_json::json!([]));
    }
}
