//! Errors raised by catalog operations and their HTTP mapping.

use bookshelf_db::StorageError;
use bookshelf_http::error::AppError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("failed to encode response: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("{subject} failed validation")]
    Validation {
        subject: &'static str,
        violations: Vec<serde_json::Value>,
    },

    #[error("invalid query: {0}")]
    InvalidQuery(String),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::Storage(StorageError::NotFound { entity, id }) => {
                AppError::not_found(format!("{entity} {id} not found"))
            }
            CatalogError::Encode(err) => AppError::Internal(err.into()),
            CatalogError::Validation {
                subject,
                violations,
            } => AppError::validation(violations, format!("{subject} failed validation")),
            CatalogError::InvalidQuery(message) => AppError::bad_request(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn not_found_maps_to_404() {
        let err: AppError = CatalogError::from(StorageError::author_not_found(9)).into();
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "not found: author 9 not found");
    }

    #[test]
    fn validation_maps_to_400_with_details() {
        let err: AppError = CatalogError::Validation {
            subject: "author",
            violations: vec![serde_json::json!({"field": "firstName"})],
        }
        .into();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert!(matches!(err, AppError::Validation { ref details, .. } if details.len() == 1));
    }
}
