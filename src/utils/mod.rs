//! Small HTTP helpers shared by the catalog modules.

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{
        header::{CONTENT_TYPE, HOST},
        HeaderMap, HeaderName,
    },
    response::{IntoResponse, Response},
    Json,
};
use bookshelf_cache::{CacheStatus, Payload};
use bookshelf_http::error::AppError;

/// Reports whether a list response came from the cache.
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");

/// Build an absolute URL for `path`.
///
/// A configured base wins; otherwise the request's `Host` (and
/// `X-Forwarded-Proto`, default `http`) is used. Without either the path is
/// returned as-is.
pub fn absolute_url(base_url: Option<&str>, headers: &HeaderMap, path: &str) -> String {
    if let Some(base) = base_url {
        return format!("{}{}", base.trim_end_matches('/'), path);
    }

    let header = |name: &HeaderName| headers.get(name).and_then(|value| value.to_str().ok());
    match header(&HOST) {
        Some(host) => {
            let scheme = header(&X_FORWARDED_PROTO).unwrap_or("http");
            format!("{scheme}://{host}{path}")
        }
        None => path.to_string(),
    }
}

/// A cached, pre-serialized JSON list.
pub fn cached_json(payload: Payload, status: CacheStatus) -> Response {
    (
        [(CONTENT_TYPE, "application/json"), (X_CACHE, status.as_str())],
        payload.to_string(),
    )
        .into_response()
}

/// Unwrap a JSON body, reporting malformed input in the error envelope.
pub fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    body.map(|Json(value)| value)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

/// Unwrap a path parameter, reporting malformed input in the error envelope.
pub fn path_param<T>(path: Result<axum::extract::Path<T>, PathRejection>) -> Result<T, AppError> {
    path.map(|axum::extract::Path(value)| value)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

/// Unwrap a query string, reporting malformed input in the error envelope.
pub fn query_params<T>(
    query: Result<axum::extract::Query<T>, QueryRejection>,
) -> Result<T, AppError> {
    query
        .map(|axum::extract::Query(value)| value)
        .map_err(|rejection| AppError::bad_request(rejection.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn configured_base_wins() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("internal:8080"));
        assert_eq!(
            absolute_url(Some("https://books.example.com/"), &headers, "/api/books/4"),
            "https://books.example.com/api/books/4"
        );
    }

    #[test]
    fn host_header_is_used_without_base() {
        let mut headers = HeaderMap::new();
        headers.insert(HOST, HeaderValue::from_static("localhost:8080"));
        assert_eq!(
            absolute_url(None, &headers, "/api/authors/1"),
            "http://localhost:8080/api/authors/1"
        );

        headers.insert(X_FORWARDED_PROTO, HeaderValue::from_static("https"));
        assert_eq!(
            absolute_url(None, &headers, "/api/authors/1"),
            "https://localhost:8080/api/authors/1"
        );
    }

    #[test]
    fn path_is_returned_without_host() {
        assert_eq!(
            absolute_url(None, &HeaderMap::new(), "/api/authors/1"),
            "/api/authors/1"
        );
    }
}
