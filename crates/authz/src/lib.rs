//! Role-based write protection.
//!
//! Authentication happens upstream; the gateway in front of the service
//! forwards the caller's roles in the `x-user-roles` header as a comma
//! separated list. Requests without the header are anonymous.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use bookshelf_http::error::AppError;

/// Header carrying the authenticated caller's roles.
pub const ROLES_HEADER: &str = "x-user-roles";

/// The caller of the current request, as far as authorization is concerned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Principal {
    roles: Vec<String>,
}

impl Principal {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_roles<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// Parse a comma separated role list, ignoring blanks.
    pub fn from_header_value(value: &str) -> Self {
        Self::with_roles(
            value
                .split(',')
                .map(str::trim)
                .filter(|role| !role.is_empty()),
        )
    }

    pub fn roles(&self) -> &[String] {
        &self.roles
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|granted| granted == role)
    }
}

impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let principal = parts
            .headers
            .get(ROLES_HEADER)
            .and_then(|value| value.to_str().ok())
            .map(Principal::from_header_value)
            .unwrap_or_default();
        Ok(principal)
    }
}

/// Deny the request unless `principal` holds `role`.
pub fn require_role(principal: &Principal, role: &str) -> Result<(), AppError> {
    if principal.has_role(role) {
        return Ok(());
    }
    tracing::warn!(required = role, roles = ?principal.roles(), "access denied");
    Err(AppError::forbidden(format!(
        "you do not have the required permissions ({role})"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;

    async fn extract(request: Request<()>) -> Principal {
        let (mut parts, _) = request.into_parts();
        Principal::from_request_parts(&mut parts, &()).await.unwrap()
    }

    #[test]
    fn header_value_is_split_and_trimmed() {
        let principal = Principal::from_header_value("ROLE_USER, ROLE_ADMIN,,");
        assert_eq!(principal.roles(), ["ROLE_USER", "ROLE_ADMIN"]);
    }

    #[tokio::test]
    async fn missing_header_is_anonymous() {
        let principal = extract(Request::builder().body(()).unwrap()).await;
        assert_eq!(principal, Principal::anonymous());
    }

    #[tokio::test]
    async fn roles_are_read_from_the_header() {
        let request = Request::builder()
            .header(ROLES_HEADER, "ROLE_ADMIN")
            .body(())
            .unwrap();
        assert!(extract(request).await.has_role("ROLE_ADMIN"));
    }

    #[test]
    fn require_role_denies_without_the_role() {
        let user = Principal::with_roles(["ROLE_USER"]);
        let err = require_role(&user, "ROLE_ADMIN").unwrap_err();
        assert_eq!(err.into_response().status(), StatusCode::FORBIDDEN);

        let admin = Principal::with_roles(["ROLE_USER", "ROLE_ADMIN"]);
        assert!(require_role(&admin, "ROLE_ADMIN").is_ok());
    }
}
