/*
 * Responsibility
 * - AuthError: the four-kind failure taxonomy shared by the oracle, the
 *   claims checks and the middleware
 * - IntoResponse (HTTP status / JSON error body); this is the only place
 *   that knows about the wire format
 */
use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorKind {
    /// The caller supplied something unusable (bad token, forbidden override).
    BadInput,
    /// No verified identity, but the operation needs one.
    Unauthenticated,
    /// Verified identity without the required claims.
    Forbidden,
    /// Backend unreachable, misconfiguration or a broken invariant.
    ServerError,
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{code}: {message}")]
    BadInput { code: &'static str, message: String },
    #[error("unauthenticated: {message}")]
    Unauthenticated { message: String },
    #[error("forbidden: {message}")]
    Forbidden {
        message: String,
        required: Vec<String>,
    },
    #[error("server error: {message}")]
    Server {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

impl AuthError {
    pub fn bad_input(code: &'static str, message: impl Into<String>) -> Self {
        Self::BadInput {
            code,
            message: message.into(),
        }
    }

    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::Unauthenticated {
            message: message.into(),
        }
    }

    pub fn forbidden<S: AsRef<str>>(message: impl Into<String>, required: &[S]) -> Self {
        Self::Forbidden {
            message: message.into(),
            required: required.iter().map(|s| s.as_ref().to_string()).collect(),
        }
    }

    pub fn server(message: impl Into<String>) -> Self {
        Self::Server {
            message: message.into(),
            source: None,
        }
    }

    pub fn kind(&self) -> AuthErrorKind {
        match self {
            AuthError::BadInput { .. } => AuthErrorKind::BadInput,
            AuthError::Unauthenticated { .. } => AuthErrorKind::Unauthenticated,
            AuthError::Forbidden { .. } => AuthErrorKind::Forbidden,
            AuthError::Server { .. } => AuthErrorKind::ServerError,
        }
    }

    /// Human-readable message, without the kind prefix `Display` adds.
    pub fn message(&self) -> &str {
        match self {
            AuthError::BadInput { message, .. }
            | AuthError::Unauthenticated { message }
            | AuthError::Forbidden { message, .. }
            | AuthError::Server { message, .. } => message,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self.kind() {
            AuthErrorKind::BadInput => StatusCode::BAD_REQUEST,
            AuthErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthErrorKind::Forbidden => StatusCode::FORBIDDEN,
            AuthErrorKind::ServerError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (code, message) = match self {
            AuthError::BadInput { code, message } => (code, message),
            AuthError::Unauthenticated { message } => ("UNAUTHENTICATED", message),
            AuthError::Forbidden { message, .. } => ("FORBIDDEN", message),
            AuthError::Server { message, source } => {
                // Detail stays in the logs; callers only learn that it was our fault.
                tracing::error!(error = %message, source = ?source, "auth server error");
                ("INTERNAL_SERVER_ERROR", "internal server error".to_string())
            }
        };

        let body = ErrorResponse {
            error: ErrorBody { code, message },
        };

        let mut response = (status, Json(body)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_statuses() {
        assert_eq!(
            AuthError::bad_input("INVALID_TOKEN", "x").status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(AuthError::unauthenticated("x").status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::forbidden("x", &["admin"]).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::server("x").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn message_has_no_kind_prefix() {
        let err = AuthError::forbidden("access to resource requires claims 'admin'", &["admin"]);
        assert_eq!(err.message(), "access to resource requires claims 'admin'");
        assert_eq!(err.to_string(), "forbidden: access to resource requires claims 'admin'");
    }

    #[test]
    fn unauthenticated_response_carries_challenge() {
        let resp = AuthError::unauthenticated("no identity").into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(resp.headers().get(header::WWW_AUTHENTICATE).unwrap(), "Bearer");
    }

    #[test]
    fn server_response_hides_detail() {
        let resp = AuthError::server("jwks fetch failed").into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(resp.headers().get(header::WWW_AUTHENTICATE).is_none());
    }
}
