use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::claims::Claims;
use crate::error::AuthError;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Identity decoded from a token the backend accepted.
#[derive(Debug, Clone)]
pub struct VerifiedToken {
    pub subject_id: String,
    pub claims: Claims,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Error)]
pub enum VerifyError {
    /// The caller's token is malformed, expired or signed by an unknown key.
    #[error("invalid token: {0}")]
    InvalidToken(String),

    /// The verification service itself could not be used.
    #[error("verification backend unavailable")]
    Backend(#[source] BoxError),
}

impl VerifyError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidToken(reason.into())
    }

    pub fn backend<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Backend(Box::new(err))
    }
}

impl From<VerifyError> for AuthError {
    fn from(e: VerifyError) -> Self {
        match e {
            VerifyError::InvalidToken(reason) => AuthError::bad_input(
                "INVALID_TOKEN",
                format!("could not decode HTTP authorization token ({reason})"),
            ),
            VerifyError::Backend(source) => AuthError::Server {
                message: "could not access authentication service".to_string(),
                source: Some(source),
            },
        }
    }
}

/// Backend that turns a raw bearer token into a verified identity.
///
/// Implementations are shared across requests, so they must be safe for
/// concurrent use. Retries, if any, belong inside the implementation.
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<VerifiedToken, VerifyError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuthErrorKind;

    #[test]
    fn invalid_token_is_callers_fault() {
        let err = AuthError::from(VerifyError::invalid("expired"));
        assert_eq!(err.kind(), AuthErrorKind::BadInput);
        assert!(err.message().contains("expired"));
    }

    #[test]
    fn backend_failure_is_ours() {
        let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = AuthError::from(VerifyError::backend(io));
        assert_eq!(err.kind(), AuthErrorKind::ServerError);
        assert!(std::error::Error::source(&err).is_some());
    }
}
