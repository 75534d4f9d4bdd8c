use std::sync::Arc;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::error::AuthError;
use crate::oracle::AuthOracle;
use crate::scope;

/// Extractor giving handlers the oracle bound to their request.
///
/// Expects the oracle middleware to have run. A missing oracle is a wiring
/// bug and rejects with a server error, not 401.
pub struct OracleExtractor(pub Arc<dyn AuthOracle>);

impl<S> FromRequestParts<S> for OracleExtractor
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(OracleExtractor(scope::retrieve(&parts.extensions)?))
    }
}

/// Like [`OracleExtractor`], but only for callers with a verified identity.
pub struct Authenticated(pub Arc<dyn AuthOracle>);

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let oracle = scope::retrieve(&parts.extensions)?;
        oracle.require_authentication()?;
        Ok(Authenticated(oracle))
    }
}
