//! The per-request authentication oracle.
//!
//! An oracle is built empty, initialized exactly once from the incoming
//! request, then bound read-only into the request's extensions (see
//! [`crate::scope`]). Handlers query it for identity and claims without
//! touching the verification backend again.
//!
//! The capabilities are split into small traits so alternate identity
//! providers and test doubles can implement them; [`AuthOracle`] is their
//! union and is what the middleware and extractors work with.

mod firebase;
mod head;

use async_trait::async_trait;
use axum::http::request::Parts;

use crate::claims::Claims;
use crate::error::AuthError;

pub use firebase::FirebaseOracle;
pub use head::RequestHead;

/// Populates an oracle from the incoming request.
#[async_trait]
pub trait Initializer: Send {
    /// Reads the `Authorization` header and verifies any bearer token in it.
    ///
    /// A missing header is not an error: the oracle becomes anonymous.
    /// Implementations must refuse a second call instead of verifying again.
    async fn init_from_request(&mut self, parts: &Parts) -> Result<(), AuthError>;
}

/// Read access to the verified identity.
pub trait IdentityReader {
    /// Stable subject id from the identity provider; empty when anonymous.
    fn subject_id(&self) -> &str;

    fn is_authenticated(&self) -> bool {
        !self.subject_id().is_empty()
    }

    /// `Unauthenticated` for anonymous callers.
    fn require_authentication(&self) -> Result<(), AuthError>;

    /// Snapshot of the request the oracle was initialized from.
    fn request(&self) -> Option<&RequestHead>;
}

/// Claim-based access checks. Pure; never talks to the backend.
pub trait Claimant {
    fn claims(&self) -> &Claims;

    fn has_all_claims(&self, names: &[&str]) -> bool {
        self.claims().has_all(names)
    }

    fn require_all_claims(&self, names: &[&str]) -> Result<(), AuthError> {
        self.claims().require_all(names)
    }

    fn has_any_claim(&self, names: &[&str]) -> bool {
        self.claims().has_any(names)
    }

    fn require_any_claim(&self, names: &[&str]) -> Result<(), AuthError> {
        self.claims().require_any(names)
    }

    /// Granted claim names; empty for anonymous callers.
    fn granted_claims(&self) -> Vec<String> {
        self.claims().granted()
    }
}

pub trait AuthOracle: Initializer + IdentityReader + Claimant + Send + Sync {}

impl<T> AuthOracle for T where T: Initializer + IdentityReader + Claimant + Send + Sync {}

/// The value of the `Authorization` header with a leading `Bearer ` removed.
///
/// `Ok(None)` when the header is absent or empty. A header without the
/// `Bearer ` prefix is passed through whole and left for the verifier to
/// reject.
pub fn bearer_token(parts: &Parts) -> Result<Option<&str>, AuthError> {
    let Some(value) = parts.headers.get(axum::http::header::AUTHORIZATION) else {
        return Ok(None);
    };
    let raw = value.to_str().map_err(|_| {
        AuthError::bad_input("INVALID_TOKEN", "authorization header is not valid text")
    })?;
    if raw.is_empty() {
        return Ok(None);
    }

    let token = raw.strip_prefix("Bearer ").unwrap_or(raw);
    if token.is_empty() {
        return Err(AuthError::bad_input("INVALID_TOKEN", "empty bearer token"));
    }
    Ok(Some(token))
}
