//! Request-scoped storage of the auth oracle.
//!
//! The oracle lives in the request's `Extensions` under a private wrapper
//! type, so only this module can bind or look it up and the stored type is
//! checked at compile time. Every request owns its extensions; sibling
//! requests can never observe each other's oracle.

use std::sync::Arc;

use axum::http::{Extensions, Request};
use thiserror::Error;

use crate::error::AuthError;
use crate::oracle::AuthOracle;

#[derive(Clone)]
struct BoundOracle(Arc<dyn AuthOracle>);

/// Handler-wiring mistakes. These are never the caller's fault.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScopeError {
    #[error("no auth oracle bound to request")]
    NotBound,
    #[error("a different auth oracle is already bound to request")]
    AlreadyBound,
}

impl From<ScopeError> for AuthError {
    fn from(e: ScopeError) -> Self {
        AuthError::server(e.to_string())
    }
}

/// Associates `oracle` with the request. Re-binding the same oracle is a
/// no-op; binding a different one fails and leaves the first in place.
pub fn bind(extensions: &mut Extensions, oracle: Arc<dyn AuthOracle>) -> Result<(), ScopeError> {
    if let Some(existing) = extensions.get::<BoundOracle>() {
        if Arc::ptr_eq(&existing.0, &oracle) {
            return Ok(());
        }
        tracing::error!(target: "auth_oracle::scope", "a different auth oracle is already bound to request");
        return Err(ScopeError::AlreadyBound);
    }
    extensions.insert(BoundOracle(oracle));
    Ok(())
}

/// Consuming form of [`bind`]: returns the request carrying the oracle.
pub fn bind_request<B>(mut request: Request<B>, oracle: Arc<dyn AuthOracle>) -> Result<Request<B>, ScopeError> {
    bind(request.extensions_mut(), oracle)?;
    Ok(request)
}

pub fn retrieve(extensions: &Extensions) -> Result<Arc<dyn AuthOracle>, ScopeError> {
    match extensions.get::<BoundOracle>() {
        Some(bound) => Ok(bound.0.clone()),
        None => {
            tracing::error!(target: "auth_oracle::scope", "no auth oracle bound to request");
            Err(ScopeError::NotBound)
        }
    }
}

/// Pre-installs an alternate oracle for the oracle middleware to use instead
/// of the default one (another identity provider, or a test double).
///
/// Holds a constructor rather than an instance: each request gets its own
/// fresh oracle. The middleware refuses it in production.
#[derive(Clone)]
pub struct CustomOracle(Arc<dyn Fn() -> Box<dyn AuthOracle> + Send + Sync>);

impl CustomOracle {
    pub fn new<F, O>(make: F) -> Self
    where
        F: Fn() -> O + Send + Sync + 'static,
        O: AuthOracle + 'static,
    {
        Self(Arc::new(move || Box::new(make()) as Box<dyn AuthOracle>))
    }

    pub fn build(&self) -> Box<dyn AuthOracle> {
        (self.0)()
    }
}

impl std::fmt::Debug for CustomOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("CustomOracle")
    }
}
