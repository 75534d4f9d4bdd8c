//! Request-scoped authentication for axum services.
//!
//! The oracle middleware verifies the caller's bearer token once per request
//! and binds the result, an [`oracle::AuthOracle`], into the request's
//! extensions. Handlers pull it back out with the extractors in
//! [`api::v1::extractors`] and gate access with
//! [`IdentityReader::require_authentication`],
//! [`Claimant::require_all_claims`] and [`Claimant::require_any_claim`].

pub mod api;
pub mod app;
pub mod claims;
pub mod config;
pub mod error;
pub mod middleware;
pub mod oracle;
pub mod scope;
pub mod services;
pub mod state;

pub use claims::Claims;
pub use error::{AuthError, AuthErrorKind};
pub use oracle::{AuthOracle, Claimant, FirebaseOracle, IdentityReader, Initializer};
pub use scope::CustomOracle;
pub use services::auth::{AuthService, TokenVerifier, VerifiedToken, VerifyError};
