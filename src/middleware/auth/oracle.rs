//! Bearer token → auth oracle → request extensions.
//!
//! This is the only place token verification happens. Per request:
//!
//! 1. pick the oracle: a [`CustomOracle`] installed earlier in the stack, or
//!    the default one from [`AuthService`]
//! 2. initialize it from the request, bounded by the configured timeout
//! 3. on success bind it into the request and run the rest of the stack;
//!    on failure answer with the error and never call the next handler
//!
//! Anonymous requests (no `Authorization` header) pass through with an
//! unauthenticated oracle; handlers decide whether that is acceptable.

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
};

use crate::error::AuthError;
use crate::oracle::AuthOracle;
use crate::scope::{self, CustomOracle};
use crate::services::auth::AuthService;

/// Puts the oracle middleware in front of every route of `router`.
///
/// ```ignore
/// let v1 = api::v1::routes();
/// let v1 = middleware::auth::oracle::apply(v1, state.auth.clone());
/// app = app.nest("/api/v1", v1);
/// ```
pub fn apply<S>(router: Router<S>, auth: Arc<AuthService>) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(middleware::from_fn_with_state(auth, oracle_middleware))
}

pub async fn oracle_middleware(
    State(auth): State<Arc<AuthService>>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, AuthError> {
    let (mut parts, body) = req.into_parts();

    let mut oracle: Box<dyn AuthOracle> = match parts.extensions.remove::<CustomOracle>() {
        Some(_) if auth.app_env().is_production() => {
            tracing::error!("custom auth oracle installed in production; rejecting request");
            return Err(AuthError::server(
                "custom auth oracle is not permitted in production",
            ));
        }
        Some(custom) => {
            tracing::debug!("using pre-installed auth oracle");
            custom.build()
        }
        None => Box::new(auth.new_oracle()),
    };

    let timeout = auth.verify_timeout();
    match tokio::time::timeout(timeout, oracle.init_from_request(&parts)).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => {
            tracing::debug!(kind = ?err.kind(), "request rejected by auth oracle");
            return Err(err);
        }
        Err(_) => {
            tracing::warn!(timeout_ms = timeout.as_millis() as u64, "identity verification timed out");
            return Err(AuthError::server("identity verification timed out"));
        }
    }

    let oracle: Arc<dyn AuthOracle> = Arc::from(oracle);
    tracing::debug!(
        subject_id = %oracle.subject_id(),
        authenticated = oracle.is_authenticated(),
        "auth oracle bound"
    );

    let req = scope::bind_request(Request::from_parts(parts, body), oracle)?;
    Ok(next.run(req).await)
}
