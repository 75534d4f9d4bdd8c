/*
 * Responsibility
 * - v1 URL layout
 * - Every route sits behind the oracle middleware (applied in app.rs);
 *   per-route access rules live in the handlers' extractors / claim checks
 */
use axum::{Router, routing::get};

use crate::api::v1::handlers::{
    access::{admin, owned, staff},
    health::health,
    identity::me,
};

pub fn routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route("/health", get(health))
        .route("/me", get(me))
        .route("/owned", get(owned))
        .route("/admin", get(admin))
        .route("/staff", get(staff))
}
