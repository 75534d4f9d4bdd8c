/*
 * Responsibility
 * - GET /me: report the caller's identity as seen by the bound oracle
 * - Anonymous callers get an empty subject and no claims
 */
use axum::Json;

use crate::api::v1::{dto::identity::IdentityResponse, extractors::OracleExtractor};

pub async fn me(OracleExtractor(oracle): OracleExtractor) -> Json<IdentityResponse> {
    Json(IdentityResponse {
        subject_id: oracle.subject_id().to_string(),
        authenticated: oracle.is_authenticated(),
        claims: oracle.granted_claims(),
    })
}
