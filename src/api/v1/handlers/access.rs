/*
 * Responsibility
 * - Routes gated by identity / claims
 * - Checks run against the oracle's cached claims; nothing is re-verified here
 */
use axum::Json;
use serde_json::{Value, json};

use crate::api::v1::extractors::Authenticated;
use crate::error::AuthError;

pub const ADMIN_CLAIM: &str = "admin";
pub const STAFF_CLAIM: &str = "staff";

pub async fn owned(Authenticated(oracle): Authenticated) -> Json<Value> {
    Json(json!({ "owner": oracle.subject_id() }))
}

pub async fn admin(Authenticated(oracle): Authenticated) -> Result<Json<Value>, AuthError> {
    oracle.require_all_claims(&[ADMIN_CLAIM])?;
    Ok(Json(json!({ "area": "admin", "subject_id": oracle.subject_id() })))
}

pub async fn staff(Authenticated(oracle): Authenticated) -> Result<Json<Value>, AuthError> {
    oracle.require_any_claim(&[ADMIN_CLAIM, STAFF_CLAIM])?;
    Ok(Json(json!({ "area": "staff", "subject_id": oracle.subject_id() })))
}
