use serde::Serialize;

/// What the bound oracle knows about the caller.
#[derive(Debug, Serialize)]
pub struct IdentityResponse {
    pub subject_id: String,
    pub authenticated: bool,
    pub claims: Vec<String>,
}
