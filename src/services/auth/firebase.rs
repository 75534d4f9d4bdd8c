use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, Validation};
use serde::Deserialize;

use crate::claims::Claims;
use crate::services::auth::keys::{KeyCache, KeySource};
use crate::services::auth::verifier::{TokenVerifier, VerifiedToken, VerifyError};

const ISSUER_PREFIX: &str = "https://securetoken.google.com/";
const MAX_SUBJECT_LEN: usize = 128;

/// Payload of a Firebase ID token.
///
/// Everything besides the members listed here (custom claims, `email_verified`,
/// `aud`, `iss`, ...) lands in `extra`; only its boolean members become claims.
#[derive(Debug, Deserialize)]
struct FirebaseIdClaims {
    sub: String,
    exp: i64,
    iat: i64,
    #[serde(default)]
    auth_time: Option<i64>,
    #[serde(flatten)]
    extra: serde_json::Map<String, serde_json::Value>,
}

/// Verifies Firebase ID tokens against Google's published signing keys.
///
/// Shared across requests; the key cache is the only interior state.
pub struct FirebaseVerifier {
    project_id: String,
    keys: KeyCache,
    validation: Validation,
    leeway_seconds: u64,
}

impl std::fmt::Debug for FirebaseVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseVerifier")
            .field("project_id", &self.project_id)
            .field("keys", &self.keys)
            .finish()
    }
}

impl FirebaseVerifier {
    pub fn new(project_id: impl Into<String>, keys: Arc<dyn KeySource>, leeway_seconds: u64) -> Self {
        let project_id = project_id.into();

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&[project_id.as_str()]);
        validation.set_issuer(&[format!("{ISSUER_PREFIX}{project_id}")]);
        validation.set_required_spec_claims(&["exp", "sub", "aud", "iss"]);
        validation.leeway = leeway_seconds;

        Self {
            project_id,
            keys: KeyCache::new(keys),
            validation,
            leeway_seconds,
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    fn check_times(&self, claims: &FirebaseIdClaims) -> Result<(), VerifyError> {
        let latest = Utc::now().timestamp() + self.leeway_seconds as i64;
        if claims.iat > latest {
            return Err(VerifyError::invalid("token issued in the future"));
        }
        if claims.auth_time.is_some_and(|at| at > latest) {
            return Err(VerifyError::invalid("authentication time is in the future"));
        }
        Ok(())
    }
}

#[async_trait]
impl TokenVerifier for FirebaseVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedToken, VerifyError> {
        let header = jsonwebtoken::decode_header(token)
            .map_err(|e| VerifyError::invalid(format!("malformed token: {e}")))?;

        if header.alg != Algorithm::RS256 {
            return Err(VerifyError::invalid(format!(
                "unexpected signing algorithm {:?}",
                header.alg
            )));
        }
        let kid = header
            .kid
            .ok_or_else(|| VerifyError::invalid("token has no key id"))?;

        let key = self
            .keys
            .key(&kid)
            .await
            .map_err(VerifyError::backend)?
            .ok_or_else(|| VerifyError::invalid("token signed by an unknown key"))?;

        let data = jsonwebtoken::decode::<FirebaseIdClaims>(token, &key, &self.validation)
            .map_err(|e| VerifyError::invalid(e.to_string()))?;
        let claims = data.claims;

        self.check_times(&claims)?;

        if claims.sub.is_empty() || claims.sub.len() > MAX_SUBJECT_LEN {
            return Err(VerifyError::invalid("token subject is empty or too long"));
        }

        Ok(VerifiedToken {
            expires_at: DateTime::<Utc>::from_timestamp(claims.exp, 0),
            claims: Claims::from_json_map(&claims.extra),
            subject_id: claims.sub,
        })
    }
}
