use std::sync::Arc;

use async_trait::async_trait;
use axum::http::request::Parts;
use chrono::{DateTime, Utc};

use crate::claims::Claims;
use crate::config::AppEnv;
use crate::error::AuthError;
use crate::oracle::{Claimant, IdentityReader, Initializer, RequestHead, bearer_token};
use crate::services::auth::TokenVerifier;

static NO_CLAIMS: Claims = Claims::new();

#[derive(Debug)]
enum Identity {
    Pending,
    Anonymous,
    Authenticated {
        subject_id: String,
        claims: Claims,
        expires_at: Option<DateTime<Utc>>,
    },
}

/// The default oracle, backed by Firebase ID-token verification.
pub struct FirebaseOracle {
    verifier: Arc<dyn TokenVerifier>,
    app_env: AppEnv,
    request: Option<RequestHead>,
    initialized: bool,
    identity: Identity,
}

impl std::fmt::Debug for FirebaseOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseOracle")
            .field("app_env", &self.app_env)
            .field("request", &self.request)
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

impl FirebaseOracle {
    pub fn new(verifier: Arc<dyn TokenVerifier>, app_env: AppEnv) -> Self {
        Self {
            verifier,
            app_env,
            request: None,
            initialized: false,
            identity: Identity::Pending,
        }
    }

    /// Backend handle the oracle verified with.
    pub fn verifier(&self) -> &Arc<dyn TokenVerifier> {
        &self.verifier
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match &self.identity {
            Identity::Authenticated { expires_at, .. } => *expires_at,
            _ => None,
        }
    }

    /// Overrides the subject id for local testing.
    ///
    /// Refused in production. An empty id makes the oracle anonymous; any
    /// claims already held are kept for a non-empty one.
    pub fn set_subject_id(&mut self, subject_id: impl Into<String>) -> Result<(), AuthError> {
        if self.app_env.is_production() {
            tracing::warn!("attempt to override auth subject id in production");
            return Err(AuthError::bad_input(
                "POLICY_VIOLATION",
                "attempt to set auth id in production",
            ));
        }

        let subject_id = subject_id.into();
        let previous = std::mem::replace(&mut self.identity, Identity::Pending);
        self.identity = if subject_id.is_empty() {
            Identity::Anonymous
        } else {
            let (claims, expires_at) = match previous {
                Identity::Authenticated {
                    claims, expires_at, ..
                } => (claims, expires_at),
                _ => (Claims::new(), None),
            };
            Identity::Authenticated {
                subject_id,
                claims,
                expires_at,
            }
        };
        Ok(())
    }
}

#[async_trait]
impl Initializer for FirebaseOracle {
    async fn init_from_request(&mut self, parts: &Parts) -> Result<(), AuthError> {
        if self.initialized {
            return Err(AuthError::server("auth oracle already initialized"));
        }
        self.initialized = true;
        self.request = Some(RequestHead::from_parts(parts));

        let Some(token) = bearer_token(parts)? else {
            tracing::debug!("no authorization header; request is anonymous");
            self.identity = Identity::Anonymous;
            return Ok(());
        };

        let verified = self.verifier.verify(token).await.map_err(|err| {
            tracing::warn!(error = %err, "identity token verification failed");
            AuthError::from(err)
        })?;

        if verified.subject_id.is_empty() {
            return Err(AuthError::server("verifier accepted a token without a subject"));
        }

        tracing::debug!(subject_id = %verified.subject_id, "identity token verified");
        self.identity = Identity::Authenticated {
            subject_id: verified.subject_id,
            claims: verified.claims,
            expires_at: verified.expires_at,
        };
        Ok(())
    }
}

impl IdentityReader for FirebaseOracle {
    fn subject_id(&self) -> &str {
        match &self.identity {
            Identity::Authenticated { subject_id, .. } => subject_id,
            _ => "",
        }
    }

    fn require_authentication(&self) -> Result<(), AuthError> {
        match &self.identity {
            Identity::Authenticated { subject_id, .. } if !subject_id.is_empty() => Ok(()),
            Identity::Authenticated { .. } => Err(AuthError::server(
                "missing authorization id for authenticated user",
            )),
            Identity::Pending | Identity::Anonymous => Err(AuthError::unauthenticated(
                "non-authenticated user cannot access owned items",
            )),
        }
    }

    fn request(&self) -> Option<&RequestHead> {
        self.request.as_ref()
    }
}

impl Claimant for FirebaseOracle {
    fn claims(&self) -> &Claims {
        match &self.identity {
            Identity::Authenticated { claims, .. } => claims,
            _ => &NO_CLAIMS,
        }
    }
}
