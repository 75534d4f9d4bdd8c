pub mod credentials;
pub mod factory;
pub mod firebase;
pub mod keys;
pub mod verifier;

use std::sync::Arc;
use std::time::Duration;

use crate::config::AppEnv;
use crate::oracle::FirebaseOracle;

pub use credentials::FirebaseCredentials;
pub use factory::build_auth_service;
pub use firebase::FirebaseVerifier;
pub use verifier::{TokenVerifier, VerifiedToken, VerifyError};

/// Everything the oracle middleware needs, built once at start-up.
///
/// Cheap to share: the verifier handle is reference counted and read-only.
#[derive(Clone)]
pub struct AuthService {
    verifier: Arc<dyn TokenVerifier>,
    app_env: AppEnv,
    verify_timeout: Duration,
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("app_env", &self.app_env)
            .field("verify_timeout", &self.verify_timeout)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(verifier: Arc<dyn TokenVerifier>, app_env: AppEnv, verify_timeout: Duration) -> Self {
        Self {
            verifier,
            app_env,
            verify_timeout,
        }
    }

    pub fn verifier(&self) -> &Arc<dyn TokenVerifier> {
        &self.verifier
    }

    pub fn app_env(&self) -> AppEnv {
        self.app_env
    }

    pub fn verify_timeout(&self) -> Duration {
        self.verify_timeout
    }

    /// A fresh, uninitialized default oracle for one request.
    pub fn new_oracle(&self) -> FirebaseOracle {
        FirebaseOracle::new(self.verifier.clone(), self.app_env)
    }
}
