/// Factory: build `AuthService` from application `Config`.
use std::sync::Arc;

use thiserror::Error;

use crate::config::Config;
use crate::services::auth::credentials::{CredentialsError, FirebaseCredentials};
use crate::services::auth::keys::{HttpKeySource, KeySourceError};
use crate::services::auth::{AuthService, FirebaseVerifier};

#[derive(Debug, Error)]
pub enum AuthSetupError {
    #[error(transparent)]
    Credentials(#[from] CredentialsError),
    #[error("could not build signing-key client")]
    KeySource(#[from] KeySourceError),
    #[error("no firebase project id configured")]
    MissingProjectId,
}

pub fn build_auth_service(config: &Config) -> Result<Arc<AuthService>, AuthSetupError> {
    // The credentials file is a development-only input; elsewhere the
    // project comes from the ambient environment.
    let credentials = match &config.firebase_creds_file {
        Some(path) if config.app_env.is_development() => {
            let creds = FirebaseCredentials::from_file(path)?;
            tracing::info!(
                path = %path.display(),
                project_id = %creds.project_id,
                "loaded local firebase credentials"
            );
            Some(creds)
        }
        _ => None,
    };

    let project_id = config
        .firebase_project_id
        .clone()
        .or_else(|| credentials.map(|c| c.project_id))
        .ok_or(AuthSetupError::MissingProjectId)?;

    let keys = HttpKeySource::new(config.firebase_jwks_url.clone(), config.verify_timeout)?;
    let verifier = FirebaseVerifier::new(project_id, Arc::new(keys), config.token_leeway_seconds);

    Ok(Arc::new(AuthService::new(
        Arc::new(verifier),
        config.app_env,
        config.verify_timeout,
    )))
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use super::*;
    use crate::config::{AppEnv, DEFAULT_JWKS_URL};

    fn config(app_env: AppEnv) -> Config {
        Config {
            addr: "127.0.0.1:0".parse().unwrap(),
            app_env,
            firebase_creds_file: None,
            firebase_project_id: None,
            firebase_jwks_url: DEFAULT_JWKS_URL.parse().unwrap(),
            verify_timeout: Duration::from_secs(1),
            token_leeway_seconds: 60,
        }
    }

    fn creds_file(project_id: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("auth-oracle-creds-{project_id}.json"));
        let mut file = std::fs::File::create(&path).unwrap();
        write!(
            file,
            r#"{{"type":"service_account","project_id":"{project_id}","client_email":"x@{project_id}.iam.gserviceaccount.com"}}"#
        )
        .unwrap();
        path
    }

    #[test]
    fn missing_project_id_fails_setup() {
        let err = build_auth_service(&config(AppEnv::Production)).unwrap_err();
        assert!(matches!(err, AuthSetupError::MissingProjectId));
    }

    #[test]
    fn explicit_project_id_builds_service() {
        let mut config = config(AppEnv::Production);
        config.firebase_project_id = Some("demo".to_string());

        let auth = build_auth_service(&config).unwrap();
        assert!(auth.app_env().is_production());
        assert_eq!(auth.verify_timeout(), Duration::from_secs(1));
    }

    #[test]
    fn development_falls_back_to_credentials_file() {
        let mut config = config(AppEnv::Development);
        config.firebase_creds_file = Some(creds_file("dev-fallback"));
        assert!(build_auth_service(&config).is_ok());
    }

    #[test]
    fn credentials_file_is_ignored_outside_development() {
        let mut config = config(AppEnv::Production);
        config.firebase_creds_file = Some(creds_file("prod-ignored"));
        let err = build_auth_service(&config).unwrap_err();
        assert!(matches!(err, AuthSetupError::MissingProjectId));
    }
}
