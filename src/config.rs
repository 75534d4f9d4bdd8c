/*
 * Responsibility
 * - Load settings from the environment (.env honoured via dotenvy)
 * - Validate them up front so a misconfigured service fails to start
 * - Decide dev/test/prod mode (credentials file is a development-only input)
 */
use std::fmt;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

pub const DEFAULT_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Development,
    Test,
    Production,
}

impl AppEnv {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "test" => Self::Test,
            _ => Self::Development,
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid(&'static str),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "missing configuration: {}", key),
            ConfigError::Invalid(key) => write!(f, "invalid configuration: {}", key),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone)]
pub struct Config {
    pub addr: SocketAddr,
    pub app_env: AppEnv,

    /// Service-account JSON; only read in development.
    pub firebase_creds_file: Option<PathBuf>,
    /// Explicit project id. In development it may be left unset and taken
    /// from the credentials file instead.
    pub firebase_project_id: Option<String>,
    pub firebase_jwks_url: Url,

    pub verify_timeout: Duration,
    pub token_leeway_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. `from_env` is this over
    /// the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port: u16 = match lookup("PORT") {
            Some(raw) => raw.trim().parse().map_err(|_| ConfigError::Invalid("PORT"))?,
            None => 3000,
        };

        let addr: SocketAddr = SocketAddr::from_str(&format!("0.0.0.0:{}", port))
            .map_err(|_| ConfigError::Invalid("PORT"))?;

        let app_env = lookup("APP_ENV")
            .map(|raw| AppEnv::parse(&raw))
            .unwrap_or(AppEnv::Development);

        let firebase_creds_file = if app_env.is_development() {
            let path = lookup("FIREBASE_CREDS_FILE")
                .filter(|s| !s.trim().is_empty())
                .ok_or(ConfigError::Missing("FIREBASE_CREDS_FILE"))?;
            Some(PathBuf::from(path))
        } else {
            None
        };

        let firebase_project_id = lookup("FIREBASE_PROJECT_ID")
            .or_else(|| lookup("GOOGLE_CLOUD_PROJECT"))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        if firebase_project_id.is_none() && !app_env.is_development() {
            return Err(ConfigError::Missing("FIREBASE_PROJECT_ID"));
        }

        let firebase_jwks_url = match lookup("FIREBASE_JWKS_URL") {
            Some(raw) => Url::parse(raw.trim()).map_err(|_| ConfigError::Invalid("FIREBASE_JWKS_URL"))?,
            None => Url::parse(DEFAULT_JWKS_URL).map_err(|_| ConfigError::Invalid("FIREBASE_JWKS_URL"))?,
        };

        let verify_timeout_ms = match lookup("AUTH_VERIFY_TIMEOUT_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|ms| *ms > 0)
                .ok_or(ConfigError::Invalid("AUTH_VERIFY_TIMEOUT_MS"))?,
            None => 5_000,
        };

        let token_leeway_seconds = match lookup("AUTH_TOKEN_LEEWAY_SECONDS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::Invalid("AUTH_TOKEN_LEEWAY_SECONDS"))?,
            None => 60,
        };

        Ok(Self {
            addr,
            app_env,
            firebase_creds_file,
            firebase_project_id,
            firebase_jwks_url,
            verify_timeout: Duration::from_millis(verify_timeout_ms),
            token_leeway_seconds,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn app_env_parsing() {
        assert_eq!(AppEnv::parse("PROD"), AppEnv::Production);
        assert_eq!(AppEnv::parse("production"), AppEnv::Production);
        assert_eq!(AppEnv::parse("test"), AppEnv::Test);
        assert_eq!(AppEnv::parse("anything"), AppEnv::Development);
    }

    #[test]
    fn development_requires_creds_file() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("FIREBASE_CREDS_FILE")));
    }

    #[test]
    fn development_defaults() {
        let config = Config::from_lookup(lookup(&[("FIREBASE_CREDS_FILE", "/tmp/creds.json")])).unwrap();
        assert_eq!(config.app_env, AppEnv::Development);
        assert_eq!(config.addr.port(), 3000);
        assert_eq!(config.firebase_creds_file, Some(PathBuf::from("/tmp/creds.json")));
        assert_eq!(config.firebase_project_id, None);
        assert_eq!(config.firebase_jwks_url.as_str(), DEFAULT_JWKS_URL);
        assert_eq!(config.verify_timeout, Duration::from_secs(5));
        assert_eq!(config.token_leeway_seconds, 60);
    }

    #[test]
    fn production_ignores_creds_file_and_needs_project() {
        let err = Config::from_lookup(lookup(&[
            ("APP_ENV", "production"),
            ("FIREBASE_CREDS_FILE", "/tmp/creds.json"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Missing("FIREBASE_PROJECT_ID")));

        let config = Config::from_lookup(lookup(&[
            ("APP_ENV", "production"),
            ("FIREBASE_CREDS_FILE", "/tmp/creds.json"),
            ("GOOGLE_CLOUD_PROJECT", "demo-project"),
        ]))
        .unwrap();
        assert_eq!(config.firebase_creds_file, None);
        assert_eq!(config.firebase_project_id.as_deref(), Some("demo-project"));
    }

    #[test]
    fn rejects_zero_timeout() {
        let err = Config::from_lookup(lookup(&[
            ("APP_ENV", "test"),
            ("FIREBASE_PROJECT_ID", "p"),
            ("AUTH_VERIFY_TIMEOUT_MS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("AUTH_VERIFY_TIMEOUT_MS")));
    }

    #[test]
    fn malformed_leeway_is_invalid_not_defaulted() {
        for raw in ["soon", "-5", ""] {
            let err = Config::from_lookup(lookup(&[
                ("APP_ENV", "test"),
                ("FIREBASE_PROJECT_ID", "p"),
                ("AUTH_TOKEN_LEEWAY_SECONDS", raw),
            ]))
            .unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid("AUTH_TOKEN_LEEWAY_SECONDS")),
                "value {raw:?}"
            );
        }

        let config = Config::from_lookup(lookup(&[
            ("APP_ENV", "test"),
            ("FIREBASE_PROJECT_ID", "p"),
            ("AUTH_TOKEN_LEEWAY_SECONDS", " 0 "),
        ]))
        .unwrap();
        assert_eq!(config.token_leeway_seconds, 0);
    }
}
