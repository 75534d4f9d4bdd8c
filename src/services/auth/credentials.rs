//! Service-account credentials, read from a local file in development mode.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CredentialsError {
    #[error("could not read credentials file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("credentials file is not valid service-account JSON")]
    Parse(#[from] serde_json::Error),
    #[error("credentials file has an empty project_id")]
    EmptyProjectId,
}

/// The parts of a service-account key file the verifier needs.
///
/// Private key material in the file is never deserialized.
#[derive(Debug, Clone, Deserialize)]
pub struct FirebaseCredentials {
    #[serde(rename = "type", default)]
    pub account_type: Option<String>,
    pub project_id: String,
    #[serde(default)]
    pub client_email: Option<String>,
}

impl FirebaseCredentials {
    pub fn from_file(path: &Path) -> Result<Self, CredentialsError> {
        let raw = std::fs::read_to_string(path).map_err(|source| CredentialsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, CredentialsError> {
        let creds: Self = serde_json::from_str(raw)?;
        if creds.project_id.trim().is_empty() {
            return Err(CredentialsError::EmptyProjectId);
        }
        Ok(creds)
    }
}
