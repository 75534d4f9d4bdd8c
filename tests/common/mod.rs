#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use auth_oracle::app::build_router;
use auth_oracle::config::AppEnv;
use auth_oracle::state::AppState;
use auth_oracle::{AuthService, Claims, TokenVerifier, VerifiedToken, VerifyError};
use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response, header};
use http_body_util::BodyExt;

/// Accepts tokens of the form `<subject>[:claim[,claim...]]`, prefixed by
/// `ok.`; anything else is rejected. `down` simulates a dead backend.
pub struct FakeVerifier {
    pub delay: Duration,
}

#[async_trait]
impl TokenVerifier for FakeVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedToken, VerifyError> {
        tokio::time::sleep(self.delay).await;
        if token == "down" {
            let io = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
            return Err(VerifyError::backend(io));
        }
        let body = token
            .strip_prefix("ok.")
            .ok_or_else(|| VerifyError::invalid("signature mismatch"))?;
        let (subject, claims) = body.split_once(':').unwrap_or((body, ""));
        let claims = claims
            .split(',')
            .filter(|c| !c.is_empty())
            .map(|c| match c.strip_prefix('!') {
                Some(name) => (name.to_string(), false),
                None => (c.to_string(), true),
            })
            .collect::<Claims>();
        Ok(VerifiedToken {
            subject_id: subject.to_string(),
            claims,
            expires_at: None,
        })
    }
}

pub fn app_with_delay(delay: Duration) -> Router {
    let auth = Arc::new(AuthService::new(
        Arc::new(FakeVerifier { delay }),
        AppEnv::Test,
        Duration::from_secs(2),
    ));
    build_router(AppState::new(auth))
}

pub fn app() -> Router {
    app_with_delay(Duration::ZERO)
}

pub fn get(path: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::get(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

pub async fn json(resp: Response<Body>) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
