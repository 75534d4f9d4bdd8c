use std::fmt;

use axum::http::{HeaderMap, Method, Uri, Version, header, request::Parts};

/// Owned copy of the request line and headers an oracle was built from.
///
/// Extensions only hold `'static` values, so the oracle keeps this snapshot
/// rather than a borrow of the request. It is dropped with the oracle when
/// the request finishes.
#[derive(Clone)]
pub struct RequestHead {
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub headers: HeaderMap,
}

impl RequestHead {
    pub fn from_parts(parts: &Parts) -> Self {
        Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            version: parts.version,
            headers: parts.headers.clone(),
        }
    }
}

// Headers are listed by name only so bearer tokens never reach the logs.
impl fmt::Debug for RequestHead {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestHead")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("version", &self.version)
            .field("headers", &self.headers.keys().collect::<Vec<_>>())
            .field("has_authorization", &self.headers.contains_key(header::AUTHORIZATION))
            .finish()
    }
}
