//! Typed authorization claims and the all-of / any-of checks over them.
//!
//! A claim grants access only when it is present *and* `true`. A claim that
//! exists with value `false` is indistinguishable from an absent one for
//! every check in this module.

use std::collections::BTreeMap;

use crate::error::AuthError;

/// Claim name → granted flag, as decoded from a verified identity token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Claims(BTreeMap<String, bool>);

impl Claims {
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Keeps the boolean members of a decoded token payload and drops the
    /// rest. Non-boolean values never grant anything.
    pub fn from_json_map(map: &serde_json::Map<String, serde_json::Value>) -> Self {
        map.iter()
            .filter_map(|(name, value)| value.as_bool().map(|b| (name.clone(), b)))
            .collect()
    }

    pub fn insert(&mut self, name: impl Into<String>, granted: bool) -> Option<bool> {
        self.0.insert(name.into(), granted)
    }

    pub fn is_granted(&self, name: &str) -> bool {
        self.0.get(name).copied().unwrap_or(false)
    }

    pub fn has_all<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().all(|name| self.is_granted(name.as_ref()))
    }

    pub fn has_any<S: AsRef<str>>(&self, names: &[S]) -> bool {
        names.iter().any(|name| self.is_granted(name.as_ref()))
    }

    pub fn require_all<S: AsRef<str>>(&self, names: &[S]) -> Result<(), AuthError> {
        if self.has_all(names) {
            return Ok(());
        }
        Err(AuthError::forbidden(
            format!("access to resource requires claims {}", quote_list(names)),
            names,
        ))
    }

    pub fn require_any<S: AsRef<str>>(&self, names: &[S]) -> Result<(), AuthError> {
        if self.has_any(names) {
            return Ok(());
        }
        Err(AuthError::forbidden(
            format!("access to resource requires any claim {}", quote_list(names)),
            names,
        ))
    }

    /// Names of granted claims, sorted. Empty (never absent) when nothing is granted.
    pub fn granted(&self) -> Vec<String> {
        self.0
            .iter()
            .filter(|(_, granted)| **granted)
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl<K: Into<String>> FromIterator<(K, bool)> for Claims {
    fn from_iter<I: IntoIterator<Item = (K, bool)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

fn quote_list<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|n| format!("'{}'", n.as_ref()))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::error::AuthErrorKind;

    fn admin_not_beta() -> Claims {
        Claims::from_iter([("admin", true), ("beta", false)])
    }

    #[test]
    fn all_of_requires_every_claim_truthy() {
        let claims = admin_not_beta();
        assert!(claims.has_all(&["admin"]));
        assert!(!claims.has_all(&["admin", "beta"]));
        assert!(!claims.has_all(&["admin", "missing"]));
    }

    #[test]
    fn any_of_ignores_falsy_claims() {
        let claims = admin_not_beta();
        assert!(claims.has_any(&["beta", "admin"]));
        assert!(!claims.has_any(&["beta"]));
        assert!(!claims.has_any(&["missing"]));
    }

    #[test]
    fn granted_lists_only_truthy_claims() {
        assert_eq!(admin_not_beta().granted(), vec!["admin".to_string()]);
        assert!(Claims::new().granted().is_empty());
    }

    #[test]
    fn const_empty_set_grants_nothing() {
        static NONE: Claims = Claims::new();
        assert_eq!(NONE, Claims::default());
        assert!(!NONE.has_any(&["admin"]));
    }

    #[test]
    fn vacuous_all_of_succeeds() {
        let empty: [&str; 0] = [];
        assert!(Claims::new().require_all(&empty).is_ok());
        assert!(admin_not_beta().require_all(&empty).is_ok());
    }

    #[test]
    fn vacuous_any_of_fails_forbidden() {
        let empty: [&str; 0] = [];
        let err = admin_not_beta().require_any(&empty).unwrap_err();
        assert_eq!(err.kind(), AuthErrorKind::Forbidden);
    }

    #[test]
    fn require_all_lists_required_claims() {
        let err = admin_not_beta().require_all(&["admin", "beta"]).unwrap_err();
        assert_eq!(err.kind(), AuthErrorKind::Forbidden);
        assert_eq!(err.message(), "access to resource requires claims 'admin', 'beta'");
        match err {
            AuthError::Forbidden { required, .. } => assert_eq!(required, vec!["admin", "beta"]),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn require_any_message() {
        let err = admin_not_beta().require_any(&["beta", "staff"]).unwrap_err();
        assert_eq!(err.message(), "access to resource requires any claim 'beta', 'staff'");
    }

    #[test]
    fn from_json_map_keeps_booleans_only() {
        let payload = json!({
            "admin": true,
            "beta": false,
            "role": "admin",
            "level": 3,
            "firebase": { "sign_in_provider": "password" },
        });
        let claims = Claims::from_json_map(payload.as_object().unwrap());
        assert_eq!(claims.len(), 2);
        assert!(claims.is_granted("admin"));
        assert!(!claims.is_granted("beta"));
        assert!(!claims.is_granted("role"));
    }
}
