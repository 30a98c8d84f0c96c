//! Credential model — long-lived username/password, or short-lived JWT.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Either a long-lived username/password pair or a short-lived signed token.
///
/// Invariant (spec.md §3): for the JWT variant, the refresh scheduler fires
/// at `expiry - refresh_slack`, with `refresh_slack <= jwt_expiration - 1h`.
/// This type only models the credential itself; the scheduler lives in
/// `bridge-credentials`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Credential {
    UsernamePassword { username: String, password: String },
    Jwt { token: String, expiry: DateTime<Utc> },
}

impl Credential {
    pub fn jwt(token: impl Into<String>, expiry: DateTime<Utc>) -> Self {
        Self::Jwt {
            token: token.into(),
            expiry,
        }
    }

    /// Seconds remaining until expiry, clamped to zero if already expired.
    pub fn seconds_until_expiry(&self, now: DateTime<Utc>) -> i64 {
        match self {
            Credential::Jwt { expiry, .. } => (*expiry - now).num_seconds().max(0),
            Credential::UsernamePassword { .. } => i64::MAX,
        }
    }

    pub fn is_jwt(&self) -> bool {
        matches!(self, Credential::Jwt { .. })
    }
}
