//! JWT minting for clouds that authenticate MQTT connections with a signed
//! token as the password field (spec.md §4.3).

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use serde::Serialize;

use crate::error::{TransportError, TransportResult};

#[derive(Debug, Serialize)]
struct Claims {
    iat: i64,
    exp: i64,
    aud: String,
}

/// Sign a JWT valid from `now` for `ttl`, audience-scoped to `aud` (the
/// cloud project/tenant id). Returns the encoded token and its expiry.
pub fn mint(
    private_key_pem: &[u8],
    aud: &str,
    ttl: Duration,
    now: DateTime<Utc>,
) -> TransportResult<(String, DateTime<Utc>)> {
    let expiry = now + ttl;
    let claims = Claims {
        iat: now.timestamp(),
        exp: expiry.timestamp(),
        aud: aud.to_string(),
    };
    let key = EncodingKey::from_rsa_pem(private_key_pem)
        .map_err(|e| TransportError::Credential(format!("invalid RSA key: {e}")))?;
    let token = encode(&Header::new(Algorithm::RS256), &claims, &key)
        .map_err(|e| TransportError::Credential(format!("JWT sign failed: {e}")))?;
    Ok((token, expiry))
}
