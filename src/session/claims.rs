//! Reads the expiry of an access token without verifying its signature.
//!
//! The client never holds the signing secret; it only needs `exp` to decide
//! whether a stored token is still usable and when to refresh it.

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use jsonwebtoken::dangerous::insecure_decode;
use serde::Deserialize;

/// Seconds before expiry at which the access token is refreshed.
pub const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Deserialize)]
struct Claims {
    exp: i64,
}

/// Expiry instant of `token`, `None` when it cannot be decoded.
pub fn token_expiry(token: &str) -> Option<DateTime<Utc>> {
    let data = insecure_decode::<Claims>(token).ok()?;
    DateTime::from_timestamp(data.claims.exp, 0)
}

/// A token is live while its expiry lies strictly after `now`.
pub fn is_token_live(token: &str, now: DateTime<Utc>) -> bool {
    token_expiry(token).is_some_and(|exp| exp > now)
}

pub fn verify_token_live(token: &str) -> bool {
    is_token_live(token, Utc::now())
}

/// Time to wait before refreshing `token`, zero when the margin has passed.
pub fn refresh_delay(token: &str, now: DateTime<Utc>) -> Option<Duration> {
    let refresh_at = token_expiry(token)? - TimeDelta::seconds(REFRESH_MARGIN_SECS);
    Some((refresh_at - now).to_std().unwrap_or(Duration::ZERO))
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::Utc;
    use jsonwebtoken::{EncodingKey, Header, encode};

    /// Signed token expiring `secs` seconds from now.
    pub fn token_expiring_in(secs: i64) -> String {
        token_with_exp(Utc::now().timestamp() + secs)
    }

    pub fn token_with_exp(exp: i64) -> String {
        encode(
            &Header::default(),
            &serde_json::json!({ "exp": exp, "uid": 1 }),
            &EncodingKey::from_secret(b"server-secret"),
        )
        .expect("encodable claims")
    }
}
