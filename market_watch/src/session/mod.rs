//! Session expiry: the countdown state machine and the task that drives it.

pub mod monitor;
pub mod tracker;

pub use monitor::SessionMonitor;
pub use tracker::{ExpiryInfo, ExpiryTracker, SessionPhase, TickOutcome, format_remaining};

use chrono::{DateTime, Utc};
use jsonwebtoken::dangerous::insecure_decode;
use serde::Deserialize;
use std::str::FromStr;

/// Where a countdown starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpiryAnchor {
    /// The first tick that observes a token
    #[default]
    FirstObservation,
    /// The token's `iat` claim, falling back to first observation when absent
    IssuedAtClaim,
}

impl FromStr for ExpiryAnchor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "first-observation" | "first_observation" | "observation" => {
                Ok(Self::FirstObservation)
            }
            "issued-at" | "issued_at" | "iat" => Ok(Self::IssuedAtClaim),
            other => Err(format!(
                "Unknown anchor {other:?}; expected first-observation or issued-at"
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IssuedAt {
    iat: Option<i64>,
}

/// Read the `iat` claim of a JWT without verifying its signature.
///
/// The client cannot verify the signature; the claim is only used to
/// place the countdown, never to grant access.
pub fn token_issued_at(token: &str) -> Option<DateTime<Utc>> {
    match insecure_decode::<IssuedAt>(token) {
        Ok(data) => data
            .claims
            .iat
            .and_then(|iat| DateTime::from_timestamp(iat, 0)),
        Err(e) => {
            log::debug!("Token has no readable iat claim: {}", e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{EncodingKey, Header, encode};
    use serde::Serialize;

    #[derive(Serialize)]
    struct Claims {
        sub: String,
        iat: i64,
    }

    #[test]
    fn test_anchor_parsing() {
        assert_eq!(
            "first-observation".parse::<ExpiryAnchor>(),
            Ok(ExpiryAnchor::FirstObservation)
        );
        assert_eq!("IAT".parse::<ExpiryAnchor>(), Ok(ExpiryAnchor::IssuedAtClaim));
        assert!("server".parse::<ExpiryAnchor>().is_err());
    }

    #[test]
    fn test_issued_at_read_without_key() {
        let token = encode(
            &Header::default(),
            &Claims {
                sub: "analyst_1".to_string(),
                iat: 1_700_000_000,
            },
            &EncodingKey::from_secret(b"server-side-secret"),
        )
        .unwrap();

        let iat = token_issued_at(&token).unwrap();
        assert_eq!(iat.timestamp(), 1_700_000_000);
    }

    #[test]
    fn test_expired_token_still_yields_issued_at() {
        #[derive(Serialize)]
        struct Expired {
            iat: i64,
            exp: i64,
        }
        let token = encode(
            &Header::default(),
            &Expired { iat: 1_000, exp: 2_000 },
            &EncodingKey::from_secret(b"server-side-secret"),
        )
        .unwrap();

        assert_eq!(token_issued_at(&token).unwrap().timestamp(), 1_000);
    }

    #[test]
    fn test_opaque_token_has_no_issued_at() {
        assert!(token_issued_at("opaque-session-token").is_none());
    }
}
