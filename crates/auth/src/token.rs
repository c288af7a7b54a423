use chrono::{DateTime, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shopledger_core::ShopId;

use crate::{JwtClaims, PrincipalId, Role};

/// Claims as they appear inside the signed token.
///
/// `iat`/`exp` are unix timestamps because that is what JWT validators expect
/// on the wire; [`JwtClaims`] keeps `DateTime<Utc>` for the rest of the
/// codebase.
#[derive(Debug, Serialize, Deserialize)]
struct WireClaims {
    sub: PrincipalId,
    shop_id: ShopId,
    roles: Vec<Role>,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("token rejected: {0}")]
    Rejected(#[from] jsonwebtoken::errors::Error),

    #[error("token carries an out-of-range timestamp")]
    InvalidTimestamp,
}

/// HS256 bearer-token codec over a shared secret.
///
/// The codec verifies signature and expiry; the remaining claim-level checks
/// live in [`crate::validate_claims`] so they stay deterministic and testable
/// without key material.
pub struct Hs256TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl Hs256TokenCodec {
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    pub fn encode(&self, claims: &JwtClaims) -> Result<String, TokenError> {
        let wire = WireClaims {
            sub: claims.sub,
            shop_id: claims.shop_id,
            roles: claims.roles.clone(),
            iat: claims.issued_at.timestamp(),
            exp: claims.expires_at.timestamp(),
        };

        Ok(encode(&Header::new(Algorithm::HS256), &wire, &self.encoding)?)
    }

    pub fn decode(&self, token: &str) -> Result<JwtClaims, TokenError> {
        let data = decode::<WireClaims>(token, &self.decoding, &self.validation)?;
        let wire = data.claims;

        Ok(JwtClaims {
            sub: wire.sub,
            shop_id: wire.shop_id,
            roles: wire.roles,
            issued_at: from_unix(wire.iat)?,
            expires_at: from_unix(wire.exp)?,
        })
    }
}

fn from_unix(secs: i64) -> Result<DateTime<Utc>, TokenError> {
    DateTime::from_timestamp(secs, 0).ok_or(TokenError::InvalidTimestamp)
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn sample_claims() -> JwtClaims {
        let now = Utc::now();
        JwtClaims {
            sub: PrincipalId::new(),
            shop_id: ShopId::new(),
            roles: vec![Role::new("admin"), Role::new("cashier")],
            issued_at: now - Duration::minutes(1),
            expires_at: now + Duration::hours(1),
        }
    }

    #[test]
    fn encode_then_decode_preserves_identity_and_roles() {
        let codec = Hs256TokenCodec::new(b"test-secret");
        let claims = sample_claims();

        let token = codec.encode(&claims).unwrap();
        let decoded = codec.decode(&token).unwrap();

        assert_eq!(decoded.sub, claims.sub);
        assert_eq!(decoded.shop_id, claims.shop_id);
        assert_eq!(decoded.roles, claims.roles);
        // Sub-second precision is dropped on the wire.
        assert_eq!(decoded.issued_at.timestamp(), claims.issued_at.timestamp());
        assert_eq!(
            decoded.expires_at.timestamp(),
            claims.expires_at.timestamp()
        );
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let codec = Hs256TokenCodec::new(b"test-secret");
        let other = Hs256TokenCodec::new(b"other-secret");

        let token = codec.encode(&sample_claims()).unwrap();
        assert!(other.decode(&token).is_err());
    }

    #[test]
    fn expired_token_is_rejected_by_the_codec() {
        let codec = Hs256TokenCodec::new(b"test-secret");
        let now = Utc::now();
        let claims = JwtClaims {
            expires_at: now - Duration::hours(1),
            issued_at: now - Duration::hours(2),
            ..sample_claims()
        };

        let token = codec.encode(&claims).unwrap();
        assert!(codec.decode(&token).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let codec = Hs256TokenCodec::new(b"test-secret");
        let mut token = codec.encode(&sample_claims()).unwrap();
        token.push('x');

        assert!(codec.decode(&token).is_err());
    }
}
