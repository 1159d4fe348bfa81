use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::{Digest, Sha256};

use crate::error::app_error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies compact, tamper-evident tokens of the form
/// `base64url(claims JSON) "." base64url(HMAC-SHA256 tag)`.
///
/// Claims are opaque to the codec except for the `exp` unix timestamp it
/// injects at signing and checks at verification. Expiry is exact; there is
/// no skew window. Verification is pure and side-effect free.
#[derive(Clone)]
pub struct TokenCodec {
    key: Vec<u8>,
}

#[derive(Serialize, serde::Deserialize)]
struct Envelope<T> {
    exp: i64,
    #[serde(flatten)]
    claims: T,
}

impl TokenCodec {
    pub fn new(signing_secret: &str) -> Self {
        Self {
            key: signing_secret.as_bytes().to_vec(),
        }
    }

    pub fn sign<T: Serialize>(&self, claims: &T, ttl: Duration) -> Result<String, AppError> {
        let envelope = serde_json::to_vec(&Envelope {
            exp: (Utc::now() + ttl).timestamp(),
            claims,
        })
        .map_err(|e| AppError::TokenEncoding {
            message: format!("Failed to encode token claims: {e}"),
        })?;

        let payload = URL_SAFE_NO_PAD.encode(&envelope);
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length");
        mac.update(payload.as_bytes());
        let tag = URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes());

        Ok(format!("{payload}.{tag}"))
    }

    /// Fails with the uniform gate error on a bad tag, a malformed token, or
    /// a passed expiry, without distinguishing which.
    pub fn verify<T: DeserializeOwned>(&self, token: &str) -> Result<T, AppError> {
        let (payload, tag) = token.split_once('.').ok_or(AppError::AuthenticationFailed)?;

        let tag = URL_SAFE_NO_PAD
            .decode(tag)
            .map_err(|_| AppError::AuthenticationFailed)?;
        let mut mac = HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length");
        mac.update(payload.as_bytes());
        // Constant-time tag comparison.
        mac.verify_slice(&tag).map_err(|_| AppError::AuthenticationFailed)?;

        let claims = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| AppError::AuthenticationFailed)?;
        let envelope: Envelope<T> =
            serde_json::from_slice(&claims).map_err(|_| AppError::AuthenticationFailed)?;

        if envelope.exp <= Utc::now().timestamp() {
            return Err(AppError::AuthenticationFailed);
        }

        Ok(envelope.claims)
    }
}

/// Generate an opaque random secret: 40 bytes of entropy, hex encoded.
/// Used for session secrets, verification tokens and reset tokens.
pub fn generate_secret() -> String {
    let mut bytes = [0u8; 40];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// One-way digest for tokens stored server-side. Both the verification token
/// and the reset token are persisted only as this hash.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::token::{AccessClaims, RefreshClaims, TokenUser};
    use crate::models::user::Role;
    use uuid::Uuid;

    fn codec() -> TokenCodec {
        TokenCodec::new("test-signing-secret")
    }

    fn identity() -> TokenUser {
        TokenUser {
            user_id: Uuid::new_v4(),
            name: "peter".to_string(),
            role: Role::User,
        }
    }

    #[test]
    fn sign_then_verify_round_trips_claims() {
        let codec = codec();
        let user = identity();
        let token = codec
            .sign(&AccessClaims { user: user.clone() }, Duration::minutes(15))
            .unwrap();
        let claims: AccessClaims = codec.verify(&token).unwrap();
        assert_eq!(claims.user, user);
    }

    #[test]
    fn refresh_claims_carry_the_session_secret() {
        let codec = codec();
        let token = codec
            .sign(
                &RefreshClaims {
                    user: identity(),
                    refresh_secret: "opaque".to_string(),
                },
                Duration::hours(25),
            )
            .unwrap();
        let claims: RefreshClaims = codec.verify::<RefreshClaims>(&token).unwrap();
        assert_eq!(claims.refresh_secret, "opaque");
    }

    #[test]
    fn expired_token_is_rejected() {
        let codec = codec();
        let token = codec
            .sign(&AccessClaims { user: identity() }, Duration::minutes(-1))
            .unwrap();
        assert!(matches!(
            codec.verify::<AccessClaims>(&token),
            Err(AppError::AuthenticationFailed)
        ));
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let codec = codec();
        let token = codec
            .sign(&AccessClaims { user: identity() }, Duration::minutes(15))
            .unwrap();
        let (payload, tag) = token.split_once('.').unwrap();
        let mut forged = payload.to_string();
        forged.push('A');
        assert!(codec.verify::<AccessClaims>(&format!("{forged}.{tag}")).is_err());
    }

    #[test]
    fn token_signed_with_other_key_is_rejected() {
        let token = codec()
            .sign(&AccessClaims { user: identity() }, Duration::minutes(15))
            .unwrap();
        let other = TokenCodec::new("a-different-secret");
        assert!(other.verify::<AccessClaims>(&token).is_err());
    }

    #[test]
    fn malformed_tokens_are_rejected() {
        let codec = codec();
        for garbage in ["", "no-dot-here", "a.b.c", "!!!.???"] {
            assert!(codec.verify::<AccessClaims>(garbage).is_err(), "{garbage:?} accepted");
        }
    }

    #[test]
    fn generated_secrets_are_unique_and_hex() {
        let a = generate_secret();
        let b = generate_secret();
        assert_ne!(a, b);
        assert_eq!(a.len(), 80);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn sha256_hex_is_deterministic_and_distinct_from_input() {
        let token = generate_secret();
        let hash = sha256_hex(&token);
        assert_eq!(hash, sha256_hex(&token));
        assert_ne!(hash, token);
        assert_eq!(hash.len(), 64);
    }
}
