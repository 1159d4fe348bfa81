use argon2::{Algorithm, Argon2, Params, Version};
use password_hash::rand_core::OsRng;
use password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use std::sync::LazyLock;

use crate::error::app_error::AppError;

/// A real Argon2 hash generated once at startup, used as a timing decoy
/// so that requests for non-existent accounts take the same time as
/// requests for existing ones.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(b"dummy-never-matches", &salt)
        .expect("failed to generate dummy hash")
        .to_string()
});

/// Hashes and verifies user passwords. Every password-writing path calls
/// [`CredentialService::hash`] explicitly before persisting; nothing re-hashes
/// on other writes.
pub struct CredentialService {
    argon2: Argon2<'static>,
}

impl CredentialService {
    pub fn new(hash_cost: u32) -> Self {
        let argon2 = Params::new(Params::DEFAULT_M_COST, hash_cost, Params::DEFAULT_P_COST, None)
            .map(|params| Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
            .unwrap_or_else(|e| {
                tracing::warn!(hash_cost, error = %e, "invalid hash cost, falling back to Argon2 defaults");
                Argon2::default()
            });
        Self { argon2 }
    }

    /// One-way transform with a fresh random salt per call: the same plaintext
    /// yields a different digest every time, and all of them verify.
    pub fn hash(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = self.argon2.hash_password(password.as_bytes(), &salt)?;
        Ok(digest.to_string())
    }

    /// Never errors on mismatch, only returns false.
    pub fn verify(&self, password: &str, digest: &str) -> bool {
        match PasswordHash::new(digest) {
            Ok(parsed) => self.argon2.verify_password(password.as_bytes(), &parsed).is_ok(),
            Err(_) => false,
        }
    }

    /// Perform a throwaway verification against a prebuilt hash to equalize
    /// response timing regardless of whether the target account exists.
    pub fn dummy_verify(&self, password: &str) {
        if let Ok(hash) = PasswordHash::new(&DUMMY_HASH) {
            let _ = self.argon2.verify_password(password.as_bytes(), &hash);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_password_hashes_to_distinct_digests() {
        let service = CredentialService::new(2);
        let a = service.hash("hunter2-but-long").unwrap();
        let b = service.hash("hunter2-but-long").unwrap();
        assert_ne!(a, b);
        assert!(service.verify("hunter2-but-long", &a));
        assert!(service.verify("hunter2-but-long", &b));
    }

    #[test]
    fn wrong_password_fails_verification_without_error() {
        let service = CredentialService::new(2);
        let digest = service.hash("right-password").unwrap();
        assert!(!service.verify("wrong-password", &digest));
    }

    #[test]
    fn garbage_digest_fails_verification() {
        let service = CredentialService::new(2);
        assert!(!service.verify("whatever", "not-a-phc-string"));
    }

    #[test]
    fn invalid_cost_falls_back_to_defaults() {
        let service = CredentialService::new(0);
        let digest = service.hash("still-works").unwrap();
        assert!(service.verify("still-works", &digest));
    }
}
