//! Password hashing
//!
//! Secure password hashing and verification using Argon2id with the
//! crate's default parameters and a random salt per hash.

use anyhow::{Context, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Hash a password using Argon2id.
///
/// Returns the hash in PHC string format (algorithm, parameters, salt,
/// and hash in one string).
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("Failed to hash password: {}", e))
        .context("Password hashing failed")?;

    Ok(password_hash.to_string())
}

/// Verify a password against a stored PHC-format hash.
///
/// Returns `Ok(false)` for a wrong password; an error only when the
/// stored hash itself cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(hash)
        .map_err(|e| anyhow::anyhow!("Invalid password hash format: {}", e))
        .context("Failed to parse password hash")?;

    let argon2 = Argon2::default();

    match argon2.verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(anyhow::anyhow!("Password verification failed: {}", e))
            .context("Password verification error"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_produces_argon2id_hash() {
        let hash = hash_password("swordfish").expect("Failed to hash password");
        assert!(hash.starts_with("$argon2id$"), "Hash should use Argon2id");
    }

    #[test]
    fn test_same_password_hashes_differently() {
        let hash1 = hash_password("swordfish").expect("Failed to hash password");
        let hash2 = hash_password("swordfish").expect("Failed to hash password");

        // Different salts should produce different hashes
        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_verify_round_trip() {
        let hash = hash_password("swordfish").expect("Failed to hash password");

        assert!(verify_password("swordfish", &hash).unwrap());
        assert!(!verify_password("sword fish", &hash).unwrap());
    }

    #[test]
    fn test_verify_invalid_hash_is_error() {
        let result = verify_password("swordfish", "not-a-phc-string");
        assert!(result.is_err());
    }

    #[test]
    fn test_unicode_password_round_trip() {
        let password = "contraseña-日本語-🔐";
        let hash = hash_password(password).expect("Failed to hash password");
        assert!(verify_password(password, &hash).unwrap());
    }

    #[test]
    fn test_hash_does_not_leak_password() {
        let hash = hash_password("my_secret_password").expect("Failed to hash password");
        assert!(!hash.contains("my_secret_password"));
    }
}
