use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::errors::MigrationError;

/// Hash a seed account password with Argon2id.
pub fn hash_password(email: &str, password: &str) -> Result<String, MigrationError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|err| MigrationError::PasswordHash {
            email: email.to_string(),
            message: err.to_string(),
        })
}

/// Check a plaintext password against a stored hash. Malformed hashes never verify.
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_then_verify() {
        let hash = hash_password("coach@example.com", "Coach#2024").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Coach#2024", &hash));
        assert!(!verify_password("wrong", &hash));
    }

    #[test]
    fn hashes_are_salted() {
        let first = hash_password("a@example.com", "same").unwrap();
        let second = hash_password("a@example.com", "same").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_hash_does_not_verify() {
        assert!(!verify_password("anything", "not-a-hash"));
    }
}
