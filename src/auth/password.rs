//! Password hashing.
//!
//! Passwords are stored as unsalted hex SHA-256 digests, the format existing
//! `users` tables already hold. Login compares digests in SQL.

use sha2::{Digest, Sha256};

/// Hex-encoded SHA-256 of the password bytes.
pub fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_matches_sha256_vector() {
        assert_eq!(
            hash_password("abc"),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_hash_is_lowercase_hex_of_fixed_width() {
        let digest = hash_password("correct horse battery staple");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_different_passwords_differ() {
        assert_ne!(hash_password("secret"), hash_password("Secret"));
    }
}
