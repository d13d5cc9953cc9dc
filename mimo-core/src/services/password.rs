//! Salted password hashing
//!
//! New hashes are Argon2id PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`),
//! so the salt and parameters travel with the stored value. Credential files
//! written by earlier versions of the app hold bcrypt hashes (`$2b$12$...`);
//! those still verify and are replaced on the next successful login.

use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use rand::Rng;

use crate::domain::result::{Error, Result};

/// Hash `plain` with a fresh random salt
pub fn hash_password(plain: &str) -> Result<String> {
    // 16 random bytes, like the key-derivation salts elsewhere
    let salt_bytes: [u8; 16] = rand::thread_rng().gen();
    let salt = SaltString::encode_b64(&salt_bytes)
        .map_err(|e| Error::storage(format!("failed to encode salt: {}", e)))?;

    Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| Error::storage(format!("failed to hash password: {}", e)))
}

const BCRYPT_PREFIXES: &[&str] = &["$2a$", "$2b$", "$2y$"];

fn is_bcrypt(stored_hash: &str) -> bool {
    BCRYPT_PREFIXES.iter().any(|p| stored_hash.starts_with(p))
}

/// Check `plain` against a stored hash
///
/// Fails closed: an empty, truncated or otherwise unparsable hash is a
/// mismatch, never an error.
pub fn verify_password(plain: &str, stored_hash: &str) -> bool {
    if is_bcrypt(stored_hash) {
        return bcrypt::verify(plain, stored_hash).unwrap_or(false);
    }
    match PasswordHash::new(stored_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(plain.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

/// True when a verified hash should be replaced with a fresh Argon2id one
pub fn needs_rehash(stored_hash: &str) -> bool {
    is_bcrypt(stored_hash)
}
