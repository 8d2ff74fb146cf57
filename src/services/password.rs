//! Credential hashing collaborator (Argon2id). Hashing runs on the
//! blocking pool so the runtime is never stalled by a slow adaptive hash.

use argon2::{
    password_hash::{rand_core::OsRng, SaltString},
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher, PasswordVerifier, Version,
};
use once_cell::sync::Lazy;

#[derive(Debug)]
pub enum PasswordError {
    Unexpected,
}

// Verified in place of a real hash when the account lookup misses, so a
// login attempt against an unknown email costs the same as one against a
// known email.
static DUMMY_HASH: Lazy<String> =
    Lazy::new(|| hash_blocking("dummy-Sentinel!-not-a-real-credential").expect("static params"));

pub fn dummy_hash() -> String {
    DUMMY_HASH.clone()
}

pub async fn hash_password(plain: &str) -> Result<String, PasswordError> {
    let plain = plain.to_owned();
    tokio::task::spawn_blocking(move || hash_blocking(&plain))
        .await
        .map_err(|_| PasswordError::Unexpected)?
}

pub async fn verify_password(plain: &str, hash: &str) -> Result<bool, PasswordError> {
    let plain = plain.to_owned();
    let hash = hash.to_owned();
    tokio::task::spawn_blocking(move || {
        let parsed_hash = PasswordHash::new(&hash).map_err(|_| PasswordError::Unexpected)?;
        match Argon2::default().verify_password(plain.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(_) => Ok(false),
        }
    })
    .await
    .map_err(|_| PasswordError::Unexpected)?
}

fn hash_blocking(plain: &str) -> Result<String, PasswordError> {
    let argon2 = Argon2::new(
        Algorithm::Argon2id,
        Version::V0x13,
        Params::new(15000, 2, 1, None).map_err(|_| PasswordError::Unexpected)?,
    );
    let salt = SaltString::generate(&mut OsRng);
    Ok(argon2
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|_| PasswordError::Unexpected)?
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn verifies_matching_password() {
        let hash = hash_password("Correct-horse1!").await.unwrap();
        assert!(verify_password("Correct-horse1!", &hash).await.unwrap());
        assert!(!verify_password("wrong-password", &hash).await.unwrap());
    }

    #[tokio::test]
    async fn dummy_hash_parses_and_never_matches() {
        assert!(!verify_password("anything", &dummy_hash()).await.unwrap());
    }
}
