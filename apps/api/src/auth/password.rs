use std::sync::Arc;

use argon2::{
    password_hash::{self, rand_core::OsRng, SaltString},
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
};

#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("password does not match")]
    Mismatch,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Argon2id hashing, run on the blocking pool.
#[derive(Debug, Clone, Default)]
pub struct PasswordService {
    argon2: Arc<Argon2<'static>>,
}

impl PasswordService {
    pub async fn hash(&self, password: String) -> anyhow::Result<String> {
        let argon2 = Arc::clone(&self.argon2);
        let salt = SaltString::generate(&mut OsRng);
        tokio::task::spawn_blocking(move || {
            argon2
                .hash_password(password.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|err| anyhow::anyhow!("failed to hash password: {err}"))
        })
        .await?
    }

    pub async fn verify(&self, password: String, hash: String) -> Result<(), PasswordError> {
        let argon2 = Arc::clone(&self.argon2);
        tokio::task::spawn_blocking(move || {
            let hash = PasswordHash::new(&hash)
                .map_err(|err| anyhow::anyhow!("stored password hash is malformed: {err}"))?;
            argon2
                .verify_password(password.as_bytes(), &hash)
                .map_err(|err| match err {
                    password_hash::Error::Password => PasswordError::Mismatch,
                    err => anyhow::anyhow!("failed to verify password: {err}").into(),
                })
        })
        .await
        .map_err(|err| PasswordError::Other(err.into()))?
    }
}

#[cfg(test)]
impl PasswordService {
    /// Minimal cost parameters so test suites stay fast.
    pub fn fast() -> Self {
        let params = argon2::Params::new(8, 1, 1, None).unwrap();
        Self {
            argon2: Arc::new(Argon2::new(
                argon2::Algorithm::Argon2id,
                argon2::Version::V0x13,
                params,
            )),
        }
    }
}
