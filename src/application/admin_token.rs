//! Shared-secret admin authentication.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AdminAuthError {
    #[error("admin token missing")]
    Missing,
    #[error("admin token invalid")]
    Invalid,
}

/// Digest of the configured admin token. The plaintext is never retained.
#[derive(Clone)]
pub struct AdminToken {
    hashed_secret: Vec<u8>,
}

impl std::fmt::Debug for AdminToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminToken").finish_non_exhaustive()
    }
}

impl AdminToken {
    pub fn new(secret: &str) -> Self {
        Self {
            hashed_secret: hash_secret(secret),
        }
    }

    pub fn verify(&self, presented: Option<&str>) -> Result<(), AdminAuthError> {
        let presented = presented
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(AdminAuthError::Missing)?;

        let hashed_input = hash_secret(presented);
        if self.hashed_secret.ct_eq(&hashed_input).unwrap_u8() == 0 {
            return Err(AdminAuthError::Invalid);
        }
        Ok(())
    }
}

fn hash_secret(secret: &str) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hasher.finalize().to_vec()
}
