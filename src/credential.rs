//! The credential check gating edits and deletes.
//!
//! Route handlers never compare passwords themselves; they go through a [`CredentialCheck`]
//! so that the storage scheme can change without touching any route logic.

use std::sync::Arc;

use anyhow::Context;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash};

use crate::http::{Error, Result};

#[async_trait::async_trait]
pub trait CredentialCheck: Send + Sync {
    /// Turn a submitted password into the value stored in the `password` column.
    async fn protect(&self, password: String) -> Result<String>;

    /// Check a submitted password against the stored value.
    ///
    /// A mismatch is reported as `Error::Forbidden`.
    async fn verify(&self, password: String, stored: String) -> Result<()>;
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasswordScheme {
    /// Store passwords verbatim and compare them byte for byte.
    Plaintext,
    /// Store an Argon2 PHC string.
    Argon2,
}

impl PasswordScheme {
    pub fn checker(self) -> Arc<dyn CredentialCheck> {
        match self {
            PasswordScheme::Plaintext => Arc::new(Plaintext),
            PasswordScheme::Argon2 => Arc::new(Argon2Hash),
        }
    }
}

pub struct Plaintext;

#[async_trait::async_trait]
impl CredentialCheck for Plaintext {
    async fn protect(&self, password: String) -> Result<String> {
        Ok(password)
    }

    async fn verify(&self, password: String, stored: String) -> Result<()> {
        if password == stored {
            Ok(())
        } else {
            Err(Error::Forbidden)
        }
    }
}

pub struct Argon2Hash;

#[async_trait::async_trait]
impl CredentialCheck for Argon2Hash {
    async fn protect(&self, password: String) -> Result<String> {
        Ok(tokio::task::spawn_blocking(move || -> Result<String> {
            let salt = SaltString::generate(rand::thread_rng());
            Ok(PasswordHash::generate(Argon2::default(), password, &salt)
                .map_err(|e| anyhow::anyhow!("failed to generate password hash: {}", e))?
                .to_string())
        })
        .await
        .context("panic in generating password hash")??)
    }

    async fn verify(&self, password: String, stored: String) -> Result<()> {
        Ok(tokio::task::spawn_blocking(move || -> Result<()> {
            let hash = PasswordHash::new(&stored)
                .map_err(|e| anyhow::anyhow!("invalid password hash: {}", e))?;

            hash.verify_password(&[&Argon2::default()], password)
                .map_err(|e| match e {
                    argon2::password_hash::Error::Password => Error::Forbidden,
                    _ => anyhow::anyhow!("failed to verify password hash: {}", e).into(),
                })
        })
        .await
        .context("panic in verifying password hash")??)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn plaintext_compares_verbatim() {
        let check = PasswordScheme::Plaintext.checker();
        let stored = check.protect("p1".to_string()).await.unwrap();
        assert_eq!(stored, "p1");

        assert!(check.verify("p1".into(), stored.clone()).await.is_ok());
        assert!(matches!(
            check.verify("P1".into(), stored).await,
            Err(Error::Forbidden)
        ));
    }

    #[tokio::test]
    async fn argon2_round_trips_and_rejects_wrong_password() {
        let check = PasswordScheme::Argon2.checker();
        let stored = check.protect("hunter2".to_string()).await.unwrap();
        assert!(stored.starts_with("$argon2"));

        assert!(check.verify("hunter2".into(), stored.clone()).await.is_ok());
        assert!(matches!(
            check.verify("hunter3".into(), stored).await,
            Err(Error::Forbidden)
        ));
    }

    #[tokio::test]
    async fn argon2_treats_a_plaintext_column_as_internal_error() {
        let check = Argon2Hash;
        let res = check.verify("p1".into(), "p1".into()).await;
        assert!(matches!(res, Err(Error::Anyhow(_))));
    }
}
