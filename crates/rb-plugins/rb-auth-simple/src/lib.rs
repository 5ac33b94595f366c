//! # rb-auth-simple
//!
//! Argon2-based implementation of `AuthProvider`.
//! Handles password hashing at registration and verification at login.

use anyhow::anyhow;
use async_trait::async_trait;
use rb_core::error::{AppError, Result};
use rb_core::traits::AuthProvider;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

pub struct SimpleAuthProvider {
    argon2: Argon2<'static>,
    /// Compared against when the username does not exist, so the response
    /// time does not reveal which usernames are registered.
    decoy_hash: String,
}

impl SimpleAuthProvider {
    /// Uses the argon2 crate's recommended (OWASP) parameters.
    pub fn new() -> anyhow::Result<Self> {
        Self::with_argon2(Argon2::default())
    }

    /// Argon2id with explicit cost parameters (memory in KiB, iterations,
    /// lanes). Mainly useful to keep tests fast.
    pub fn with_cost(m_cost: u32, t_cost: u32, p_cost: u32) -> anyhow::Result<Self> {
        let params = Params::new(m_cost, t_cost, p_cost, None)
            .map_err(|e| anyhow!("invalid argon2 parameters: {e}"))?;
        Self::with_argon2(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
    }

    fn with_argon2(argon2: Argon2<'static>) -> anyhow::Result<Self> {
        let mut provider = Self {
            argon2,
            decoy_hash: String::new(),
        };
        provider.decoy_hash = provider.hash_password("not a real password")?;
        Ok(provider)
    }
}

#[async_trait]
impl AuthProvider for SimpleAuthProvider {
    fn hash_password(&self, password: &str) -> Result<String> {
        let salt = SaltString::generate(&mut OsRng);
        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("password hashing failed: {e}")))
    }

    /// Verifies if a provided password matches a stored Argon2 hash.
    async fn verify_password(&self, password: &str, hash: Option<&str>) -> bool {
        let (hash, genuine) = match hash {
            Some(hash) => (hash, true),
            None => (self.decoy_hash.as_str(), false),
        };
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(p) => p,
            Err(_) => return false,
        };
        let matches = self
            .argon2
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok();
        matches && genuine
    }
}
