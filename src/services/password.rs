// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Salted one-way password hashing (bcrypt).
//!
//! Hashing and verification run on the blocking thread pool.

use crate::error::AppError;

/// bcrypt hasher with a fixed cost factor.
#[derive(Debug, Clone, Copy)]
pub struct PasswordHasher {
    cost: u32,
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self {
            cost: crate::config::DEFAULT_BCRYPT_COST,
        }
    }
}

impl PasswordHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hash a plaintext password with a fresh random salt.
    pub async fn hash_password(&self, plaintext: &str) -> Result<String, AppError> {
        let plaintext = plaintext.to_string();
        let cost = self.cost;

        tokio::task::spawn_blocking(move || bcrypt::hash(plaintext, cost))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Hashing task failed: {}", e)))?
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))
    }

    /// Check a plaintext password against a stored hash.
    ///
    /// A malformed stored hash is an error, not a mismatch.
    pub async fn verify_password(&self, plaintext: &str, hash: &str) -> Result<bool, AppError> {
        let plaintext = plaintext.to_string();
        let hash = hash.to_string();

        tokio::task::spawn_blocking(move || bcrypt::verify(plaintext, &hash))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Verification task failed: {}", e)))?
            .map_err(|e| {
                AppError::Internal(anyhow::anyhow!("Password verification failed: {}", e))
            })
    }
}
