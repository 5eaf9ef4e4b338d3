// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! Signing secrets are injected at startup (Cloud Run secret bindings or a
//! local `.env`) and never compiled into the binary.

use std::env;

/// Which document store backs the repositories.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Firestore,
    /// In-process store; data is lost on restart.
    Memory,
}

impl std::str::FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "firestore" => Ok(StoreBackend::Firestore),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid("STORE_BACKEND")),
        }
    }
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// GCP project ID
    pub gcp_project_id: String,
    /// Server port
    pub port: u16,
    pub store_backend: StoreBackend,
    /// Access token lifetime in seconds
    pub access_token_ttl_secs: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_ttl_secs: i64,
    /// bcrypt cost factor
    pub bcrypt_cost: u32,

    // --- Secrets ---
    /// JWT signing key for new tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Retired signing keys that are still accepted for verification
    pub jwt_previous_signing_keys: Vec<Vec<u8>>,
}

pub const DEFAULT_ACCESS_TOKEN_TTL_SECS: i64 = 15 * 60;
pub const DEFAULT_REFRESH_TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;
pub const DEFAULT_BCRYPT_COST: u32 = 10;

impl Config {
    /// Deterministic config for tests.
    ///
    /// Uses the in-memory store and the lowest bcrypt cost so tests stay fast.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            gcp_project_id: "test-project".to_string(),
            port: 3000,
            store_backend: StoreBackend::Memory,
            access_token_ttl_secs: DEFAULT_ACCESS_TOKEN_TTL_SECS,
            refresh_token_ttl_secs: DEFAULT_REFRESH_TOKEN_TTL_SECS,
            bcrypt_cost: 4,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            jwt_previous_signing_keys: Vec::new(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let jwt_signing_key = env::var("JWT_SIGNING_KEY")
            .map(|v| v.trim().to_string())
            .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?;
        if jwt_signing_key.is_empty() {
            return Err(ConfigError::Invalid("JWT_SIGNING_KEY"));
        }

        let jwt_previous_signing_keys = env::var("JWT_PREVIOUS_SIGNING_KEYS")
            .map(|v| parse_key_list(&v))
            .unwrap_or_default();

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            gcp_project_id: env::var("GCP_PROJECT_ID").unwrap_or_else(|_| "local-dev".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .unwrap_or(3000),
            store_backend: env::var("STORE_BACKEND")
                .unwrap_or_else(|_| "firestore".to_string())
                .parse()?,
            access_token_ttl_secs: parse_positive("ACCESS_TOKEN_TTL_SECS")?
                .unwrap_or(DEFAULT_ACCESS_TOKEN_TTL_SECS),
            refresh_token_ttl_secs: parse_positive("REFRESH_TOKEN_TTL_SECS")?
                .unwrap_or(DEFAULT_REFRESH_TOKEN_TTL_SECS),
            bcrypt_cost: match env::var("BCRYPT_COST") {
                Ok(v) => v
                    .trim()
                    .parse::<u32>()
                    .ok()
                    .filter(|cost| (4..=31).contains(cost))
                    .ok_or(ConfigError::Invalid("BCRYPT_COST"))?,
                Err(_) => DEFAULT_BCRYPT_COST,
            },
            jwt_signing_key: jwt_signing_key.into_bytes(),
            jwt_previous_signing_keys,
        })
    }
}

/// Split a comma-separated list of secrets, skipping blanks.
fn parse_key_list(raw: &str) -> Vec<Vec<u8>> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(|k| k.as_bytes().to_vec())
        .collect()
}

fn parse_positive(name: &'static str) -> Result<Option<i64>, ConfigError> {
    match env::var(name) {
        Ok(v) => v
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|secs| *secs > 0)
            .map(Some)
            .ok_or(ConfigError::Invalid(name)),
        Err(_) => Ok(None),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for environment variable: {0}")]
    Invalid(&'static str),
}
