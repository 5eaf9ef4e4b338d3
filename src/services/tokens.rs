// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signed access/refresh token pairs (HS256 JWTs).
//!
//! New tokens are signed with the current key and carry its `kid`. Retired
//! keys stay in the keyring for verification until they are removed from
//! configuration, which is how the secret is rotated.

use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::TokenPair;
use crate::services::ids::random_alphanumeric;
use crate::services::users::UserRepository;
use chrono::{Duration, Utc};
use jsonwebtoken::{
    decode, decode_header, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;

const JTI_LEN: usize = 16;
const KID_HEX_LEN: usize = 16;

/// What a token may be used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    Access,
    Refresh,
}

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    pub email: String,
    pub token_use: TokenUse,
    /// Random nonce, so two pairs minted in the same second differ
    pub jti: String,
    /// Issued at (Unix timestamp)
    pub iat: usize,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
}

/// An HMAC secret with its key ID.
#[derive(Clone)]
struct SigningKey {
    kid: String,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKey {
    fn new(secret: &[u8]) -> Self {
        Self {
            kid: key_id(secret),
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

/// Key ID: truncated hex SHA-256 of the secret.
pub fn key_id(secret: &[u8]) -> String {
    let digest = Sha256::digest(secret);
    let mut kid = hex::encode(digest);
    kid.truncate(KID_HEX_LEN);
    kid
}

struct Keyring {
    current: SigningKey,
    previous: Vec<SigningKey>,
}

impl Keyring {
    fn find(&self, kid: &str) -> Option<&SigningKey> {
        std::iter::once(&self.current)
            .chain(self.previous.iter())
            .find(|key| key.kid == kid)
    }
}

/// Issues and verifies token pairs.
#[derive(Clone)]
pub struct TokenService {
    keys: Arc<Keyring>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenService {
    pub fn new(
        current_key: &[u8],
        previous_keys: &[Vec<u8>],
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Self {
        let keys = Keyring {
            current: SigningKey::new(current_key),
            previous: previous_keys.iter().map(|k| SigningKey::new(k)).collect(),
        };

        Self {
            keys: Arc::new(keys),
            access_ttl,
            refresh_ttl,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            &config.jwt_signing_key,
            &config.jwt_previous_signing_keys,
            Duration::seconds(config.access_token_ttl_secs),
            Duration::seconds(config.refresh_token_ttl_secs),
        )
    }

    /// Key ID stamped on newly issued tokens.
    pub fn current_kid(&self) -> &str {
        &self.keys.current.kid
    }

    /// Sign a fresh access/refresh pair for a user.
    pub fn issue_pair(&self, user_id: &str, email: &str) -> Result<TokenPair> {
        Ok(TokenPair {
            access_token: self.sign(user_id, email, TokenUse::Access, self.access_ttl)?,
            refresh_token: self.sign(user_id, email, TokenUse::Refresh, self.refresh_ttl)?,
        })
    }

    fn sign(
        &self,
        user_id: &str,
        email: &str,
        token_use: TokenUse,
        ttl: Duration,
    ) -> Result<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            email: email.to_string(),
            token_use,
            jti: random_alphanumeric(JTI_LEN),
            iat: now.timestamp().max(0) as usize,
            exp: (now + ttl).timestamp().max(0) as usize,
        };

        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(self.keys.current.kid.clone());

        encode(&header, &claims, &self.keys.current.encoding)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))
    }

    /// Verify signature and expiry; returns the claims.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let header = decode_header(token).map_err(|_| AppError::InvalidToken)?;
        let key = header
            .kid
            .as_deref()
            .and_then(|kid| self.keys.find(kid))
            .ok_or(AppError::InvalidToken)?;

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &key.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "Token rejected");
                AppError::InvalidToken
            })
    }

    /// Verify a token that authorizes API requests.
    pub fn verify_access(&self, token: &str) -> Result<Claims> {
        self.verify_use(token, TokenUse::Access)
    }

    /// Verify a token that may mint a new pair.
    pub fn verify_refresh(&self, token: &str) -> Result<Claims> {
        self.verify_use(token, TokenUse::Refresh)
    }

    fn verify_use(&self, token: &str, expected: TokenUse) -> Result<Claims> {
        let claims = self.verify(token)?;
        if claims.token_use != expected {
            tracing::debug!(?expected, actual = ?claims.token_use, "Token used for wrong purpose");
            return Err(AppError::InvalidToken);
        }
        Ok(claims)
    }

    /// Exchange a refresh token for a new pair.
    ///
    /// The user named by the token must still exist under the same email.
    /// The stored refresh-token record is not consulted.
    pub async fn refresh(&self, refresh_token: &str, users: &UserRepository) -> Result<TokenPair> {
        let claims = self.verify_refresh(refresh_token)?;

        let user = match users.find_by_email(&claims.email).await {
            Ok(Some(user)) if user.id == claims.sub => user,
            Ok(_) => {
                tracing::warn!(user_id = %claims.sub, "Refresh for user that no longer exists");
                return Err(AppError::InvalidToken);
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    user_id = %claims.sub,
                    "User lookup failed during refresh"
                );
                return Err(AppError::InvalidToken);
            }
        };

        let pair = self.issue_pair(&user.id, &user.email)?;
        tracing::info!(user_id = %user.id, "Tokens refreshed");
        Ok(pair)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"test_signing_key_32_bytes_long!!";

    fn service() -> TokenService {
        TokenService::new(KEY, &[], Duration::minutes(15), Duration::days(7))
    }

    #[test]
    fn test_pair_claims() {
        let tokens = service();
        let pair = tokens.issue_pair("user-1", "a@example.com").unwrap();

        let access = tokens.verify(&pair.access_token).unwrap();
        let refresh = tokens.verify(&pair.refresh_token).unwrap();

        assert_eq!(access.sub, "user-1");
        assert_eq!(access.email, "a@example.com");
        assert_eq!(access.token_use, TokenUse::Access);
        assert_eq!(refresh.token_use, TokenUse::Refresh);
        assert_eq!(access.exp - access.iat, 15 * 60);
        assert_eq!(refresh.exp - refresh.iat, 7 * 24 * 60 * 60);
        assert_ne!(access.jti, refresh.jti);
    }

    #[test]
    fn test_header_carries_current_kid() {
        let tokens = service();
        let pair = tokens.issue_pair("user-1", "a@example.com").unwrap();
        let header = decode_header(&pair.access_token).unwrap();

        assert_eq!(header.kid.as_deref(), Some(tokens.current_kid()));
        assert_eq!(header.alg, Algorithm::HS256);
        assert_eq!(tokens.current_kid().len(), KID_HEX_LEN);
    }

    #[test]
    fn test_token_use_is_enforced() {
        let tokens = service();
        let pair = tokens.issue_pair("user-1", "a@example.com").unwrap();

        assert!(tokens.verify_access(&pair.access_token).is_ok());
        assert!(tokens.verify_refresh(&pair.refresh_token).is_ok());
        assert!(matches!(
            tokens.verify_access(&pair.refresh_token),
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(
            tokens.verify_refresh(&pair.access_token),
            Err(AppError::InvalidToken)
        ));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = TokenService::new(KEY, &[], Duration::seconds(-30), Duration::days(7));
        let pair = tokens.issue_pair("user-1", "a@example.com").unwrap();

        assert!(matches!(
            tokens.verify(&pair.access_token),
            Err(AppError::InvalidToken)
        ));
        assert!(tokens.verify(&pair.refresh_token).is_ok());
    }

    #[test]
    fn test_garbage_and_unsigned_tokens_rejected() {
        let tokens = service();
        assert!(tokens.verify("").is_err());
        assert!(tokens.verify("invalid.token.here").is_err());
        // alg "none" header, no kid
        assert!(tokens.verify("eyJhbGciOiJub25lIn0.eyJzdWIiOiJ4In0.").is_err());
    }

    #[test]
    fn test_key_id_is_stable() {
        assert_eq!(key_id(KEY), key_id(KEY));
        assert_ne!(key_id(KEY), key_id(b"another key"));
    }
}
