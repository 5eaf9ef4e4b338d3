// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signup, signin and refresh use cases.

use crate::error::{AppError, Result};
use crate::models::{AuthResult, SignInRequest, SignUpRequest, TokenPair, User};
use crate::services::tokens::TokenService;
use crate::services::users::UserRepository;

/// Composes the user repository and token service.
#[derive(Clone)]
pub struct AuthService {
    users: UserRepository,
    tokens: TokenService,
}

impl AuthService {
    pub fn new(users: UserRepository, tokens: TokenService) -> Self {
        Self { users, tokens }
    }

    /// Register a user and sign them in.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<AuthResult> {
        if self.users.find_by_email(&request.email).await?.is_some() {
            tracing::info!("Signup rejected, email already registered");
            return Err(AppError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let user = self
            .users
            .create(&request.username, &request.email, &request.password)
            .await?;

        let result = self.issue_for(&user).await?;
        tracing::info!(user_id = %user.id, "Signup successful");
        Ok(result)
    }

    /// Check credentials and issue a token pair.
    pub async fn sign_in(&self, request: &SignInRequest) -> Result<AuthResult> {
        let user = match self
            .users
            .validate_user(&request.email, &request.password)
            .await
        {
            Ok(Some(user)) => user,
            Ok(None) => return Err(AppError::Unauthorized),
            // Callers see the same 401 as for bad credentials.
            Err(e) => {
                tracing::error!(error = %e, "Credential validation failed");
                return Err(AppError::Unauthorized);
            }
        };

        let result = self.issue_for(&user).await?;
        tracing::info!(user_id = %user.id, "Signin successful");
        Ok(result)
    }

    /// Exchange a refresh token for a new pair.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair> {
        self.tokens
            .refresh(refresh_token, &self.users)
            .await
            .map_err(|e| {
                if !matches!(e, AppError::InvalidToken) {
                    tracing::error!(error = %e, "Refresh failed");
                }
                AppError::InvalidToken
            })
    }

    async fn issue_for(&self, user: &User) -> Result<AuthResult> {
        let tokens = self.tokens.issue_pair(&user.id, &user.email)?;

        // Audit copy only; losing it does not fail the request.
        if let Err(e) = self
            .users
            .record_refresh_token(&user.id, &tokens.refresh_token)
            .await
        {
            tracing::warn!(error = %e, user_id = %user.id, "Failed to record refresh token");
        }

        Ok(AuthResult {
            tokens,
            user: user.view(),
        })
    }
}
