// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Signup, signin and token refresh routes.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use std::sync::Arc;

use crate::error::Result;
use crate::models::{AuthResult, RefreshRequest, SignInRequest, SignUpRequest, TokenPair};
use crate::routes::extract::ValidatedJson;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(sign_up))
        .route("/auth/signin", post(sign_in))
        .route("/auth/refresh", post(refresh))
}

/// Register a new user.
async fn sign_up(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<SignUpRequest>,
) -> Result<(StatusCode, Json<AuthResult>)> {
    tracing::info!("Signup request");
    let result = state.auth.sign_up(&body).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

/// Sign in with email and password.
async fn sign_in(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<SignInRequest>,
) -> Result<Json<AuthResult>> {
    tracing::info!("Signin request");
    let result = state.auth.sign_in(&body).await?;
    Ok(Json(result))
}

/// Exchange a refresh token for a new pair.
async fn refresh(
    State(state): State<Arc<AppState>>,
    ValidatedJson(body): ValidatedJson<RefreshRequest>,
) -> Result<Json<TokenPair>> {
    tracing::info!("Refresh request");
    let pair = state.auth.refresh(&body.refresh_token).await?;
    Ok(Json(pair))
}
