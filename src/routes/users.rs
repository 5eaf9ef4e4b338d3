// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile routes.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{UpdateProfileRequest, UserUpdate, UserView};
use crate::routes::extract::ValidatedJson;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::get,
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const USER_NOT_FOUND: &str = "User not found";

/// Public routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/users/{id}", get(get_user))
}

/// Routes for the authenticated user.
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn protected_routes() -> Router<Arc<AppState>> {
    Router::new().route("/users/me", get(get_me).patch(update_me).delete(delete_me))
}

// ─── Public Lookup ───────────────────────────────────────────

/// Result of a lookup by ID.
///
/// A missing user is still a 200, with a message body instead of the view.
#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UserLookupResponse {
    Found(UserView),
    NotFound { message: String },
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Json<UserLookupResponse> {
    let user = match state.users.find_by_id(&id).await {
        Ok(user) => user,
        Err(e) => {
            tracing::error!(error = %e, user_id = %id, "User lookup failed");
            None
        }
    };

    Json(match user {
        Some(user) => UserLookupResponse::Found(user.view()),
        None => UserLookupResponse::NotFound {
            message: USER_NOT_FOUND.to_string(),
        },
    })
}

// ─── Own Profile ─────────────────────────────────────────────

async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserView>> {
    let user = state
        .users
        .find_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string()))?;

    Ok(Json(user.view()))
}

async fn update_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    ValidatedJson(body): ValidatedJson<UpdateProfileRequest>,
) -> Result<Json<UserView>> {
    let update = UserUpdate {
        username: body.username,
        password: body.password,
    };

    if !state.users.update_user(&auth.user_id, update).await? {
        return Err(AppError::NotFound(USER_NOT_FOUND.to_string()));
    }

    let user = state
        .users
        .find_by_id(&auth.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(USER_NOT_FOUND.to_string()))?;

    Ok(Json(user.view()))
}

/// Response for account deletion.
#[derive(Debug, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct DeleteAccountResponse {
    pub deleted: bool,
}

async fn delete_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<DeleteAccountResponse>> {
    tracing::info!(user_id = %auth.user_id, "User-initiated account deletion");

    if !state.users.delete_user(&auth.user_id).await? {
        return Err(AppError::NotFound(USER_NOT_FOUND.to_string()));
    }

    Ok(Json(DeleteAccountResponse { deleted: true }))
}
