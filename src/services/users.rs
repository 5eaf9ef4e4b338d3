// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User repository: user documents, email reservations and credential checks.
//!
//! Store failures are logged here and returned to the caller as
//! `AppError::Database`, so callers can tell "absent" from "unavailable".

use crate::db::{collections, from_document, to_document, Document, DocumentStore};
use crate::error::{AppError, Result};
use crate::models::{EmailReservation, RefreshTokenRecord, User, UserUpdate};
use crate::services::ids::generate_user_id;
use crate::services::password::PasswordHasher;
use crate::time_utils::now_rfc3339;
use serde_json::Value;
use std::sync::Arc;

/// Key of an email reservation document.
///
/// Firestore document IDs may not contain `/`, so the email is URL-encoded.
fn email_key(email: &str) -> String {
    urlencoding::encode(email).into_owned()
}

/// Domain operations on users, built on a [`DocumentStore`].
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
    hasher: PasswordHasher,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>, hasher: PasswordHasher) -> Self {
        Self { store, hasher }
    }

    /// Look up a user by email.
    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let doc = self
            .store
            .find_by_field(collections::USERS, "email", email)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Failed to look up user by email"))?;

        doc.map(from_document).transpose()
    }

    /// Look up a user by document ID.
    pub async fn find_by_id(&self, id: &str) -> Result<Option<User>> {
        let doc = self
            .store
            .get_document(collections::USERS, id)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, user_id = id, "Failed to get user"))?;

        doc.map(from_document).transpose()
    }

    /// Register a new user.
    ///
    /// The email is reserved with a conditional write before the password is
    /// hashed and the user document stored; a taken email is
    /// `AppError::Conflict`. Any later failure releases the reservation.
    pub async fn create(&self, username: &str, email: &str, password: &str) -> Result<User> {
        let id = generate_user_id();
        let now = now_rfc3339();

        let reservation = EmailReservation {
            user_id: id.clone(),
            created_at: now.clone(),
        };
        let reserved = self
            .store
            .create_if_absent(
                collections::USER_EMAILS,
                &email_key(email),
                to_document(&reservation)?,
            )
            .await
            .inspect_err(|e| tracing::warn!(error = %e, "Failed to reserve email"))?;

        if !reserved {
            tracing::info!("Signup rejected, email already reserved");
            return Err(AppError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        match self.insert_user(id, username, email, password, now).await {
            Ok(user) => {
                tracing::info!(user_id = %user.id, "User created");
                Ok(user)
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to write user, releasing email");
                if let Err(release_err) = self
                    .store
                    .delete_document(collections::USER_EMAILS, &email_key(email))
                    .await
                {
                    tracing::error!(error = %release_err, "Failed to release email reservation");
                }
                Err(e)
            }
        }
    }

    /// Hash the password and write the user document.
    async fn insert_user(
        &self,
        id: String,
        username: &str,
        email: &str,
        password: &str,
        now: String,
    ) -> Result<User> {
        let password_hash = self.hasher.hash_password(password).await?;

        let user = User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
            created_at: now.clone(),
            updated_at: now,
        };

        self.store
            .create_document(collections::USERS, &user.id, to_document(&user)?)
            .await?;
        Ok(user)
    }

    /// Return the user only if the email exists and the password matches.
    pub async fn validate_user(&self, email: &str, password: &str) -> Result<Option<User>> {
        let Some(user) = self.find_by_email(email).await? else {
            tracing::info!("Sign-in for unknown email");
            return Ok(None);
        };

        if self
            .hasher
            .verify_password(password, &user.password_hash)
            .await?
        {
            Ok(Some(user))
        } else {
            tracing::info!(user_id = %user.id, "Sign-in with wrong password");
            Ok(None)
        }
    }

    /// Apply a partial profile update.
    ///
    /// Returns `false` if the user does not exist.
    pub async fn update_user(&self, id: &str, update: UserUpdate) -> Result<bool> {
        if update.is_empty() {
            return Ok(self.find_by_id(id).await?.is_some());
        }

        let mut changes = Document::new();
        if let Some(username) = update.username {
            changes.insert("username".to_string(), Value::String(username));
        }
        if let Some(password) = update.password {
            let hash = self.hasher.hash_password(&password).await?;
            changes.insert("passwordHash".to_string(), Value::String(hash));
        }
        changes.insert("updatedAt".to_string(), Value::String(now_rfc3339()));

        let updated = self
            .store
            .update_document(collections::USERS, id, changes)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, user_id = id, "Failed to update user"))?;

        if updated {
            tracing::info!(user_id = id, "User updated");
        }
        Ok(updated)
    }

    /// Delete a user with its email reservation and refresh-token record.
    ///
    /// The reservation goes first: a failure part way leaves at worst a user
    /// without a reservation, never a reservation without a user.
    ///
    /// Returns `false` if the user does not exist.
    pub async fn delete_user(&self, id: &str) -> Result<bool> {
        let Some(user) = self.find_by_id(id).await? else {
            return Ok(false);
        };

        // Only release the reservation if it still points at this user.
        let key = email_key(&user.email);
        let reservation = self
            .store
            .get_document(collections::USER_EMAILS, &key)
            .await
            .inspect_err(|e| {
                tracing::warn!(error = %e, user_id = id, "Failed to read email reservation")
            })?
            .map(from_document::<EmailReservation>)
            .transpose()?;
        if reservation.is_some_and(|r| r.user_id == id) {
            self.store
                .delete_document(collections::USER_EMAILS, &key)
                .await?;
        }

        self.store
            .delete_document(collections::USERS, id)
            .await
            .inspect_err(|e| tracing::warn!(error = %e, user_id = id, "Failed to delete user"))?;

        self.store
            .delete_document(collections::REFRESH_TOKENS, id)
            .await?;

        tracing::info!(user_id = id, "User deleted");
        Ok(true)
    }

    /// Store the audit copy of the latest refresh token for a user.
    pub async fn record_refresh_token(&self, user_id: &str, refresh_token: &str) -> Result<()> {
        let record = RefreshTokenRecord {
            refresh_token: refresh_token.to_string(),
            created_at: now_rfc3339(),
            user_id: user_id.to_string(),
        };

        self.store
            .create_document(collections::REFRESH_TOKENS, user_id, to_document(&record)?)
            .await
    }
}
