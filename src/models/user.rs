// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User model for storage and API.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// User profile stored in Firestore.
///
/// The document key is merged in as `id` on read and is not written back
/// into the document body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Generated document ID
    #[serde(skip_serializing)]
    pub id: String,
    pub username: String,
    /// Unique within the `users` collection
    pub email: String,
    /// bcrypt hash; never leaves the repository in a response
    pub password_hash: String,
    pub created_at: String,
    pub updated_at: String,
}

impl User {
    /// Public fields of the user.
    pub fn view(&self) -> UserView {
        UserView::from(self)
    }
}

/// Redacted user view returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UserView {
    pub id: String,
    pub email: String,
    pub username: String,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            email: user.email.clone(),
            username: user.username.clone(),
        }
    }
}

/// Partial profile change. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub username: Option<String>,
    /// New plaintext password; hashed before it is stored
    pub password: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.username.is_none() && self.password.is_none()
    }
}

/// Audit copy of the last refresh token issued to a user.
///
/// Stored in `refresh_tokens`, keyed by user id. Never read by verification.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRecord {
    pub refresh_token: String,
    pub created_at: String,
    pub user_id: String,
}

/// Reservation of an email address, keyed by the URL-encoded email.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailReservation {
    pub user_id: String,
    pub created_at: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: "1700000000000abcd1234".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "$2b$04$abcdefghijklmnopqrstuv".to_string(),
            created_at: "2025-01-01T00:00:00Z".to_string(),
            updated_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_user_document_layout() {
        let value = serde_json::to_value(sample_user()).unwrap();
        let obj = value.as_object().unwrap();

        // The key lives outside the body.
        assert!(!obj.contains_key("id"));
        assert!(obj.contains_key("passwordHash"));
        assert!(obj.contains_key("createdAt"));
        assert!(obj.contains_key("updatedAt"));
    }

    #[test]
    fn test_view_omits_password_hash() {
        let value = serde_json::to_value(sample_user().view()).unwrap();
        let obj = value.as_object().unwrap();

        assert_eq!(obj.len(), 3);
        assert_eq!(obj["id"], "1700000000000abcd1234");
        assert!(!obj.contains_key("passwordHash"));
        assert!(!obj.contains_key("password_hash"));
    }
}
