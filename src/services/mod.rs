// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod auth;
pub mod ids;
pub mod password;
pub mod tokens;
pub mod users;

pub use auth::AuthService;
pub use password::PasswordHasher;
pub use tokens::{Claims, TokenService, TokenUse};
pub use users::UserRepository;
