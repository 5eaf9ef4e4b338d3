// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Auth API: user registration, credential validation and JWT issuance
//!
//! This crate provides a small authentication backend storing users in
//! Firestore and issuing short-lived access tokens with long-lived refresh
//! tokens.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::DocumentStore;
use services::{AuthService, PasswordHasher, TokenService, UserRepository};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub users: UserRepository,
    pub tokens: TokenService,
    pub auth: AuthService,
}

impl AppState {
    /// Wire the services together over the given document store.
    pub fn new(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        let users = UserRepository::new(store, PasswordHasher::new(config.bcrypt_cost));
        let tokens = TokenService::from_config(&config);
        let auth = AuthService::new(users.clone(), tokens.clone());

        Self {
            config,
            users,
            tokens,
            auth,
        }
    }
}
