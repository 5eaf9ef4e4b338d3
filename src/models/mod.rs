// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod auth;
pub mod user;

pub use auth::{
    AuthResult, RefreshRequest, SignInRequest, SignUpRequest, TokenPair, UpdateProfileRequest,
};
pub use user::{EmailReservation, RefreshTokenRecord, User, UserUpdate, UserView};
