// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Random identifiers.

use rand::{distr::Alphanumeric, Rng};

const USER_ID_SUFFIX_LEN: usize = 8;

/// Random lowercase alphanumeric string.
pub fn random_alphanumeric(len: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(len)
        .map(|b| char::from(b).to_ascii_lowercase())
        .collect()
}

/// New user document ID: unix millis followed by a random suffix.
///
/// Not collision-proof at high request rates, but ids sort by creation time.
pub fn generate_user_id() -> String {
    format!(
        "{}{}",
        chrono::Utc::now().timestamp_millis(),
        random_alphanumeric(USER_ID_SUFFIX_LEN)
    )
}
