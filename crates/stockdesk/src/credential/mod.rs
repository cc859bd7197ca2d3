// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session credentials: the persisted token pair, single-flight refresh, and
//! the session events broadcast when the pair changes.

pub mod refresh;
pub mod store;

use serde::{Deserialize, Serialize};

/// An access/refresh token pair.
///
/// Both tokens are always present together; a partial pair is not
/// representable.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry timestamp exactly as the API reported it on login.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
}

impl Credential {
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self { access_token: access_token.into(), refresh_token: refresh_token.into(), expiration: None }
    }
}

// Tokens stay out of logs.
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &"<redacted>")
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Events emitted when the session's credential changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum SessionEvent {
    /// A login stored a fresh credential.
    SignedIn,
    /// The refresh coordinator rotated the token pair.
    Refreshed,
    /// The session was torn down; the user must log in again.
    SignedOut { reason: SignOutReason },
}

/// Why a session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignOutReason {
    /// Explicit logout.
    Logout,
    /// The refresh token could not be exchanged.
    RefreshFailed(String),
}
