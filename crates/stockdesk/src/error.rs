// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::fmt;

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Machine-readable error codes surfaced by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCode {
    Unauthorized,
    Transport,
    HttpStatus,
    Decode,
    RefreshFailed,
    Cancelled,
    NotSignedIn,
    InvalidRequest,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Transport => "TRANSPORT",
            Self::HttpStatus => "HTTP_STATUS",
            Self::Decode => "DECODE",
            Self::RefreshFailed => "REFRESH_FAILED",
            Self::Cancelled => "CANCELLED",
            Self::NotSignedIn => "NOT_SIGNED_IN",
            Self::InvalidRequest => "INVALID_REQUEST",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a token refresh did not produce a new credential.
///
/// Cloned into every queued waiter, so it carries strings rather than the
/// underlying (non-`Clone`) transport error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshError {
    /// No refresh token was stored, so there was nothing to exchange.
    MissingRefreshToken,
    /// The refresh endpoint answered, but not with a usable credential.
    Rejected { status: u16, message: String },
    /// The refresh endpoint could not be reached or its body was unreadable.
    Transport(String),
    /// The refresh task ended without settling (panic or runtime shutdown).
    Interrupted,
}

impl RefreshError {
    pub fn code(&self) -> ErrorCode {
        ErrorCode::RefreshFailed
    }
}

impl fmt::Display for RefreshError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingRefreshToken => f.write_str("no refresh token stored"),
            Self::Rejected { status, message } => {
                write!(f, "refresh rejected ({status}): {message}")
            }
            Self::Transport(msg) => write!(f, "refresh request failed: {msg}"),
            Self::Interrupted => f.write_str("refresh interrupted before settling"),
        }
    }
}

impl std::error::Error for RefreshError {}

/// Errors returned by the request pipeline and the typed API client.
///
/// Application-level failures (`status != "Success"`) are not errors; they
/// come back as [`crate::api::envelope::Outcome::Failure`].
#[derive(Debug)]
pub enum ApiError {
    /// The request never produced an HTTP response.
    Transport(reqwest::Error),
    /// A 401 survived the refresh-and-replay cycle (or the request was anonymous).
    Unauthorized { message: String },
    /// Any other non-2xx HTTP status.
    Status { status: StatusCode, message: String },
    /// The body was not the expected envelope shape.
    Decode(serde_json::Error),
    /// The access token expired and could not be refreshed.
    Refresh(RefreshError),
    /// The caller's cancellation token fired before the response arrived.
    Cancelled,
    /// A command that needs a session ran without stored credentials.
    NotSignedIn,
    /// The request could not be built (bad path or unserializable body).
    InvalidRequest(String),
}

impl ApiError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Transport(_) => ErrorCode::Transport,
            Self::Unauthorized { .. } => ErrorCode::Unauthorized,
            Self::Status { .. } => ErrorCode::HttpStatus,
            Self::Decode(_) => ErrorCode::Decode,
            Self::Refresh(e) => e.code(),
            Self::Cancelled => ErrorCode::Cancelled,
            Self::NotSignedIn => ErrorCode::NotSignedIn,
            Self::InvalidRequest(_) => ErrorCode::InvalidRequest,
        }
    }

    /// True when the session is gone and the user has to log in again.
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Refresh(_) | Self::NotSignedIn | Self::Unauthorized { .. })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(e) => write!(f, "request failed: {e}"),
            Self::Unauthorized { message } => write!(f, "unauthorized: {message}"),
            Self::Status { status, message } if message.is_empty() => {
                write!(f, "server returned {status}")
            }
            Self::Status { status, message } => write!(f, "server returned {status}: {message}"),
            Self::Decode(e) => write!(f, "unexpected response body: {e}"),
            Self::Refresh(e) => write!(f, "session expired: {e}"),
            Self::Cancelled => f.write_str("request cancelled"),
            Self::NotSignedIn => f.write_str("not signed in; run `stockdesk login` first"),
            Self::InvalidRequest(msg) => write!(f, "invalid request: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(e) => Some(e),
            Self::Decode(e) => Some(e),
            Self::Refresh(e) => Some(e),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e)
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Decode(e)
    }
}

impl From<RefreshError> for ApiError {
    fn from(e: RefreshError) -> Self {
        Self::Refresh(e)
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
