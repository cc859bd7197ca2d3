// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Stockdesk: command-line client for the inventory management API.
//!
//! The interesting part is the session plumbing: every call goes through a
//! pipeline that attaches the stored access token and, when the server
//! answers 401, waits on a single shared token refresh before replaying the
//! call once.

pub mod api;
pub mod command;
pub mod config;
pub mod credential;
pub mod error;
pub mod paging;
pub mod transport;

pub use command::{run, Cli};
