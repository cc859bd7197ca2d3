// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Single-flight access token refresh.
//!
//! The first caller that needs a new access token moves the coordinator from
//! `Idle` to `Refreshing` and spawns the one refresh call. Everyone who asks
//! while it runs joins the waiter queue. Settlement drains the queue in FIFO
//! order with the same result for all: the new access token, or the refresh
//! error after the store has been cleared and a sign-out broadcast.

use std::collections::VecDeque;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use serde::Serialize;
use tokio::sync::{broadcast, oneshot};

use crate::api::envelope::{Envelope, Outcome};
use crate::api::models::TokenPair;
use crate::credential::store::TokenStore;
use crate::credential::{Credential, SessionEvent, SignOutReason};
use crate::error::RefreshError;

/// Exchanges a refresh token for a new credential pair.
pub trait Refresher: Send + Sync {
    fn refresh<'a>(&'a self, refresh_token: &'a str)
        -> BoxFuture<'a, Result<Credential, RefreshError>>;
}

/// [`Refresher`] that calls the API's `RefreshToken` endpoint.
pub struct HttpRefresher {
    http: reqwest::Client,
    url: String,
}

impl HttpRefresher {
    /// `base_url` must end with `/` (see [`crate::config::ClientConfig::base_url`]).
    pub fn new(http: reqwest::Client, base_url: &str) -> Self {
        Self { http, url: format!("{base_url}RefreshToken") }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

impl Refresher for HttpRefresher {
    fn refresh<'a>(
        &'a self,
        refresh_token: &'a str,
    ) -> BoxFuture<'a, Result<Credential, RefreshError>> {
        Box::pin(do_refresh(&self.http, &self.url, refresh_token))
    }
}

/// Perform a single refresh request.
///
/// Only a 2xx response whose envelope status is `Success` counts; anything
/// else is a rejection and never retried.
pub async fn do_refresh(
    http: &reqwest::Client,
    url: &str,
    refresh_token: &str,
) -> Result<Credential, RefreshError> {
    let resp = http
        .post(url)
        .json(&RefreshRequest { refresh_token })
        .send()
        .await
        .map_err(|e| RefreshError::Transport(e.to_string()))?;

    let status = resp.status();
    let bytes = resp.bytes().await.map_err(|e| RefreshError::Transport(e.to_string()))?;

    if !status.is_success() {
        let message = serde_json::from_slice::<Envelope>(&bytes)
            .map(|env| env.message)
            .unwrap_or_else(|_| String::from_utf8_lossy(&bytes).into_owned());
        return Err(RefreshError::Rejected { status: status.as_u16(), message });
    }

    let envelope: Envelope = serde_json::from_slice(&bytes)
        .map_err(|e| RefreshError::Transport(format!("malformed refresh response: {e}")))?;
    match envelope.decode::<TokenPair>() {
        Ok(Outcome::Success { data, .. }) => Ok(data.into_credential()),
        Ok(Outcome::Failure { message, .. }) => {
            Err(RefreshError::Rejected { status: status.as_u16(), message })
        }
        Err(e) => Err(RefreshError::Transport(format!("malformed refresh response: {e}"))),
    }
}

type Waiter = oneshot::Sender<Result<String, RefreshError>>;

enum RefreshState {
    Idle,
    Refreshing {
        /// Access token the server rejected to start this refresh.
        rejected: Option<String>,
        waiters: VecDeque<Waiter>,
    },
}

/// Owns the `Idle`/`Refreshing` state machine and the waiter queue.
pub struct RefreshCoordinator {
    state: Mutex<RefreshState>,
    store: Arc<dyn TokenStore>,
    refresher: Arc<dyn Refresher>,
    events: broadcast::Sender<SessionEvent>,
    /// Token whose refresh last failed, and how. A late 401 for that token
    /// shares the outcome instead of starting another refresh.
    failed: Mutex<Option<(String, RefreshError)>>,
}

impl RefreshCoordinator {
    pub fn new(store: Arc<dyn TokenStore>, refresher: Arc<dyn Refresher>) -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self {
            state: Mutex::new(RefreshState::Idle),
            store,
            refresher,
            events,
            failed: Mutex::new(None),
        })
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        &self.store
    }

    pub fn is_refreshing(&self) -> bool {
        matches!(*self.state.lock(), RefreshState::Refreshing { .. })
    }

    /// Number of callers waiting on the in-flight refresh.
    pub fn pending(&self) -> usize {
        match &*self.state.lock() {
            RefreshState::Idle => 0,
            RefreshState::Refreshing { waiters, .. } => waiters.len(),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub(crate) fn emit(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }

    /// Obtain an access token to replace `rejected`, the one the server just
    /// answered 401 to.
    ///
    /// If the store already holds a different token (a refresh finished
    /// since the request went out) it is returned without a network call.
    /// Otherwise this joins, or starts, the single in-flight refresh.
    pub async fn refresh(self: &Arc<Self>, rejected: Option<&str>) -> Result<String, RefreshError> {
        let (tx, rx) = oneshot::channel();
        let start = {
            let mut state = self.state.lock();
            match &mut *state {
                RefreshState::Refreshing { waiters, .. } => {
                    waiters.push_back(tx);
                    false
                }
                RefreshState::Idle => {
                    match self.store.access_token() {
                        Some(current) if rejected != Some(current.as_str()) => return Ok(current),
                        Some(_) => {}
                        None => {
                            if let Some((token, err)) = &*self.failed.lock() {
                                if rejected == Some(token.as_str()) {
                                    tracing::debug!("refresh for this token already failed");
                                    return Err(err.clone());
                                }
                            }
                        }
                    }
                    *state = RefreshState::Refreshing {
                        rejected: rejected.map(str::to_owned),
                        waiters: VecDeque::from([tx]),
                    };
                    true
                }
            }
        };

        if start {
            // The refresh runs on its own task so a caller that gives up
            // cannot abort the call other waiters depend on.
            let this = Arc::clone(self);
            tokio::spawn(async move { this.drive().await });
        } else {
            tracing::debug!("refresh in flight, queued");
        }

        rx.await.unwrap_or(Err(RefreshError::Interrupted))
    }

    async fn drive(self: Arc<Self>) {
        let mut guard = SettleGuard { coordinator: &self, armed: true };
        let outcome = match self.store.load() {
            Some(credential) => {
                tracing::info!("access token rejected, refreshing");
                self.refresher.refresh(&credential.refresh_token).await
            }
            None => Err(RefreshError::MissingRefreshToken),
        };
        guard.armed = false;
        self.settle(outcome);
    }

    fn settle(&self, outcome: Result<Credential, RefreshError>) {
        // Store first: a caller arriving after the state flips back to Idle
        // must already see the rotated (or cleared) pair.
        let result = match outcome {
            Ok(credential) => {
                let token = credential.access_token.clone();
                self.store.save(credential);
                Ok(token)
            }
            Err(e) => {
                self.store.clear();
                Err(e)
            }
        };

        let waiters = {
            let mut state = self.state.lock();
            let (rejected, waiters) = match std::mem::replace(&mut *state, RefreshState::Idle) {
                RefreshState::Refreshing { rejected, waiters } => (rejected, waiters),
                RefreshState::Idle => (None, VecDeque::new()),
            };
            // Recorded before the state lock drops so no late caller can
            // slip in between and start a second refresh.
            *self.failed.lock() = match &result {
                Ok(_) => None,
                Err(e) => rejected.map(|token| (token, e.clone())),
            };
            waiters
        };

        match &result {
            Ok(_) => {
                tracing::info!(waiters = waiters.len(), "credentials refreshed");
                self.emit(SessionEvent::Refreshed);
            }
            Err(e) => {
                tracing::warn!(waiters = waiters.len(), err = %e, "credential refresh failed, signing out");
                self.emit(SessionEvent::SignedOut {
                    reason: SignOutReason::RefreshFailed(e.to_string()),
                });
            }
        }

        for waiter in waiters {
            let _ = waiter.send(result.clone());
        }
    }
}

/// Settles the coordinator with [`RefreshError::Interrupted`] if the refresh
/// task unwinds or is dropped before settling normally.
struct SettleGuard<'a> {
    coordinator: &'a RefreshCoordinator,
    armed: bool,
}

impl Drop for SettleGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.coordinator.settle(Err(RefreshError::Interrupted));
        }
    }
}

#[cfg(test)]
#[path = "refresh_tests.rs"]
mod tests;
