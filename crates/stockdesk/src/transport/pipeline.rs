// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The authenticated request pipeline.
//!
//! Every outgoing request picks up the stored access token as a bearer
//! header. A 401 on a credentialed request parks it on the refresh
//! coordinator and replays it exactly once with whatever token the refresh
//! produced. Anything else (including a second 401) goes back to the caller
//! untouched.

use std::sync::{Arc, Once};

use reqwest::{StatusCode, Url};
use tokio_util::sync::CancellationToken;

use super::{ApiRequest, ApiResponse};
use crate::config::ClientConfig;
use crate::credential::refresh::{HttpRefresher, RefreshCoordinator};
use crate::credential::store::TokenStore;
use crate::error::ApiError;

static CRYPTO_PROVIDER: Once = Once::new();

/// Install the process-wide rustls provider. Safe to call repeatedly.
pub fn install_crypto_provider() {
    CRYPTO_PROVIDER.call_once(|| {
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}

/// Build the shared HTTP client used for API calls and token refreshes.
pub fn build_http_client(config: &ClientConfig) -> anyhow::Result<reqwest::Client> {
    install_crypto_provider();
    let client = reqwest::Client::builder().timeout(config.timeout()).build()?;
    Ok(client)
}

pub struct AuthPipeline {
    http: reqwest::Client,
    base: Url,
    coordinator: Arc<RefreshCoordinator>,
}

impl AuthPipeline {
    pub fn new(
        http: reqwest::Client,
        base_url: &str,
        coordinator: Arc<RefreshCoordinator>,
    ) -> anyhow::Result<Self> {
        let base = Url::parse(base_url)
            .map_err(|e| anyhow::anyhow!("invalid API URL {base_url:?}: {e}"))?;
        Ok(Self { http, base, coordinator })
    }

    /// Wire a pipeline against `config` with the HTTP refresher and `store`.
    pub fn from_config(config: &ClientConfig, store: Arc<dyn TokenStore>) -> anyhow::Result<Self> {
        let http = build_http_client(config)?;
        let base_url = config.base_url();
        let refresher = Arc::new(HttpRefresher::new(http.clone(), &base_url));
        let coordinator = RefreshCoordinator::new(store, refresher);
        Self::new(http, &base_url, coordinator)
    }

    pub fn coordinator(&self) -> &Arc<RefreshCoordinator> {
        &self.coordinator
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        self.coordinator.store()
    }

    pub fn base_url(&self) -> &str {
        self.base.as_str()
    }

    /// Send `request`, refreshing and replaying once on a 401.
    pub async fn send(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let token = if request.anonymous { None } else { self.store().access_token() };
        let response = self.transmit(&request, token.as_deref()).await?;

        if response.status != StatusCode::UNAUTHORIZED || request.anonymous || request.retried {
            return Ok(response);
        }

        request.retried = true;
        tracing::debug!(method = %request.method, path = %request.path, "401, awaiting token refresh");
        let fresh = self.coordinator.refresh(token.as_deref()).await?;

        tracing::debug!(method = %request.method, path = %request.path, "replaying with refreshed token");
        self.transmit(&request, Some(&fresh)).await
    }

    /// [`send`](Self::send), abandoned with [`ApiError::Cancelled`] when
    /// `cancel` fires first. An in-flight refresh keeps running for the
    /// other waiters.
    pub async fn send_cancellable(
        &self,
        request: ApiRequest,
        cancel: &CancellationToken,
    ) -> Result<ApiResponse, ApiError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(ApiError::Cancelled),
            result = self.send(request) => result,
        }
    }

    async fn transmit(
        &self,
        request: &ApiRequest,
        token: Option<&str>,
    ) -> Result<ApiResponse, ApiError> {
        let mut url = self
            .base
            .join(&request.path)
            .map_err(|e| ApiError::InvalidRequest(format!("{}: {e}", request.path)))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }

        let mut builder = self.http.request(request.method.clone(), url);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        if let Some(ref body) = request.body {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let body = resp.bytes().await?;
        tracing::debug!(method = %request.method, path = %request.path, status = status.as_u16(), "response");
        Ok(ApiResponse { status, body })
    }
}

#[cfg(test)]
#[path = "pipeline_tests.rs"]
mod tests;
