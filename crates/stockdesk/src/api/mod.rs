// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Typed calls against the inventory API.
//!
//! Every call goes through the [`AuthPipeline`], so any of them may trigger
//! (or join) a token refresh. HTTP-level failures come back as [`ApiError`];
//! a reachable server that declines the request answers with
//! [`Outcome::Failure`].

pub mod envelope;
pub mod models;

use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

use crate::config::ClientConfig;
use crate::credential::store::TokenStore;
use crate::credential::{SessionEvent, SignOutReason};
use crate::error::ApiError;
use crate::paging::{PageQuery, PageSource};
use crate::transport::pipeline::AuthPipeline;
use crate::transport::{ApiRequest, ApiResponse};
use envelope::{Envelope, Outcome, Page, PagedEnvelope};
use models::{
    Category, Dashboard, Login, NewCategory, NewOrder, NewOrganization, NewProduct, Order,
    OrderApproval, OrderHistory, Organization, Product, ProfileUpdate, Registration, Supply,
    TokenPair, Transaction, User,
};

/// Response `data` the client does not interpret (create, delete, approve).
pub type Ack = serde_json::Value;

pub struct ApiClient {
    pipeline: Arc<AuthPipeline>,
    cancel: CancellationToken,
}

impl ApiClient {
    pub fn new(pipeline: AuthPipeline) -> Self {
        Self { pipeline: Arc::new(pipeline), cancel: CancellationToken::new() }
    }

    pub fn from_config(config: &ClientConfig, store: Arc<dyn TokenStore>) -> anyhow::Result<Self> {
        Ok(Self::new(AuthPipeline::from_config(config, store)?))
    }

    /// Abandon in-flight and future calls with [`ApiError::Cancelled`] once
    /// `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn pipeline(&self) -> &Arc<AuthPipeline> {
        &self.pipeline
    }

    pub fn store(&self) -> &Arc<dyn TokenStore> {
        self.pipeline.store()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.pipeline.coordinator().subscribe()
    }

    pub fn is_signed_in(&self) -> bool {
        self.store().access_token().is_some()
    }

    /// Fail fast with [`ApiError::NotSignedIn`] when no credential is stored.
    pub fn require_session(&self) -> Result<(), ApiError> {
        if self.is_signed_in() {
            Ok(())
        } else {
            Err(ApiError::NotSignedIn)
        }
    }

    /// Send `request` and decode the standard envelope.
    pub async fn call<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<Outcome<T>, ApiError> {
        let response = self.send(request).await?;
        let envelope: Envelope = response.json()?;
        Ok(envelope.decode()?)
    }

    /// Send `request` and decode the paged envelope.
    pub async fn call_paged<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
    ) -> Result<Outcome<Page<T>>, ApiError> {
        let response = self.send(request).await?;
        let envelope: PagedEnvelope = response.json()?;
        Ok(envelope.decode()?)
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let response = self.pipeline.send_cancellable(request, &self.cancel).await?;
        if response.status == StatusCode::UNAUTHORIZED {
            return Err(ApiError::Unauthorized { message: response.message() });
        }
        if !response.status.is_success() {
            return Err(ApiError::Status { status: response.status, message: response.message() });
        }
        Ok(response)
    }

    // -- Session -------------------------------------------------------------

    /// Exchange credentials for a token pair and store it.
    pub async fn login(&self, email: &str, password: &str) -> Result<Outcome<()>, ApiError> {
        let login = Login { email: email.to_owned(), password: password.to_owned() };
        let request = with_body(ApiRequest::post("login"), &login)?.anonymous();
        let outcome: Outcome<TokenPair> = self.call(request).await?;
        Ok(outcome.map(|tokens| {
            self.store().save(tokens.into_credential());
            tracing::info!("signed in");
            self.pipeline.coordinator().emit(SessionEvent::SignedIn);
        }))
    }

    pub async fn register(&self, registration: &Registration) -> Result<Outcome<Ack>, ApiError> {
        let request = with_body(ApiRequest::post("register"), registration)?.anonymous();
        self.call(request).await
    }

    /// Forget the stored credential. No server call is made.
    pub fn logout(&self) {
        self.store().clear();
        self.pipeline.coordinator().emit(SessionEvent::SignedOut { reason: SignOutReason::Logout });
    }

    // -- Products ------------------------------------------------------------

    pub async fn products(&self) -> Result<Outcome<Vec<Product>>, ApiError> {
        self.call(ApiRequest::get("products")).await
    }

    pub fn paged_products(&self) -> PagedEndpoint<'_, Product> {
        PagedEndpoint::new(self, "Products/Paged")
    }

    pub async fn create_product(&self, product: &NewProduct) -> Result<Outcome<Ack>, ApiError> {
        self.call(with_body(ApiRequest::post("products"), product)?).await
    }

    pub async fn add_supply(
        &self,
        product_id: i64,
        supply: &Supply,
    ) -> Result<Outcome<Ack>, ApiError> {
        let path = format!("products/{product_id}/supplies");
        self.call(with_body(ApiRequest::post(path), supply)?).await
    }

    // -- Orders --------------------------------------------------------------

    /// Orders awaiting approval.
    pub async fn orders(&self) -> Result<Outcome<Vec<Order>>, ApiError> {
        self.call(ApiRequest::get("orders")).await
    }

    /// Approved and rejected orders.
    pub async fn order_history(&self) -> Result<Outcome<Vec<OrderHistory>>, ApiError> {
        let request = ApiRequest::get("orders").query([pair("isDeleted", true)]);
        self.call(request).await
    }

    pub fn paged_orders(&self, processed: bool) -> PagedEndpoint<'_, OrderHistory> {
        PagedEndpoint::new(self, "api/Order/Paged").fixed("isDeleted", processed)
    }

    pub async fn create_order(&self, order: &NewOrder) -> Result<Outcome<Ack>, ApiError> {
        self.call(with_body(ApiRequest::post("orders"), order)?).await
    }

    /// Book a pending order against its product's stock.
    pub async fn approve_order(&self, order: &Order) -> Result<Outcome<Ack>, ApiError> {
        let path = format!("products/{}/{}", order.product_id, order.kind);
        let request = with_body(ApiRequest::post(path), &OrderApproval::from(order))?;
        self.call(request).await
    }

    pub async fn reject_order(&self, order_id: i64) -> Result<Outcome<Ack>, ApiError> {
        self.call(ApiRequest::delete(format!("orders/{order_id}"))).await
    }

    // -- Organizations -------------------------------------------------------

    pub async fn organizations(&self) -> Result<Outcome<Vec<Organization>>, ApiError> {
        self.call(ApiRequest::get("api/organization")).await
    }

    pub fn paged_organizations(&self) -> PagedEndpoint<'_, Organization> {
        PagedEndpoint::new(self, "api/Organization/Paged")
    }

    pub async fn create_organization(
        &self,
        organization: &NewOrganization,
    ) -> Result<Outcome<Ack>, ApiError> {
        self.call(with_body(ApiRequest::post("api/organization"), organization)?).await
    }

    pub async fn delete_organization(&self, id: i64) -> Result<Outcome<Ack>, ApiError> {
        self.call(ApiRequest::delete(format!("api/organization/{id}"))).await
    }

    // -- Categories ----------------------------------------------------------

    pub async fn categories(&self) -> Result<Outcome<Vec<Category>>, ApiError> {
        self.call(ApiRequest::get("api/category")).await
    }

    pub fn paged_categories(&self) -> PagedEndpoint<'_, Category> {
        PagedEndpoint::new(self, "api/Category/Paged")
    }

    pub async fn create_category(&self, name: &str) -> Result<Outcome<Ack>, ApiError> {
        let category = NewCategory { name: name.to_owned() };
        self.call(with_body(ApiRequest::post("api/category"), &category)?).await
    }

    // -- Transactions --------------------------------------------------------

    /// Transactions between two calendar days (`YYYY-MM-DD`), both inclusive.
    pub async fn transactions(
        &self,
        start: &str,
        end: &str,
        product_id: Option<i64>,
    ) -> Result<Outcome<Vec<Transaction>>, ApiError> {
        let (from, to) = day_range(start, end)?;
        let mut request = ApiRequest::get(format!("transactions/{from}/{to}"));
        if let Some(id) = product_id {
            request = request.query([pair("productId", id)]);
        }
        self.call(request).await
    }

    /// Paged transactions between two calendar days. Failed transactions are
    /// only listed when `include_failures` is set.
    pub fn paged_transactions(
        &self,
        start: &str,
        end: &str,
        include_failures: bool,
    ) -> Result<PagedEndpoint<'_, Transaction>, ApiError> {
        let (from, to) = day_range(start, end)?;
        Ok(PagedEndpoint::new(self, "Paged/Transactions")
            .fixed("startDate", from)
            .fixed("endDate", to)
            .fixed("includeFailures", include_failures))
    }

    // -- Profile and dashboard -----------------------------------------------

    pub async fn profile(&self) -> Result<Outcome<User>, ApiError> {
        let request = with_body(ApiRequest::post("GetProfileInfo"), &serde_json::json!({}))?;
        self.call(request).await
    }

    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<Outcome<Ack>, ApiError> {
        self.call(with_body(ApiRequest::patch("api/User"), update)?).await
    }

    pub async fn dashboard(&self) -> Result<Outcome<Dashboard>, ApiError> {
        self.call(ApiRequest::get("dash")).await
    }
}

/// A paged list endpoint, usable as a [`PageSource`].
pub struct PagedEndpoint<'c, T> {
    client: &'c ApiClient,
    path: &'static str,
    fixed: Vec<(String, String)>,
    _record: PhantomData<fn() -> T>,
}

impl<'c, T> PagedEndpoint<'c, T> {
    fn new(client: &'c ApiClient, path: &'static str) -> Self {
        Self { client, path, fixed: Vec::new(), _record: PhantomData }
    }

    /// A parameter sent with every page regardless of the filter.
    fn fixed(mut self, key: &str, value: impl ToString) -> Self {
        self.fixed.push(pair(key, value));
        self
    }

    pub fn path(&self) -> &str {
        self.path
    }
}

impl<T: DeserializeOwned + Send> PageSource<T> for PagedEndpoint<'_, T> {
    fn fetch_page<'a>(
        &'a self,
        query: &'a PageQuery,
    ) -> BoxFuture<'a, Result<Outcome<Page<T>>, ApiError>> {
        Box::pin(async move {
            let request = ApiRequest::get(self.path)
                .query(query.to_query())
                .query(self.fixed.iter().cloned());
            tracing::debug!(path = self.path, page = query.page_number, "fetching page");
            self.client.call_paged(request).await
        })
    }
}

fn with_body<T: Serialize>(request: ApiRequest, body: &T) -> Result<ApiRequest, ApiError> {
    request.json(body).map_err(|e| ApiError::InvalidRequest(e.to_string()))
}

fn pair(key: &str, value: impl ToString) -> (String, String) {
    (key.to_owned(), value.to_string())
}

/// Expand two `YYYY-MM-DD` days into the inclusive UTC timestamp bounds the
/// API expects.
fn day_range(start: &str, end: &str) -> Result<(String, String), ApiError> {
    let start = calendar_day(start)?;
    let end = calendar_day(end)?;
    if start > end {
        return Err(ApiError::InvalidRequest(format!("start {start} is after end {end}")));
    }
    Ok((format!("{start}T00:00:00.000Z"), format!("{end}T23:59:59.999Z")))
}

fn calendar_day(value: &str) -> Result<&str, ApiError> {
    let bytes = value.as_bytes();
    let well_formed = bytes.len() == 10
        && bytes.iter().enumerate().all(|(i, b)| match i {
            4 | 7 => *b == b'-',
            _ => b.is_ascii_digit(),
        });
    if well_formed {
        Ok(value)
    } else {
        Err(ApiError::InvalidRequest(format!("expected a YYYY-MM-DD date, got {value:?}")))
    }
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod tests;
