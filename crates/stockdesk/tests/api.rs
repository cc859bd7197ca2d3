// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Integration tests for the typed API client against a fake backend.

mod support;

use std::sync::Arc;

use axum::http::Method;
use serde_json::json;

use stockdesk::api::envelope::Outcome;
use stockdesk::api::models::{Order, ProfileUpdate, User};
use stockdesk::api::ApiClient;
use stockdesk::config::ClientConfig;
use stockdesk::credential::store::{self, FileTokenStore, MemoryTokenStore, TokenStore};
use stockdesk::credential::{Credential, SessionEvent};
use stockdesk::error::{ApiError, RefreshError};
use stockdesk::paging::{PageController, PageFilter};
use support::{envelope, failure, FakeBackend};

fn client(base: &str, store: Arc<dyn TokenStore>) -> anyhow::Result<ApiClient> {
    ApiClient::from_config(&ClientConfig::new(base), store)
}

fn signed_in(access: &str, refresh: &str) -> Arc<MemoryTokenStore> {
    Arc::new(MemoryTokenStore::with_credential(Credential::new(access, refresh)))
}

fn organization(id: i64, name: &str) -> serde_json::Value {
    json!({ "id": id, "name": name, "email": "", "phone": "", "address": "" })
}

fn history(id: i64) -> serde_json::Value {
    json!({
        "id": id, "productId": 1, "organizationId": 2, "quantity": 3, "price": 4.0,
        "date": "2026-10-01", "type": "sale", "isSuccessfull": true, "detail": "",
        "createdAt": "2026-10-01"
    })
}

#[tokio::test]
async fn login_stores_tokens_and_announces() -> anyhow::Result<()> {
    let backend = FakeBackend::new("A1");
    backend.reply(
        Method::POST,
        "/login",
        200,
        envelope(json!({
            "accessToken": "A1", "refreshToken": "R1", "expiration": "2026-10-20T00:00:00Z"
        })),
    );
    let base = backend.serve().await?;
    let store = Arc::new(MemoryTokenStore::new());
    let client = client(&base, store.clone())?;
    let mut events = client.subscribe();

    let outcome = client.login("ada@example.test", "hunter2").await?;

    assert!(outcome.is_success());
    let stored = store.load().ok_or_else(|| anyhow::anyhow!("nothing stored"))?;
    assert_eq!(stored.access_token, "A1");
    assert_eq!(stored.refresh_token, "R1");
    assert_eq!(stored.expiration.as_deref(), Some("2026-10-20T00:00:00Z"));
    assert_eq!(events.try_recv().ok(), Some(SessionEvent::SignedIn));

    let login = &backend.requests_to("/login")[0];
    assert_eq!(login.auth, None);
    assert_eq!(login.body, json!({ "email": "ada@example.test", "password": "hunter2" }));
    Ok(())
}

#[tokio::test]
async fn rejected_login_leaves_store_untouched() -> anyhow::Result<()> {
    let backend = FakeBackend::new("A1");
    backend.reply(Method::POST, "/login", 200, failure("Invalid credentials"));
    let base = backend.serve().await?;
    let store = Arc::new(MemoryTokenStore::new());
    let client = client(&base, store.clone())?;

    let outcome = client.login("ada@example.test", "wrong").await?;

    assert_eq!(outcome.message(), "Invalid credentials");
    assert!(!outcome.is_success());
    assert!(store.load().is_none());
    Ok(())
}

#[tokio::test]
async fn expired_session_is_refreshed_and_persisted() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("credentials.json");
    store::save(&path, &Credential::new("A1", "R1"))?;

    let backend = FakeBackend::new("A2");
    backend.rotate_to("A2", "R2");
    backend.reply(Method::GET, "/dash", 200, envelope(json!({ "productCount": 12 })));
    let base = backend.serve().await?;
    let client = client(&base, Arc::new(FileTokenStore::open(&path)?))?;

    let dashboard = client.dashboard().await?.into_result()?;

    assert_eq!(dashboard.product_count, 12);
    let auths: Vec<_> = backend.requests_to("/dash").into_iter().map(|r| r.auth).collect();
    assert_eq!(auths, vec![Some("Bearer A1".to_owned()), Some("Bearer A2".to_owned())]);
    assert_eq!(backend.requests_to("/RefreshToken")[0].body, json!({ "refreshToken": "R1" }));
    assert_eq!(store::load(&path)?, Credential::new("A2", "R2"));
    Ok(())
}

#[tokio::test]
async fn failed_refresh_removes_token_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("credentials.json");
    store::save(&path, &Credential::new("A1", "R1"))?;

    let backend = FakeBackend::new("A9");
    let base = backend.serve().await?;
    let client = client(&base, Arc::new(FileTokenStore::open(&path)?))?;
    let mut events = client.subscribe();

    let err = client.products().await.err().ok_or_else(|| anyhow::anyhow!("expected error"))?;

    match err {
        ApiError::Refresh(RefreshError::Rejected { status, ref message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid refresh token");
        }
        ref other => anyhow::bail!("unexpected error {other:?}"),
    }
    assert!(err.requires_login());
    assert!(!path.exists());
    assert!(!client.is_signed_in());
    assert!(matches!(events.try_recv(), Ok(SessionEvent::SignedOut { .. })));
    Ok(())
}

#[tokio::test]
async fn resource_400_is_a_status_error_without_refresh() -> anyhow::Result<()> {
    let backend = FakeBackend::new("A1");
    backend.reply(Method::POST, "/products", 400, failure("SKU already exists"));
    let base = backend.serve().await?;
    let client = client(&base, signed_in("A1", "R1"))?;

    let product = stockdesk::api::models::NewProduct {
        sku: "B-100".to_owned(),
        name: "Bolt".to_owned(),
        category_id: 4,
    };
    match client.create_product(&product).await {
        Err(ApiError::Status { status, message }) => {
            assert_eq!(status.as_u16(), 400);
            assert_eq!(message, "SKU already exists");
        }
        other => anyhow::bail!("unexpected result {other:?}"),
    }
    assert_eq!(backend.refresh_calls(), 0);
    assert_eq!(
        backend.requests_to("/products")[0].body,
        json!({ "sku": "B-100", "name": "Bolt", "categoryId": 4 })
    );
    Ok(())
}

#[tokio::test]
async fn application_failure_is_an_outcome() -> anyhow::Result<()> {
    let backend = FakeBackend::new("A1");
    backend.reply(Method::GET, "/dash", 200, failure("No data for this month"));
    let base = backend.serve().await?;
    let client = client(&base, signed_in("A1", "R1"))?;

    match client.dashboard().await? {
        Outcome::Failure { status, message } => {
            assert_eq!(status, "Error");
            assert_eq!(message, "No data for this month");
        }
        Outcome::Success { .. } => anyhow::bail!("expected failure"),
    }
    Ok(())
}

#[tokio::test]
async fn approval_books_order_against_its_product() -> anyhow::Result<()> {
    let backend = FakeBackend::new("A1");
    backend.reply(Method::POST, "/products/3/sale", 200, envelope(json!(null)));
    let base = backend.serve().await?;
    let client = client(&base, signed_in("A1", "R1"))?;
    let order = Order {
        id: 42,
        product_id: 3,
        organization_id: 9,
        quantity: 5,
        price: 2.5,
        date: "2026-10-19T00:00:00.000Z".to_owned(),
        kind: "sale".to_owned(),
    };

    assert!(client.approve_order(&order).await?.is_success());

    assert_eq!(
        backend.requests_to("/products/3/sale")[0].body,
        json!({
            "organizationId": 9, "quantity": 5, "price": 2.5,
            "date": "2026-10-19T00:00:00.000Z", "orderId": 42
        })
    );
    Ok(())
}

#[tokio::test]
async fn reject_and_delete_use_delete_method() -> anyhow::Result<()> {
    let backend = FakeBackend::new("A1");
    backend.reply(Method::DELETE, "/orders/42", 200, envelope(json!(null)));
    backend.reply(Method::DELETE, "/api/organization/7", 200, envelope(json!(null)));
    let base = backend.serve().await?;
    let client = client(&base, signed_in("A1", "R1"))?;

    assert!(client.reject_order(42).await?.is_success());
    assert!(client.delete_organization(7).await?.is_success());

    let methods: Vec<_> = backend.requests().into_iter().map(|r| r.method).collect();
    assert_eq!(methods, vec![Method::DELETE, Method::DELETE]);
    Ok(())
}

#[tokio::test]
async fn order_history_asks_for_processed_orders() -> anyhow::Result<()> {
    let backend = FakeBackend::new("A1");
    backend.reply(Method::GET, "/orders", 200, envelope(json!([history(1)])));
    let base = backend.serve().await?;
    let client = client(&base, signed_in("A1", "R1"))?;

    let orders = client.order_history().await?.into_result()?;

    assert_eq!(orders.len(), 1);
    assert_eq!(backend.requests_to("/orders")[0].param("isDeleted"), Some("true"));
    Ok(())
}

#[tokio::test]
async fn transactions_span_whole_days() -> anyhow::Result<()> {
    let path = "/transactions/2026-10-01T00:00:00.000Z/2026-10-31T23:59:59.999Z";
    let backend = FakeBackend::new("A1");
    backend.reply(Method::GET, path, 200, envelope(json!([])));
    let base = backend.serve().await?;
    let client = client(&base, signed_in("A1", "R1"))?;

    let transactions = client.transactions("2026-10-01", "2026-10-31", Some(7)).await?;

    assert_eq!(transactions.data(), Some(vec![]));
    assert_eq!(backend.requests_to(path)[0].param("productId"), Some("7"));
    Ok(())
}

#[tokio::test]
async fn profile_round_trip_sends_only_changes() -> anyhow::Result<()> {
    let backend = FakeBackend::new("A1");
    backend.reply(
        Method::POST,
        "/GetProfileInfo",
        200,
        envelope(json!({
            "id": 1, "fullName": "Ada", "email": "ada@example.test", "phoneNumber": "555-0100",
            "currency": "$", "receiveEmail": true, "receiveLowStockAlert": false, "userType": "Admin"
        })),
    );
    backend.reply(Method::PATCH, "/api/User", 200, envelope(json!(null)));
    let base = backend.serve().await?;
    let client = client(&base, signed_in("A1", "R1"))?;

    let current: User = client.profile().await?.into_result()?;
    let update = ProfileUpdate::diff(
        &current,
        ProfileUpdate {
            full_name: Some("Ada".to_owned()),
            currency: Some("€".to_owned()),
            ..Default::default()
        },
    );
    assert!(client.update_profile(&update).await?.is_success());

    assert_eq!(backend.requests_to("/GetProfileInfo")[0].body, json!({}));
    assert_eq!(backend.requests_to("/api/User")[0].body, json!({ "currency": "€" }));
    Ok(())
}

#[tokio::test]
async fn paged_orders_walk_until_nothing_new() -> anyhow::Result<()> {
    let backend = FakeBackend::new("A1");
    backend.pages(
        "/api/Order/Paged",
        vec![vec![history(1), history(2)], vec![history(2), history(3)], vec![]],
        0,
    );
    let base = backend.serve().await?;
    let client = client(&base, signed_in("A1", "R1"))?;

    let filter = PageFilter::new().search("acme").param("type", "sale");
    let mut pages = PageController::new(client.paged_orders(true), 2).with_filter(filter);
    assert_eq!(pages.load_all().await?, 3);

    let ids: Vec<i64> = pages.items().map(|h| h.id).collect();
    assert_eq!(ids, vec![1, 2, 3]);

    let requests = backend.requests_to("/api/Order/Paged");
    let numbers: Vec<_> = requests.iter().filter_map(|r| r.param("pageNumber")).collect();
    assert_eq!(numbers, vec!["1", "2", "3"]);
    for r in &requests {
        assert_eq!(r.param("pageSize"), Some("2"));
        assert_eq!(r.param("isDeleted"), Some("true"));
        assert_eq!(r.param("search"), Some("acme"));
        assert_eq!(r.param("type"), Some("sale"));
    }
    Ok(())
}

#[tokio::test]
async fn paging_survives_expiry_between_pages() -> anyhow::Result<()> {
    let backend = FakeBackend::new("A1");
    backend.rotate_to("A2", "R2");
    backend.pages(
        "/api/Organization/Paged",
        vec![vec![organization(1, "Acme")], vec![organization(2, "Globex")]],
        2,
    );
    let base = backend.serve().await?;
    let client = client(&base, signed_in("A1", "R1"))?;

    let mut pages = PageController::new(client.paged_organizations(), 1);
    pages.load_next().await?;
    backend.expire("A2");
    pages.load_next().await?;

    assert!(pages.is_exhausted());
    let names: Vec<_> = pages.items().map(|o| o.name.clone()).collect();
    assert_eq!(names, vec!["Acme", "Globex"]);
    assert_eq!(backend.refresh_calls(), 1);
    Ok(())
}

#[tokio::test]
async fn search_text_is_encoded_on_the_wire() -> anyhow::Result<()> {
    let backend = FakeBackend::new("A1");
    backend.pages("/api/Category/Paged", vec![vec![json!({ "id": 1, "name": "Nuts & Bolts" })]], 1);
    let base = backend.serve().await?;
    let client = client(&base, signed_in("A1", "R1"))?;

    let mut pages = PageController::new(client.paged_categories(), 15)
        .with_filter(PageFilter::new().search("nuts & bolts"));
    pages.load_all().await?;

    assert_eq!(pages.len(), 1);
    let request = &backend.requests_to("/api/Category/Paged")[0];
    assert_eq!(request.param("search"), Some("nuts & bolts"));
    Ok(())
}
