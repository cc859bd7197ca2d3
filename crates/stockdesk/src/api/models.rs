// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Records and request bodies exchanged with the inventory API.
//!
//! Field names follow the API's camelCase wire format.

use serde::{Deserialize, Serialize};

use crate::credential::Credential;
use crate::paging::Identified;

/// `data` of a successful `login` or `RefreshToken` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expiration: Option<String>,
}

impl TokenPair {
    pub fn into_credential(self) -> Credential {
        Credential {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            expiration: self.expiration,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Login {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: i64,
    pub sku: String,
    pub name: String,
    #[serde(default)]
    pub total_quantity: i64,
    pub category_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub sku: String,
    pub name: String,
    pub category_id: i64,
}

/// Stock received for a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Supply {
    pub quantity: i64,
    /// ISO-8601 timestamp.
    pub date: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
}

/// Direction of an order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// Stock coming in from a supplier.
    Supply,
    /// Stock going out to a customer.
    Sale,
}

impl OrderType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supply => "supply",
            Self::Sale => "sale",
        }
    }
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pending order awaiting approval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: i64,
    pub product_id: i64,
    pub organization_id: i64,
    pub quantity: i64,
    pub price: f64,
    pub date: String,
    /// `supply` or `sale`; kept as a string since the API owns the set.
    #[serde(rename = "type")]
    pub kind: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub product_id: i64,
    pub organization_id: i64,
    pub quantity: i64,
    pub price: f64,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: OrderType,
}

/// Body of the approve call, which books the order against its product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderApproval {
    pub organization_id: i64,
    pub quantity: i64,
    pub price: f64,
    pub date: String,
    pub order_id: i64,
}

impl From<&Order> for OrderApproval {
    fn from(order: &Order) -> Self {
        Self {
            organization_id: order.organization_id,
            quantity: order.quantity,
            price: order.price,
            date: order.date.clone(),
            order_id: order.id,
        }
    }
}

/// A processed (approved or rejected) order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderHistory {
    pub id: i64,
    pub product_id: i64,
    #[serde(default)]
    pub product_name: Option<String>,
    pub organization_id: i64,
    #[serde(default)]
    pub organization_name: Option<String>,
    pub quantity: i64,
    pub price: f64,
    pub date: String,
    #[serde(rename = "type")]
    pub kind: String,
    // Spelling is the API's.
    #[serde(default)]
    pub is_successfull: bool,
    #[serde(default)]
    pub detail: String,
    #[serde(default)]
    pub created_at: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewOrganization {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: i64,
    pub product: String,
    pub organization: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub price: f64,
    pub quantity: i64,
    pub date: String,
    #[serde(default)]
    pub remaining_quantity: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub receive_email: bool,
    #[serde(default)]
    pub receive_low_stock_alert: bool,
    #[serde(default)]
    pub user_type: String,
}

/// Partial user update; only fields that differ from the current profile
/// are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_email: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receive_low_stock_alert: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl ProfileUpdate {
    /// Keep only the requested values that differ from `current`.
    pub fn diff(current: &User, requested: ProfileUpdate) -> Self {
        Self {
            full_name: requested.full_name.filter(|v| *v != current.full_name),
            phone_number: requested.phone_number.filter(|v| *v != current.phone_number),
            receive_email: requested.receive_email.filter(|v| *v != current.receive_email),
            receive_low_stock_alert: requested
                .receive_low_stock_alert
                .filter(|v| *v != current.receive_low_stock_alert),
            currency: requested.currency.filter(|v| *v != current.currency),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Headline figures for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Dashboard {
    pub product_count: i64,
    pub low_stock_items: i64,
    pub active_supplies: i64,
    pub organization_count: i64,
    pub pending_orders: i64,
    pub monthly_supply_expense: f64,
    pub monthly_sales_revenue: f64,
    pub monthly_profit: f64,
}

macro_rules! identified_by_id {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Identified for $ty {
                type Id = i64;
                fn id(&self) -> i64 {
                    self.id
                }
            }
        )*
    };
}

identified_by_id!(Product, Category, Order, OrderHistory, Organization, Transaction);

#[cfg(test)]
#[path = "models_tests.rs"]
mod tests;
