// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `{status, message, data}` wrapper every endpoint answers with.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// Envelope status value that marks a successful call.
pub const SUCCESS: &str = "Success";

/// Envelope as received, with `data` left undecoded until the status is known.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: serde_json::Value,
}

impl Envelope {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS
    }

    /// Decode `data` as `T` when the status is `Success`.
    ///
    /// A failed call keeps its message and ignores `data`, which servers
    /// fill with anything from `null` to partial records.
    pub fn decode<T: DeserializeOwned>(self) -> Result<Outcome<T>, serde_json::Error> {
        if !self.is_success() {
            return Ok(Outcome::Failure { status: self.status, message: self.message });
        }
        let data = T::deserialize(self.data)?;
        Ok(Outcome::Success { message: self.message, data })
    }
}

/// Paged variant: the envelope plus page bookkeeping alongside `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedEnvelope {
    pub status: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub page_number: u32,
    #[serde(default)]
    pub page_size: u32,
    #[serde(default)]
    pub total_count: u64,
}

impl PagedEnvelope {
    pub fn is_success(&self) -> bool {
        self.status == SUCCESS
    }

    pub fn decode<T: DeserializeOwned>(self) -> Result<Outcome<Page<T>>, serde_json::Error> {
        if !self.is_success() {
            return Ok(Outcome::Failure { status: self.status, message: self.message });
        }
        // Some list endpoints answer `data: null` for an empty page.
        let items = if self.data.is_null() { Vec::new() } else { Vec::<T>::deserialize(self.data)? };
        Ok(Outcome::Success {
            message: self.message,
            data: Page {
                items,
                page_number: self.page_number,
                page_size: self.page_size,
                total_count: self.total_count,
            },
        })
    }
}

/// Result of a call that reached the application layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Success { message: String, data: T },
    Failure { status: String, message: String },
}

impl<T> Outcome<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Success { message, .. } | Self::Failure { message, .. } => message,
        }
    }

    pub fn data(self) -> Option<T> {
        match self {
            Self::Success { data, .. } => Some(data),
            Self::Failure { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Success { message, data } => Outcome::Success { message, data: f(data) },
            Self::Failure { status, message } => Outcome::Failure { status, message },
        }
    }

    /// Convert into a `Result`, treating an application failure as an error
    /// carrying the server's message.
    pub fn into_result(self) -> anyhow::Result<T> {
        match self {
            Self::Success { data, .. } => Ok(data),
            Self::Failure { message, .. } => Err(anyhow::anyhow!("{message}")),
        }
    }
}

/// One page of a paginated listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// 1-indexed.
    pub page_number: u32,
    pub page_size: u32,
    pub total_count: u64,
}

impl<T> Page<T> {
    pub fn empty(page_number: u32, page_size: u32) -> Self {
        Self { items: Vec::new(), page_number, page_size, total_count: 0 }
    }

    /// The 1-indexed `(first, last, total)` range this page covers, as in
    /// "Showing 101 – 200 of 250". `None` for an empty page.
    pub fn showing(&self) -> Option<(u64, u64, u64)> {
        if self.items.is_empty() {
            return None;
        }
        let first = u64::from(self.page_size) * u64::from(self.page_number.saturating_sub(1)) + 1;
        let last = (first + self.items.len() as u64 - 1).min(self.total_count.max(first));
        Some((first, last, self.total_count))
    }
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
