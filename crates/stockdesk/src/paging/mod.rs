// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Load-more pagination over any paged endpoint.
//!
//! [`PageController`] walks pages 1, 2, 3, ... of a [`PageSource`], merging
//! each page into an insertion-ordered accumulator keyed by record id so an
//! overlapping or repeated page never duplicates a record. Changing the
//! filter throws the accumulator away and starts again from page 1.

use std::fmt;
use std::hash::Hash;

use futures_util::future::BoxFuture;
use indexmap::IndexMap;

use crate::api::envelope::{Outcome, Page};
use crate::error::ApiError;

/// A record with a stable unique id.
pub trait Identified {
    type Id: Eq + Hash + Clone;
    fn id(&self) -> Self::Id;
}

/// Search text plus endpoint-specific filters (`categoryId`, `type`, ...).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFilter {
    search: Option<String>,
    params: Vec<(String, String)>,
}

impl PageFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank search text means no search.
    pub fn search(mut self, text: impl Into<String>) -> Self {
        let text = text.into();
        let trimmed = text.trim();
        self.search = if trimmed.is_empty() { None } else { Some(trimmed.to_owned()) };
        self
    }

    pub fn param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.params.push((key.into(), value.to_string()));
        self
    }

    pub fn search_text(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }
}

/// One page request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageQuery {
    /// 1-indexed.
    pub page_number: u32,
    pub page_size: u32,
    pub filter: PageFilter,
}

impl PageQuery {
    pub fn first(page_size: u32, filter: PageFilter) -> Self {
        Self { page_number: 1, page_size, filter }
    }

    /// Query-string pairs in the API's naming.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut pairs = vec![
            ("pageNumber".to_owned(), self.page_number.to_string()),
            ("pageSize".to_owned(), self.page_size.to_string()),
        ];
        if let Some(search) = self.filter.search_text() {
            pairs.push(("search".to_owned(), search.to_owned()));
        }
        pairs.extend(self.filter.params().iter().cloned());
        pairs
    }
}

/// Something that can fetch one page of `T`.
pub trait PageSource<T>: Send + Sync {
    fn fetch_page<'a>(
        &'a self,
        query: &'a PageQuery,
    ) -> BoxFuture<'a, Result<Outcome<Page<T>>, ApiError>>;
}

/// What a [`PageController::load_next`] call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loaded {
    /// The page contributed this many previously unseen records.
    Added(usize),
    /// Nothing more to load; the "load more" affordance should be hidden.
    Exhausted,
}

/// A page load that failed. The controller is exhausted afterwards.
#[derive(Debug)]
pub enum LoadError {
    Api(ApiError),
    /// The API answered with a non-`Success` envelope.
    Failed { message: String },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Api(e) => write!(f, "{e}"),
            Self::Failed { message } => f.write_str(message),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Api(e) => Some(e),
            Self::Failed { .. } => None,
        }
    }
}

/// Accumulates the pages of one listing.
pub struct PageController<T: Identified, S> {
    source: S,
    page_size: u32,
    filter: PageFilter,
    items: IndexMap<T::Id, T>,
    next_page: u32,
    total_count: Option<u64>,
    exhausted: bool,
    last_error: Option<String>,
}

impl<T, S> PageController<T, S>
where
    T: Identified + Send,
    S: PageSource<T>,
{
    pub fn new(source: S, page_size: u32) -> Self {
        Self {
            source,
            page_size: page_size.max(1),
            filter: PageFilter::default(),
            items: IndexMap::new(),
            next_page: 1,
            total_count: None,
            exhausted: false,
            last_error: None,
        }
    }

    pub fn with_filter(mut self, filter: PageFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn items(&self) -> impl ExactSizeIterator<Item = &T> {
        self.items.values()
    }

    pub fn into_items(self) -> Vec<T> {
        self.items.into_values().collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn filter(&self) -> &PageFilter {
        &self.filter
    }

    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Total reported by the most recent successful page.
    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    /// Message of the most recent failed load, for display.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Replace the filter. A different filter discards everything loaded so
    /// far; returns whether that happened.
    pub fn set_filter(&mut self, filter: PageFilter) -> bool {
        if filter == self.filter {
            return false;
        }
        self.filter = filter;
        self.reset();
        true
    }

    /// Forget loaded pages and start again from page 1 on the next load.
    pub fn reset(&mut self) {
        self.items.clear();
        self.next_page = 1;
        self.total_count = None;
        self.exhausted = false;
        self.last_error = None;
    }

    /// Reset and load page 1 again, e.g. after creating a record.
    pub async fn reload(&mut self) -> Result<Loaded, LoadError> {
        self.reset();
        self.load_next().await
    }

    /// Fetch the next page and merge it in.
    pub async fn load_next(&mut self) -> Result<Loaded, LoadError> {
        if self.exhausted {
            return Ok(Loaded::Exhausted);
        }

        let query = PageQuery {
            page_number: self.next_page,
            page_size: self.page_size,
            filter: self.filter.clone(),
        };
        let page = match self.source.fetch_page(&query).await {
            Ok(Outcome::Success { data, .. }) => data,
            Ok(Outcome::Failure { message, .. }) => {
                self.fail(&message);
                return Err(LoadError::Failed { message });
            }
            Err(e) => {
                self.fail(&e.to_string());
                return Err(LoadError::Api(e));
            }
        };

        self.last_error = None;
        self.total_count = Some(page.total_count);

        let before = self.items.len();
        for item in page.items {
            self.items.entry(item.id()).or_insert(item);
        }
        let added = self.items.len() - before;

        if added == 0 {
            tracing::debug!(page = query.page_number, "page added nothing new, exhausted");
            self.exhausted = true;
            return Ok(Loaded::Exhausted);
        }

        self.next_page += 1;
        if page.total_count > 0 && self.items.len() as u64 >= page.total_count {
            self.exhausted = true;
        }
        Ok(Loaded::Added(added))
    }

    /// Keep loading until exhausted; returns the number of records held.
    pub async fn load_all(&mut self) -> Result<usize, LoadError> {
        while let Loaded::Added(_) = self.load_next().await? {}
        Ok(self.items.len())
    }

    // A failing endpoint stops auto-loading rather than being hammered.
    fn fail(&mut self, message: &str) {
        tracing::warn!(page = self.next_page, err = %message, "page load failed");
        self.last_error = Some(message.to_owned());
        self.exhausted = true;
    }
}

#[cfg(test)]
#[path = "paging_tests.rs"]
mod tests;
