//! Page-number pagination over list endpoints.
//!
//! List responses have the shape `{ "data": [...], "total_pages": n }`.
//! [`Listing`] describes a query; each call to [`Listing::iter`] starts a new
//! [`Pages`] iterator that fetches one page at a time, yields its items, and
//! only then asks for the next page. Restarting re-issues every request.

use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;

use serde::Deserialize;
use serde_json::Value;

use crate::client::Client;
use crate::error::Result;
use crate::http::Transport;
use crate::resources::{from_json, Queryable, Resource};
use crate::types::{Query, MIN_PAGE};

/// One page of a list response.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    pub data: Vec<R>,
    /// Page count reported by the server. Missing counts are read as 0.
    pub total_pages: u32,
}

#[derive(Deserialize)]
struct RawPage {
    data: Vec<Value>,
    #[serde(default)]
    total_pages: u32,
}

impl<R: Resource> Page<R> {
    pub fn from_json(value: Value) -> Result<Self> {
        let raw: RawPage = serde_json::from_value(value)?;
        let data = raw
            .data
            .into_iter()
            .map(from_json)
            .collect::<Result<Vec<R>>>()?;
        Ok(Self {
            data,
            total_pages: raw.total_pages,
        })
    }
}

/// Where a [`Pages`] iterator stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageState {
    /// The next request asks for this page number.
    HasNextPage(u32),
    Exhausted,
}

/// A query over every page of a resource listing.
pub struct Listing<'c, T: Transport, R> {
    client: &'c Client<T>,
    query: Query,
    _resource: PhantomData<fn() -> R>,
}

impl<'c, T: Transport, R> Clone for Listing<'c, T, R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client,
            query: self.query.clone(),
            _resource: PhantomData,
        }
    }
}

impl<T: Transport, R> fmt::Debug for Listing<'_, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listing")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}

impl<'c, T: Transport, R: Queryable> Listing<'c, T, R> {
    pub(crate) fn new(client: &'c Client<T>, query: Query) -> Self {
        Self {
            client,
            query,
            _resource: PhantomData,
        }
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Start a fresh pass over the results, beginning at `query.page` (or 1).
    pub fn iter(&self) -> Pages<'c, T, R> {
        Pages {
            client: self.client,
            query: self.query.clone(),
            state: PageState::HasNextPage(self.query.page.unwrap_or(MIN_PAGE)),
            buffer: VecDeque::new(),
        }
    }

    /// Fetch every page and collect the items, stopping at the first error.
    pub fn collect_all(&self) -> Result<Vec<R>> {
        self.iter().collect()
    }
}

impl<'a, 'c, T: Transport, R: Queryable> IntoIterator for &'a Listing<'c, T, R> {
    type Item = Result<R>;
    type IntoIter = Pages<'c, T, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'c, T: Transport, R: Queryable> IntoIterator for Listing<'c, T, R> {
    type Item = Result<R>;
    type IntoIter = Pages<'c, T, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Forward-only iterator over the items of a [`Listing`].
///
/// A failed page request is yielded once as `Err` and ends the iteration.
pub struct Pages<'c, T: Transport, R> {
    client: &'c Client<T>,
    query: Query,
    state: PageState,
    buffer: VecDeque<R>,
}

impl<T: Transport, R> fmt::Debug for Pages<'_, T, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pages")
            .field("query", &self.query)
            .field("state", &self.state)
            .field("buffered", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

impl<'c, T: Transport, R> Pages<'c, T, R> {
    pub fn state(&self) -> PageState {
        self.state
    }
}

impl<'c, T: Transport, R: Queryable> Iterator for Pages<'c, T, R> {
    type Item = Result<R>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.pop_front() {
                return Some(Ok(item));
            }

            let PageState::HasNextPage(current) = self.state else {
                return None;
            };

            let query = self.query.clone().with_page(current);
            match R::page(self.client, &query) {
                Ok(page) => {
                    self.state = if current < page.total_pages {
                        PageState::HasNextPage(current + 1)
                    } else {
                        PageState::Exhausted
                    };
                    self.buffer.extend(page.data);
                }
                Err(err) => {
                    self.state = PageState::Exhausted;
                    return Some(Err(err));
                }
            }
        }
    }
}
