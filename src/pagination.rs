// Copyright 2026 gsc-query Authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Offset pagination over `searchAnalytics.query`.
//!
//! The API never says whether more rows exist. A page holding exactly as
//! many rows as requested may be followed by another one; a shorter page is
//! the last. Requests are strictly sequential.

use log::debug;
use log::info;
use serde::Deserialize;
use serde_json::Value;

use crate::enums::MAX_ROW_LIMIT;
use crate::error::RemoteQueryError;
use crate::payload;
use crate::query::QueryState;
use crate::report::Report;
use crate::report::Row;
use crate::transport::Endpoint;
use crate::transport::Transport;

/// How a full retrieval walks the pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchPolicy {
    pub page_size: u32,
    pub max_rows: Option<u64>,
}

impl Default for FetchPolicy {
    fn default() -> Self {
        Self {
            page_size: MAX_ROW_LIMIT,
            max_rows: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub start_row: u32,
    pub row_limit: u32,
    pub rows: Vec<Row>,
    pub aggregation: Option<String>,
}

impl Page {
    /// A full page means the next offset may still hold rows.
    pub fn may_have_more(&self) -> bool {
        self.rows.len() as u64 >= u64::from(self.row_limit)
    }
}

#[derive(Deserialize)]
struct RawResponse {
    #[serde(default)]
    rows: Vec<RawRow>,
    #[serde(default, rename = "responseAggregationType")]
    aggregation: Option<String>,
}

#[derive(Deserialize)]
struct RawRow {
    #[serde(default)]
    keys: Vec<String>,
    #[serde(default)]
    clicks: f64,
    #[serde(default)]
    impressions: f64,
    #[serde(default)]
    ctr: f64,
    position: Option<f64>,
}

pub fn parse_page(
    state: &QueryState,
    endpoint: &Endpoint,
    response: Value,
    start_row: u32,
    row_limit: u32,
) -> Result<Page, RemoteQueryError> {
    let malformed = |reason: String| RemoteQueryError::MalformedResponse {
        endpoint: endpoint.to_string(),
        offset: start_row,
        reason,
    };
    if !response.is_object() {
        return Err(malformed("response is not a JSON object".to_string()));
    }
    let raw: RawResponse = serde_json::from_value(response).map_err(|e| malformed(e.to_string()))?;
    let expected = state.dimensions.len();
    let keep_position = state.search_type.reports_position();
    let rows = raw
        .rows
        .into_iter()
        .enumerate()
        .map(|(idx, row)| {
            if row.keys.len() != expected {
                return Err(malformed(format!(
                    "row {idx} has {} keys, expected {expected}",
                    row.keys.len()
                )));
            }
            Ok(Row {
                keys: row.keys,
                clicks: row.clicks,
                impressions: row.impressions,
                ctr: row.ctr,
                position: row.position.filter(|_| keep_position),
            })
        })
        .collect::<Result<Vec<Row>, RemoteQueryError>>()?;

    Ok(Page {
        start_row,
        row_limit,
        rows,
        aggregation: raw.aggregation,
    })
}

pub fn fetch_page<T: Transport + ?Sized>(
    transport: &T,
    state: &QueryState,
    start_row: u32,
    row_limit: u32,
) -> Result<Page, RemoteQueryError> {
    let endpoint = Endpoint::search_analytics(&state.site_url);
    let body = payload::search_analytics(state, start_row, row_limit);
    debug!("{endpoint}: startRow={start_row} rowLimit={row_limit}");
    let response = transport
        .submit(&endpoint, &body)
        .map_err(|source| RemoteQueryError::Transport {
            endpoint: endpoint.to_string(),
            offset: start_row,
            source,
        })?;
    parse_page(state, &endpoint, response, start_row, row_limit)
}

/// Page-by-page retrieval. Each `next` sends at most one request; the
/// first error ends the iteration.
pub struct Pages<'t, T: Transport + ?Sized> {
    transport: &'t T,
    state: QueryState,
    policy: FetchPolicy,
    next_start: u32,
    fetched: u64,
    requests: u32,
    done: bool,
}

impl<'t, T: Transport + ?Sized> Pages<'t, T> {
    /// The state is rewritten to the window actually walked: row zero and
    /// the page size, whatever limit or offset the caller set.
    pub fn new(transport: &'t T, mut state: QueryState, policy: FetchPolicy) -> Self {
        let page_size = policy.page_size.clamp(1, MAX_ROW_LIMIT);
        state.start_row = 0;
        state.row_limit = page_size;
        Self {
            transport,
            state,
            policy: FetchPolicy {
                page_size,
                max_rows: policy.max_rows,
            },
            next_start: 0,
            fetched: 0,
            requests: 0,
            done: false,
        }
    }

    pub fn state(&self) -> &QueryState {
        &self.state
    }

    pub fn requests(&self) -> u32 {
        self.requests
    }

    pub fn rows_fetched(&self) -> u64 {
        self.fetched
    }

    pub fn into_state(self) -> QueryState {
        self.state
    }
}

impl<T: Transport + ?Sized> Iterator for Pages<'_, T> {
    type Item = Result<Page, RemoteQueryError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let remaining = self.policy.max_rows.map(|cap| cap.saturating_sub(self.fetched));
        if remaining == Some(0) {
            self.done = true;
            return None;
        }

        let page_size = self.policy.page_size;
        let mut page = match fetch_page(self.transport, &self.state, self.next_start, page_size) {
            Ok(page) => page,
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };
        self.requests += 1;

        let more = page.may_have_more();
        if let Some(remaining) = remaining
            && page.rows.len() as u64 >= remaining
        {
            page.rows.truncate(remaining as usize);
            self.done = true;
        }
        self.fetched += page.rows.len() as u64;
        match self.next_start.checked_add(page_size) {
            Some(next) if more => self.next_start = next,
            _ => self.done = true,
        }
        Some(Ok(page))
    }
}

/// Drains every page into one report. Nothing is returned if any page fails.
pub fn fetch_all<T: Transport + ?Sized>(
    transport: &T,
    state: QueryState,
    policy: FetchPolicy,
) -> Result<Report, RemoteQueryError> {
    let mut pages = Pages::new(transport, state, policy);
    let mut rows = Vec::new();
    for page in pages.by_ref() {
        rows.extend(page?.rows);
    }
    info!(
        "fetched {} rows in {} requests from {}",
        rows.len(),
        pages.requests(),
        pages.state().site_url
    );
    Ok(Report::new(pages.into_state(), rows))
}
