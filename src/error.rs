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

//! Error taxonomy shared by the builders, the page engine and the
//! persistence bridge.

use std::path::PathBuf;

use thiserror::Error;
use time::Date;

use crate::enums::AggregationType;
use crate::enums::Dimension;
use crate::enums::Operator;
use crate::enums::SearchType;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Remote(#[from] RemoteQueryError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Problems detected locally, before anything is sent to the API.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid date range: end {end} is before start {start}")]
    InvalidRange { start: Date, end: Date },

    #[error("end date {end} is in the future (latest allowed is {latest})")]
    FutureDate { end: Date, latest: Date },

    #[error("start date {start} is older than the 16 month window (earliest allowed is {earliest})")]
    RangeTooOld { start: Date, earliest: Date },

    #[error("a window of the last {days} days is empty")]
    EmptyWindow { days: u32 },

    #[error("invalid date '{input}': expected YYYY-MM-DD")]
    InvalidDate { input: String },

    #[error("invalid filter on {dimension} with {operator} for search type {search_type}: {reason}")]
    InvalidFilter {
        dimension: Dimension,
        operator: Operator,
        search_type: SearchType,
        reason: &'static str,
    },

    #[error("dimension {0} requested more than once")]
    DuplicateDimension(Dimension),

    #[error("dimension {dimension} cannot be used here: {reason}")]
    IncompatibleDimension {
        dimension: Dimension,
        reason: &'static str,
    },

    #[error("aggregation {aggregation} cannot be used here: {reason}")]
    IncompatibleAggregation {
        aggregation: AggregationType,
        reason: &'static str,
    },

    #[error("row limit must be between 1 and {max}, got {value}")]
    InvalidRowLimit { value: u32, max: u32 },

    #[error("no URL to inspect")]
    NoInspectionUrls,

    #[error("URL '{url}' cannot be inspected for {site}: {reason}")]
    InvalidInspectionUrl {
        url: String,
        site: String,
        reason: &'static str,
    },
}

/// Failures reported after a request left the process.
#[derive(Error, Debug)]
pub enum RemoteQueryError {
    #[error("request to {endpoint} failed at offset {offset}: {source}")]
    Transport {
        endpoint: String,
        offset: u32,
        #[source]
        source: anyhow::Error,
    },

    #[error("malformed response from {endpoint} at offset {offset}: {reason}")]
    MalformedResponse {
        endpoint: String,
        offset: u32,
        reason: String,
    },
}

impl RemoteQueryError {
    pub fn offset(&self) -> u32 {
        match self {
            RemoteQueryError::Transport { offset, .. } => *offset,
            RemoteQueryError::MalformedResponse { offset, .. } => *offset,
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            RemoteQueryError::Transport { endpoint, .. } => endpoint,
            RemoteQueryError::MalformedResponse { endpoint, .. } => endpoint,
        }
    }
}

/// The byte stream of a persisted report could not be written or read back.
#[derive(Error, Debug)]
pub enum PersistenceError {
    #[error("i/o error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("report stream is not readable: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("report could not be encoded: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("report stream version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("report stream holds '{found}', expected '{expected}'")]
    KindMismatch { found: String, expected: &'static str },
}
