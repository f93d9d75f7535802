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

//! Query builder and report engine for the Search Console Search Analytics
//! and URL Inspection APIs.
//!
//! ```no_run
//! use gsc_query::Dimension;
//! use gsc_query::Filter;
//! use gsc_query::Query;
//! use gsc_query::transport::HttpTransport;
//!
//! # fn main() -> anyhow::Result<()> {
//! let transport = HttpTransport::from_env(
//!     "https://searchconsole.googleapis.com",
//!     "GSC_ACCESS_TOKEN",
//!     std::time::Duration::from_secs(30),
//! )?;
//! let report = Query::new("sc-domain:example.com")
//!     .last_days(28)
//!     .dimensions([Dimension::Page, Dimension::Query])
//!     .filter(Filter::contains(Dimension::Page, "/blog/"))
//!     .get(&transport)?;
//! println!("{} rows", report.len());
//! # Ok(())
//! # }
//! ```

pub mod account;
pub mod config;
pub mod country;
pub mod dates;
pub mod enums;
pub mod error;
pub mod filter;
pub mod inspection;
pub mod pagination;
pub mod payload;
pub mod query;
pub mod report;
pub mod transport;

pub use account::Account;
pub use account::WebProperty;
pub use country::Country;
pub use dates::DateRange;
pub use enums::AggregationType;
pub use enums::DataState;
pub use enums::Dimension;
pub use enums::Operator;
pub use enums::SearchType;
pub use error::ConfigError;
pub use error::Error;
pub use error::PersistenceError;
pub use error::RemoteQueryError;
pub use error::Result;
pub use filter::Filter;
pub use filter::FilterSet;
pub use inspection::InspectUrl;
pub use inspection::InspectionReport;
pub use pagination::FetchPolicy;
pub use pagination::Page;
pub use query::Query;
pub use query::QueryState;
pub use report::Report;
pub use report::Row;
pub use transport::Endpoint;
pub use transport::Transport;
