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

//! The Search Analytics query builder.
//!
//! Chained calls only record intent. Everything is resolved and checked in
//! [`Query::resolve`], which runs before any request is sent, so a bad
//! configuration never costs a network round trip.

use log::warn;
use serde::Deserialize;
use serde::Serialize;
use time::Date;

use crate::dates;
use crate::dates::DateInput;
use crate::dates::DateRange;
use crate::dates::DateSpec;
use crate::enums::AggregationType;
use crate::enums::DataState;
use crate::enums::Dimension;
use crate::enums::MAX_ROW_LIMIT;
use crate::enums::SearchType;
use crate::error::ConfigError;
use crate::error::Result;
use crate::filter::Filter;
use crate::filter::FilterSet;
use crate::pagination;
use crate::pagination::FetchPolicy;
use crate::pagination::Page;
use crate::pagination::Pages;
use crate::report::Report;
use crate::transport::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Empty,
    Configured,
    Submitted,
}

/// A fully resolved and validated query. This is what gets translated to
/// the wire and echoed inside every report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryState {
    pub site_url: String,
    pub search_type: SearchType,
    pub date_range: DateRange,
    pub dimensions: Vec<Dimension>,
    pub filters: FilterSet,
    pub aggregation: AggregationType,
    pub row_limit: u32,
    pub start_row: u32,
}

#[derive(Debug, Clone)]
pub struct Query {
    site_url: String,
    today: Option<Date>,
    search_type: SearchType,
    data_state: DataState,
    aggregation: AggregationType,
    dates: DateSpec,
    dimensions: Vec<Dimension>,
    filters: FilterSet,
    row_limit: Option<u32>,
    start_row: u32,
    policy: FetchPolicy,
    phase: Phase,
}

impl Query {
    pub fn new(site_url: impl Into<String>) -> Self {
        Self {
            site_url: site_url.into(),
            today: None,
            search_type: SearchType::default(),
            data_state: DataState::default(),
            aggregation: AggregationType::default(),
            dates: DateSpec::Default,
            dimensions: Vec::new(),
            filters: FilterSet::new(),
            row_limit: None,
            start_row: 0,
            policy: FetchPolicy::default(),
            phase: Phase::Empty,
        }
    }

    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn filters(&self) -> &FilterSet {
        &self.filters
    }

    fn touch(&mut self) -> &mut Self {
        if self.phase == Phase::Empty {
            self.phase = Phase::Configured;
        }
        self
    }

    /// Pins "today" instead of reading the UTC clock at resolution time.
    pub fn today(&mut self, today: Date) -> &mut Self {
        self.today = Some(today);
        self
    }

    pub fn search_type(&mut self, search_type: SearchType) -> &mut Self {
        self.search_type = search_type;
        self.touch()
    }

    pub fn data_state(&mut self, data_state: DataState) -> &mut Self {
        self.data_state = data_state;
        self.touch()
    }

    pub fn aggregation(&mut self, aggregation: AggregationType) -> &mut Self {
        self.aggregation = aggregation;
        self.touch()
    }

    fn dates(&mut self, spec: DateSpec) -> &mut Self {
        self.dates = spec;
        self.touch()
    }

    pub fn default_range(&mut self) -> &mut Self {
        self.dates(DateSpec::Default)
    }

    pub fn range(&mut self, start: impl Into<DateInput>, end: impl Into<DateInput>) -> &mut Self {
        self.dates(DateSpec::Range {
            start: start.into(),
            end: end.into(),
        })
    }

    /// Same as [`Query::range`]; spelled out for `YYYY-MM-DD` callers.
    pub fn range_iso(&mut self, start: &str, end: &str) -> &mut Self {
        self.range(start, end)
    }

    pub fn start_date(&mut self, start: impl Into<DateInput>) -> &mut Self {
        self.dates(DateSpec::StartOnly(start.into()))
    }

    pub fn end_date(&mut self, end: impl Into<DateInput>) -> &mut Self {
        self.dates(DateSpec::EndOnly(end.into()))
    }

    pub fn single_day(&mut self, day: impl Into<DateInput>) -> &mut Self {
        self.dates(DateSpec::Single(day.into()))
    }

    pub fn last_days(&mut self, days: u32) -> &mut Self {
        self.dates(DateSpec::LastDays(days))
    }

    pub fn range_relative(&mut self, start: impl Into<DateInput>, days: i64, months: i32) -> &mut Self {
        self.dates(DateSpec::Relative {
            start: start.into(),
            days,
            months,
        })
    }

    pub fn dimension(&mut self, dimension: Dimension) -> &mut Self {
        self.dimensions.push(dimension);
        self.touch()
    }

    /// Replaces the dimension list.
    pub fn dimensions(&mut self, dimensions: impl IntoIterator<Item = Dimension>) -> &mut Self {
        self.dimensions = dimensions.into_iter().collect();
        self.touch()
    }

    pub fn filter(&mut self, filter: Filter) -> &mut Self {
        self.filters.push(filter, false);
        self.touch()
    }

    /// Adds `filter` as one more AND clause, keeping earlier filters on the
    /// same dimension.
    pub fn and_filter(&mut self, filter: Filter) -> &mut Self {
        self.filters.push(filter, true);
        self.touch()
    }

    pub fn remove_filter(&mut self, dimension: Dimension, expression: Option<&str>) -> &mut Self {
        self.filters.remove(dimension, expression);
        self.touch()
    }

    pub fn clear_filters(&mut self) -> &mut Self {
        self.filters.clear();
        self.touch()
    }

    pub fn limit(&mut self, row_limit: u32) -> &mut Self {
        self.row_limit = Some(row_limit);
        self.touch()
    }

    pub fn offset(&mut self, start_row: u32) -> &mut Self {
        self.start_row = start_row;
        self.touch()
    }

    pub fn limit_range(&mut self, start_row: u32, row_limit: u32) -> &mut Self {
        self.offset(start_row).limit(row_limit)
    }

    /// Row cap for [`Query::get`] and [`Query::pages`].
    pub fn max_rows(&mut self, max_rows: u64) -> &mut Self {
        self.policy.max_rows = Some(max_rows);
        self.touch()
    }

    /// Rows requested per page by [`Query::get`], clamped to the API maximum.
    pub fn page_size(&mut self, page_size: u32) -> &mut Self {
        self.policy.page_size = page_size.clamp(1, MAX_ROW_LIMIT);
        self.touch()
    }

    pub fn policy(&self) -> FetchPolicy {
        self.policy
    }

    /// Resolves dates and checks every cross-field rule, reporting the first
    /// violation.
    pub fn resolve(&self) -> std::result::Result<QueryState, ConfigError> {
        let today = self.today.unwrap_or_else(dates::today_utc);
        let date_range = dates::resolve(&self.dates, self.data_state, today)?;
        check_dimensions(&self.dimensions, self.search_type)?;
        self.filters.validate(self.search_type)?;
        if self.aggregation == AggregationType::ByProperty {
            if self.dimensions.contains(&Dimension::Page) {
                return Err(ConfigError::IncompatibleAggregation {
                    aggregation: self.aggregation,
                    reason: "results cannot be grouped by page",
                });
            }
            if self.filters.for_dimension(Dimension::Page).next().is_some() {
                return Err(ConfigError::IncompatibleAggregation {
                    aggregation: self.aggregation,
                    reason: "results cannot be filtered by page",
                });
            }
        }
        let row_limit = match self.row_limit {
            None => MAX_ROW_LIMIT,
            Some(0) => {
                return Err(ConfigError::InvalidRowLimit {
                    value: 0,
                    max: MAX_ROW_LIMIT,
                });
            }
            Some(limit) if limit > MAX_ROW_LIMIT => {
                warn!("row limit {limit} exceeds the API maximum; capped to {MAX_ROW_LIMIT}");
                MAX_ROW_LIMIT
            }
            Some(limit) => limit,
        };

        Ok(QueryState {
            site_url: self.site_url.clone(),
            search_type: self.search_type,
            date_range,
            dimensions: self.dimensions.clone(),
            filters: self.filters.clone(),
            aggregation: self.aggregation,
            row_limit,
            start_row: self.start_row,
        })
    }

    /// Submits one page using the configured row limit and start row.
    pub fn execute<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<Page> {
        let state = self.resolve()?;
        self.phase = Phase::Submitted;
        let page = pagination::fetch_page(transport, &state, state.start_row, state.row_limit)?;
        Ok(page)
    }

    /// [`Query::execute`] wrapped as a report whose query records the
    /// submitted row limit and start row.
    pub fn execute_report<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<Report> {
        let state = self.resolve()?;
        self.phase = Phase::Submitted;
        let page = pagination::fetch_page(transport, &state, state.start_row, state.row_limit)?;
        Ok(Report::new(state, page.rows))
    }

    /// Walks every page from row zero and returns the whole dataset. Any
    /// manually set row limit or start row is ignored.
    pub fn get<T: Transport + ?Sized>(&mut self, transport: &T) -> Result<Report> {
        let state = self.resolve()?;
        self.phase = Phase::Submitted;
        let report = pagination::fetch_all(transport, state, self.policy)?;
        Ok(report)
    }

    /// Like [`Query::get`], but yields pages as they arrive. No request is
    /// sent until the first call to `next`.
    pub fn pages<'t, T: Transport + ?Sized>(&mut self, transport: &'t T) -> Result<Pages<'t, T>> {
        let state = self.resolve()?;
        self.phase = Phase::Submitted;
        Ok(Pages::new(transport, state, self.policy))
    }
}

fn check_dimensions(dimensions: &[Dimension], search_type: SearchType) -> std::result::Result<(), ConfigError> {
    for (idx, dimension) in dimensions.iter().enumerate() {
        if dimensions[..idx].contains(dimension) {
            return Err(ConfigError::DuplicateDimension(*dimension));
        }
    }
    for dimension in dimensions {
        match dimension {
            Dimension::Query if !search_type.supports_query() => {
                return Err(ConfigError::IncompatibleDimension {
                    dimension: *dimension,
                    reason: "not available for this search type",
                });
            }
            Dimension::SearchAppearance if dimensions.len() > 1 => {
                return Err(ConfigError::IncompatibleDimension {
                    dimension: *dimension,
                    reason: "cannot be combined with other dimensions",
                });
            }
            _ => {}
        }
    }
    Ok(())
}
