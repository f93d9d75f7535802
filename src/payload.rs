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

//! Wire payloads. Pure functions of their input: no clock, no counters.

use serde_json::Value;
use serde_json::json;

use crate::dates::format_iso_date;
use crate::filter::Filter;
use crate::query::QueryState;

/// Request body for `searchAnalytics.query`. Every filter goes into one
/// AND group; empty dimension and filter lists are left out.
pub fn search_analytics(state: &QueryState, start_row: u32, row_limit: u32) -> Value {
    let mut body = json!({
        "startDate": format_iso_date(state.date_range.start),
        "endDate": format_iso_date(state.date_range.end),
        "type": state.search_type.as_str(),
        "dataState": state.date_range.data_state.as_str(),
        "aggregationType": state.aggregation.as_str(),
        "rowLimit": row_limit,
        "startRow": start_row,
    });
    if !state.dimensions.is_empty() {
        let dimensions: Vec<&str> = state.dimensions.iter().map(|d| d.as_str()).collect();
        body["dimensions"] = json!(dimensions);
    }
    if !state.filters.is_empty() {
        let filters: Vec<Value> = state.filters.iter().map(filter_json).collect();
        body["dimensionFilterGroups"] = json!([{ "groupType": "and", "filters": filters }]);
    }
    body
}

fn filter_json(filter: &Filter) -> Value {
    json!({
        "dimension": filter.dimension.as_str(),
        "operator": filter.operator.as_str(),
        "expression": filter.expression,
    })
}

/// Request body for `urlInspection.index.inspect`.
pub fn inspection(inspection_url: &str, site_url: &str, language_code: Option<&str>) -> Value {
    let mut body = json!({
        "inspectionUrl": inspection_url,
        "siteUrl": site_url,
    });
    if let Some(code) = language_code {
        body["languageCode"] = json!(code);
    }
    body
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::enums::Dimension;
    use crate::enums::Operator;
    use crate::enums::SearchType;
    use crate::query::Query;

    fn state() -> QueryState {
        let mut query = Query::new("sc-domain:example.com");
        query
            .today(date!(2024 - 03 - 10))
            .search_type(SearchType::Image)
            .dimensions([Dimension::Page, Dimension::Country])
            .filter(Filter::country(
                crate::country::Country::lookup("Italy").expect("italy"),
                Operator::Equals,
            ))
            .and_filter(Filter::new(Dimension::Page, Operator::IncludingRegex, "/blog/.*"));
        query.resolve().expect("resolve")
    }

    #[test]
    fn search_analytics_shape() {
        let body = search_analytics(&state(), 0, 25_000);
        assert_eq!(
            body,
            json!({
                "startDate": "2024-03-08",
                "endDate": "2024-03-09",
                "type": "image",
                "dataState": "final",
                "aggregationType": "auto",
                "rowLimit": 25_000,
                "startRow": 0,
                "dimensions": ["page", "country"],
                "dimensionFilterGroups": [{
                    "groupType": "and",
                    "filters": [
                        {"dimension": "country", "operator": "equals", "expression": "ita"},
                        {"dimension": "page", "operator": "includingRegex", "expression": "/blog/.*"}
                    ]
                }]
            })
        );
    }

    #[test]
    fn translation_is_byte_identical() {
        let state = state();
        let first = serde_json::to_vec(&search_analytics(&state, 100, 50)).expect("encode");
        let second = serde_json::to_vec(&search_analytics(&state, 100, 50)).expect("encode");
        assert_eq!(first, second);
    }

    #[test]
    fn empty_lists_are_omitted() {
        let mut query = Query::new("https://www.example.com/");
        let state = query.today(date!(2024 - 03 - 10)).resolve().expect("resolve");
        let body = search_analytics(&state, 0, 10);
        assert!(body.get("dimensions").is_none());
        assert!(body.get("dimensionFilterGroups").is_none());
    }

    #[test]
    fn inspection_shape() {
        assert_eq!(
            inspection("https://www.example.com/a", "https://www.example.com/", None),
            json!({"inspectionUrl": "https://www.example.com/a", "siteUrl": "https://www.example.com/"})
        );
        assert_eq!(
            inspection("https://www.example.com/a", "https://www.example.com/", Some("it-IT"))["languageCode"],
            "it-IT"
        );
    }
}
