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

//! Closed vocabularies of the Search Analytics and URL Inspection APIs.
//!
//! Every enum carries its wire name (`as_str`) and parses from either the
//! wire name or a snake_case spelling, case-insensitively.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

/// Largest `rowLimit` the Search Analytics endpoint accepts per request.
pub const MAX_ROW_LIMIT: u32 = 25_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Dimension {
    Date,
    Query,
    Page,
    Country,
    Device,
    SearchAppearance,
}

impl Dimension {
    pub const ALL: [Dimension; 6] = [
        Dimension::Date,
        Dimension::Query,
        Dimension::Page,
        Dimension::Country,
        Dimension::Device,
        Dimension::SearchAppearance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Dimension::Date => "date",
            Dimension::Query => "query",
            Dimension::Page => "page",
            Dimension::Country => "country",
            Dimension::Device => "device",
            Dimension::SearchAppearance => "searchAppearance",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Operator {
    Equals,
    NotEquals,
    Contains,
    NotContains,
    IncludingRegex,
    ExcludingRegex,
}

impl Operator {
    pub const ALL: [Operator; 6] = [
        Operator::Equals,
        Operator::NotEquals,
        Operator::Contains,
        Operator::NotContains,
        Operator::IncludingRegex,
        Operator::ExcludingRegex,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Equals => "equals",
            Operator::NotEquals => "notEquals",
            Operator::Contains => "contains",
            Operator::NotContains => "notContains",
            Operator::IncludingRegex => "includingRegex",
            Operator::ExcludingRegex => "excludingRegex",
        }
    }

    pub fn is_regex(self) -> bool {
        matches!(self, Operator::IncludingRegex | Operator::ExcludingRegex)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchType {
    #[default]
    Web,
    Image,
    Video,
    News,
    Discover,
    GoogleNews,
}

impl SearchType {
    pub const ALL: [SearchType; 6] = [
        SearchType::Web,
        SearchType::Image,
        SearchType::Video,
        SearchType::News,
        SearchType::Discover,
        SearchType::GoogleNews,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SearchType::Web => "web",
            SearchType::Image => "image",
            SearchType::Video => "video",
            SearchType::News => "news",
            SearchType::Discover => "discover",
            SearchType::GoogleNews => "googleNews",
        }
    }

    /// Discover and Google News traffic is not keyed by search query.
    pub fn supports_query(self) -> bool {
        !matches!(self, SearchType::Discover | SearchType::GoogleNews)
    }

    pub fn reports_position(self) -> bool {
        self.supports_query()
    }
}

/// FRESH includes same-day, possibly incomplete rows; FINAL only
/// finalized ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DataState {
    #[serde(rename = "all", alias = "fresh")]
    Fresh,
    #[default]
    #[serde(rename = "final")]
    Final,
}

impl DataState {
    pub fn as_str(self) -> &'static str {
        match self {
            DataState::Fresh => "all",
            DataState::Final => "final",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AggregationType {
    #[default]
    Auto,
    ByPage,
    ByProperty,
}

impl AggregationType {
    pub fn as_str(self) -> &'static str {
        match self {
            AggregationType::Auto => "auto",
            AggregationType::ByPage => "byPage",
            AggregationType::ByProperty => "byProperty",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Clicks,
    Impressions,
    Ctr,
    Position,
}

impl Metric {
    pub const ALL: [Metric; 4] = [
        Metric::Clicks,
        Metric::Impressions,
        Metric::Ctr,
        Metric::Position,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Clicks => "clicks",
            Metric::Impressions => "impressions",
            Metric::Ctr => "ctr",
            Metric::Position => "position",
        }
    }

    pub fn for_search_type(search_type: SearchType) -> Vec<Metric> {
        Metric::ALL
            .into_iter()
            .filter(|m| *m != Metric::Position || search_type.reports_position())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    kind: &'static str,
    input: String,
}

impl fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown {} '{}'", self.kind, self.input)
    }
}

impl std::error::Error for ParseEnumError {}

fn normalize(input: &str) -> String {
    input
        .trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-')
        .flat_map(char::to_lowercase)
        .collect()
}

fn parse_by_name<T: Copy>(
    kind: &'static str,
    input: &str,
    candidates: &[T],
    name: impl Fn(T) -> &'static str,
) -> Result<T, ParseEnumError> {
    let wanted = normalize(input);
    candidates
        .iter()
        .copied()
        .find(|c| normalize(name(*c)) == wanted)
        .ok_or_else(|| ParseEnumError {
            kind,
            input: input.to_string(),
        })
}

impl FromStr for Dimension {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_by_name("dimension", s, &Dimension::ALL, Dimension::as_str)
    }
}

impl FromStr for Operator {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "eq" | "=" => Ok(Operator::Equals),
            "ne" | "noteq" | "notequal" | "!=" => Ok(Operator::NotEquals),
            "regex" => Ok(Operator::IncludingRegex),
            _ => parse_by_name("operator", s, &Operator::ALL, Operator::as_str),
        }
    }
}

impl FromStr for SearchType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_by_name("search type", s, &SearchType::ALL, SearchType::as_str)
    }
}

impl FromStr for DataState {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "fresh" | "all" => Ok(DataState::Fresh),
            "final" => Ok(DataState::Final),
            _ => Err(ParseEnumError {
                kind: "data state",
                input: s.to_string(),
            }),
        }
    }
}

impl FromStr for AggregationType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_by_name(
            "aggregation type",
            s,
            &[
                AggregationType::Auto,
                AggregationType::ByPage,
                AggregationType::ByProperty,
            ],
            AggregationType::as_str,
        )
    }
}

macro_rules! impl_display {
    ($($ty:ty),+) => {
        $(
            impl fmt::Display for $ty {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    f.write_str(self.as_str())
                }
            }
        )+
    };
}

impl_display!(Dimension, Operator, SearchType, DataState, AggregationType, Metric);

/// Status codes returned by the URL Inspection endpoint, each with the
/// human readable label used in flattened reports.
macro_rules! inspection_codes {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => ($code:literal, $label:literal)),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn code(self) -> &'static str {
                match self {
                    $($name::$variant => $code),+
                }
            }

            pub fn description(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn from_code(code: &str) -> Option<Self> {
                Self::ALL.iter().copied().find(|v| v.code() == code)
            }
        }
    };
}

inspection_codes!(Verdict {
    Unspecified => ("VERDICT_UNSPECIFIED", "Unknown verdict"),
    Pass => ("PASS", "Page is in GSC"),
    Partial => ("PARTIAL", "Page is partially valid"),
    Fail => ("FAIL", "Page is not in GSC"),
    Neutral => ("NEUTRAL", "Excluded from GSC"),
});

inspection_codes!(RobotsTxtState {
    Unspecified => ("ROBOTS_TXT_STATE_UNSPECIFIED", "State unknown, page not fetched"),
    Allowed => ("ALLOWED", "Allowed"),
    Disallowed => ("DISALLOWED", "Disallowed"),
});

inspection_codes!(IndexingState {
    Unspecified => ("INDEXING_STATE_UNSPECIFIED", "State unknown"),
    Allowed => ("INDEXING_ALLOWED", "Indexing allowed"),
    BlockedByMetaTag => ("BLOCKED_BY_META_TAG", "Noindex detected in robots meta tag"),
    BlockedDueToNoindex => ("BLOCKED_DUE_TO_NOINDEX", "Noindex detected in robots meta tag"),
    BlockedByHttpHeader => ("BLOCKED_BY_HTTP_HEADER", "Noindex detected in X-Robots-Tag"),
    BlockedByRobotsTxt => ("BLOCKED_BY_ROBOTS_TXT", "Blocked by robots.txt"),
    BlockedDueToExpiredUnavailableAfter => (
        "BLOCKED_DUE_TO_EXPIRED_UNAVAILABLE_AFTER",
        "Indexing not allowed due to 'unavailable_after' date expired"
    ),
});

inspection_codes!(PageFetchState {
    Unspecified => ("PAGE_FETCH_STATE_UNSPECIFIED", "State unknown"),
    Successful => ("SUCCESSFUL", "Success"),
    SoftNotFound => ("SOFT_404", "Soft 404"),
    BlockedRobotsTxt => ("BLOCKED_ROBOTS_TXT", "Blocked by robots.txt"),
    NotFound => ("NOT_FOUND", "Page Not found (404)"),
    AccessDenied => ("ACCESS_DENIED", "Access denied (401)"),
    ServerError => ("SERVER_ERROR", "Server error (5xx)"),
    RedirectError => ("REDIRECT_ERROR", "Redirection error"),
    AccessForbidden => ("ACCESS_FORBIDDEN", "Access forbidden (403)"),
    Blocked4xx => ("BLOCKED_4XX", "Other 4xx issue (not 403, 404)"),
    InternalCrawlError => ("INTERNAL_CRAWL_ERROR", "Internal error"),
    InvalidUrl => ("INVALID_URL", "Invalid URL"),
});

inspection_codes!(CrawlingUserAgent {
    Unspecified => ("CRAWLING_USER_AGENT_UNSPECIFIED", "Unknown"),
    Desktop => ("DESKTOP", "Desktop"),
    Mobile => ("MOBILE", "Mobile"),
});

inspection_codes!(Severity {
    Unspecified => ("SEVERITY_UNSPECIFIED", "Unknown severity"),
    Warning => ("WARNING", "Warning"),
    Error => ("ERROR", "Error"),
});

inspection_codes!(MobileUsabilityIssueType {
    Unspecified => ("MOBILE_USABILITY_ISSUE_TYPE_UNSPECIFIED", "Unknown issue"),
    UsesIncompatiblePlugins => (
        "USES_INCOMPATIBLE_PLUGINS",
        "Site uses incompatible plugins for mobile devices"
    ),
    ConfigureViewport => ("CONFIGURE_VIEWPORT", "Viewport is not specified"),
    FixedWidthViewport => ("FIXED_WIDTH_VIEWPORT", "Viewport defined to a fixed width"),
    SizeContentToViewport => ("SIZE_CONTENT_TO_VIEWPORT", "Content not sized to viewport"),
    UseLegibleFontSizes => ("USE_LEGIBLE_FONT_SIZES", "Font size is too small for mobile devices"),
    TapTargetsTooClose => ("TAP_TARGETS_TOO_CLOSE", "Touch elements are too close"),
});

/// Label for a status code found under a flattened inspection key such as
/// `indexStatusResult.pageFetchState`. Unknown keys or codes yield `None`.
pub fn describe_inspection_code(key: &str, code: &str) -> Option<&'static str> {
    let field = key.rsplit('.').next().unwrap_or(key);
    match field {
        "verdict" | "ampIndexStatusVerdict" => Verdict::from_code(code).map(Verdict::description),
        "robotsTxtState" => RobotsTxtState::from_code(code).map(RobotsTxtState::description),
        "indexingState" => IndexingState::from_code(code).map(IndexingState::description),
        "pageFetchState" => PageFetchState::from_code(code).map(PageFetchState::description),
        "crawledAs" => CrawlingUserAgent::from_code(code).map(CrawlingUserAgent::description),
        "severity" => Severity::from_code(code).map(Severity::description),
        "issueType" if key.starts_with("mobileUsabilityResult") => {
            MobileUsabilityIssueType::from_code(code).map(MobileUsabilityIssueType::description)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_and_snake_case_names() {
        assert_eq!("searchAppearance".parse(), Ok(Dimension::SearchAppearance));
        assert_eq!("search_appearance".parse(), Ok(Dimension::SearchAppearance));
        assert_eq!("COUNTRY".parse(), Ok(Dimension::Country));
        assert_eq!("not_contains".parse(), Ok(Operator::NotContains));
        assert_eq!("google_news".parse(), Ok(SearchType::GoogleNews));
        assert_eq!("fresh".parse(), Ok(DataState::Fresh));
        assert_eq!("by_property".parse(), Ok(AggregationType::ByProperty));
        assert!("weekday".parse::<Dimension>().is_err());
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&(Operator::NotEquals, DataState::Fresh, SearchType::GoogleNews))
            .expect("serialize");
        assert_eq!(json, r#"["notEquals","all","googleNews"]"#);
    }

    #[test]
    fn discover_drops_position_metric() {
        let metrics = Metric::for_search_type(SearchType::Discover);
        assert_eq!(metrics, vec![Metric::Clicks, Metric::Impressions, Metric::Ctr]);
        assert_eq!(Metric::for_search_type(SearchType::Web).len(), 4);
    }

    #[test]
    fn inspection_codes_resolve_by_key() {
        assert_eq!(
            describe_inspection_code("indexStatusResult.pageFetchState", "SOFT_404"),
            Some("Soft 404")
        );
        assert_eq!(
            describe_inspection_code("mobileUsabilityResult.issues.0.issueType", "CONFIGURE_VIEWPORT"),
            Some("Viewport is not specified")
        );
        assert_eq!(describe_inspection_code("indexStatusResult.verdict", "BOGUS"), None);
        assert_eq!(describe_inspection_code("indexStatusResult.coverageState", "PASS"), None);
    }
}
