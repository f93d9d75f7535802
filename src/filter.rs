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

//! Dimension filters and the table deciding which combinations the API
//! accepts.

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;

use crate::country::Country;
use crate::enums::Dimension;
use crate::enums::Operator;
use crate::enums::SearchType;
use crate::error::ConfigError;

/// One `(dimension, operator, expression)` constraint. Regex expressions
/// use RE2 syntax and are checked by the API, not here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Filter {
    pub dimension: Dimension,
    pub operator: Operator,
    pub expression: String,
}

impl Filter {
    pub fn new(dimension: Dimension, operator: Operator, expression: impl Into<String>) -> Self {
        Self {
            dimension,
            operator,
            expression: expression.into(),
        }
    }

    pub fn equals(dimension: Dimension, expression: impl Into<String>) -> Self {
        Self::new(dimension, Operator::Equals, expression)
    }

    pub fn contains(dimension: Dimension, expression: impl Into<String>) -> Self {
        Self::new(dimension, Operator::Contains, expression)
    }

    pub fn regex(dimension: Dimension, pattern: impl Into<String>) -> Self {
        Self::new(dimension, Operator::IncludingRegex, pattern)
    }

    pub fn country(country: Country, operator: Operator) -> Self {
        Self::new(Dimension::Country, operator, country.expression())
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.dimension, self.operator, self.expression)
    }
}

/// Parses `dimension:operator:expression`; the expression may itself
/// contain colons.
impl FromStr for Filter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(3, ':');
        let (Some(dimension), Some(operator), Some(expression)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(format!(
                "filter '{s}' must look like dimension:operator:expression"
            ));
        };
        let dimension = dimension.parse::<Dimension>().map_err(|e| e.to_string())?;
        let operator = operator.parse::<Operator>().map_err(|e| e.to_string())?;
        Ok(Filter::new(dimension, operator, expression))
    }
}

struct FilterRule {
    dimension: Dimension,
    operators: &'static [Operator],
    unsupported: &'static [SearchType],
}

const PLAIN_OPERATORS: &[Operator] = &[
    Operator::Equals,
    Operator::NotEquals,
    Operator::Contains,
    Operator::NotContains,
];

const FILTER_RULES: [FilterRule; 6] = [
    FilterRule {
        dimension: Dimension::Date,
        operators: &[],
        unsupported: &[],
    },
    FilterRule {
        dimension: Dimension::Query,
        operators: &Operator::ALL,
        unsupported: &[SearchType::Discover, SearchType::GoogleNews],
    },
    FilterRule {
        dimension: Dimension::Page,
        operators: &Operator::ALL,
        unsupported: &[],
    },
    FilterRule {
        dimension: Dimension::Country,
        operators: PLAIN_OPERATORS,
        unsupported: &[],
    },
    FilterRule {
        dimension: Dimension::Device,
        operators: PLAIN_OPERATORS,
        unsupported: &[],
    },
    FilterRule {
        dimension: Dimension::SearchAppearance,
        operators: &[Operator::Equals, Operator::NotEquals],
        unsupported: &[],
    },
];

fn violation(dimension: Dimension, operator: Operator, search_type: SearchType) -> Option<&'static str> {
    let rule = FILTER_RULES.iter().find(|r| r.dimension == dimension)?;
    if rule.operators.is_empty() {
        return Some("dimension cannot be filtered");
    }
    if rule.unsupported.contains(&search_type) {
        return Some("dimension is not available for this search type");
    }
    if !rule.operators.contains(&operator) {
        if operator.is_regex() {
            return Some("regex operators only apply to query and page");
        }
        return Some("operator is not supported for this dimension");
    }
    None
}

pub fn is_legal(dimension: Dimension, operator: Operator, search_type: SearchType) -> bool {
    violation(dimension, operator, search_type).is_none()
}

pub fn check(filter: &Filter, search_type: SearchType) -> Result<(), ConfigError> {
    match violation(filter.dimension, filter.operator, search_type) {
        None => Ok(()),
        Some(reason) => Err(ConfigError::InvalidFilter {
            dimension: filter.dimension,
            operator: filter.operator,
            search_type,
            reason,
        }),
    }
}

/// Ordered filters, ANDed together on the wire. Keyed by dimension: a new
/// filter replaces every filter on the same dimension unless appended.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet {
    filters: Vec<Filter>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks `filter` against `search_type`, then stores it.
    pub fn add(&mut self, search_type: SearchType, filter: Filter, append: bool) -> Result<(), ConfigError> {
        check(&filter, search_type)?;
        self.push(filter, append);
        Ok(())
    }

    /// Stores `filter` without checking it; see [`FilterSet::validate`].
    pub fn push(&mut self, filter: Filter, append: bool) {
        if !append {
            self.filters.retain(|f| f.dimension != filter.dimension);
        }
        self.filters.push(filter);
    }

    /// Removes the filters on `dimension` matching `expression`, or all of
    /// them when no expression is given. Returns how many were removed.
    pub fn remove(&mut self, dimension: Dimension, expression: Option<&str>) -> usize {
        let before = self.filters.len();
        self.filters.retain(|f| {
            f.dimension != dimension || expression.is_some_and(|e| e != f.expression)
        });
        before - self.filters.len()
    }

    pub fn clear(&mut self) {
        self.filters.clear();
    }

    /// Reports the first filter that is illegal for `search_type`.
    pub fn validate(&self, search_type: SearchType) -> Result<(), ConfigError> {
        self.filters.iter().try_for_each(|f| check(f, search_type))
    }

    pub fn for_dimension(&self, dimension: Dimension) -> impl Iterator<Item = &Filter> {
        self.filters.iter().filter(move |f| f.dimension == dimension)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Filter> {
        self.filters.iter()
    }

    pub fn as_slice(&self) -> &[Filter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl<'a> IntoIterator for &'a FilterSet {
    type Item = &'a Filter;
    type IntoIter = std::slice::Iter<'a, Filter>;

    fn into_iter(self) -> Self::IntoIter {
        self.filters.iter()
    }
}
