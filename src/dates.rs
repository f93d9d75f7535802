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

//! Date window resolution.
//!
//! A builder records *what* the caller asked for as a [`DateSpec`]; the
//! concrete [`DateRange`] is only computed, and checked, when the query is
//! resolved for submission. The check order is fixed: inverted bounds,
//! then a future end, then a start beyond the 16 month lookback.

use serde::Deserialize;
use serde::Serialize;
use time::Date;
use time::Duration;
use time::Month;
use time::OffsetDateTime;

use crate::enums::DataState;
use crate::error::ConfigError;

/// How far back the Search Analytics data goes.
pub const LOOKBACK_MONTHS: i32 = 16;

time::serde::format_description!(iso_date, Date, "[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    #[serde(with = "iso_date")]
    pub start: Date,
    #[serde(with = "iso_date")]
    pub end: Date,
    pub data_state: DataState,
}

impl DateRange {
    pub fn days(&self) -> i64 {
        (self.end - self.start).whole_days() + 1
    }
}

/// A calendar date, either already typed or still in `YYYY-MM-DD` form.
/// String input is parsed during resolution so that a bad string surfaces
/// together with every other configuration problem.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateInput {
    Date(Date),
    Iso(String),
}

impl DateInput {
    fn resolve(&self) -> Result<Date, ConfigError> {
        match self {
            DateInput::Date(date) => Ok(*date),
            DateInput::Iso(text) => parse_iso_date(text),
        }
    }
}

impl From<Date> for DateInput {
    fn from(date: Date) -> Self {
        DateInput::Date(date)
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        DateInput::Iso(text.to_string())
    }
}

impl From<String> for DateInput {
    fn from(text: String) -> Self {
        DateInput::Iso(text)
    }
}

/// The last date-affecting call made on a builder. Each call replaces the
/// previous spec outright.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DateSpec {
    /// Start two days ago, end yesterday.
    #[default]
    Default,
    Range {
        start: DateInput,
        end: DateInput,
    },
    /// End defaults to the day after `start`, never past the latest
    /// allowed end.
    StartOnly(DateInput),
    /// Start defaults to the day before `end`.
    EndOnly(DateInput),
    /// `end = start + months + days`; a negative offset swaps the bounds.
    Relative {
        start: DateInput,
        days: i64,
        months: i32,
    },
    /// The last `n` days up to the latest allowed end.
    LastDays(u32),
    Single(DateInput),
}

pub fn today_utc() -> Date {
    OffsetDateTime::now_utc().date()
}

pub fn parse_iso_date(text: &str) -> Result<Date, ConfigError> {
    let format = time::macros::format_description!("[year]-[month]-[day]");
    Date::parse(text.trim(), format).map_err(|_| ConfigError::InvalidDate {
        input: text.to_string(),
    })
}

pub fn format_iso_date(date: Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), u8::from(date.month()), date.day())
}

/// Latest end date the API serves for `data_state`.
pub fn latest_end(today: Date, data_state: DataState) -> Date {
    match data_state {
        DataState::Fresh => today,
        DataState::Final => today.saturating_sub(Duration::days(1)),
    }
}

pub fn earliest_start(today: Date) -> Date {
    shift_months(today, -LOOKBACK_MONTHS)
}

/// Calendar month arithmetic, clamping the day to the target month's length.
pub fn shift_months(date: Date, months: i32) -> Date {
    let index = date.year() * 12 + i32::from(u8::from(date.month())) - 1 + months;
    let year = index.div_euclid(12);
    let month = Month::try_from((index.rem_euclid(12) + 1) as u8).unwrap_or(Month::January);
    let day = date.day().min(time::util::days_in_year_month(year, month));
    Date::from_calendar_date(year, month, day).unwrap_or(date)
}

pub fn resolve(spec: &DateSpec, data_state: DataState, today: Date) -> Result<DateRange, ConfigError> {
    let latest = latest_end(today, data_state);
    let (start, end) = match spec {
        DateSpec::Default => (
            today.saturating_sub(Duration::days(2)),
            today.saturating_sub(Duration::days(1)),
        ),
        DateSpec::Range { start, end } => (start.resolve()?, end.resolve()?),
        DateSpec::StartOnly(start) => {
            let start = start.resolve()?;
            let end = start.saturating_add(Duration::days(1)).min(latest).max(start);
            (start, end)
        }
        DateSpec::EndOnly(end) => {
            let end = end.resolve()?;
            (end.saturating_sub(Duration::days(1)), end)
        }
        DateSpec::Relative {
            start,
            days,
            months,
        } => {
            let anchor = start.resolve()?;
            let shifted = shift_months(anchor, *months).saturating_add(Duration::days(*days));
            if shifted < anchor {
                (shifted, anchor)
            } else {
                (anchor, shifted)
            }
        }
        DateSpec::LastDays(0) => return Err(ConfigError::EmptyWindow { days: 0 }),
        DateSpec::LastDays(days) => {
            let span = i64::from(*days) - 1;
            (latest.saturating_sub(Duration::days(span)), latest)
        }
        DateSpec::Single(day) => {
            let day = day.resolve()?;
            (day, day)
        }
    };

    validate(start, end, data_state, today)
}

fn validate(start: Date, end: Date, data_state: DataState, today: Date) -> Result<DateRange, ConfigError> {
    if end < start {
        return Err(ConfigError::InvalidRange { start, end });
    }
    let latest = latest_end(today, data_state);
    if end > latest {
        return Err(ConfigError::FutureDate { end, latest });
    }
    let earliest = earliest_start(today);
    if start < earliest {
        return Err(ConfigError::RangeTooOld { start, earliest });
    }
    Ok(DateRange {
        start,
        end,
        data_state,
    })
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    const TODAY: Date = date!(2024 - 03 - 10);

    #[test]
    fn default_window_is_two_days_back_to_yesterday() {
        let range = resolve(&DateSpec::Default, DataState::Final, TODAY).expect("resolve");
        assert_eq!(range.start, date!(2024 - 03 - 08));
        assert_eq!(range.end, date!(2024 - 03 - 09));
        assert_eq!(range.days(), 2);
    }

    #[test]
    fn final_rejects_today_but_fresh_allows_it() {
        let spec = DateSpec::Single(TODAY.into());
        let err = resolve(&spec, DataState::Final, TODAY).unwrap_err();
        assert_eq!(
            err,
            ConfigError::FutureDate {
                end: TODAY,
                latest: date!(2024 - 03 - 09)
            }
        );
        let range = resolve(&spec, DataState::Fresh, TODAY).expect("fresh");
        assert_eq!(range.end, TODAY);
    }

    #[test]
    fn inverted_bounds_are_rejected_before_other_checks() {
        let spec = DateSpec::Range {
            start: date!(2030 - 01 - 02).into(),
            end: date!(2030 - 01 - 01).into(),
        };
        let err = resolve(&spec, DataState::Final, TODAY).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidRange { .. }));
    }

    #[test]
    fn seventeen_months_back_is_too_old() {
        let start = shift_months(TODAY, -17);
        let spec = DateSpec::Range {
            start: start.into(),
            end: date!(2024 - 01 - 01).into(),
        };
        let err = resolve(&spec, DataState::Final, TODAY).unwrap_err();
        assert_eq!(
            err,
            ConfigError::RangeTooOld {
                start,
                earliest: date!(2022 - 11 - 10)
            }
        );
    }

    #[test]
    fn exactly_sixteen_months_back_is_allowed() {
        let spec = DateSpec::Range {
            start: date!(2022 - 11 - 10).into(),
            end: date!(2022 - 11 - 30).into(),
        };
        assert!(resolve(&spec, DataState::Final, TODAY).is_ok());
    }

    #[test]
    fn start_only_defaults_end_to_next_day_capped_at_latest() {
        let range = resolve(
            &DateSpec::StartOnly(date!(2024 - 02 - 01).into()),
            DataState::Final,
            TODAY,
        )
        .expect("resolve");
        assert_eq!(range.end, date!(2024 - 02 - 02));

        let range = resolve(
            &DateSpec::StartOnly(date!(2024 - 03 - 09).into()),
            DataState::Final,
            TODAY,
        )
        .expect("resolve");
        assert_eq!((range.start, range.end), (date!(2024 - 03 - 09), date!(2024 - 03 - 09)));
    }

    #[test]
    fn end_only_defaults_start_to_previous_day() {
        let range = resolve(
            &DateSpec::EndOnly("2024-03-01".into()),
            DataState::Final,
            TODAY,
        )
        .expect("resolve");
        assert_eq!(range.start, date!(2024 - 02 - 29));
    }

    #[test]
    fn negative_relative_offset_swaps_bounds() {
        let spec = DateSpec::Relative {
            start: "2023-10-10".into(),
            days: 0,
            months: -1,
        };
        let range = resolve(&spec, DataState::Final, TODAY).expect("resolve");
        assert_eq!(range.start, date!(2023 - 09 - 10));
        assert_eq!(range.end, date!(2023 - 10 - 10));

        let spec = DateSpec::Relative {
            start: "2023-10-10".into(),
            days: 1,
            months: 1,
        };
        let range = resolve(&spec, DataState::Final, TODAY).expect("resolve");
        assert_eq!(range.end, date!(2023 - 11 - 11));
    }

    #[test]
    fn last_days_ends_at_latest_allowed_day() {
        let range = resolve(&DateSpec::LastDays(7), DataState::Final, TODAY).expect("resolve");
        assert_eq!(range.start, date!(2024 - 03 - 03));
        assert_eq!(range.end, date!(2024 - 03 - 09));
        assert_eq!(range.days(), 7);
    }

    #[test]
    fn zero_day_window_is_rejected() {
        let err = resolve(&DateSpec::LastDays(0), DataState::Final, TODAY).unwrap_err();
        assert_eq!(err, ConfigError::EmptyWindow { days: 0 });
        let range = resolve(&DateSpec::LastDays(1), DataState::Final, TODAY).expect("one day");
        assert_eq!((range.start, range.end), (date!(2024 - 03 - 09), date!(2024 - 03 - 09)));
    }

    #[test]
    fn bad_iso_string_is_a_config_error() {
        let err = resolve(&DateSpec::Single("10/03/2024".into()), DataState::Final, TODAY).unwrap_err();
        assert_eq!(
            err,
            ConfigError::InvalidDate {
                input: "10/03/2024".to_string()
            }
        );
    }

    #[test]
    fn month_shift_clamps_to_month_end() {
        assert_eq!(shift_months(date!(2024 - 03 - 31), -1), date!(2024 - 02 - 29));
        assert_eq!(shift_months(date!(2024 - 01 - 15), -16), date!(2022 - 09 - 15));
        assert_eq!(shift_months(date!(2023 - 12 - 31), 2), date!(2024 - 02 - 29));
    }

    #[test]
    fn serializes_dates_as_iso_strings() {
        let range = resolve(&DateSpec::Default, DataState::Fresh, TODAY).expect("resolve");
        let json = serde_json::to_value(range).expect("serialize");
        assert_eq!(json["start"], "2024-03-08");
        assert_eq!(json["end"], "2024-03-09");
        assert_eq!(json["data_state"], "all");
        let back: DateRange = serde_json::from_value(json).expect("deserialize");
        assert_eq!(back, range);
    }
}
