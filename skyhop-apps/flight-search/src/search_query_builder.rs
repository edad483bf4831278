//!  Skyhop Flight Search
//!
//!  Copyright (C) 2026  Mamy Ratsimbazafy
//!
//!  This program is free software: you can redistribute it and/or modify
//!  it under the terms of the GNU Affero General Public License as published by
//!  the Free Software Foundation, either version 3 of the License, or
//!  (at your option) any later version.
//!
//!  This program is distributed in the hope that it will be useful,
//!  but WITHOUT ANY WARRANTY; without even the implied warranty of
//!  MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
//!  GNU Affero General Public License for more details.
//!
//!  You should have received a copy of the GNU Affero General Public License
//!  along with this program.  If not, see <http://www.gnu.org/licenses/>.

//! # Search Query Builder
//!
//! Side-effect free input handling for a flight search.
//! [`SearchForm`] holds the user's partially filled input and applies the
//! trip-nights rules; [`SearchRequest`] is the validated JSON body sent to
//! the search endpoint.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::num::IntErrorKind;
use thiserror::Error;

static AIRPORT_CODE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]{3}$").unwrap());

/// Input problems that block submission. `Display` is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("모든 항목을 입력해주세요.")]
    MissingFields,
    #[error("올바른 공항 코드가 아닙니다: {0}")]
    InvalidAirportCode(String),
    #[error("귀국일은 출발일보다 빠를 수 없습니다.")]
    EndBeforeStart,
    #[error("최대 {max}박까지 선택할 수 있습니다.")]
    NightsExceeded { max: u32 },
}

/// Whole days between `start` and `end`, never negative.
pub fn calculate_max_nights(start: NaiveDate, end: NaiveDate) -> u32 {
    let days = end.signed_duration_since(start).num_days();
    u32::try_from(days.max(0)).unwrap_or(u32::MAX)
}

/// Normalize an airport code: trimmed, upper-cased, exactly three letters.
pub fn normalize_airport_code(raw: &str) -> Result<String, FormError> {
    let code = raw.trim().to_ascii_uppercase();
    if AIRPORT_CODE_RE.is_match(&code) {
        Ok(code)
    } else {
        Err(FormError::InvalidAirportCode(raw.trim().to_string()))
    }
}

/// Request body for `POST /api/search`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub departure: String,
    pub destination: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trip_nights: Option<u32>,
}

impl SearchRequest {
    pub fn new(
        departure: &str,
        destination: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
        trip_nights: Option<u32>,
    ) -> Result<Self, FormError> {
        let request = Self {
            departure: normalize_airport_code(departure)?,
            destination: normalize_airport_code(destination)?,
            start_date,
            end_date,
            trip_nights,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), FormError> {
        for code in [&self.departure, &self.destination] {
            if !AIRPORT_CODE_RE.is_match(code) {
                return Err(FormError::InvalidAirportCode(code.clone()));
            }
        }
        if self.end_date < self.start_date {
            return Err(FormError::EndBeforeStart);
        }
        if let Some(nights) = self.trip_nights {
            let max = self.max_nights();
            if nights > max {
                return Err(FormError::NightsExceeded { max });
            }
        }
        Ok(())
    }

    pub fn max_nights(&self) -> u32 {
        calculate_max_nights(self.start_date, self.end_date)
    }
}

/// Result of interpreting raw trip-nights text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NightsInput {
    Empty,
    Nights(u32),
}

fn parse_nights_input(raw: &str) -> NightsInput {
    // Negative and non-numeric entries are both treated as "no value"
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 0 => NightsInput::Nights(u32::try_from(n).unwrap_or(u32::MAX)),
        // Too many digits is still an over-range number, left for the clamp
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => NightsInput::Nights(u32::MAX),
        _ => NightsInput::Empty,
    }
}

/// User input for one search, filled in field by field.
///
/// Mirrors what a search form does as the user types: airport codes are
/// normalized on entry, trip nights are clamped to the date window whenever
/// either side changes, and [`SearchForm::submit`] refuses to produce a
/// request while a required field is unset.
#[derive(Debug, Clone, Default)]
pub struct SearchForm {
    from_airport: Option<String>,
    to_airport: Option<String>,
    start_date: Option<NaiveDate>,
    end_date: Option<NaiveDate>,
    trip_nights: Option<u32>,
    error: Option<FormError>,
}

impl SearchForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_airport(&self) -> Option<&str> {
        self.from_airport.as_deref()
    }

    pub fn to_airport(&self) -> Option<&str> {
        self.to_airport.as_deref()
    }

    pub fn start_date(&self) -> Option<NaiveDate> {
        self.start_date
    }

    pub fn end_date(&self) -> Option<NaiveDate> {
        self.end_date
    }

    pub fn trip_nights(&self) -> Option<u32> {
        self.trip_nights
    }

    /// Message currently shown next to the form, if any.
    pub fn error(&self) -> Option<&FormError> {
        self.error.as_ref()
    }

    pub fn set_from_airport(&mut self, raw: &str) {
        self.from_airport = self.accept_airport(raw);
    }

    pub fn set_to_airport(&mut self, raw: &str) {
        self.to_airport = self.accept_airport(raw);
    }

    fn accept_airport(&mut self, raw: &str) -> Option<String> {
        if raw.trim().is_empty() {
            return None;
        }
        match normalize_airport_code(raw) {
            Ok(code) => {
                if matches!(self.error, Some(FormError::InvalidAirportCode(_))) {
                    self.error = None;
                }
                Some(code)
            }
            Err(e) => {
                tracing::debug!("Rejected airport code input: {:?}", raw);
                self.error = Some(e);
                None
            }
        }
    }

    pub fn set_start_date(&mut self, date: Option<NaiveDate>) {
        self.start_date = date;
        self.reapply_nights_bound();
    }

    pub fn set_end_date(&mut self, date: Option<NaiveDate>) {
        self.end_date = date;
        self.reapply_nights_bound();
    }

    /// Upper bound for trip nights, known once both dates are set.
    pub fn max_nights(&self) -> Option<u32> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some(calculate_max_nights(start, end)),
            _ => None,
        }
    }

    /// Apply raw trip-nights text as typed by the user.
    ///
    /// Over-range values are clamped to [`SearchForm::max_nights`] with a
    /// message; negative or non-numeric text clears the field silently.
    pub fn set_trip_nights_input(&mut self, raw: &str) {
        match parse_nights_input(raw) {
            NightsInput::Empty => {
                self.trip_nights = None;
                self.clear_nights_error();
            }
            NightsInput::Nights(nights) => {
                self.trip_nights = Some(nights);
                self.clear_nights_error();
                self.reapply_nights_bound();
            }
        }
    }

    fn reapply_nights_bound(&mut self) {
        let (Some(nights), Some(max)) = (self.trip_nights, self.max_nights()) else {
            return;
        };
        if nights > max {
            tracing::debug!("Clamping trip nights {} to {}", nights, max);
            self.trip_nights = Some(max);
            self.error = Some(FormError::NightsExceeded { max });
        }
    }

    fn clear_nights_error(&mut self) {
        if matches!(self.error, Some(FormError::NightsExceeded { .. })) {
            self.error = None;
        }
    }

    /// True when every required field is set.
    pub fn is_complete(&self) -> bool {
        self.from_airport.is_some()
            && self.to_airport.is_some()
            && self.start_date.is_some()
            && self.end_date.is_some()
    }

    /// Build the request, or record and return the reason it cannot be sent.
    pub fn submit(&mut self) -> Result<SearchRequest, FormError> {
        let result = match (
            &self.from_airport,
            &self.to_airport,
            self.start_date,
            self.end_date,
        ) {
            (Some(from), Some(to), Some(start), Some(end)) => {
                SearchRequest::new(from, to, start, end, self.trip_nights)
            }
            _ => Err(FormError::MissingFields),
        };
        match &result {
            Ok(_) => self.error = None,
            Err(e) => self.error = Some(e.clone()),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_max_nights() {
        assert_eq!(calculate_max_nights(date(2025, 1, 15), date(2025, 1, 20)), 5);
        assert_eq!(calculate_max_nights(date(2025, 1, 15), date(2025, 1, 15)), 0);
        assert_eq!(calculate_max_nights(date(2025, 1, 20), date(2025, 1, 15)), 0);
        assert_eq!(calculate_max_nights(date(2024, 2, 28), date(2024, 3, 1)), 2);
    }

    #[test]
    fn test_normalize_airport_code() {
        assert_eq!(normalize_airport_code(" icn ").unwrap(), "ICN");
        assert!(normalize_airport_code("IC").is_err());
        assert!(normalize_airport_code("ICN1").is_err());
        assert!(normalize_airport_code("인천").is_err());
    }

    #[test]
    fn test_parse_nights_input() {
        assert_eq!(parse_nights_input("3"), NightsInput::Nights(3));
        assert_eq!(parse_nights_input(" 0 "), NightsInput::Nights(0));
        assert_eq!(parse_nights_input("-1"), NightsInput::Empty);
        assert_eq!(
            parse_nights_input("99999999999999999999"),
            NightsInput::Nights(u32::MAX)
        );
        assert_eq!(parse_nights_input("-99999999999999999999"), NightsInput::Empty);
        assert_eq!(parse_nights_input("abc"), NightsInput::Empty);
        assert_eq!(parse_nights_input("2.5"), NightsInput::Empty);
        assert_eq!(parse_nights_input(""), NightsInput::Empty);
    }

    #[test]
    fn test_request_serializes_without_nights() {
        let request =
            SearchRequest::new("ICN", "NRT", date(2025, 1, 15), date(2025, 1, 20), None).unwrap();
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "departure": "ICN",
                "destination": "NRT",
                "start_date": "2025-01-15",
                "end_date": "2025-01-20",
            })
        );
    }

    #[test]
    fn test_request_rejects_reversed_dates() {
        let err = SearchRequest::new("ICN", "NRT", date(2025, 1, 20), date(2025, 1, 15), None)
            .unwrap_err();
        assert_eq!(err, FormError::EndBeforeStart);
    }

    #[test]
    fn test_request_rejects_nights_over_window() {
        let err = SearchRequest::new("ICN", "NRT", date(2025, 1, 15), date(2025, 1, 17), Some(3))
            .unwrap_err();
        assert_eq!(err, FormError::NightsExceeded { max: 2 });
        assert_eq!(err.to_string(), "최대 2박까지 선택할 수 있습니다.");
    }

    #[test]
    fn test_invalid_airport_leaves_field_unset() {
        let mut form = SearchForm::new();
        form.set_from_airport("ICNX");
        assert_eq!(form.from_airport(), None);
        assert!(matches!(form.error(), Some(FormError::InvalidAirportCode(_))));

        form.set_from_airport("icn");
        assert_eq!(form.from_airport(), Some("ICN"));
        assert_eq!(form.error(), None);
    }
}
