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

//! # Results View
//!
//! Side-effect free display values derived from a [`SearchResponse`]:
//! trip span, localized dates, grouped prices and savings against the
//! direct fare.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::search_results::{FlightSegment, ROUTE_ARROW, SearchResponse};

pub const CURRENCY_SUFFIX: &str = "원";

/// Length of the stay between the first and last segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TripSpan {
    pub nights: u32,
    pub days: u32,
}

impl TripSpan {
    pub fn label(&self) -> String {
        format!("{}박 {}일", self.nights, self.days)
    }
}

/// Nights between the first and last segment dates, `None` without segments.
pub fn trip_span(segments: &[FlightSegment]) -> Option<TripSpan> {
    let first = segments.first()?;
    let last = segments.last()?;
    let nights = last.date.signed_duration_since(first.date).num_days().max(0);
    let nights = u32::try_from(nights).unwrap_or(u32::MAX);
    Some(TripSpan {
        nights,
        days: nights.saturating_add(1),
    })
}

/// Savings against the direct fare, only when the backend flags the
/// itinerary as cheaper and sent a direct cost.
pub fn savings(response: &SearchResponse) -> Option<i128> {
    if !response.cheaper_than_direct {
        return None;
    }
    let direct = response.direct_cost?;
    Some(i128::from(direct) - i128::from(response.total_cost))
}

/// Group digits by thousands: `164000` -> `164,000`.
pub fn group_thousands(value: i128) -> String {
    let digits = value.unsigned_abs().to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if value < 0 {
        grouped.push('-');
    }
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    grouped
}

pub fn format_price(amount: u64) -> String {
    format!("{}{}", group_thousands(i128::from(amount)), CURRENCY_SUFFIX)
}

pub fn format_savings(amount: i128) -> String {
    format!("{}{} 절약", group_thousands(amount), CURRENCY_SUFFIX)
}

/// Korean short date: `2025. 1. 15.`
pub fn format_date(date: NaiveDate) -> String {
    format!("{}. {}. {}.", date.year(), date.month(), date.day())
}

fn format_times(dep: Option<&str>, arr: Option<&str>) -> Option<String> {
    match (dep, arr) {
        (Some(dep), Some(arr)) => Some(format!("{}{}{}", dep, ROUTE_ARROW, arr)),
        (Some(dep), None) => Some(format!("{} 출발", dep)),
        (None, Some(arr)) => Some(format!("{} 도착", arr)),
        (None, None) => None,
    }
}

/// Display values for one segment. Absent optional fields stay absent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SegmentView {
    pub route: String,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub times: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flight_number: Option<String>,
    pub provider: String,
    pub price: String,
}

impl SegmentView {
    pub fn from_segment(segment: &FlightSegment) -> Self {
        Self {
            route: format!(
                "{}{}{}",
                segment.from_airport, ROUTE_ARROW, segment.to_airport
            ),
            date: format_date(segment.date),
            times: format_times(segment.departure_time(), segment.arrival_time()),
            flight_number: segment.flight_number().map(str::to_string),
            provider: segment.provider.clone(),
            price: format_price(segment.price),
        }
    }
}

/// Everything a result screen shows for one search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultView {
    pub route_pattern: String,
    pub total_cost: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trip_span: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub departure_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direct_cost: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub savings: Option<String>,
    pub segments: Vec<SegmentView>,
}

impl ResultView {
    pub fn from_response(response: &SearchResponse) -> Self {
        let show_savings = savings(response);
        Self {
            route_pattern: response.display_route_pattern(),
            total_cost: format_price(response.total_cost),
            trip_span: trip_span(&response.segments).map(|span| span.label()),
            departure_date: response.first_segment().map(|s| format_date(s.date)),
            return_date: response.last_segment().map(|s| format_date(s.date)),
            direct_cost: show_savings
                .and(response.direct_cost)
                .map(format_price),
            savings: show_savings.map(format_savings),
            segments: response
                .segments
                .iter()
                .map(SegmentView::from_segment)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1000), "1,000");
        assert_eq!(group_thousands(36000), "36,000");
        assert_eq!(group_thousands(1234567), "1,234,567");
        assert_eq!(group_thousands(-36000), "-36,000");
        assert_eq!(
            group_thousands(i128::from(u64::MAX)),
            "18,446,744,073,709,551,615"
        );
    }

    #[test]
    fn test_format_date() {
        let date = NaiveDate::from_ymd_opt(2025, 1, 5).unwrap();
        assert_eq!(format_date(date), "2025. 1. 5.");
    }

    #[test]
    fn test_format_times() {
        assert_eq!(
            format_times(Some("09:00"), Some("11:30")).as_deref(),
            Some("09:00 → 11:30")
        );
        assert_eq!(format_times(Some("09:00"), None).as_deref(), Some("09:00 출발"));
        assert_eq!(format_times(None, Some("11:30")).as_deref(), Some("11:30 도착"));
        assert_eq!(format_times(None, None), None);
    }
}
