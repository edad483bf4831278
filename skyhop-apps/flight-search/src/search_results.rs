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

//! # Search Results
//!
//! Response body of `POST /api/search`, as produced by the backend.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Separator used between airport codes in a route pattern.
pub const ROUTE_ARROW: &str = " → ";

/// One leg of an itinerary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightSegment {
    pub from_airport: String,
    pub to_airport: String,
    pub date: NaiveDate,
    pub price: u64,
    pub provider: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub departure_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arrival_time: Option<String>,
}

impl FlightSegment {
    /// Flight number, treating the empty string some providers send as absent.
    pub fn flight_number(&self) -> Option<&str> {
        non_blank(&self.flight_number)
    }

    pub fn departure_time(&self) -> Option<&str> {
        non_blank(&self.departure_time)
    }

    pub fn arrival_time(&self) -> Option<&str> {
        non_blank(&self.arrival_time)
    }
}

fn non_blank(opt: &Option<String>) -> Option<&str> {
    opt.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub total_cost: u64,
    pub segments: Vec<FlightSegment>,
    #[serde(default)]
    pub route_pattern: String,
    pub cheaper_than_direct: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direct_cost: Option<u64>,
}

impl SearchResponse {
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn first_segment(&self) -> Option<&FlightSegment> {
        self.segments.first()
    }

    pub fn last_segment(&self) -> Option<&FlightSegment> {
        self.segments.last()
    }

    /// Sum of segment prices, `None` if it does not fit in a `u64`.
    pub fn segments_total(&self) -> Option<u64> {
        self.segments
            .iter()
            .try_fold(0u64, |acc, s| acc.checked_add(s.price))
    }

    /// Whether `total_cost` matches the segment prices. Informational only.
    pub fn is_total_consistent(&self) -> bool {
        self.segments_total() == Some(self.total_cost)
    }

    /// Server route pattern, or one derived from the segments when blank.
    pub fn display_route_pattern(&self) -> String {
        if self.route_pattern.trim().is_empty() {
            derive_route_pattern(&self.segments)
        } else {
            self.route_pattern.clone()
        }
    }
}

/// Join the airports visited by `segments` with [`ROUTE_ARROW`].
///
/// A leg departing from the airport the previous one arrived at does not
/// repeat the code: `ICN→NRT, NRT→KIX` gives `ICN → NRT → KIX`.
pub fn derive_route_pattern(segments: &[FlightSegment]) -> String {
    let mut codes: Vec<&str> = Vec::with_capacity(segments.len() + 1);
    for segment in segments {
        for code in [segment.from_airport.as_str(), segment.to_airport.as_str()] {
            if codes.last() != Some(&code) {
                codes.push(code);
            }
        }
    }
    codes.join(ROUTE_ARROW)
}
