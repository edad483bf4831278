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

// Library for skyhop-flight-search
// Search form, request/response contract and result view for multi-leg flight search

mod api_config;
mod results_view;
mod search_client;
mod search_query_builder;
mod search_results;

pub use api_config::{ApiConfig, DEFAULT_API_BASE_URL, SEARCH_PATH};

pub use search_query_builder::{
    FormError, SearchForm, SearchRequest, calculate_max_nights, normalize_airport_code,
};

pub use search_results::{FlightSegment, ROUTE_ARROW, SearchResponse, derive_route_pattern};

pub use results_view::{
    ResultView, SegmentView, TripSpan, format_date, format_price, format_savings,
    group_thousands, savings, trip_span,
};

pub use search_client::{FALLBACK_ERROR_MESSAGE, SearchError, SkyhopClient, error_message_from_body};

// Request lifecycle as seen by callers of SkyhopClient::state
pub use skyhop_request_gate::RequestState;
