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

//! # Skyhop Search Client
//!
//! Effectful (network) operations against the search backend.

use crate::api_config::ApiConfig;
use crate::search_query_builder::{FormError, SearchRequest};
use crate::search_results::SearchResponse;
use anyhow::{Context, Result};
use serde::Deserialize;
use skyhop_request_gate::{GateError, RequestGate, RequestState};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use wreq::redirect::Policy;

/// Shown when the backend gives no usable `detail`.
pub const FALLBACK_ERROR_MESSAGE: &str = "검색 중 오류가 발생했습니다. 잠시 후 다시 시도해주세요.";

/// Failure of a search attempt. `Display` is the message shown to the user.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("이미 검색이 진행 중입니다.")]
    InFlight,
    #[error(transparent)]
    Invalid(#[from] FormError),
    #[error("{message}")]
    Server { status: u16, message: String },
    #[error("{}", FALLBACK_ERROR_MESSAGE)]
    Transport(#[source] wreq::Error),
    #[error("{}", FALLBACK_ERROR_MESSAGE)]
    Decode(#[source] serde_json::Error),
}

impl From<GateError> for SearchError {
    fn from(err: GateError) -> Self {
        match err {
            GateError::Busy => Self::InFlight,
        }
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: String,
}

/// User-facing message for a non-2xx body: its `detail`, else the fallback.
pub fn error_message_from_body(body: &str) -> String {
    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .map(|b| b.detail)
        .filter(|detail| !detail.trim().is_empty())
        .unwrap_or_else(|| FALLBACK_ERROR_MESSAGE.to_string())
}

/// Client for `POST /api/search`.
///
/// Clones share one [`RequestGate`], so at most one search is in flight per
/// client no matter how many handles exist. Failed searches are not retried.
#[derive(Clone)]
pub struct SkyhopClient {
    client: Arc<wreq::Client>,
    config: ApiConfig,
    gate: RequestGate,
}

impl SkyhopClient {
    pub fn new(config: ApiConfig) -> Result<Self> {
        let client = wreq::Client::builder()
            .redirect(Policy::default())
            .build()
            .context("Failed to build HTTP client")?;
        tracing::debug!("Search endpoint: {}", config.search_url());
        Ok(Self {
            client: Arc::new(client),
            config,
            gate: RequestGate::new(),
        })
    }

    pub fn config(&self) -> &ApiConfig {
        &self.config
    }

    pub fn state(&self) -> RequestState {
        self.gate.state()
    }

    pub fn is_pending(&self) -> bool {
        self.gate.is_pending()
    }

    /// Run one search. Refused with [`SearchError::InFlight`] while another
    /// search from this client is pending.
    pub async fn search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        request.validate()?;
        self.gate.run(|| self.post_search(request)).await?
    }

    async fn post_search(&self, request: &SearchRequest) -> Result<SearchResponse, SearchError> {
        let url = self.config.search_url();
        tracing::info!(
            "Searching {} -> {} ({} ~ {}, nights: {:?})",
            request.departure,
            request.destination,
            request.start_date,
            request.end_date,
            request.trip_nights
        );

        let http_start = Instant::now();
        let response = self
            .client
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("[post_search] Request to {} failed: {:?}", url, e);
                SearchError::Transport(e)
            })?;

        let status = response.status();
        tracing::debug!(
            "[post_search] HTTP Status: {} {} in {:?}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("Unknown"),
            http_start.elapsed()
        );

        let body = response.text().await.map_err(|e| {
            tracing::error!("[post_search] Failed to read body: {:?}", e);
            SearchError::Transport(e)
        })?;

        if !status.is_success() {
            let body_preview = body.chars().take(500).collect::<String>();
            tracing::warn!("Search failed with HTTP {}: {}", status, body_preview);
            return Err(SearchError::Server {
                status: status.as_u16(),
                message: error_message_from_body(&body),
            });
        }

        let result: SearchResponse = serde_json::from_str(&body).map_err(|e| {
            let body_preview = body.chars().take(500).collect::<String>();
            tracing::error!("Could not decode search response: {e}\n{body_preview}");
            SearchError::Decode(e)
        })?;

        if result.is_empty() {
            tracing::warn!("Search succeeded but returned no segments");
        }
        if !result.is_total_consistent() {
            tracing::warn!(
                "total_cost {} differs from segment sum {:?}",
                result.total_cost,
                result.segments_total()
            );
        }
        tracing::info!(
            "Search completed in {:?}: {} segments, total {}",
            http_start.elapsed(),
            result.len(),
            result.total_cost
        );
        Ok(result)
    }
}
