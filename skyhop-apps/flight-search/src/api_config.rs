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

//! # Search API Configuration
//!
//! The backend base address is resolved once at startup and injected into
//! [`crate::SkyhopClient`]. Builds can bake a different default in with the
//! `SKYHOP_API_URL` environment variable.

use anyhow::{Result, ensure};

/// Production backend used when no address is baked in at build time.
pub const DEFAULT_API_BASE_URL: &str = "https://api.skyhop.kr";

/// Path of the search endpoint, relative to the base address.
pub const SEARCH_PATH: &str = "/api/search";

const BUILD_TIME_BASE_URL: Option<&str> = option_env!("SKYHOP_API_URL");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    base_url: String,
}

impl ApiConfig {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let base_url = base_url.into();
        let trimmed = base_url.trim().trim_end_matches('/');
        ensure!(!trimmed.is_empty(), "API base URL is empty");
        ensure!(
            trimmed.starts_with("http://") || trimmed.starts_with("https://"),
            "API base URL must start with http:// or https://, got: {}",
            base_url
        );
        Ok(Self {
            base_url: trimmed.to_string(),
        })
    }

    /// Address baked in at build time, or the production default.
    pub fn from_build_env() -> Self {
        let base_url = BUILD_TIME_BASE_URL
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL);
        Self::new(base_url).unwrap_or_else(|e| {
            tracing::warn!("Ignoring build-time SKYHOP_API_URL: {e}");
            Self {
                base_url: DEFAULT_API_BASE_URL.to_string(),
            }
        })
    }

    /// Explicit override if given, otherwise [`ApiConfig::from_build_env`].
    pub fn resolve(override_url: Option<&str>) -> Result<Self> {
        match override_url {
            Some(url) => Self::new(url),
            None => Ok(Self::from_build_env()),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn search_url(&self) -> String {
        format!("{}{}", self.base_url, SEARCH_PATH)
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_build_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_url_strips_trailing_slash() {
        let config = ApiConfig::new("http://127.0.0.1:8000/").unwrap();
        assert_eq!(config.base_url(), "http://127.0.0.1:8000");
        assert_eq!(config.search_url(), "http://127.0.0.1:8000/api/search");
    }

    #[test]
    fn test_rejects_non_http_urls() {
        assert!(ApiConfig::new("").is_err());
        assert!(ApiConfig::new("   ").is_err());
        assert!(ApiConfig::new("ftp://example.com").is_err());
        assert!(ApiConfig::new("api.skyhop.kr").is_err());
    }

    #[test]
    fn test_resolve_prefers_override() {
        let config = ApiConfig::resolve(Some("https://staging.example.com")).unwrap();
        assert_eq!(config.base_url(), "https://staging.example.com");

        let fallback = ApiConfig::resolve(None).unwrap();
        assert!(fallback.search_url().ends_with("/api/search"));
    }
}
