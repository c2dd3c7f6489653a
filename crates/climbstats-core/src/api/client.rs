//! API client for the TopLogger REST API.
//!
//! One request per run: a GET of the gym's whole climb catalog. There is no
//! retry and no request timeout beyond the HTTP client's defaults; a failed
//! run is simply run again.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::models::{normalize, Climb, RawClimb};

use super::ApiError;

/// Identifies us to the API
const USER_AGENT: &str = concat!("climbstats/", env!("CARGO_PKG_VERSION"));

/// API client for TopLogger.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    climbs_url: String,
}

impl ApiClient {
    /// Create a new API client for the given climbs endpoint
    pub fn new(climbs_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            climbs_url: climbs_url.into(),
        })
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;
        let text = response
            .text()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to read response body from {}", url))?;
        debug!(url = url, bytes = text.len(), "Response received");

        parse_json(&text).with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    // ===== Data Fetching Methods =====

    /// Fetch the gym's climb catalog as the API returns it
    pub async fn fetch_raw_climbs(&self) -> Result<Vec<RawClimb>> {
        info!(url = %self.climbs_url, "Loading climbs from API");
        let climbs: Vec<RawClimb> = self.get(&self.climbs_url).await?;
        info!(count = climbs.len(), "Climbs received");
        Ok(climbs)
    }

    /// Fetch and normalize the climb catalog. Climbs still on the wall are
    /// treated as live until `now`.
    pub async fn fetch_climbs(&self, now: DateTime<Utc>) -> Result<Vec<Climb>> {
        let raw = self.fetch_raw_climbs().await?;
        normalize(raw, now).context("Failed to normalize climbs")
    }
}

fn parse_json<T: DeserializeOwned>(text: &str) -> Result<T, ApiError> {
    serde_json::from_str(text).map_err(|e| ApiError::InvalidResponse(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_climbs_response() {
        let json = r#"[{"id": 5123, "gym_id": 21, "grade": "6.33", "hold_color_id": 4, "date_live_start": "2021-02-10T23:00:00.000Z", "date_live_end": null, "date_removed": null}]"#;

        let climbs: Vec<RawClimb> = parse_json(json).expect("Failed to parse climbs test JSON");
        assert_eq!(climbs.len(), 1);
        assert_eq!(climbs[0].id.as_str(), "5123");
        assert_eq!(climbs[0].grade.integer(), 6);
        assert_eq!(climbs[0].live_start.as_deref(), Some("2021-02-10T23:00:00.000Z"));
        assert!(climbs[0].live_end.is_none());
    }

    #[test]
    fn test_parse_rejects_non_array() {
        let err = parse_json::<Vec<RawClimb>>(r#"{"error": "gym not found"}"#).unwrap_err();
        assert!(matches!(err, ApiError::InvalidResponse(_)));
    }

    #[test]
    fn test_parse_rejects_missing_grade() {
        let json = r#"[{"id": 1, "date_live_start": "2021-02-10T23:00:00.000Z"}]"#;
        assert!(parse_json::<Vec<RawClimb>>(json).is_err());
    }

    #[test]
    fn test_new_client() {
        let client = ApiClient::new("https://example.invalid/climbs").unwrap();
        assert_eq!(client.climbs_url, "https://example.invalid/climbs");
    }
}
