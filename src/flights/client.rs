//! Flight data API client.

use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::FlightError;

use super::search::{run_search, AirportSource};
use super::types::{Airport, AirportData, DataResponse, PlaceData};

/// Flight data API client.
///
/// Bearer-authenticated, versioned via the `Duffel-Version` header.
#[derive(Debug, Clone)]
pub struct FlightClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Flight API base URL, without trailing slash.
    base_url: String,
    /// Bearer token.
    api_key: String,
    /// Value for the Duffel-Version header.
    api_version: String,
}

impl FlightClient {
    /// Create a new flight client from config.
    pub fn new(config: &Config) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout())
            .connect_timeout(std::time::Duration::from_millis(500))
            .tcp_keepalive(std::time::Duration::from_secs(30))
            .pool_max_idle_per_host(config.http_pool_size)
            .pool_idle_timeout(std::time::Duration::from_secs(90))
            .build()
            .expect("failed to create HTTP client");

        Self {
            http,
            base_url: config.flight_api_url.trim_end_matches('/').to_string(),
            api_key: config.flight_api_key.clone(),
            api_version: config.flight_api_version.clone(),
        }
    }

    /// Get the flight API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Issue an authenticated GET and decode a `{"data": [...]}` body.
    async fn get_data<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<T>, FlightError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));

        let response = self
            .http
            .get(&url)
            .bearer_auth(&self.api_key)
            .header("Duffel-Version", &self.api_version)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FlightError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: DataResponse<T> = response
            .json()
            .await
            .map_err(|e| FlightError::Parse(format!("invalid data payload: {}", e)))?;

        Ok(payload.data)
    }

    /// Search airports by name fragment.
    #[instrument(skip(self))]
    pub async fn airports(&self, search: &str, limit: u32) -> Result<Vec<Airport>, FlightError> {
        let raw: Vec<AirportData> = self
            .get_data(
                "air/airports",
                &[
                    ("search", search.to_string()),
                    ("limit", limit.to_string()),
                ],
            )
            .await?;

        let airports: Vec<Airport> = raw.into_iter().filter_map(AirportData::into_airport).collect();
        debug!(count = airports.len(), "Fetched airports");
        Ok(airports)
    }

    /// Fetch place suggestions (airports and cities) for a query.
    #[instrument(skip(self))]
    pub async fn place_suggestions(&self, query: &str) -> Result<Vec<Airport>, FlightError> {
        let raw: Vec<PlaceData> = self
            .get_data("places/suggestions", &[("query", query.to_string())])
            .await?;

        let places: Vec<Airport> = raw.into_iter().filter_map(PlaceData::into_airport).collect();
        debug!(count = places.len(), "Fetched place suggestions");
        Ok(places)
    }

    /// Free-text airport search with cleaning, fallback and dedup.
    pub async fn search_airports(&self, raw_query: &str, limit: u32) -> Vec<Airport> {
        run_search(self, raw_query, limit).await
    }
}

impl AirportSource for FlightClient {
    async fn airports(&self, query: &str, limit: u32) -> Result<Vec<Airport>, FlightError> {
        FlightClient::airports(self, query, limit).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[test]
    fn client_creation_works() {
        let client = FlightClient::new(&test_config());
        assert_eq!(client.base_url(), "https://api.duffel.com");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let mut config = test_config();
        config.flight_api_url = "https://api.duffel.com/".to_string();
        let client = FlightClient::new(&config);
        assert_eq!(client.base_url(), "https://api.duffel.com");
    }
}
