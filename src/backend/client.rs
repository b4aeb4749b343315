//! Authenticated client for the hosted backend.
//!
//! One client covers the three surfaces the platform uses: table access
//! via `/rest/v1`, SQL execution via `/rest/v1/rpc/exec_sql`, and object
//! storage via `/storage/v1`. Every request carries the `apikey` header
//! and a bearer token; non-2xx responses surface the status code and raw
//! body text to the caller and are never retried here.

use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::config::Config;
use crate::error::GatewayError;

use super::types::{BucketInfo, StorageObject};

/// Authenticated client for the hosted backend.
#[derive(Debug, Clone)]
pub struct BackendClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Backend base URL, without trailing slash.
    base_url: String,
    /// Key sent in apikey/Authorization headers.
    api_key: String,
}

impl BackendClient {
    /// Create a client using the service-role key from config.
    pub fn new(config: &Config) -> Self {
        Self::with_key(config, config.backend_service_key.clone())
    }

    /// Create a client with an explicit key (e.g. the anonymous key).
    pub fn with_key(config: &Config, api_key: String) -> Self {
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
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }

    /// Get the HTTP client reference.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Get the backend base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the absolute URL for a resource path.
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Issue an authenticated request and decode the JSON response.
    ///
    /// This is the whole gateway contract: resource path, method,
    /// optional query parameters, optional JSON body. Empty 2xx bodies
    /// decode to `Value::Null`.
    #[instrument(skip(self, body), fields(method = %method, path = %path))]
    pub async fn request_json(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&Value>,
    ) -> Result<Value, GatewayError> {
        let mut request = self
            .http
            .request(method, self.endpoint(path))
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await.unwrap_or_default();

        if !status.is_success() {
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        if text.is_empty() {
            return Ok(Value::Null);
        }

        serde_json::from_str(&text)
            .map_err(|e| GatewayError::Parse(format!("invalid JSON body: {}", e)))
    }

    /// Select rows from a table, with `column=eq.value` style filters.
    pub async fn rest_get(
        &self,
        table: &str,
        filters: &[(&str, &str)],
    ) -> Result<Value, GatewayError> {
        let path = format!("rest/v1/{}", table);
        self.request_json(Method::GET, &path, filters, None).await
    }

    /// Insert rows into a table.
    pub async fn rest_post(&self, table: &str, body: &Value) -> Result<Value, GatewayError> {
        let path = format!("rest/v1/{}", table);
        self.request_json(Method::POST, &path, &[], Some(body)).await
    }

    /// Update rows matching the filters.
    pub async fn rest_patch(
        &self,
        table: &str,
        filters: &[(&str, &str)],
        body: &Value,
    ) -> Result<Value, GatewayError> {
        let path = format!("rest/v1/{}", table);
        self.request_json(Method::PATCH, &path, filters, Some(body))
            .await
    }

    /// Execute a SQL statement through the RPC surface.
    ///
    /// The request body key is `sql`; older scripts that sent `query`
    /// were relying on a stale signature of the remote function.
    #[instrument(skip(self, sql))]
    pub async fn exec_sql(&self, sql: &str) -> Result<Value, GatewayError> {
        debug!(len = sql.len(), "Executing SQL via RPC");
        self.request_json(
            Method::POST,
            "rest/v1/rpc/exec_sql",
            &[],
            Some(&json!({ "sql": sql })),
        )
        .await
    }

    /// Create a storage bucket.
    #[instrument(skip(self))]
    pub async fn create_bucket(&self, name: &str, public: bool) -> Result<(), GatewayError> {
        self.request_json(
            Method::POST,
            "storage/v1/bucket",
            &[],
            Some(&json!({ "name": name, "id": name, "public": public })),
        )
        .await
        .map(|_| ())
    }

    /// Fetch metadata for a bucket.
    pub async fn get_bucket(&self, name: &str) -> Result<BucketInfo, GatewayError> {
        let path = format!("storage/v1/bucket/{}", name);
        let value = self.request_json(Method::GET, &path, &[], None).await?;
        serde_json::from_value(value)
            .map_err(|e| GatewayError::Parse(format!("invalid bucket metadata: {}", e)))
    }

    /// List objects in a bucket.
    pub async fn list_objects(&self, bucket: &str) -> Result<Vec<StorageObject>, GatewayError> {
        let path = format!("storage/v1/object/list/{}", bucket);
        let value = self
            .request_json(
                Method::POST,
                &path,
                &[],
                Some(&json!({ "prefix": "", "limit": 100 })),
            )
            .await?;
        serde_json::from_value(value)
            .map_err(|e| GatewayError::Parse(format!("invalid object listing: {}", e)))
    }

    /// Upload an object into a bucket.
    #[instrument(skip(self, bytes))]
    pub async fn upload_object(
        &self,
        bucket: &str,
        name: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), GatewayError> {
        let url = self.endpoint(&format!("storage/v1/object/{}/{}", bucket, name));

        let response = self
            .http
            .post(&url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Content-Type", content_type)
            // Overwrite on re-run so upload checks stay idempotent
            .header("x-upsert", "true")
            .body(bytes)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GatewayError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }

    /// Public URL for an object in a public bucket.
    pub fn public_url(&self, bucket: &str, name: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{}",
            self.base_url, bucket, name
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[test]
    fn client_creation_works() {
        let config = test_config();
        let client = BackendClient::new(&config);
        assert_eq!(client.base_url(), "https://project.backend.example.com");
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let mut config = test_config();
        config.backend_url = "https://project.backend.example.com/".to_string();
        let client = BackendClient::new(&config);
        assert_eq!(client.base_url(), "https://project.backend.example.com");
    }

    #[test]
    fn endpoint_joins_paths() {
        let client = BackendClient::new(&test_config());
        assert_eq!(
            client.endpoint("rest/v1/users"),
            "https://project.backend.example.com/rest/v1/users"
        );
        assert_eq!(
            client.endpoint("/storage/v1/bucket"),
            "https://project.backend.example.com/storage/v1/bucket"
        );
    }

    #[test]
    fn public_url_has_expected_shape() {
        let client = BackendClient::new(&test_config());
        assert_eq!(
            client.public_url("banners", "hero.png"),
            "https://project.backend.example.com/storage/v1/object/public/banners/hero.png"
        );
    }
}
