//! Payment API client for hosted checkout links.

use tracing::{debug, info, instrument};
use uuid::Uuid;

use crate::config::Config;
use crate::error::PaymentError;

use super::types::{PaymentLink, PaymentLinkData, PaymentLinkRequest, PaymentLinkResponse};

/// Payment API client.
#[derive(Debug, Clone)]
pub struct PaymentClient {
    /// HTTP client for API requests.
    http: reqwest::Client,
    /// Payment API base URL, without trailing slash.
    base_url: String,
    /// Bearer token.
    api_key: String,
    /// Location id attached to orders.
    location_id: String,
    /// ISO currency code for amounts.
    currency: String,
}

impl PaymentClient {
    /// Create a new payment client from config.
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
            base_url: config.payment_api_url.trim_end_matches('/').to_string(),
            api_key: config.payment_api_key.clone(),
            location_id: config.payment_location_id.clone(),
            currency: config.currency.clone(),
        }
    }

    /// Get the payment API base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create a hosted checkout link for a single line item.
    ///
    /// The amount is validated locally before any network call; a fresh
    /// UUIDv4 idempotency key is attached so a retried request is not
    /// double-processed remotely.
    #[instrument(skip(self, description, buyer_email))]
    pub async fn create_payment_link(
        &self,
        description: &str,
        amount_minor: i64,
        buyer_email: &str,
    ) -> Result<PaymentLink, PaymentError> {
        if amount_minor <= 0 {
            return Err(PaymentError::InvalidAmount(amount_minor));
        }

        let request = PaymentLinkRequest::single_item(
            Uuid::new_v4().to_string(),
            self.location_id.clone(),
            description.to_string(),
            amount_minor,
            self.currency.clone(),
            buyer_email.to_string(),
        );

        let url = format!("{}/v2/online-checkout/payment-links", self.base_url);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: PaymentLinkResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::Parse(format!("invalid payment link payload: {}", e)))?;

        let link = Self::into_link(payload.payment_link)?;
        info!(link_id = %link.id, "Created payment link");
        Ok(link)
    }

    /// Fetch a payment link's current state.
    #[instrument(skip(self))]
    pub async fn get_payment_link(&self, link_id: &str) -> Result<PaymentLink, PaymentError> {
        let url = format!("{}/v2/online-checkout/payment-links/{}", self.base_url, link_id);

        let response = self.http.get(&url).bearer_auth(&self.api_key).send().await?;

        let status = response.status();
        if status.as_u16() == 404 {
            return Err(PaymentError::LinkNotFound {
                link_id: link_id.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: PaymentLinkResponse = response
            .json()
            .await
            .map_err(|e| PaymentError::Parse(format!("invalid payment link payload: {}", e)))?;

        let link = Self::into_link(payload.payment_link)?;
        debug!(link_id = %link.id, "Fetched payment link");
        Ok(link)
    }

    /// Convert a raw link entry, requiring id and checkout URL.
    fn into_link(data: Option<PaymentLinkData>) -> Result<PaymentLink, PaymentError> {
        let data = data.ok_or(PaymentError::MissingCheckoutUrl)?;
        let url = data.url.ok_or(PaymentError::MissingCheckoutUrl)?;

        Ok(PaymentLink {
            id: data.id.unwrap_or_default(),
            url,
            order_id: data.order_id,
            created_at: data.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;

    #[test]
    fn client_creation_works() {
        let client = PaymentClient::new(&test_config());
        assert_eq!(client.base_url(), "https://connect.squareup.com");
    }

    #[tokio::test]
    async fn non_positive_amounts_are_rejected_locally() {
        let client = PaymentClient::new(&test_config());

        for amount in [0, -1, -500] {
            let result = client
                .create_payment_link("Test item", amount, "buyer@example.com")
                .await;
            assert!(matches!(result, Err(PaymentError::InvalidAmount(a)) if a == amount));
        }
    }

    #[test]
    fn into_link_requires_checkout_url() {
        let missing = PaymentClient::into_link(None);
        assert!(matches!(missing, Err(PaymentError::MissingCheckoutUrl)));

        let no_url = PaymentClient::into_link(Some(PaymentLinkData {
            id: Some("LINK1".to_string()),
            url: None,
            order_id: None,
            created_at: None,
        }));
        assert!(matches!(no_url, Err(PaymentError::MissingCheckoutUrl)));

        let ok = PaymentClient::into_link(Some(PaymentLinkData {
            id: Some("LINK1".to_string()),
            url: Some("https://checkout.example.com/LINK1".to_string()),
            order_id: Some("ORDER1".to_string()),
            created_at: None,
        }))
        .unwrap();
        assert_eq!(ok.id, "LINK1");
        assert_eq!(ok.url, "https://checkout.example.com/LINK1");
    }
}
