//! Payment link request and response types.
//!
//! Amounts are integer minor-currency units throughout (cents for USD);
//! the payment API rejects fractional amounts and so does this module.

use serde::{Deserialize, Serialize};

/// A monetary amount in minor units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    /// Amount in minor units (e.g. cents).
    pub amount: i64,
    /// ISO currency code.
    pub currency: String,
}

/// A single order line item.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LineItem {
    /// Item description shown on the checkout page.
    pub name: String,
    /// Quantity, as the API's string encoding.
    pub quantity: String,
    /// Unit price.
    pub base_price_money: Money,
}

/// Order wrapper for a payment link request.
#[derive(Debug, Clone, Serialize)]
pub struct Order {
    /// Location the order is attributed to.
    pub location_id: String,
    /// Order line items.
    pub line_items: Vec<LineItem>,
}

/// Buyer details pre-filled on the checkout page.
#[derive(Debug, Clone, Serialize)]
pub struct PrePopulatedData {
    /// Buyer email address.
    pub buyer_email: String,
}

/// Request body for `POST /v2/online-checkout/payment-links`.
#[derive(Debug, Clone, Serialize)]
pub struct PaymentLinkRequest {
    /// Client-supplied token; a repeated request with the same key is
    /// not double-processed by the remote.
    pub idempotency_key: String,
    /// The order to collect payment for.
    pub order: Order,
    /// Buyer details pre-filled at checkout.
    pub pre_populated_data: PrePopulatedData,
}

impl PaymentLinkRequest {
    /// Build a single-item payment link request.
    pub fn single_item(
        idempotency_key: String,
        location_id: String,
        description: String,
        amount_minor: i64,
        currency: String,
        buyer_email: String,
    ) -> Self {
        Self {
            idempotency_key,
            order: Order {
                location_id,
                line_items: vec![LineItem {
                    name: description,
                    quantity: "1".to_string(),
                    base_price_money: Money {
                        amount: amount_minor,
                        currency,
                    },
                }],
            },
            pre_populated_data: PrePopulatedData { buyer_email },
        }
    }
}

/// A created payment link.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentLink {
    /// Link id.
    pub id: String,
    /// Hosted checkout URL.
    pub url: String,
    /// Backing order id.
    pub order_id: Option<String>,
    /// Creation timestamp (ISO format).
    pub created_at: Option<String>,
}

/// Raw payment link entry from the API.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentLinkData {
    /// Link id.
    pub id: Option<String>,
    /// Hosted checkout URL.
    pub url: Option<String>,
    /// Backing order id.
    pub order_id: Option<String>,
    /// Creation timestamp.
    pub created_at: Option<String>,
}

/// Response wrapper for payment link calls.
#[derive(Debug, Clone, Deserialize)]
pub struct PaymentLinkResponse {
    /// The created or fetched link.
    pub payment_link: Option<PaymentLinkData>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_item_request_shape() {
        let request = PaymentLinkRequest::single_item(
            "key-123".to_string(),
            "LOC123".to_string(),
            "Havana flight deposit".to_string(),
            15_000,
            "USD".to_string(),
            "buyer@example.com".to_string(),
        );

        assert_eq!(request.order.line_items.len(), 1);
        let item = &request.order.line_items[0];
        assert_eq!(item.quantity, "1");
        assert_eq!(item.base_price_money.amount, 15_000);

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(body["idempotency_key"], "key-123");
        assert_eq!(body["order"]["location_id"], "LOC123");
        assert_eq!(
            body["order"]["line_items"][0]["base_price_money"]["amount"],
            15_000
        );
        assert_eq!(
            body["pre_populated_data"]["buyer_email"],
            "buyer@example.com"
        );
    }
}
