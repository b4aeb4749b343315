//! Integration tests for the Cubalink23 operations toolkit.
//!
//! These tests require real credentials in the environment (or a .env
//! file) and are ignored by default. Run with:
//! cargo test --test integration -- --ignored
//!
//! Note: These tests interact with the real hosted services.

use cubalink_ops::backend::BackendClient;
use cubalink_ops::config::Config;
use cubalink_ops::error::PaymentError;
use cubalink_ops::flights::FlightClient;
use cubalink_ops::payments::PaymentClient;

/// Get a test config from environment.
fn test_config() -> Option<Config> {
    dotenvy::dotenv().ok();

    let config = Config::load().ok()?;
    config.validate().ok()?;

    // Skip if using a placeholder key
    if config.backend_service_key.starts_with("test-") || config.backend_service_key.len() < 20 {
        return None;
    }

    Some(config)
}

/// Test that the REST surface answers an authenticated query.
#[tokio::test]
#[ignore = "requires BACKEND_URL and BACKEND_SERVICE_KEY"]
async fn test_rest_ping() {
    let config = match test_config() {
        Some(c) => c,
        None => {
            println!("Skipping: backend credentials not set");
            return;
        }
    };

    let client = BackendClient::new(&config);

    let result = client
        .rest_get("users", &[("select", "id"), ("limit", "1")])
        .await;
    assert!(result.is_ok(), "REST ping failed: {:?}", result.err());

    let value = result.unwrap();
    assert!(value.is_array(), "Expected an array of rows");
}

/// Test that the storage surface lists the banners bucket.
#[tokio::test]
#[ignore = "requires BACKEND_URL and BACKEND_SERVICE_KEY"]
async fn test_storage_listing() {
    let config = match test_config() {
        Some(c) => c,
        None => {
            println!("Skipping: backend credentials not set");
            return;
        }
    };

    let client = BackendClient::new(&config);

    let result = client.list_objects("banners").await;
    assert!(result.is_ok(), "Storage listing failed: {:?}", result.err());

    println!("Found {} objects in banners", result.unwrap().len());
}

/// Test a live airport search for Havana.
#[tokio::test]
#[ignore = "requires FLIGHT_API_KEY"]
async fn test_airport_search_live() {
    let config = match test_config() {
        Some(c) => c,
        None => {
            println!("Skipping: backend credentials not set");
            return;
        }
    };

    if !config.has_flight_api() {
        println!("Skipping: FLIGHT_API_KEY not set");
        return;
    }

    let client = FlightClient::new(&config);

    let airports = client.search_airports("havana", 10).await;
    assert!(!airports.is_empty(), "Expected at least one airport");
    assert!(
        airports.iter().any(|a| a.code == "HAV"),
        "Expected HAV in results: {:?}",
        airports
    );
}

/// Test live place suggestions for Havana.
#[tokio::test]
#[ignore = "requires FLIGHT_API_KEY"]
async fn test_place_suggestions_live() {
    let config = match test_config() {
        Some(c) => c,
        None => {
            println!("Skipping: backend credentials not set");
            return;
        }
    };

    if !config.has_flight_api() {
        println!("Skipping: FLIGHT_API_KEY not set");
        return;
    }

    let client = FlightClient::new(&config);

    let places = client.place_suggestions("havana").await;
    assert!(places.is_ok(), "Suggestions failed: {:?}", places.err());
    println!("Found {} places", places.unwrap().len());
}

/// Test that a bogus payment link id yields a not-found error.
#[tokio::test]
#[ignore = "requires PAYMENT_API_KEY"]
async fn test_payment_link_not_found() {
    let config = match test_config() {
        Some(c) => c,
        None => {
            println!("Skipping: backend credentials not set");
            return;
        }
    };

    if !config.has_payment_api() {
        println!("Skipping: PAYMENT_API_KEY not set");
        return;
    }

    let client = PaymentClient::new(&config);

    let result = client.get_payment_link("NONEXISTENT_LINK_ID").await;
    assert!(
        matches!(result, Err(PaymentError::LinkNotFound { .. })),
        "Expected LinkNotFound, got: {:?}",
        result
    );
}
