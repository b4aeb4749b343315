//! Mock flight client for unit testing.
//!
//! This module provides a mock airport source that can be used in tests
//! without making real network requests.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::error::FlightError;

use super::search::AirportSource;
use super::types::Airport;

/// Mock flight client for testing.
#[derive(Debug, Clone, Default)]
pub struct MockFlightClient {
    /// Canned responses by exact query.
    responses: Arc<Mutex<HashMap<String, Vec<Airport>>>>,
    /// Queries that should return an error.
    failing: Arc<Mutex<HashSet<String>>>,
    /// Queries received, in call order.
    calls: Arc<Mutex<Vec<String>>>,
}

impl MockFlightClient {
    /// Create a new mock client with no canned responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response for an exact query.
    pub fn set_response(&self, query: &str, airports: Vec<Airport>) {
        self.responses
            .lock()
            .unwrap()
            .insert(query.to_string(), airports);
    }

    /// Make an exact query fail with a remote error.
    pub fn fail_on(&self, query: &str) {
        self.failing.lock().unwrap().insert(query.to_string());
    }

    /// Number of remote calls made.
    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Queries received, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl AirportSource for MockFlightClient {
    async fn airports(&self, query: &str, _limit: u32) -> Result<Vec<Airport>, FlightError> {
        self.calls.lock().unwrap().push(query.to_string());

        if self.failing.lock().unwrap().contains(query) {
            return Err(FlightError::Status {
                status: 500,
                body: "mock failure".to_string(),
            });
        }

        Ok(self
            .responses
            .lock()
            .unwrap()
            .get(query)
            .cloned()
            .unwrap_or_default())
    }
}
