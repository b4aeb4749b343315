//! Flight data module.
//!
//! This module handles:
//! - Airport and place types
//! - The flight data API client
//! - Free-text query cleaning and fallback search
//! - Mock client for testing

pub mod client;
pub mod mock;
pub mod search;
pub mod types;

pub use client::FlightClient;
pub use mock::MockFlightClient;
pub use search::{candidate_queries, clean_query, dedupe_by_code, run_search, AirportSource};
pub use types::Airport;
