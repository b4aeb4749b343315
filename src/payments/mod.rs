//! Payment link module.
//!
//! This module handles:
//! - Payment link request/response types
//! - The hosted-checkout payment API client

pub mod client;
pub mod types;

pub use client::PaymentClient;
pub use types::{LineItem, Money, PaymentLink, PaymentLinkRequest};
