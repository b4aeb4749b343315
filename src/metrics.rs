//! Prometheus metrics for the operations toolkit.
//!
//! This module provides metrics for:
//! - Keep-alive probe outcomes
//! - Provisioning op outcomes
//! - Airport search volume and latency
//! - Payment link creation

use std::time::Instant;

use metrics::{counter, describe_counter, describe_histogram, histogram};
use tracing::debug;

use crate::provision::OpOutcome;

// === Metric Name Constants ===

/// Successful keep-alive probes counter metric name.
pub const METRIC_PROBES_OK: &str = "keepalive_probes_ok_total";
/// Failed keep-alive probes counter metric name.
pub const METRIC_PROBES_FAILED: &str = "keepalive_probes_failed_total";
/// Applied provisioning ops counter metric name.
pub const METRIC_PROVISION_APPLIED: &str = "provision_ops_applied_total";
/// Already-present provisioning ops counter metric name.
pub const METRIC_PROVISION_EXISTING: &str = "provision_ops_existing_total";
/// Failed provisioning ops counter metric name.
pub const METRIC_PROVISION_FAILED: &str = "provision_ops_failed_total";
/// Airport searches counter metric name.
pub const METRIC_AIRPORT_SEARCHES: &str = "airport_searches_total";
/// Airport search latency metric name.
pub const METRIC_AIRPORT_SEARCH_LATENCY: &str = "airport_search_latency_ms";
/// Payment links created counter metric name.
pub const METRIC_PAYMENT_LINKS_CREATED: &str = "payment_links_created_total";

/// Initialize all metric descriptions.
/// Call this once at startup to register metrics with descriptions.
pub fn init_metrics() {
    describe_counter!(
        METRIC_PROBES_OK,
        "Total number of successful keep-alive probes"
    );
    describe_counter!(
        METRIC_PROBES_FAILED,
        "Total number of failed keep-alive probes"
    );
    describe_counter!(
        METRIC_PROVISION_APPLIED,
        "Total number of provisioning ops that changed remote state"
    );
    describe_counter!(
        METRIC_PROVISION_EXISTING,
        "Total number of provisioning ops whose resource already existed"
    );
    describe_counter!(
        METRIC_PROVISION_FAILED,
        "Total number of failed provisioning ops"
    );
    describe_counter!(
        METRIC_AIRPORT_SEARCHES,
        "Total number of airport searches served"
    );
    describe_histogram!(
        METRIC_AIRPORT_SEARCH_LATENCY,
        "Airport search latency in milliseconds"
    );
    describe_counter!(
        METRIC_PAYMENT_LINKS_CREATED,
        "Total number of payment links created"
    );

    debug!("Metrics initialized");
}

/// Count one keep-alive probe outcome.
pub fn inc_probe(ok: bool) {
    if ok {
        counter!(METRIC_PROBES_OK).increment(1);
    } else {
        counter!(METRIC_PROBES_FAILED).increment(1);
    }
}

/// Count one provisioning op outcome.
pub fn inc_provision_op(outcome: &OpOutcome) {
    match outcome {
        OpOutcome::Applied => counter!(METRIC_PROVISION_APPLIED).increment(1),
        OpOutcome::AlreadyPresent => counter!(METRIC_PROVISION_EXISTING).increment(1),
        OpOutcome::Failed { .. } => counter!(METRIC_PROVISION_FAILED).increment(1),
    }
}

/// Count one airport search and record its latency.
pub fn record_airport_search(start: Instant) {
    counter!(METRIC_AIRPORT_SEARCHES).increment(1);
    let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
    histogram!(METRIC_AIRPORT_SEARCH_LATENCY).record(latency_ms);
}

/// Count one created payment link.
pub fn inc_payment_link_created() {
    counter!(METRIC_PAYMENT_LINKS_CREATED).increment(1);
}
