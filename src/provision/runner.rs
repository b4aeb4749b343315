//! Plan runner: applies ops in order and classifies outcomes.

use serde_json::Value;
use tracing::{info, instrument, warn};

use crate::backend::BackendClient;
use crate::error::GatewayError;
use crate::metrics;

use super::plan::{OpAction, ProvisionOp, ProvisionPlan};

/// Error fragments the hosted backend uses for duplicate resources.
const ALREADY_EXISTS_MARKERS: &[&str] = &[
    "already exists",
    "duplicate",
    // Postgres codes: duplicate_column, duplicate_table, duplicate_object
    "42701",
    "42P07",
    "42710",
];

/// Outcome of a single provisioning op.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpOutcome {
    /// The op changed remote state.
    Applied,
    /// The resource was already in the desired state.
    AlreadyPresent,
    /// The op failed; the run continues regardless.
    Failed {
        /// Status code and body, or transport error text.
        detail: String,
    },
}

/// One op's label and outcome.
#[derive(Debug, Clone)]
pub struct OpResult {
    /// The op label (resource and desired state).
    pub label: String,
    /// What happened.
    pub outcome: OpOutcome,
}

/// Counts and per-op results for a completed plan run.
#[derive(Debug, Clone, Default)]
pub struct ProvisionSummary {
    /// Ops that changed remote state.
    pub applied: usize,
    /// Ops whose resource already existed.
    pub already_present: usize,
    /// Ops that failed.
    pub failed: usize,
    /// Per-op results in application order.
    pub results: Vec<OpResult>,
}

impl ProvisionSummary {
    /// Record one op outcome.
    pub fn record(&mut self, label: String, outcome: OpOutcome) {
        match outcome {
            OpOutcome::Applied => self.applied += 1,
            OpOutcome::AlreadyPresent => self.already_present += 1,
            OpOutcome::Failed { .. } => self.failed += 1,
        }
        self.results.push(OpResult { label, outcome });
    }

    /// Total ops recorded.
    pub fn total(&self) -> usize {
        self.results.len()
    }

    /// Whether every op succeeded (applied or already present).
    pub fn ok(&self) -> bool {
        self.failed == 0
    }
}

/// Classify a gateway response as an op outcome.
///
/// 2xx is applied; 409 or a duplicate-resource error body counts as
/// already present; anything else is a failure.
pub fn classify(result: Result<Value, GatewayError>) -> OpOutcome {
    match result {
        Ok(_) => OpOutcome::Applied,
        Err(GatewayError::Status { status: 409, .. }) => OpOutcome::AlreadyPresent,
        Err(GatewayError::Status { status, body }) => {
            let lowered = body.to_lowercase();
            if ALREADY_EXISTS_MARKERS
                .iter()
                .any(|marker| lowered.contains(&marker.to_lowercase()))
            {
                OpOutcome::AlreadyPresent
            } else {
                OpOutcome::Failed {
                    detail: format!("HTTP {}: {}", status, body),
                }
            }
        }
        Err(e) => OpOutcome::Failed {
            detail: e.to_string(),
        },
    }
}

/// Execute one op against the gateway.
async fn execute_op(client: &BackendClient, op: &ProvisionOp) -> Result<Value, GatewayError> {
    match &op.action {
        OpAction::ExecSql { sql } => client.exec_sql(sql).await,
        OpAction::CreateBucket { name, public } => {
            client.create_bucket(name, *public).await.map(|_| Value::Null)
        }
        OpAction::UpdateRows { table, filters, body } => {
            let filters: Vec<(&str, &str)> = filters
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect();
            client.rest_patch(table, &filters, body).await
        }
    }
}

/// Apply a plan in declaration order, continuing past failures.
#[instrument(skip(client, plan), fields(plan = %plan.name, ops = plan.ops.len()))]
pub async fn apply_plan(client: &BackendClient, plan: &ProvisionPlan) -> ProvisionSummary {
    let mut summary = ProvisionSummary::default();

    for op in &plan.ops {
        let label = op.label();
        let outcome = classify(execute_op(client, op).await);

        match &outcome {
            OpOutcome::Applied => info!(op = %label, "Applied"),
            OpOutcome::AlreadyPresent => info!(op = %label, "Already present"),
            OpOutcome::Failed { detail } => warn!(op = %label, detail = %detail, "Failed"),
        }

        metrics::inc_provision_op(&outcome);
        summary.record(label, outcome);
    }

    info!(
        applied = summary.applied,
        existing = summary.already_present,
        failed = summary.failed,
        "Plan complete"
    );

    summary
}
