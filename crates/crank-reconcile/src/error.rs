//! Reconcile-cycle failure reporting.

use thiserror::Error;

use crank_domain::{ApiError, ResourceKind};

use crate::plan::Operation;

/// A reconcile cycle stopped on a failed operation.
///
/// Carries everything the caller needs to decide on a retry: the resource
/// kind, the operation that failed, the remote id involved (including an id
/// bound by a create that succeeded earlier in the same cycle — the caller
/// must persist it so a retry resumes instead of re-creating), the
/// operations that had already been applied, and the underlying cause.
/// Operations already applied remain applied; there is no rollback, and the
/// next cycle converges by re-diffing against the now-partially-updated
/// remote state.
#[derive(Debug, Clone, PartialEq, Error)]
#[error(
    "{operation} failed for {kind}{} ({} operations already applied): {source}",
    display_id(.id),
    .applied.len()
)]
pub struct ReconcileError {
    pub kind: ResourceKind,
    /// The operation that failed.
    pub operation: Operation,
    /// The remote id the cycle was working with, when one is known.
    pub id: Option<i64>,
    /// Operations of this cycle that succeeded before the failure, in
    /// execution order.
    pub applied: Vec<Operation>,
    #[source]
    pub source: ApiError,
}

impl ReconcileError {
    pub(crate) fn new(
        kind: ResourceKind,
        operation: Operation,
        id: Option<i64>,
        applied: Vec<Operation>,
        source: ApiError,
    ) -> Self {
        Self { kind, operation, id, applied, source }
    }
}

fn display_id(id: &Option<i64>) -> String {
    match id {
        Some(id) => format!(" {id}"),
        None => String::new(),
    }
}
