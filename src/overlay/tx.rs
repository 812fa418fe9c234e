//! Transaction decoration: lifecycle bracketing and the begin veto signal.

use std::sync::Arc;

use crate::api::Transaction;
use crate::error::{GraphError, GraphResult};
use crate::overlay::{hooks, Core};

/// Veto signal raised by an `on_begin_transaction` hook.
///
/// A veto either carries the original error (the `begin_tx` caller observes
/// exactly that error) or is bare (the caller observes
/// [`GraphError::TransactionVetoed`]). This is a control-flow signal, not a
/// diagnostic: it captures no backtrace and allocates nothing beyond the
/// optional cause.
#[derive(Debug, Default)]
pub struct TransactionVeto {
    cause: Option<GraphError>,
}

impl TransactionVeto {
    /// A bare veto
    pub fn new() -> Self {
        Self { cause: None }
    }

    /// A veto carrying the original error
    pub fn with_cause(cause: GraphError) -> Self {
        Self { cause: Some(cause) }
    }

    /// The error the `begin_tx` caller observes
    pub(crate) fn into_error(self) -> GraphError {
        self.cause.unwrap_or(GraphError::TransactionVetoed)
    }
}

/// Decorated transaction handle.
///
/// Each lifecycle method runs the corresponding hook and then always
/// delegates to the underlying transaction if one is bound; the delegate
/// call runs even when the hook errored, and the hook's error is the one
/// ultimately returned. With no underlying transaction bound the methods
/// still run their hooks and are otherwise harmless no-ops.
pub struct OverlayTransaction {
    db: Arc<Core>,
    inner: Option<Arc<dyn Transaction>>,
}

impl OverlayTransaction {
    pub(crate) fn new(db: Arc<Core>, inner: Option<Arc<dyn Transaction>>) -> Self {
        Self { db, inner }
    }

    /// Whether an underlying transaction is bound
    pub fn is_bound(&self) -> bool {
        self.inner.is_some()
    }

    fn delegate(&self, call: impl FnOnce(&dyn Transaction) -> GraphResult<()>) -> GraphResult<()> {
        match &self.inner {
            Some(tx) => call(tx.as_ref()),
            None => Ok(()),
        }
    }
}

impl std::fmt::Debug for OverlayTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayTransaction")
            .field("bound", &self.is_bound())
            .finish()
    }
}

impl Transaction for OverlayTransaction {
    fn success(&self) -> GraphResult<()> {
        let hook = hooks::run(&self.db.hooks.on_success_transaction);
        let delegated = self.delegate(|tx| tx.success());
        hook.and(delegated)
    }

    fn failure(&self) -> GraphResult<()> {
        let hook = hooks::run(&self.db.hooks.on_failure_transaction);
        let delegated = self.delegate(|tx| tx.failure());
        hook.and(delegated)
    }

    fn finish(&self) -> GraphResult<()> {
        let hook = hooks::run(&self.db.hooks.on_finish_transaction);
        let delegated = self.delegate(|tx| tx.finish());
        hook.and(delegated)
    }
}
