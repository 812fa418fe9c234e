//! Hook configuration for an overlay database.
//!
//! Each hook point is an optional boxed closure supplied at construction;
//! unset hooks are no-ops. This replaces subclass method overrides: policy
//! code (auditing, access control, metrics, transaction vetoes) attaches
//! here without touching the engine.

use crate::api::{Node, Relationship};
use crate::error::GraphResult;
use crate::overlay::tx::TransactionVeto;

/// Plain lifecycle hook
pub type HookFn = Box<dyn Fn() -> GraphResult<()> + Send + Sync>;

/// Transaction-begin hook, may veto the begin
pub type BeginHookFn = Box<dyn Fn() -> Result<(), TransactionVeto> + Send + Sync>;

/// Observer invoked by the node wrap factory, with the raw entity and
/// whether it was freshly created (as opposed to retrieved)
pub type NodeObserverFn = Box<dyn Fn(&dyn Node, bool) + Send + Sync>;

/// Observer invoked by the relationship wrap factory
pub type RelationshipObserverFn = Box<dyn Fn(&dyn Relationship, bool) + Send + Sync>;

/// Hook points of an overlay database. All default to no-op.
#[derive(Default)]
pub struct Hooks {
    pub(crate) on_begin_transaction: Option<BeginHookFn>,
    pub(crate) on_success_transaction: Option<HookFn>,
    pub(crate) on_failure_transaction: Option<HookFn>,
    pub(crate) on_finish_transaction: Option<HookFn>,
    pub(crate) on_node_create: Option<HookFn>,
    pub(crate) on_shutdown: Option<HookFn>,
    pub(crate) on_wrap_node: Option<NodeObserverFn>,
    pub(crate) on_wrap_relationship: Option<RelationshipObserverFn>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run before a transaction is begun; an `Err` vetoes the begin
    pub fn on_begin_transaction(
        mut self,
        hook: impl Fn() -> Result<(), TransactionVeto> + Send + Sync + 'static,
    ) -> Self {
        self.on_begin_transaction = Some(Box::new(hook));
        self
    }

    /// Run when `success` is called on a transaction obtained through the overlay
    pub fn on_success_transaction(
        mut self,
        hook: impl Fn() -> GraphResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_success_transaction = Some(Box::new(hook));
        self
    }

    /// Run when `failure` is called on a transaction obtained through the overlay
    pub fn on_failure_transaction(
        mut self,
        hook: impl Fn() -> GraphResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_failure_transaction = Some(Box::new(hook));
        self
    }

    /// Run when `finish` is called on a transaction obtained through the overlay
    pub fn on_finish_transaction(
        mut self,
        hook: impl Fn() -> GraphResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_finish_transaction = Some(Box::new(hook));
        self
    }

    /// Run before node creation is delegated; an `Err` aborts the creation
    pub fn on_node_create(
        mut self,
        hook: impl Fn() -> GraphResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_node_create = Some(Box::new(hook));
        self
    }

    /// Run before the underlying shutdown; the shutdown is delegated even
    /// when this hook errors
    pub fn on_shutdown(
        mut self,
        hook: impl Fn() -> GraphResult<()> + Send + Sync + 'static,
    ) -> Self {
        self.on_shutdown = Some(Box::new(hook));
        self
    }

    /// Observe every node passing through the wrap factory
    pub fn on_wrap_node(
        mut self,
        observer: impl Fn(&dyn Node, bool) + Send + Sync + 'static,
    ) -> Self {
        self.on_wrap_node = Some(Box::new(observer));
        self
    }

    /// Observe every relationship passing through the wrap factory
    pub fn on_wrap_relationship(
        mut self,
        observer: impl Fn(&dyn Relationship, bool) + Send + Sync + 'static,
    ) -> Self {
        self.on_wrap_relationship = Some(Box::new(observer));
        self
    }
}

/// Run an optional hook; unset hooks succeed
pub(crate) fn run(hook: &Option<HookFn>) -> GraphResult<()> {
    match hook {
        Some(hook) => hook(),
        None => Ok(()),
    }
}
