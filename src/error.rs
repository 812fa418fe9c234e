//! Errors shared by the capability contract and the overlay layer

use crate::api::{NodeId, RelationshipId};

/// Errors that can occur in graph operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    #[error("Node not found: {0}")]
    NodeNotFound(NodeId),

    #[error("Relationship not found: {0}")]
    RelationshipNotFound(RelationshipId),

    #[error("Index not found: {0}")]
    IndexNotFound(String),

    /// A transaction begin was rejected by policy and the veto carried no
    /// original cause. A veto with a cause surfaces the cause itself instead.
    #[error("Transaction not allowed")]
    TransactionVetoed,

    /// A mutating index operation was invoked on an index backed by a
    /// read-only view (for example an auto-index).
    #[error("Index is read-only: {0}")]
    ReadOnlyIndex(String),

    #[error("Operation not supported: {0}")]
    NotSupported(String),

    /// Rejection raised by a policy hook or an event handler.
    #[error("Rejected by policy: {0}")]
    Policy(String),

    /// Failure raised by the underlying engine. Propagated untranslated.
    #[error("Engine error: {0}")]
    Engine(String),
}

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;
