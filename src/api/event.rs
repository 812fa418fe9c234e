//! Event handler contract: transaction event handlers observe commits and
//! rollbacks with the entities involved; kernel event handlers observe
//! engine-level lifecycle and carry no entities.

use std::sync::Arc;

use crate::api::{Node, PropertyValue, Relationship};
use crate::error::GraphResult;

/// One property change observed in a transaction
#[derive(Clone)]
pub struct PropertyEntry<T> {
    pub entity: T,
    pub key: String,
    /// The newly assigned value, `None` for removals
    pub value: Option<PropertyValue>,
    /// The value before the change, `None` when the key was absent
    pub previously: Option<PropertyValue>,
}

/// Everything a transaction touched, as surfaced to event handlers
#[derive(Clone, Default)]
pub struct TransactionData {
    pub created_nodes: Vec<Arc<dyn Node>>,
    pub deleted_nodes: Vec<Arc<dyn Node>>,
    pub created_relationships: Vec<Arc<dyn Relationship>>,
    pub deleted_relationships: Vec<Arc<dyn Relationship>>,
    pub assigned_node_properties: Vec<PropertyEntry<Arc<dyn Node>>>,
    pub removed_node_properties: Vec<PropertyEntry<Arc<dyn Node>>>,
    pub assigned_relationship_properties: Vec<PropertyEntry<Arc<dyn Relationship>>>,
    pub removed_relationship_properties: Vec<PropertyEntry<Arc<dyn Relationship>>>,
}

/// Observes transaction outcomes. `before_commit` may reject the commit by
/// returning an error.
pub trait TransactionEventHandler: Send + Sync {
    fn before_commit(&self, data: &TransactionData) -> GraphResult<()>;

    fn after_commit(&self, data: &TransactionData);

    fn after_rollback(&self, data: &TransactionData);
}

/// Observes engine-level lifecycle events
pub trait KernelEventHandler: Send + Sync {
    fn before_shutdown(&self);

    fn kernel_panic(&self, error: &str);
}
