//! Capability contract consumed from the underlying graph engine and
//! re-exposed by the overlay.
//!
//! Every trait here is object safe and implemented both by real engines and
//! by the overlay types, so a decorated database can itself be decorated
//! again. Entities are shared handles (`Arc<dyn Node>` etc.) owned by the
//! engine; this layer never mutates them directly.

use std::any::Any;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::GraphResult;

pub mod event;
pub mod index;

pub use event::{
    KernelEventHandler, PropertyEntry, TransactionData, TransactionEventHandler,
};
pub use index::{
    Index, IndexHits, IndexManager, IndexRef, NodeAutoIndexer, NodeHits, ReadableIndex,
    ReadableRelationshipIndex, RelationshipAutoIndexer, RelationshipHits, RelationshipIndex,
};

/// Engine-assigned node identifier
pub type NodeId = u64;

/// Engine-assigned relationship identifier
pub type RelationshipId = u64;

/// Property values, free-form query objects and configuration entries are
/// JSON values.
pub type PropertyValue = serde_json::Value;

/// The type of a relationship, named by the engine
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationshipType(pub String);

impl RelationshipType {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Direction of a relationship relative to a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Outgoing,
    Incoming,
    Both,
}

/// A lazily produced sequence of nodes
pub type Nodes = Box<dyn Iterator<Item = Arc<dyn Node>> + Send>;

/// A lazily produced sequence of relationships
pub type Relationships = Box<dyn Iterator<Item = Arc<dyn Relationship>> + Send>;

/// Anything that carries string-keyed properties
pub trait PropertyContainer: Send + Sync {
    /// Get a property value, `None` when the key is absent
    fn get_property(&self, key: &str) -> GraphResult<Option<PropertyValue>>;

    /// Set a property value, overwriting any previous value
    fn set_property(&self, key: &str, value: PropertyValue) -> GraphResult<()>;

    /// Remove a property, returning the previous value if any
    fn remove_property(&self, key: &str) -> GraphResult<Option<PropertyValue>>;

    /// All property keys currently set
    fn property_keys(&self) -> GraphResult<Vec<String>>;

    fn has_property(&self, key: &str) -> GraphResult<bool> {
        Ok(self.get_property(key)?.is_some())
    }
}

/// A node handle
pub trait Node: PropertyContainer + std::fmt::Debug {
    /// Engine-assigned id
    fn id(&self) -> NodeId;

    /// Delete this node
    fn delete(&self) -> GraphResult<()>;

    /// All relationships attached to this node
    fn relationships(&self) -> GraphResult<Relationships>;

    /// Relationships attached to this node, filtered by direction
    fn relationships_directed(&self, direction: Direction) -> GraphResult<Relationships>;

    /// Relationships attached to this node, filtered by type and direction
    fn relationships_typed(
        &self,
        relationship_type: &RelationshipType,
        direction: Direction,
    ) -> GraphResult<Relationships>;

    /// Whether any relationship is attached to this node
    fn has_relationship(&self) -> GraphResult<bool>;

    /// Create a relationship from this node to `other`
    fn create_relationship_to(
        &self,
        other: &dyn Node,
        relationship_type: RelationshipType,
    ) -> GraphResult<Arc<dyn Relationship>>;

    /// Concrete-type access, used to recognize decorated handles
    fn as_any(&self) -> &dyn Any;
}

/// A relationship handle
pub trait Relationship: PropertyContainer + std::fmt::Debug {
    /// Engine-assigned id
    fn id(&self) -> RelationshipId;

    /// Delete this relationship
    fn delete(&self) -> GraphResult<()>;

    /// The node this relationship starts at
    fn start_node(&self) -> GraphResult<Arc<dyn Node>>;

    /// The node this relationship ends at
    fn end_node(&self) -> GraphResult<Arc<dyn Node>>;

    /// Given one endpoint, return the opposite one
    fn other_node(&self, node: &dyn Node) -> GraphResult<Arc<dyn Node>>;

    /// Both endpoints, start first
    fn nodes(&self) -> GraphResult<[Arc<dyn Node>; 2]>;

    /// The type this relationship was created with
    fn relationship_type(&self) -> RelationshipType;

    fn is_type(&self, relationship_type: &RelationshipType) -> bool {
        self.relationship_type() == *relationship_type
    }

    /// Concrete-type access, used to recognize decorated handles
    fn as_any(&self) -> &dyn Any;
}

/// A transaction handle. State (open, success/failure, finished) is owned by
/// the engine; `success` and `failure` may each be called any number of times
/// before `finish`, and the last call before `finish` governs the outcome.
pub trait Transaction: Send + Sync + std::fmt::Debug {
    fn success(&self) -> GraphResult<()>;

    fn failure(&self) -> GraphResult<()>;

    fn finish(&self) -> GraphResult<()>;
}

/// Extended management capability. Optional: engines that do not expose it
/// simply never hand out a binding.
pub trait Management: Send + Sync {
    /// Filesystem location of the store
    fn store_dir(&self) -> PathBuf;

    /// The configuration the engine was started with
    fn configuration(&self) -> HashMap<String, String>;

    /// Look up a management bean by name
    fn management_bean(&self, name: &str) -> Option<Arc<dyn Any + Send + Sync>>;

    /// Whether the engine was opened read-only
    fn is_read_only(&self) -> bool;
}

/// The full graph database capability set.
pub trait GraphDatabase: Send + Sync {
    /// Create a new node
    fn create_node(&self) -> GraphResult<Arc<dyn Node>>;

    /// Fetch a node by id
    fn node_by_id(&self, id: NodeId) -> GraphResult<Arc<dyn Node>>;

    /// Fetch a relationship by id
    fn relationship_by_id(&self, id: RelationshipId) -> GraphResult<Arc<dyn Relationship>>;

    /// The distinguished reference node
    fn reference_node(&self) -> GraphResult<Arc<dyn Node>>;

    /// Enumerate all nodes
    fn all_nodes(&self) -> GraphResult<Nodes>;

    /// Enumerate the relationship types in use
    fn relationship_types(&self) -> GraphResult<Vec<RelationshipType>>;

    /// Begin a transaction
    fn begin_tx(&self) -> GraphResult<Arc<dyn Transaction>>;

    /// Shut the database down
    fn shutdown(&self) -> GraphResult<()>;

    /// The index manager
    fn index(&self) -> Arc<dyn IndexManager>;

    /// Register a transaction event handler
    fn register_transaction_event_handler(
        &self,
        handler: Arc<dyn TransactionEventHandler>,
    ) -> GraphResult<()>;

    /// Unregister a transaction event handler
    fn unregister_transaction_event_handler(
        &self,
        handler: &Arc<dyn TransactionEventHandler>,
    ) -> GraphResult<()>;

    /// Register a kernel event handler
    fn register_kernel_event_handler(
        &self,
        handler: Arc<dyn KernelEventHandler>,
    ) -> GraphResult<()>;

    /// Unregister a kernel event handler
    fn unregister_kernel_event_handler(
        &self,
        handler: &Arc<dyn KernelEventHandler>,
    ) -> GraphResult<()>;

    /// Extended management capability, absent unless the engine binds one
    fn management(&self) -> Option<&dyn Management> {
        None
    }
}
