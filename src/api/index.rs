//! Index capability contract: manual indexes, auto-indexers, and the
//! single-pass hits cursor produced by lookups.

use std::any::Any;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::api::{Node, PropertyValue, Relationship};
use crate::error::GraphResult;

/// Single-pass cursor over index hits, with an optional relevance score.
///
/// `size` reports the total hit count regardless of how many items were
/// pulled. `single` consumes the cursor expecting zero or one hit.
pub trait IndexHits: Iterator {
    fn size(&self) -> usize;

    /// Relevance score of the most recently pulled item
    fn current_score(&self) -> f32;

    /// The only hit, or `None` when there is none
    fn single(&mut self) -> GraphResult<Option<Self::Item>>;

    /// Release the underlying result set
    fn close(&mut self);
}

/// Hits cursor over nodes
pub type NodeHits = Box<dyn IndexHits<Item = Arc<dyn Node>> + Send>;

/// Hits cursor over relationships
pub type RelationshipHits = Box<dyn IndexHits<Item = Arc<dyn Relationship>> + Send>;

/// Read operations of an index over entities of kind `T`.
///
/// `T` is `Arc<dyn Node>` or `Arc<dyn Relationship>`.
pub trait ReadableIndex<T: 'static>: Send + Sync {
    fn name(&self) -> String;

    /// Exact lookup by key and value
    fn get(&self, key: &str, value: &PropertyValue) -> GraphResult<Box<dyn IndexHits<Item = T> + Send>>;

    /// Free-form query under a key
    fn query(&self, key: &str, query: &PropertyValue) -> GraphResult<Box<dyn IndexHits<Item = T> + Send>>;

    /// Free-form query across all keys
    fn query_all(&self, query: &PropertyValue) -> GraphResult<Box<dyn IndexHits<Item = T> + Send>>;

    /// The mutation capability, absent for read-only views
    fn writable(&self) -> Option<&dyn Index<T>>;

    /// Concrete-type access, used to recognize decorated indexes
    fn as_any(&self) -> &dyn Any;
}

/// A fully capable (mutable) index over entities of kind `T`
pub trait Index<T: 'static>: ReadableIndex<T> {
    /// Associate `entity` with `key`/`value`
    fn add(&self, entity: T, key: &str, value: PropertyValue) -> GraphResult<()>;

    /// Remove one `key`/`value` association of `entity`
    fn remove(&self, entity: T, key: &str, value: &PropertyValue) -> GraphResult<()>;

    /// Remove every association of `entity` under `key`
    fn remove_key(&self, entity: T, key: &str) -> GraphResult<()>;

    /// Remove every association of `entity`
    fn remove_entity(&self, entity: T) -> GraphResult<()>;

    /// Delete the whole index
    fn delete(&self) -> GraphResult<()>;
}

/// Read operations specific to relationship indexes: lookups optionally
/// constrained by the relationship's endpoints. `None` means unconstrained.
pub trait ReadableRelationshipIndex: ReadableIndex<Arc<dyn Relationship>> {
    fn get_filtered(
        &self,
        key: &str,
        value: Option<&PropertyValue>,
        start: Option<&dyn Node>,
        end: Option<&dyn Node>,
    ) -> GraphResult<RelationshipHits>;

    fn query_filtered(
        &self,
        key: &str,
        query: Option<&PropertyValue>,
        start: Option<&dyn Node>,
        end: Option<&dyn Node>,
    ) -> GraphResult<RelationshipHits>;

    fn query_all_filtered(
        &self,
        query: Option<&PropertyValue>,
        start: Option<&dyn Node>,
        end: Option<&dyn Node>,
    ) -> GraphResult<RelationshipHits>;
}

/// A fully capable relationship index
pub trait RelationshipIndex: ReadableRelationshipIndex + Index<Arc<dyn Relationship>> {}

/// Reference to an index of either entity kind, as handed to index-manager
/// configuration calls.
#[derive(Clone, Copy)]
pub enum IndexRef<'a> {
    Node(&'a dyn ReadableIndex<Arc<dyn Node>>),
    Relationship(&'a dyn ReadableIndex<Arc<dyn Relationship>>),
}

impl IndexRef<'_> {
    pub fn name(&self) -> String {
        match self {
            IndexRef::Node(index) => index.name(),
            IndexRef::Relationship(index) => index.name(),
        }
    }
}

/// Automatic indexing of designated node properties
pub trait NodeAutoIndexer: Send + Sync {
    fn set_enabled(&self, enabled: bool) -> GraphResult<()>;

    fn is_enabled(&self) -> bool;

    fn start_auto_indexing_property(&self, property: &str) -> GraphResult<()>;

    fn stop_auto_indexing_property(&self, property: &str) -> GraphResult<()>;

    fn auto_indexed_properties(&self) -> HashSet<String>;

    /// The read-only index the auto-indexer maintains
    fn auto_index(&self) -> GraphResult<Arc<dyn ReadableIndex<Arc<dyn Node>>>>;
}

/// Automatic indexing of designated relationship properties
pub trait RelationshipAutoIndexer: Send + Sync {
    fn set_enabled(&self, enabled: bool) -> GraphResult<()>;

    fn is_enabled(&self) -> bool;

    fn start_auto_indexing_property(&self, property: &str) -> GraphResult<()>;

    fn stop_auto_indexing_property(&self, property: &str) -> GraphResult<()>;

    fn auto_indexed_properties(&self) -> HashSet<String>;

    /// The read-only index the auto-indexer maintains
    fn auto_index(&self) -> GraphResult<Arc<dyn ReadableRelationshipIndex>>;
}

/// Index management capability of a graph database
pub trait IndexManager: Send + Sync {
    fn node_index_names(&self) -> Vec<String>;

    fn relationship_index_names(&self) -> Vec<String>;

    fn exists_for_nodes(&self, name: &str) -> bool;

    fn exists_for_relationships(&self, name: &str) -> bool;

    /// Get or create a node index
    fn for_nodes(&self, name: &str) -> GraphResult<Arc<dyn Index<Arc<dyn Node>>>>;

    /// Get or create a node index with custom configuration
    fn for_nodes_with_config(
        &self,
        name: &str,
        config: &HashMap<String, String>,
    ) -> GraphResult<Arc<dyn Index<Arc<dyn Node>>>>;

    /// Get or create a relationship index
    fn for_relationships(&self, name: &str) -> GraphResult<Arc<dyn RelationshipIndex>>;

    /// Get or create a relationship index with custom configuration
    fn for_relationships_with_config(
        &self,
        name: &str,
        config: &HashMap<String, String>,
    ) -> GraphResult<Arc<dyn RelationshipIndex>>;

    /// Current configuration of `index`
    fn get_configuration(&self, index: IndexRef<'_>) -> GraphResult<HashMap<String, String>>;

    /// Set one configuration entry of `index`, returning the previous value
    fn set_configuration(
        &self,
        index: IndexRef<'_>,
        key: &str,
        value: &str,
    ) -> GraphResult<Option<String>>;

    /// Remove one configuration entry of `index`, returning the removed value
    fn remove_configuration(
        &self,
        index: IndexRef<'_>,
        key: &str,
    ) -> GraphResult<Option<String>>;

    fn node_auto_indexer(&self) -> Arc<dyn NodeAutoIndexer>;

    fn relationship_auto_indexer(&self) -> Arc<dyn RelationshipAutoIndexer>;
}
