//! Index decoration: manual and read-only indexes, auto-indexers, and the
//! lazily wrapping hits cursor.
//!
//! Lookup results are wrapped one item at a time as the cursor is pulled.
//! Mutating operations unwrap their entity argument, then require the
//! underlying index to expose the writable capability; an index backed by a
//! read-only view (such as an auto-index) rejects mutation with
//! [`GraphError::ReadOnlyIndex`] and is left untouched.

use std::any::Any;
use std::collections::HashSet;
use std::sync::Arc;

use crate::api::{
    Index, IndexHits, IndexRef, Node, NodeAutoIndexer, NodeHits, PropertyValue, ReadableIndex,
    ReadableRelationshipIndex, Relationship, RelationshipAutoIndexer, RelationshipHits,
    RelationshipIndex,
};
use crate::error::{GraphError, GraphResult};
use crate::overlay::entity::{raw_node, unwrap_node, unwrap_relationship, wrap_node, wrap_relationship};
use crate::overlay::Core;

/// Substitute any decorated index in `index` with the engine index it
/// decorates, so configuration calls always reach the engine with its own
/// handle. Non-decorated references pass through unchanged.
pub(crate) fn raw_index_ref(index: IndexRef<'_>) -> IndexRef<'_> {
    match index {
        IndexRef::Node(index) => {
            let mut current = index;
            while let Some(wrapper) = current.as_any().downcast_ref::<OverlayNodeIndex>() {
                current = wrapper.inner.as_ref();
            }
            IndexRef::Node(current)
        }
        IndexRef::Relationship(index) => {
            let mut current = index;
            while let Some(wrapper) = current.as_any().downcast_ref::<OverlayRelationshipIndex>() {
                current = wrapper.inner.as_ref();
            }
            IndexRef::Relationship(current)
        }
    }
}

/// Hits cursor that applies the wrap factory to each item as it is pulled
struct OverlayHits<T: 'static, F> {
    inner: Box<dyn IndexHits<Item = T> + Send>,
    wrap: F,
}

impl<T: 'static, F> Iterator for OverlayHits<T, F>
where
    F: FnMut(T) -> T,
{
    type Item = T;

    fn next(&mut self) -> Option<T> {
        self.inner.next().map(&mut self.wrap)
    }
}

impl<T: 'static, F> IndexHits for OverlayHits<T, F>
where
    F: FnMut(T) -> T,
{
    fn size(&self) -> usize {
        self.inner.size()
    }

    fn current_score(&self) -> f32 {
        self.inner.current_score()
    }

    fn single(&mut self) -> GraphResult<Option<T>> {
        // an absent result is returned as-is, never wrapped
        Ok(self.inner.single()?.map(&mut self.wrap))
    }

    fn close(&mut self) {
        self.inner.close()
    }
}

/// Decorated node index
pub struct OverlayNodeIndex {
    pub(crate) db: Arc<Core>,
    pub(crate) inner: Arc<dyn ReadableIndex<Arc<dyn Node>>>,
}

impl OverlayNodeIndex {
    fn wrap_hits(&self, hits: NodeHits) -> NodeHits {
        let db = self.db.clone();
        Box::new(OverlayHits {
            inner: hits,
            wrap: move |node| wrap_node(&db, node, false),
        })
    }

    fn writable_inner(&self) -> GraphResult<&dyn Index<Arc<dyn Node>>> {
        self.inner
            .writable()
            .ok_or_else(|| GraphError::ReadOnlyIndex(self.inner.name()))
    }
}

impl ReadableIndex<Arc<dyn Node>> for OverlayNodeIndex {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn get(&self, key: &str, value: &PropertyValue) -> GraphResult<NodeHits> {
        Ok(self.wrap_hits(self.inner.get(key, value)?))
    }

    fn query(&self, key: &str, query: &PropertyValue) -> GraphResult<NodeHits> {
        Ok(self.wrap_hits(self.inner.query(key, query)?))
    }

    fn query_all(&self, query: &PropertyValue) -> GraphResult<NodeHits> {
        Ok(self.wrap_hits(self.inner.query_all(query)?))
    }

    fn writable(&self) -> Option<&dyn Index<Arc<dyn Node>>> {
        self.inner.writable().map(|_| self as &dyn Index<Arc<dyn Node>>)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl Index<Arc<dyn Node>> for OverlayNodeIndex {
    fn add(&self, entity: Arc<dyn Node>, key: &str, value: PropertyValue) -> GraphResult<()> {
        self.writable_inner()?.add(unwrap_node(&entity), key, value)
    }

    fn remove(&self, entity: Arc<dyn Node>, key: &str, value: &PropertyValue) -> GraphResult<()> {
        self.writable_inner()?.remove(unwrap_node(&entity), key, value)
    }

    fn remove_key(&self, entity: Arc<dyn Node>, key: &str) -> GraphResult<()> {
        self.writable_inner()?.remove_key(unwrap_node(&entity), key)
    }

    fn remove_entity(&self, entity: Arc<dyn Node>) -> GraphResult<()> {
        self.writable_inner()?.remove_entity(unwrap_node(&entity))
    }

    fn delete(&self) -> GraphResult<()> {
        self.writable_inner()?.delete()
    }
}

/// Decorated relationship index
pub struct OverlayRelationshipIndex {
    pub(crate) db: Arc<Core>,
    pub(crate) inner: Arc<dyn ReadableRelationshipIndex>,
}

impl OverlayRelationshipIndex {
    fn wrap_hits(&self, hits: RelationshipHits) -> RelationshipHits {
        let db = self.db.clone();
        Box::new(OverlayHits {
            inner: hits,
            wrap: move |relationship| wrap_relationship(&db, relationship, false),
        })
    }

    fn writable_inner(&self) -> GraphResult<&dyn Index<Arc<dyn Relationship>>> {
        self.inner
            .writable()
            .ok_or_else(|| GraphError::ReadOnlyIndex(self.inner.name()))
    }
}

impl ReadableIndex<Arc<dyn Relationship>> for OverlayRelationshipIndex {
    fn name(&self) -> String {
        self.inner.name()
    }

    fn get(&self, key: &str, value: &PropertyValue) -> GraphResult<RelationshipHits> {
        Ok(self.wrap_hits(self.inner.get(key, value)?))
    }

    fn query(&self, key: &str, query: &PropertyValue) -> GraphResult<RelationshipHits> {
        Ok(self.wrap_hits(self.inner.query(key, query)?))
    }

    fn query_all(&self, query: &PropertyValue) -> GraphResult<RelationshipHits> {
        Ok(self.wrap_hits(self.inner.query_all(query)?))
    }

    fn writable(&self) -> Option<&dyn Index<Arc<dyn Relationship>>> {
        self.inner
            .writable()
            .map(|_| self as &dyn Index<Arc<dyn Relationship>>)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl ReadableRelationshipIndex for OverlayRelationshipIndex {
    fn get_filtered(
        &self,
        key: &str,
        value: Option<&PropertyValue>,
        start: Option<&dyn Node>,
        end: Option<&dyn Node>,
    ) -> GraphResult<RelationshipHits> {
        let hits = self
            .inner
            .get_filtered(key, value, start.map(raw_node), end.map(raw_node))?;
        Ok(self.wrap_hits(hits))
    }

    fn query_filtered(
        &self,
        key: &str,
        query: Option<&PropertyValue>,
        start: Option<&dyn Node>,
        end: Option<&dyn Node>,
    ) -> GraphResult<RelationshipHits> {
        let hits = self
            .inner
            .query_filtered(key, query, start.map(raw_node), end.map(raw_node))?;
        Ok(self.wrap_hits(hits))
    }

    fn query_all_filtered(
        &self,
        query: Option<&PropertyValue>,
        start: Option<&dyn Node>,
        end: Option<&dyn Node>,
    ) -> GraphResult<RelationshipHits> {
        let hits = self
            .inner
            .query_all_filtered(query, start.map(raw_node), end.map(raw_node))?;
        Ok(self.wrap_hits(hits))
    }
}

impl Index<Arc<dyn Relationship>> for OverlayRelationshipIndex {
    fn add(&self, entity: Arc<dyn Relationship>, key: &str, value: PropertyValue) -> GraphResult<()> {
        self.writable_inner()?
            .add(unwrap_relationship(&entity), key, value)
    }

    fn remove(
        &self,
        entity: Arc<dyn Relationship>,
        key: &str,
        value: &PropertyValue,
    ) -> GraphResult<()> {
        self.writable_inner()?
            .remove(unwrap_relationship(&entity), key, value)
    }

    fn remove_key(&self, entity: Arc<dyn Relationship>, key: &str) -> GraphResult<()> {
        self.writable_inner()?
            .remove_key(unwrap_relationship(&entity), key)
    }

    fn remove_entity(&self, entity: Arc<dyn Relationship>) -> GraphResult<()> {
        self.writable_inner()?
            .remove_entity(unwrap_relationship(&entity))
    }

    fn delete(&self) -> GraphResult<()> {
        self.writable_inner()?.delete()
    }
}

impl RelationshipIndex for OverlayRelationshipIndex {}

/// Decorated node auto-indexer
pub struct OverlayNodeAutoIndexer {
    pub(crate) db: Arc<Core>,
    pub(crate) inner: Arc<dyn NodeAutoIndexer>,
}

impl NodeAutoIndexer for OverlayNodeAutoIndexer {
    fn set_enabled(&self, enabled: bool) -> GraphResult<()> {
        self.inner.set_enabled(enabled)
    }

    fn is_enabled(&self) -> bool {
        self.inner.is_enabled()
    }

    fn start_auto_indexing_property(&self, property: &str) -> GraphResult<()> {
        self.inner.start_auto_indexing_property(property)
    }

    fn stop_auto_indexing_property(&self, property: &str) -> GraphResult<()> {
        self.inner.stop_auto_indexing_property(property)
    }

    fn auto_indexed_properties(&self) -> HashSet<String> {
        self.inner.auto_indexed_properties()
    }

    fn auto_index(&self) -> GraphResult<Arc<dyn ReadableIndex<Arc<dyn Node>>>> {
        Ok(Arc::new(OverlayNodeIndex {
            db: self.db.clone(),
            inner: self.inner.auto_index()?,
        }))
    }
}

/// Decorated relationship auto-indexer
pub struct OverlayRelationshipAutoIndexer {
    pub(crate) db: Arc<Core>,
    pub(crate) inner: Arc<dyn RelationshipAutoIndexer>,
}

impl RelationshipAutoIndexer for OverlayRelationshipAutoIndexer {
    fn set_enabled(&self, enabled: bool) -> GraphResult<()> {
        self.inner.set_enabled(enabled)
    }

    fn is_enabled(&self) -> bool {
        self.inner.is_enabled()
    }

    fn start_auto_indexing_property(&self, property: &str) -> GraphResult<()> {
        self.inner.start_auto_indexing_property(property)
    }

    fn stop_auto_indexing_property(&self, property: &str) -> GraphResult<()> {
        self.inner.stop_auto_indexing_property(property)
    }

    fn auto_indexed_properties(&self) -> HashSet<String> {
        self.inner.auto_indexed_properties()
    }

    fn auto_index(&self) -> GraphResult<Arc<dyn ReadableRelationshipIndex>> {
        Ok(Arc::new(OverlayRelationshipIndex {
            db: self.db.clone(),
            inner: self.inner.auto_index()?,
        }))
    }
}
