//! Entity wrappers and the unwrap helpers.
//!
//! A wrapper holds exactly one underlying handle plus a reference to the
//! owning overlay core. Entity-valued results are wrapped through the core's
//! factory methods; entity-valued arguments are unwrapped before delegation,
//! whatever wrap depth they arrive at. Values that were never wrapped pass
//! through both helpers unchanged.

use std::any::Any;
use std::sync::Arc;

use crate::api::{
    Direction, Node, NodeId, PropertyContainer, PropertyValue, Relationship, RelationshipId,
    RelationshipType, Relationships,
};
use crate::error::GraphResult;
use crate::overlay::Core;

/// Build a decorated node. All node wrapping funnels through here.
pub(crate) fn wrap_node(db: &Arc<Core>, node: Arc<dyn Node>, created: bool) -> Arc<dyn Node> {
    if let Some(observer) = &db.hooks.on_wrap_node {
        observer(node.as_ref(), created);
    }
    Arc::new(OverlayNode {
        db: db.clone(),
        inner: node,
    })
}

/// Build a decorated relationship. All relationship wrapping funnels through here.
pub(crate) fn wrap_relationship(
    db: &Arc<Core>,
    relationship: Arc<dyn Relationship>,
    created: bool,
) -> Arc<dyn Relationship> {
    if let Some(observer) = &db.hooks.on_wrap_relationship {
        observer(relationship.as_ref(), created);
    }
    Arc::new(OverlayRelationship {
        db: db.clone(),
        inner: relationship,
    })
}

/// Recover the raw node behind `node`, peeling any depth of overlay
/// wrappers. A node that was never wrapped is returned unchanged.
pub fn unwrap_node(node: &Arc<dyn Node>) -> Arc<dyn Node> {
    let mut current = node.clone();
    loop {
        current = match current.as_any().downcast_ref::<OverlayNode>() {
            Some(wrapper) => wrapper.inner.clone(),
            None => return current,
        };
    }
}

/// Recover the raw relationship behind `relationship`, peeling any depth of
/// overlay wrappers.
pub fn unwrap_relationship(relationship: &Arc<dyn Relationship>) -> Arc<dyn Relationship> {
    let mut current = relationship.clone();
    loop {
        current = match current.as_any().downcast_ref::<OverlayRelationship>() {
            Some(wrapper) => wrapper.inner.clone(),
            None => return current,
        };
    }
}

/// Borrowing form of [`unwrap_node`], used on the argument path
pub fn raw_node(node: &dyn Node) -> &dyn Node {
    let mut current = node;
    while let Some(wrapper) = current.as_any().downcast_ref::<OverlayNode>() {
        current = wrapper.inner.as_ref();
    }
    current
}

/// Borrowing form of [`unwrap_relationship`]
pub fn raw_relationship(relationship: &dyn Relationship) -> &dyn Relationship {
    let mut current = relationship;
    while let Some(wrapper) = current.as_any().downcast_ref::<OverlayRelationship>() {
        current = wrapper.inner.as_ref();
    }
    current
}

/// Decorated node handle
pub struct OverlayNode {
    pub(crate) db: Arc<Core>,
    pub(crate) inner: Arc<dyn Node>,
}

impl OverlayNode {
    /// The raw handle this wrapper decorates
    pub fn underlying(&self) -> &Arc<dyn Node> {
        &self.inner
    }
}

impl PropertyContainer for OverlayNode {
    fn get_property(&self, key: &str) -> GraphResult<Option<PropertyValue>> {
        self.inner.get_property(key)
    }

    fn set_property(&self, key: &str, value: PropertyValue) -> GraphResult<()> {
        self.inner.set_property(key, value)
    }

    fn remove_property(&self, key: &str) -> GraphResult<Option<PropertyValue>> {
        self.inner.remove_property(key)
    }

    fn property_keys(&self) -> GraphResult<Vec<String>> {
        self.inner.property_keys()
    }

    fn has_property(&self, key: &str) -> GraphResult<bool> {
        self.inner.has_property(key)
    }
}

impl Node for OverlayNode {
    fn id(&self) -> NodeId {
        self.inner.id()
    }

    fn delete(&self) -> GraphResult<()> {
        self.inner.delete()
    }

    fn relationships(&self) -> GraphResult<Relationships> {
        let db = self.db.clone();
        Ok(Box::new(
            self.inner
                .relationships()?
                .map(move |relationship| wrap_relationship(&db, relationship, false)),
        ))
    }

    fn relationships_directed(&self, direction: Direction) -> GraphResult<Relationships> {
        let db = self.db.clone();
        Ok(Box::new(
            self.inner
                .relationships_directed(direction)?
                .map(move |relationship| wrap_relationship(&db, relationship, false)),
        ))
    }

    fn relationships_typed(
        &self,
        relationship_type: &RelationshipType,
        direction: Direction,
    ) -> GraphResult<Relationships> {
        let db = self.db.clone();
        Ok(Box::new(
            self.inner
                .relationships_typed(relationship_type, direction)?
                .map(move |relationship| wrap_relationship(&db, relationship, false)),
        ))
    }

    fn has_relationship(&self) -> GraphResult<bool> {
        self.inner.has_relationship()
    }

    fn create_relationship_to(
        &self,
        other: &dyn Node,
        relationship_type: RelationshipType,
    ) -> GraphResult<Arc<dyn Relationship>> {
        let created = self
            .inner
            .create_relationship_to(raw_node(other), relationship_type)?;
        Ok(wrap_relationship(&self.db, created, true))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl PartialEq for OverlayNode {
    /// Equal iff owned by the same overlay and decorating the same entity
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.db, &other.db) && self.inner.id() == other.inner.id()
    }
}

impl Eq for OverlayNode {}

impl std::fmt::Debug for OverlayNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayNode").field("id", &self.inner.id()).finish()
    }
}

/// Decorated relationship handle
pub struct OverlayRelationship {
    pub(crate) db: Arc<Core>,
    pub(crate) inner: Arc<dyn Relationship>,
}

impl OverlayRelationship {
    /// The raw handle this wrapper decorates
    pub fn underlying(&self) -> &Arc<dyn Relationship> {
        &self.inner
    }
}

impl PropertyContainer for OverlayRelationship {
    fn get_property(&self, key: &str) -> GraphResult<Option<PropertyValue>> {
        self.inner.get_property(key)
    }

    fn set_property(&self, key: &str, value: PropertyValue) -> GraphResult<()> {
        self.inner.set_property(key, value)
    }

    fn remove_property(&self, key: &str) -> GraphResult<Option<PropertyValue>> {
        self.inner.remove_property(key)
    }

    fn property_keys(&self) -> GraphResult<Vec<String>> {
        self.inner.property_keys()
    }

    fn has_property(&self, key: &str) -> GraphResult<bool> {
        self.inner.has_property(key)
    }
}

impl Relationship for OverlayRelationship {
    fn id(&self) -> RelationshipId {
        self.inner.id()
    }

    fn delete(&self) -> GraphResult<()> {
        self.inner.delete()
    }

    fn start_node(&self) -> GraphResult<Arc<dyn Node>> {
        Ok(wrap_node(&self.db, self.inner.start_node()?, false))
    }

    fn end_node(&self) -> GraphResult<Arc<dyn Node>> {
        Ok(wrap_node(&self.db, self.inner.end_node()?, false))
    }

    fn other_node(&self, node: &dyn Node) -> GraphResult<Arc<dyn Node>> {
        let other = self.inner.other_node(raw_node(node))?;
        Ok(wrap_node(&self.db, other, false))
    }

    fn nodes(&self) -> GraphResult<[Arc<dyn Node>; 2]> {
        let [start, end] = self.inner.nodes()?;
        Ok([
            wrap_node(&self.db, start, false),
            wrap_node(&self.db, end, false),
        ])
    }

    fn relationship_type(&self) -> RelationshipType {
        self.inner.relationship_type()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl PartialEq for OverlayRelationship {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.db, &other.db) && self.inner.id() == other.inner.id()
    }
}

impl Eq for OverlayRelationship {}

impl std::fmt::Debug for OverlayRelationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayRelationship")
            .field("id", &self.inner.id())
            .field("type", &self.inner.relationship_type())
            .finish()
    }
}
