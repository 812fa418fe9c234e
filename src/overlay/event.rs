//! Transaction event handler decoration.
//!
//! The decorator wraps every entity inside the callback data before the
//! caller's handler sees it. The owning database keeps an identity-keyed
//! registry so each distinct raw handler maps to exactly one decorator;
//! registering twice and unregistering once therefore behaves correctly at
//! the engine.

use std::sync::{Arc, Weak};

use crate::api::{PropertyEntry, TransactionData, TransactionEventHandler};
use crate::error::GraphResult;
use crate::overlay::entity::{wrap_node, wrap_relationship};
use crate::overlay::Core;

/// Registry key: the raw handler's data-pointer address.
///
/// Identity, not equality, is what the registry is keyed on: two distinct
/// handler instances that happen to compare equal must still get distinct
/// decorators.
pub(crate) fn handler_key(handler: &Arc<dyn TransactionEventHandler>) -> usize {
    Arc::as_ptr(handler) as *const () as usize
}

/// Decorator around a caller-supplied transaction event handler
pub(crate) struct OverlayEventHandler {
    db: Weak<Core>,
    pub(crate) inner: Arc<dyn TransactionEventHandler>,
}

impl OverlayEventHandler {
    pub(crate) fn new(db: Weak<Core>, inner: Arc<dyn TransactionEventHandler>) -> Self {
        Self { db, inner }
    }

    /// Rebuild the callback data with every entity wrapped. The owning
    /// database outlives its wrappers; if it is somehow gone the data is
    /// delivered undecorated.
    fn wrap_data(&self, data: &TransactionData) -> Option<TransactionData> {
        let db = self.db.upgrade()?;
        let node = |entity: &Arc<dyn crate::api::Node>| wrap_node(&db, entity.clone(), false);
        let relationship = |entity: &Arc<dyn crate::api::Relationship>| {
            wrap_relationship(&db, entity.clone(), false)
        };
        Some(TransactionData {
            created_nodes: data.created_nodes.iter().map(node).collect(),
            deleted_nodes: data.deleted_nodes.iter().map(node).collect(),
            created_relationships: data.created_relationships.iter().map(relationship).collect(),
            deleted_relationships: data.deleted_relationships.iter().map(relationship).collect(),
            assigned_node_properties: data
                .assigned_node_properties
                .iter()
                .map(|entry| PropertyEntry {
                    entity: node(&entry.entity),
                    key: entry.key.clone(),
                    value: entry.value.clone(),
                    previously: entry.previously.clone(),
                })
                .collect(),
            removed_node_properties: data
                .removed_node_properties
                .iter()
                .map(|entry| PropertyEntry {
                    entity: node(&entry.entity),
                    key: entry.key.clone(),
                    value: entry.value.clone(),
                    previously: entry.previously.clone(),
                })
                .collect(),
            assigned_relationship_properties: data
                .assigned_relationship_properties
                .iter()
                .map(|entry| PropertyEntry {
                    entity: relationship(&entry.entity),
                    key: entry.key.clone(),
                    value: entry.value.clone(),
                    previously: entry.previously.clone(),
                })
                .collect(),
            removed_relationship_properties: data
                .removed_relationship_properties
                .iter()
                .map(|entry| PropertyEntry {
                    entity: relationship(&entry.entity),
                    key: entry.key.clone(),
                    value: entry.value.clone(),
                    previously: entry.previously.clone(),
                })
                .collect(),
        })
    }
}

impl TransactionEventHandler for OverlayEventHandler {
    fn before_commit(&self, data: &TransactionData) -> GraphResult<()> {
        match self.wrap_data(data) {
            Some(wrapped) => self.inner.before_commit(&wrapped),
            None => self.inner.before_commit(data),
        }
    }

    fn after_commit(&self, data: &TransactionData) {
        match self.wrap_data(data) {
            Some(wrapped) => self.inner.after_commit(&wrapped),
            None => self.inner.after_commit(data),
        }
    }

    fn after_rollback(&self, data: &TransactionData) {
        match self.wrap_data(data) {
            Some(wrapped) => self.inner.after_rollback(&wrapped),
            None => self.inner.after_rollback(data),
        }
    }
}
