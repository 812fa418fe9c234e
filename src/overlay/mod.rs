//! The decoration layer: a database wrapper that hands out wrapped entities,
//! funnels all wrapping through two factory methods, and brackets lifecycle
//! operations with configurable hooks.

use std::any::Any;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::api::{
    GraphDatabase, Index, IndexManager, IndexRef, KernelEventHandler, Management, Node,
    NodeAutoIndexer, NodeId, Nodes, Relationship, RelationshipAutoIndexer, RelationshipId,
    RelationshipIndex, RelationshipType, Transaction, TransactionEventHandler,
};
use crate::error::{GraphError, GraphResult};

pub mod entity;
pub(crate) mod event;
pub mod hooks;
pub mod index;
pub mod tx;

pub use entity::{OverlayNode, OverlayRelationship};
pub use hooks::Hooks;
pub use index::{
    OverlayNodeAutoIndexer, OverlayNodeIndex, OverlayRelationshipAutoIndexer,
    OverlayRelationshipIndex,
};
pub use tx::{OverlayTransaction, TransactionVeto};

use entity::{wrap_node, wrap_relationship};
use event::{handler_key, OverlayEventHandler};
use index::raw_index_ref;

const NO_MANAGEMENT: &str = "underlying database exposes no management capability";

/// Shared state of one overlay database: the engine handle, the hook
/// configuration, and the event-handler registry. Every wrapper produced by
/// the overlay carries a reference back here.
pub(crate) struct Core {
    pub(crate) inner: Arc<dyn GraphDatabase>,
    pub(crate) hooks: Hooks,
    pub(crate) handlers: Mutex<HashMap<usize, Arc<OverlayEventHandler>>>,
}

/// A transparent decoration layer in front of a graph database.
///
/// Every entity obtained through an `OverlayDatabase` (nodes, relationships,
/// indexes, transactions) is itself a decorated instance owned by this
/// overlay, and every entity argument is unwrapped before it reaches the
/// engine. Behavior against the [`GraphDatabase`] contract is identical to
/// the engine's, so an overlay can stand in anywhere the engine could —
/// including underneath another overlay.
///
/// Cross-cutting behavior attaches through [`Hooks`]:
///
/// ```no_run
/// use std::sync::Arc;
/// use graph_overlay::{Hooks, OverlayDatabase, TransactionVeto};
/// use graph_overlay::api::GraphDatabase;
///
/// # fn open_engine() -> Arc<dyn GraphDatabase> { unimplemented!() }
/// let engine = open_engine();
/// let db = OverlayDatabase::with_hooks(
///     engine,
///     Hooks::new().on_begin_transaction(|| Err(TransactionVeto::new())),
/// );
/// assert!(db.begin_tx().is_err());
/// ```
pub struct OverlayDatabase {
    core: Arc<Core>,
    index_manager: Arc<OverlayIndexManager>,
}

impl OverlayDatabase {
    /// Decorate `inner` with no hooks configured
    pub fn new(inner: Arc<dyn GraphDatabase>) -> Self {
        Self::with_hooks(inner, Hooks::new())
    }

    /// Decorate `inner` with the given hook configuration
    pub fn with_hooks(inner: Arc<dyn GraphDatabase>, hooks: Hooks) -> Self {
        let core = Arc::new(Core {
            inner,
            hooks,
            handlers: Mutex::new(HashMap::new()),
        });
        let index_manager = Arc::new(OverlayIndexManager::new(core.clone()));
        Self {
            core,
            index_manager,
        }
    }

    /// The engine handle this overlay decorates
    pub fn underlying(&self) -> &Arc<dyn GraphDatabase> {
        &self.core.inner
    }

    /// A transaction wrapper with no underlying transaction bound.
    ///
    /// Lifecycle calls on it run the configured hooks and are otherwise
    /// harmless no-ops. This is the "rejected transaction" form: callers
    /// that want begin-veto rejection to still yield a usable handle pair
    /// [`begin_tx`](GraphDatabase::begin_tx) with this.
    pub fn noop_tx(&self) -> Arc<OverlayTransaction> {
        Arc::new(OverlayTransaction::new(self.core.clone(), None))
    }

    fn management_or_err(&self) -> GraphResult<&dyn Management> {
        self.core
            .inner
            .management()
            .ok_or_else(|| GraphError::NotSupported(NO_MANAGEMENT.to_string()))
    }

    /// Store directory of the engine; errors when the engine exposes no
    /// management capability
    pub fn store_dir(&self) -> GraphResult<PathBuf> {
        Ok(self.management_or_err()?.store_dir())
    }

    /// Configuration of the engine; errors when the engine exposes no
    /// management capability
    pub fn configuration(&self) -> GraphResult<HashMap<String, String>> {
        Ok(self.management_or_err()?.configuration())
    }

    /// Look up a management bean by name; errors when the engine exposes no
    /// management capability, `Ok(None)` when the bean does not exist
    pub fn management_bean(&self, name: &str) -> GraphResult<Option<Arc<dyn Any + Send + Sync>>> {
        Ok(self.management_or_err()?.management_bean(name))
    }

    /// Whether the engine was opened read-only; errors when the engine
    /// exposes no management capability
    pub fn is_read_only(&self) -> GraphResult<bool> {
        Ok(self.management_or_err()?.is_read_only())
    }
}

impl GraphDatabase for OverlayDatabase {
    fn create_node(&self) -> GraphResult<Arc<dyn Node>> {
        hooks::run(&self.core.hooks.on_node_create)?;
        let node = self.core.inner.create_node()?;
        Ok(wrap_node(&self.core, node, true))
    }

    fn node_by_id(&self, id: NodeId) -> GraphResult<Arc<dyn Node>> {
        Ok(wrap_node(&self.core, self.core.inner.node_by_id(id)?, false))
    }

    fn relationship_by_id(&self, id: RelationshipId) -> GraphResult<Arc<dyn Relationship>> {
        Ok(wrap_relationship(
            &self.core,
            self.core.inner.relationship_by_id(id)?,
            false,
        ))
    }

    fn reference_node(&self) -> GraphResult<Arc<dyn Node>> {
        Ok(wrap_node(&self.core, self.core.inner.reference_node()?, false))
    }

    fn all_nodes(&self) -> GraphResult<Nodes> {
        let nodes = self.core.inner.all_nodes()?;
        let core = self.core.clone();
        Ok(Box::new(nodes.map(move |node| wrap_node(&core, node, false))))
    }

    fn relationship_types(&self) -> GraphResult<Vec<RelationshipType>> {
        self.core.inner.relationship_types()
    }

    fn begin_tx(&self) -> GraphResult<Arc<dyn Transaction>> {
        if let Some(hook) = &self.core.hooks.on_begin_transaction {
            if let Err(veto) = hook() {
                tracing::debug!("transaction begin vetoed");
                return Err(veto.into_error());
            }
        }
        let tx = self.core.inner.begin_tx()?;
        Ok(Arc::new(OverlayTransaction::new(self.core.clone(), Some(tx))))
    }

    fn shutdown(&self) -> GraphResult<()> {
        // bracket: the hook runs first, the underlying shutdown runs
        // unconditionally, and a hook error is the one surfaced
        let hook = hooks::run(&self.core.hooks.on_shutdown);
        if let Err(error) = &hook {
            tracing::warn!(%error, "shutdown hook failed, shutting engine down anyway");
        }
        let delegated = self.core.inner.shutdown();
        hook.and(delegated)
    }

    fn index(&self) -> Arc<dyn IndexManager> {
        self.index_manager.clone()
    }

    fn register_transaction_event_handler(
        &self,
        handler: Arc<dyn TransactionEventHandler>,
    ) -> GraphResult<()> {
        let key = handler_key(&handler);
        let wrapped: Arc<dyn TransactionEventHandler> = {
            // check-then-insert under one lock: no two threads may produce
            // two decorators for the same raw handler
            let mut handlers = self.core.handlers.lock();
            handlers
                .entry(key)
                .or_insert_with(|| {
                    tracing::debug!(key, "decorating transaction event handler");
                    Arc::new(OverlayEventHandler::new(
                        Arc::downgrade(&self.core),
                        handler.clone(),
                    ))
                })
                .clone()
        };
        self.core.inner.register_transaction_event_handler(wrapped)
    }

    fn unregister_transaction_event_handler(
        &self,
        handler: &Arc<dyn TransactionEventHandler>,
    ) -> GraphResult<()> {
        let key = handler_key(handler);
        let wrapped = self.core.handlers.lock().get(&key).cloned();
        match wrapped {
            Some(wrapped) => {
                let wrapped: Arc<dyn TransactionEventHandler> = wrapped;
                self.core.inner.unregister_transaction_event_handler(&wrapped)
            }
            // never registered through this overlay: hand the raw handler on
            None => self.core.inner.unregister_transaction_event_handler(handler),
        }
    }

    fn register_kernel_event_handler(
        &self,
        handler: Arc<dyn KernelEventHandler>,
    ) -> GraphResult<()> {
        self.core.inner.register_kernel_event_handler(handler)
    }

    fn unregister_kernel_event_handler(
        &self,
        handler: &Arc<dyn KernelEventHandler>,
    ) -> GraphResult<()> {
        self.core.inner.unregister_kernel_event_handler(handler)
    }

    fn management(&self) -> Option<&dyn Management> {
        self.core.inner.management()
    }
}

impl PartialEq for OverlayDatabase {
    /// Equal iff this is the same overlay instance. Two different overlays
    /// around the same engine (say an audit layer and a metrics layer) are
    /// never equal.
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.core, &other.core)
    }
}

impl Eq for OverlayDatabase {}

impl std::fmt::Debug for OverlayDatabase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayDatabase").finish_non_exhaustive()
    }
}

/// Decorated index manager: wraps produced indexes, unwraps index handles
/// passed into configuration calls
pub struct OverlayIndexManager {
    db: Arc<Core>,
    node_auto: Arc<OverlayNodeAutoIndexer>,
    relationship_auto: Arc<OverlayRelationshipAutoIndexer>,
}

impl OverlayIndexManager {
    fn new(db: Arc<Core>) -> Self {
        let engine = db.inner.index();
        Self {
            node_auto: Arc::new(OverlayNodeAutoIndexer {
                db: db.clone(),
                inner: engine.node_auto_indexer(),
            }),
            relationship_auto: Arc::new(OverlayRelationshipAutoIndexer {
                db: db.clone(),
                inner: engine.relationship_auto_indexer(),
            }),
            db,
        }
    }
}

impl IndexManager for OverlayIndexManager {
    fn node_index_names(&self) -> Vec<String> {
        self.db.inner.index().node_index_names()
    }

    fn relationship_index_names(&self) -> Vec<String> {
        self.db.inner.index().relationship_index_names()
    }

    fn exists_for_nodes(&self, name: &str) -> bool {
        self.db.inner.index().exists_for_nodes(name)
    }

    fn exists_for_relationships(&self, name: &str) -> bool {
        self.db.inner.index().exists_for_relationships(name)
    }

    fn for_nodes(&self, name: &str) -> GraphResult<Arc<dyn Index<Arc<dyn Node>>>> {
        let index = self.db.inner.index().for_nodes(name)?;
        Ok(Arc::new(OverlayNodeIndex {
            db: self.db.clone(),
            inner: index,
        }))
    }

    fn for_nodes_with_config(
        &self,
        name: &str,
        config: &HashMap<String, String>,
    ) -> GraphResult<Arc<dyn Index<Arc<dyn Node>>>> {
        let index = self.db.inner.index().for_nodes_with_config(name, config)?;
        Ok(Arc::new(OverlayNodeIndex {
            db: self.db.clone(),
            inner: index,
        }))
    }

    fn for_relationships(&self, name: &str) -> GraphResult<Arc<dyn RelationshipIndex>> {
        let index = self.db.inner.index().for_relationships(name)?;
        Ok(Arc::new(OverlayRelationshipIndex {
            db: self.db.clone(),
            inner: index,
        }))
    }

    fn for_relationships_with_config(
        &self,
        name: &str,
        config: &HashMap<String, String>,
    ) -> GraphResult<Arc<dyn RelationshipIndex>> {
        let index = self
            .db
            .inner
            .index()
            .for_relationships_with_config(name, config)?;
        Ok(Arc::new(OverlayRelationshipIndex {
            db: self.db.clone(),
            inner: index,
        }))
    }

    fn get_configuration(&self, index: IndexRef<'_>) -> GraphResult<HashMap<String, String>> {
        self.db.inner.index().get_configuration(raw_index_ref(index))
    }

    fn set_configuration(
        &self,
        index: IndexRef<'_>,
        key: &str,
        value: &str,
    ) -> GraphResult<Option<String>> {
        self.db
            .inner
            .index()
            .set_configuration(raw_index_ref(index), key, value)
    }

    fn remove_configuration(&self, index: IndexRef<'_>, key: &str) -> GraphResult<Option<String>> {
        self.db
            .inner
            .index()
            .remove_configuration(raw_index_ref(index), key)
    }

    fn node_auto_indexer(&self) -> Arc<dyn NodeAutoIndexer> {
        self.node_auto.clone()
    }

    fn relationship_auto_indexer(&self) -> Arc<dyn RelationshipAutoIndexer> {
        self.relationship_auto.clone()
    }
}
