//! Transparent decoration layer for graph databases
//!
//! A caller substitutes an [`OverlayDatabase`] for the real engine handle;
//! every entity obtained through it — nodes, relationships, indexes,
//! index-hit cursors, transactions, event handlers — is itself a decorated
//! instance, while behaving identically to the engine against the shared
//! [`api::GraphDatabase`] contract. Cross-cutting behavior (auditing, access
//! control, metrics, transaction vetoes) attaches through [`Hooks`] without
//! touching the engine.
//!
//! The discipline the layer maintains:
//! - everything flowing out of the decorated API is wrapped, lazily for
//!   sequences and cursors, and wrapping is idempotent in effect (unwrap
//!   recovers the original raw handle at any wrap depth)
//! - everything flowing into the engine is unwrapped first
//! - lifecycle hooks bracket the engine's own operations so neither side is
//!   skipped when the other fails

pub mod api;
pub mod error;
pub mod overlay;

// Re-export main types
pub use error::{GraphError, GraphResult};
pub use overlay::entity::{raw_node, raw_relationship, unwrap_node, unwrap_relationship};
pub use overlay::{
    Hooks, OverlayDatabase, OverlayNode, OverlayRelationship, OverlayTransaction, TransactionVeto,
};
