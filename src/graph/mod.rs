//! Schema AST to positioned node/edge graph.
//!
//! Data flows one way: [`order_ast`] → [`compile`] → [`layout`] →
//! [`resolve_collisions`], with [`SearchIndex`] reading the final node set.
//! [`SchemaGraph`] drives the whole sequence.

mod collision;
mod compiler;
pub mod dagre;
mod layout;
mod order;
mod pipeline;
mod search;
mod style;
mod types;

pub use collision::{CollisionOptions, CollisionReport, resolve_collisions};
pub use compiler::{BOOLEAN_SCHEMA_KEY, CompiledGraph, ROOT_LABEL, compile};
pub use layout::{
	HORIZONTAL_GAP, LayoutDirection, NODE_HEIGHT, NODE_WIDTH, VERTICAL_GAP, layout, layout_with,
	nominal_size,
};
pub use order::order_ast;
pub use pipeline::SchemaGraph;
pub use search::{FEEDBACK_DISMISS_MS, NavDirection, SearchIndex, SearchMatch, SearchOutcome};
pub use style::SchemaKind;
pub use types::{
	EdgeData, GraphEdge, GraphNode, Handle, HandlePosition, NodeData, NodeDataEntry, NodeStyle,
	NodeValue, Point, Size,
};
