use log::{debug, error};
use serde_json::Value;

use super::collision::{CollisionOptions, CollisionReport, resolve_collisions};
use super::compiler::compile;
use super::layout::{LayoutDirection, layout};
use super::order::order_ast;
use super::search::{NavDirection, SearchIndex, SearchMatch, SearchOutcome};
use super::types::{GraphEdge, GraphNode, Size};
use crate::error::GraphError;
use crate::schema::{SchemaAst, SchemaFormat, compile_schema, parse_schema};

/// A compiled, laid-out schema graph and its search index.
///
/// Construction runs ordering, compilation and layout. Collision resolution is
/// the second phase: it runs once, after the view has measured every node.
/// A new schema builds a new `SchemaGraph`, so resolution state never leaks
/// between schemas.
#[derive(Debug)]
pub struct SchemaGraph {
	nodes: Vec<GraphNode>,
	edges: Vec<GraphEdge>,
	diagnostics: Vec<GraphError>,
	direction: LayoutDirection,
	search: SearchIndex,
	collision_resolved: bool,
	schema: Option<Value>,
}

impl SchemaGraph {
	/// Order, compile and lay out `ast`.
	pub fn build(ast: &SchemaAst, direction: LayoutDirection) -> Result<Self, GraphError> {
		let ordered = order_ast(ast);
		let compiled = compile(&ordered)?;
		let mut nodes = compiled.nodes;
		layout(&mut nodes, &compiled.edges, direction);
		let search = SearchIndex::new(&nodes);

		Ok(Self {
			nodes,
			edges: compiled.edges,
			diagnostics: compiled.diagnostics,
			direction,
			search,
			collision_resolved: false,
			schema: None,
		})
	}

	/// Parse `text` and build its graph. The parsed document is kept for
	/// subschema lookups.
	pub fn from_text(
		text: &str,
		format: SchemaFormat,
		base_uri: &str,
		direction: LayoutDirection,
	) -> Result<Self, GraphError> {
		let schema = parse_schema(text, format)?;
		let ast = compile_schema(&schema, base_uri)?;
		debug!("parsed {format} schema into {} subschemas", ast.len());
		let mut graph = Self::build(&ast, direction)?;
		graph.schema = Some(schema);
		Ok(graph)
	}

	/// Nodes in emission order.
	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	/// Edges in emission order.
	pub fn edges(&self) -> &[GraphEdge] {
		&self.edges
	}

	/// Subtrees the compiler skipped.
	pub fn diagnostics(&self) -> &[GraphError] {
		&self.diagnostics
	}

	/// Direction of the current layout.
	pub fn direction(&self) -> LayoutDirection {
		self.direction
	}

	/// Source document, when built from text.
	pub fn schema(&self) -> Option<&Value> {
		self.schema.as_ref()
	}

	/// Node with `id`.
	pub fn node(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.iter().find(|node| node.id == id)
	}

	/// Lay the graph out again in `direction`. Collision resolution has to
	/// run again afterwards.
	pub fn relayout(&mut self, direction: LayoutDirection) {
		self.direction = direction;
		layout(&mut self.nodes, &self.edges, direction);
		self.collision_resolved = false;
		self.search.reindex(&self.nodes);
	}

	/// Record the rendered size of a node. Returns `false` for unknown ids.
	pub fn set_measured(&mut self, id: &str, size: Size) -> bool {
		match self.nodes.iter_mut().find(|node| node.id == id) {
			Some(node) => {
				node.measured = Some(size);
				true
			}
			None => false,
		}
	}

	/// Whether every node has a positive measured size.
	pub fn all_measured(&self) -> bool {
		self.nodes
			.iter()
			.all(|node| node.measured.is_some_and(|size| size.is_positive()))
	}

	/// Whether the current layout went through collision resolution.
	pub fn collision_resolved(&self) -> bool {
		self.collision_resolved
	}

	/// Resolve collisions if every node is measured and this layout has not
	/// been resolved yet.
	pub fn try_resolve(&mut self, options: &CollisionOptions) -> Option<CollisionReport> {
		if self.collision_resolved || !self.all_measured() {
			return None;
		}
		let options = CollisionOptions {
			direction: self.direction,
			..*options
		};
		match resolve_collisions(&mut self.nodes, &options) {
			Ok(report) => {
				self.collision_resolved = true;
				self.search.reindex(&self.nodes);
				Some(report)
			}
			Err(err) => {
				error!("{err}");
				None
			}
		}
	}

	/// Run a label search, see [`SearchIndex::search`].
	pub fn search(&mut self, query: &str) -> SearchOutcome {
		self.search.search(query)
	}

	/// Move the search cursor.
	pub fn navigate(&mut self, direction: NavDirection) -> Option<&SearchMatch> {
		self.search.navigate(direction)
	}

	/// The search index over the current positions.
	pub fn search_index(&self) -> &SearchIndex {
		&self.search
	}

	/// Select a node and every edge touching it, clearing the previous
	/// selection. `None` clears only.
	pub fn select(&mut self, id: Option<&str>) {
		for node in &mut self.nodes {
			node.selected = Some(node.id.as_str()) == id;
		}
		for edge in &mut self.edges {
			edge.selected = id.is_some_and(|id| edge.source == id || edge.target == id);
		}
	}

	/// The selected node.
	pub fn selected(&self) -> Option<&GraphNode> {
		self.nodes.iter().find(|node| node.selected)
	}

	/// Edges in paint order: selected edges last so they draw on top.
	pub fn ordered_edges(&self) -> impl Iterator<Item = &GraphEdge> {
		let (selected, unselected): (Vec<_>, Vec<_>) =
			self.edges.iter().partition(|edge| edge.selected);
		unselected.into_iter().chain(selected)
	}
}
