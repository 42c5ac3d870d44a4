//! Schema AST to node/edge compilation.
//!
//! The compiler walks the (ordered) AST depth first from the root subschema
//! and emits one [`GraphNode`] per subschema and one [`GraphEdge`] per
//! traversed relation. A subschema that was already emitted, either because
//! a `$ref` loops back to an ancestor or because two places reference the
//! same definition, only receives a new edge.

use std::collections::HashMap;

use log::{debug, warn};
use serde_json::Value;

use super::style::SchemaKind;
use super::types::{
	EdgeData, GraphEdge, GraphNode, Handle, HandlePosition, NodeData, NodeDataEntry, NodeStyle,
	Point,
};
use crate::error::GraphError;
use crate::schema::pointer::{escape_token, last_token, split_uri};
use crate::schema::{AstNode, KeywordValue, SchemaAst};

/// Label of the document root node.
pub const ROOT_LABEL: &str = "root";
/// Data key of the single row of a `true`/`false` schema node.
pub const BOOLEAN_SCHEMA_KEY: &str = "booleanSchema";

/// Values longer than this are shown shortened on the node.
const MAX_INLINE_CHARS: usize = 48;

/// Output of [`compile`].
#[derive(Debug, Default)]
pub struct CompiledGraph {
	/// Nodes in emission order, root first.
	pub nodes: Vec<GraphNode>,
	/// Edges in emission order.
	pub edges: Vec<GraphEdge>,
	/// Subtrees that could not be compiled. The rest of the graph is intact.
	pub diagnostics: Vec<GraphError>,
}

/// Append-only accumulator for nodes and edges.
#[derive(Debug, Default)]
pub struct GraphBuilder {
	nodes: Vec<GraphNode>,
	edges: Vec<GraphEdge>,
	index: HashMap<String, usize>,
	diagnostics: Vec<GraphError>,
}

impl GraphBuilder {
	/// Append `node` and return its index.
	pub fn add_node(&mut self, node: GraphNode) -> usize {
		let idx = self.nodes.len();
		self.index.insert(node.id.clone(), idx);
		self.nodes.push(node);
		idx
	}

	/// Index of the node with `id`.
	pub fn index_of(&self, id: &str) -> Option<usize> {
		self.index.get(id).copied()
	}

	/// Node at `idx`. Panics when out of range.
	pub fn node(&self, idx: usize) -> &GraphNode {
		&self.nodes[idx]
	}

	/// Add an edge from `source` to `target` through the source handle named
	/// after `relation`.
	pub fn connect(&mut self, source: usize, target: usize, relation: &Relation) {
		let source_node = &self.nodes[source];
		let handle_id = format!("{}-{}", source_node.id, relation.key);
		let color = source_node.style.color.clone();
		let source_id = source_node.id.clone();

		let target_node = &self.nodes[target];
		let target_id = target_node.id.clone();
		let target_handle = target_node
			.target_handles
			.first()
			.map(|h| h.handle_id.clone());

		self.nodes[source].source_handles.push(Handle {
			handle_id: handle_id.clone(),
			position: HandlePosition::Right,
			row: relation.row,
		});
		self.edges.push(GraphEdge {
			id: GraphEdge::edge_id(&source_id, &target_id, &handle_id),
			source: source_id,
			target: target_id,
			source_handle: handle_id,
			target_handle,
			label: relation.label.clone(),
			is_reference: relation.is_reference,
			data: EdgeData { color },
			selected: false,
		});
	}

	/// Record a skipped subtree.
	pub fn report(&mut self, error: GraphError) {
		warn!("{error}");
		self.diagnostics.push(error);
	}

	/// Hand over everything accumulated.
	pub fn finish(self) -> CompiledGraph {
		CompiledGraph {
			nodes: self.nodes,
			edges: self.edges,
			diagnostics: self.diagnostics,
		}
	}
}

/// One parent-to-child relation found while expanding a node.
#[derive(Clone, Debug)]
pub struct Relation {
	/// Pointer suffix relative to the parent; unique per parent.
	pub key: String,
	/// Edge label and default node label.
	pub label: String,
	/// Data row the source handle lines up with.
	pub row: Option<usize>,
	/// Whether the relation is a `$ref`.
	pub is_reference: bool,
}

/// Compile an ordered AST into nodes and edges.
///
/// Fails only when the root subschema is missing. Dangling child URIs are
/// recorded in [`CompiledGraph::diagnostics`] and their subtree is skipped.
pub fn compile(ast: &SchemaAst) -> Result<CompiledGraph, GraphError> {
	let lookup: HashMap<&str, &AstNode> = ast
		.nodes
		.iter()
		.map(|(uri, node)| (uri.as_str(), node))
		.collect();
	let root = lookup
		.get(ast.root_uri.as_str())
		.copied()
		.ok_or_else(|| GraphError::MalformedAst {
			location: ast.root_uri.clone(),
			reason: "root subschema is missing".into(),
		})?;

	let mut compiler = Compiler {
		lookup,
		ast,
		builder: GraphBuilder::default(),
	};
	let root_pointer = ast.document_pointer(&ast.root_uri).unwrap_or_default().to_string();
	let root_node = compiler.new_node(
		ast.root_uri.clone(),
		root_pointer,
		ROOT_LABEL.into(),
		0,
		root,
		false,
	);
	let root_idx = compiler.builder.add_node(root_node);
	compiler.expand(root_idx, root);

	let graph = compiler.builder.finish();
	debug!(
		"compiled {} nodes, {} edges ({} diagnostics)",
		graph.nodes.len(),
		graph.edges.len(),
		graph.diagnostics.len()
	);
	Ok(graph)
}

struct Compiler<'a> {
	lookup: HashMap<&'a str, &'a AstNode>,
	ast: &'a SchemaAst,
	builder: GraphBuilder,
}

impl<'a> Compiler<'a> {
	fn expand(&mut self, idx: usize, node: &'a AstNode) {
		let AstNode::Keywords(entries) = node else {
			return;
		};
		for entry in entries {
			let keyword = entry.keyword.as_str();
			let key = escape_token(keyword);
			match &entry.value {
				KeywordValue::Literal(_) => {}
				KeywordValue::Subschema(uri) => {
					let relation = self.relation(idx, key, keyword.into(), keyword, None, false);
					self.visit(idx, uri, relation);
				}
				KeywordValue::Reference(uri) => {
					let relation = self.relation(idx, key, keyword.into(), keyword, None, true);
					self.visit(idx, uri, relation);
				}
				KeywordValue::SubschemaList(uris) => {
					for (i, uri) in uris.iter().enumerate() {
						let item = list_row(i);
						let relation = self.relation(
							idx,
							format!("{key}/{i}"),
							format!("{keyword}[{i}]"),
							keyword,
							Some(item.as_str()),
							false,
						);
						self.visit(idx, uri, relation);
					}
				}
				KeywordValue::SubschemaMap(members) => {
					for (name, uri) in members {
						let relation = self.relation(
							idx,
							format!("{key}/{}", escape_token(name)),
							name.clone(),
							keyword,
							Some(name.as_str()),
							false,
						);
						self.visit(idx, uri, relation);
					}
				}
			}
		}
	}

	fn relation(
		&self,
		parent: usize,
		key: String,
		label: String,
		keyword: &str,
		item: Option<&str>,
		is_reference: bool,
	) -> Relation {
		Relation {
			row: self.builder.node(parent).data.row_index(keyword, item),
			key,
			label,
			is_reference,
		}
	}

	fn visit(&mut self, parent: usize, uri: &str, relation: Relation) {
		let parent_node = self.builder.node(parent);
		let id = node_id(uri, &parent_node.id, &relation.key);
		let depth = parent_node.depth + 1;

		if let Some(existing) = self.builder.index_of(&id) {
			self.builder.connect(parent, existing, &relation);
			return;
		}

		let Some(node) = self.lookup.get(uri).copied() else {
			let error = GraphError::MalformedAst {
				location: uri.to_string(),
				reason: format!(
					"'{}' of {} points at a subschema that is not in the AST",
					relation.label, parent_node.id
				),
			};
			self.builder.report(error);
			return;
		};

		let label = if relation.is_reference {
			last_token(uri).unwrap_or_else(|| ROOT_LABEL.into())
		} else {
			relation.label.clone()
		};
		let pointer = match self.ast.document_pointer(uri) {
			Some(pointer) => pointer.to_string(),
			None => format!("{}/{}", parent_node.pointer, relation.key),
		};
		let child_node = self.new_node(id, pointer, label, depth, node, true);
		let child = self.builder.add_node(child_node);
		self.builder.connect(parent, child, &relation);
		self.expand(child, node);
	}

	fn new_node(
		&self,
		id: String,
		pointer: String,
		label: String,
		depth: usize,
		ast: &AstNode,
		has_parent: bool,
	) -> GraphNode {
		let kind = SchemaKind::classify(ast);
		let target_handles = if has_parent {
			vec![Handle {
				handle_id: format!("{id}-target"),
				position: HandlePosition::Left,
				row: None,
			}]
		} else {
			Vec::new()
		};

		GraphNode {
			data: self.node_data(ast),
			is_boolean_node: matches!(ast, AstNode::Boolean(_)),
			style: NodeStyle {
				color: kind.color().into(),
			},
			kind,
			id,
			pointer,
			label,
			depth,
			position: Point::default(),
			target_handles,
			source_handles: Vec::new(),
			measured: None,
			selected: false,
		}
	}

	fn node_data(&self, ast: &AstNode) -> NodeData {
		let mut data = NodeData::default();
		let entries = match ast {
			AstNode::Boolean(b) => {
				data.push(BOOLEAN_SCHEMA_KEY, NodeDataEntry::one(b.to_string()));
				return data;
			}
			AstNode::Keywords(entries) => entries,
		};

		for entry in entries {
			let row = match &entry.value {
				KeywordValue::Literal(value) => literal_entry(value),
				KeywordValue::Subschema(uri) => {
					NodeDataEntry::one(uri.clone()).with_ellipsis(Some(self.summary(uri)))
				}
				KeywordValue::Reference(uri) => {
					NodeDataEntry::one(uri.clone()).with_ellipsis(Some(short_uri(uri)))
				}
				KeywordValue::SubschemaList(uris) => {
					NodeDataEntry::many((0..uris.len()).map(list_row).collect())
				}
				KeywordValue::SubschemaMap(members) => {
					NodeDataEntry::many(members.iter().map(|(name, _)| name.clone()).collect())
				}
			};
			data.push(entry.keyword.clone(), row);
		}
		data
	}

	fn summary(&self, uri: &str) -> String {
		match self.lookup.get(uri) {
			Some(AstNode::Boolean(b)) => b.to_string(),
			Some(AstNode::Keywords(entries)) if entries.is_empty() => "{}".into(),
			Some(AstNode::Keywords(_)) => "{…}".into(),
			None => "?".into(),
		}
	}
}

/// Node id of a subschema: its URI when that carries a fragment, otherwise a
/// path derived from the parent so inline subschemas stay unique.
fn node_id(uri: &str, parent_id: &str, key: &str) -> String {
	match split_uri(uri) {
		(_, Some(_)) => uri.to_string(),
		(_, None) => format!("{parent_id}/{key}"),
	}
}

fn list_row(i: usize) -> String {
	format!("[{i}]")
}

fn literal_entry(value: &Value) -> NodeDataEntry {
	match value {
		Value::Array(items) => NodeDataEntry::many(items.iter().map(render_scalar).collect()),
		other => {
			let text = render_scalar(other);
			let short = shorten(&text);
			NodeDataEntry::one(text).with_ellipsis(short)
		}
	}
}

fn render_scalar(value: &Value) -> String {
	match value {
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}

fn shorten(text: &str) -> Option<String> {
	if text.chars().count() <= MAX_INLINE_CHARS {
		return None;
	}
	let head: String = text.chars().take(MAX_INLINE_CHARS - 1).collect();
	Some(format!("{head}…"))
}

/// Fragment of a same-document URI (`#/$defs/a`), shortened if needed.
fn short_uri(uri: &str) -> String {
	let text = match split_uri(uri) {
		(_, Some(fragment)) => format!("#{fragment}"),
		(base, None) => base.to_string(),
	};
	shorten(&text).unwrap_or(text)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::types::NodeValue;
	use crate::graph::order::order_ast;
	use crate::schema::compile_schema;
	use pretty_assertions::assert_eq;
	use serde_json::json;

	fn compile_value(schema: Value) -> CompiledGraph {
		let ast = compile_schema(&schema, "https://x/s").unwrap();
		compile(&order_ast(&ast)).unwrap()
	}

	fn edge_pairs(graph: &CompiledGraph) -> Vec<(String, String)> {
		graph
			.edges
			.iter()
			.map(|e| (e.source.clone(), e.target.clone()))
			.collect()
	}

	#[test]
	fn object_with_array_property() {
		let graph = compile_value(json!({
			"type": "object",
			"properties": {
				"id": { "type": "string" },
				"tags": { "type": "array", "items": { "type": "string" } }
			}
		}));

		let summary: Vec<_> = graph
			.nodes
			.iter()
			.map(|n| (n.label.as_str(), n.depth))
			.collect();
		assert_eq!(summary, [("root", 0), ("id", 1), ("tags", 1), ("items", 2)]);
		assert_eq!(
			edge_pairs(&graph),
			[
				("https://x/s#".into(), "https://x/s#/properties/id".into()),
				("https://x/s#".into(), "https://x/s#/properties/tags".into()),
				(
					"https://x/s#/properties/tags".into(),
					"https://x/s#/properties/tags/items".into()
				),
			]
		);

		let root = &graph.nodes[0];
		assert!(root.target_handles.is_empty());
		assert_eq!(
			root.data.get("properties").map(|e| &e.value),
			Some(&NodeValue::Many(vec!["id".into(), "tags".into()]))
		);
		let handles: Vec<_> = root.source_handles.iter().map(|h| h.handle_id.as_str()).collect();
		assert_eq!(
			handles,
			["https://x/s#-properties/id", "https://x/s#-properties/tags"]
		);
		// "type" occupies row 0, property names rows 1 and 2
		let rows: Vec<_> = root.source_handles.iter().map(|h| h.row).collect();
		assert_eq!(rows, [Some(1), Some(2)]);
		assert_eq!(root.kind, SchemaKind::Object);
		assert_eq!(graph.edges[0].data.color, root.style.color);
	}

	#[test]
	fn boolean_schema_is_a_single_payload_node() {
		let graph = compile_value(json!(true));
		assert_eq!(graph.nodes.len(), 1);
		assert!(graph.edges.is_empty());
		let node = &graph.nodes[0];
		assert!(node.is_boolean_node);
		assert_eq!(node.data.len(), 1);
		assert_eq!(
			node.data.get(BOOLEAN_SCHEMA_KEY),
			Some(&NodeDataEntry::one("true"))
		);
	}

	#[test]
	fn self_reference_draws_an_edge_back_to_the_ancestor() {
		let graph = compile_value(json!({
			"type": "object",
			"properties": { "child": { "$ref": "#" } }
		}));
		assert_eq!(graph.nodes.len(), 2);
		assert_eq!(
			edge_pairs(&graph),
			[
				("https://x/s#".into(), "https://x/s#/properties/child".into()),
				("https://x/s#/properties/child".into(), "https://x/s#".into()),
			]
		);
		let back = &graph.edges[1];
		assert!(back.is_reference);
		assert_eq!(back.label, "$ref");
		// the root has no target handle
		assert_eq!(back.target_handle, None);
	}

	#[test]
	fn shared_definitions_are_emitted_once() {
		let graph = compile_value(json!({
			"properties": {
				"a": { "$ref": "#/$defs/name" },
				"b": { "$ref": "#/$defs/name" }
			},
			"$defs": { "name": { "type": "string" } }
		}));
		let defs: Vec<_> = graph
			.nodes
			.iter()
			.filter(|n| n.id == "https://x/s#/$defs/name")
			.collect();
		assert_eq!(defs.len(), 1);
		// first reached through `a`, labelled after its own pointer
		assert_eq!(defs[0].label, "name");
		assert_eq!(defs[0].depth, 2);
		let into_def = graph
			.edges
			.iter()
			.filter(|e| e.target == "https://x/s#/$defs/name")
			.count();
		assert_eq!(into_def, 3);
	}

	#[test]
	fn combinator_branches_are_indexed() {
		let graph = compile_value(json!({ "anyOf": [ { "type": "string" }, false ] }));
		let labels: Vec<_> = graph.edges.iter().map(|e| e.label.as_str()).collect();
		assert_eq!(labels, ["anyOf[0]", "anyOf[1]"]);
		assert_eq!(graph.nodes[0].kind, SchemaKind::Combinator);
		assert!(graph.nodes[2].is_boolean_node);
		assert_eq!(
			graph.nodes[0].data.get("anyOf").map(|e| &e.value),
			Some(&NodeValue::Many(vec!["[0]".into(), "[1]".into()]))
		);
	}

	#[test]
	fn literal_rows_keep_order_and_shape() {
		let long = "x".repeat(80);
		let graph = compile_value(json!({
			"description": long,
			"enum": ["a", 1, null],
			"minLength": 2,
			"type": "string"
		}));
		let node = &graph.nodes[0];
		let keys: Vec<_> = node.data.keys().collect();
		assert_eq!(keys, ["enum", "type", "minLength", "description"]);
		assert_eq!(
			node.data.get("enum").map(|e| &e.value),
			Some(&NodeValue::Many(vec!["a".into(), "1".into(), "null".into()]))
		);
		assert_eq!(node.data.get("minLength"), Some(&NodeDataEntry::one("2")));
		let description = node.data.get("description").unwrap();
		assert_eq!(description.value, NodeValue::One(long.clone()));
		let short = description.ellipsis.as_deref().unwrap();
		assert!(short.ends_with('…'));
		assert_eq!(short.chars().count(), MAX_INLINE_CHARS);
	}

	#[test]
	fn dangling_children_produce_a_partial_graph() {
		let mut ast = compile_schema(
			&json!({ "properties": { "ok": {}, "gone": {} } }),
			"https://x/s",
		)
		.unwrap();
		ast.nodes.retain(|(uri, _)| !uri.ends_with("/gone"));

		let graph = compile(&ast).unwrap();
		assert_eq!(graph.nodes.len(), 2);
		assert_eq!(graph.edges.len(), 1);
		assert_eq!(graph.diagnostics.len(), 1);
		assert!(matches!(
			&graph.diagnostics[0],
			GraphError::MalformedAst { location, .. } if location == "https://x/s#/properties/gone"
		));
	}

	#[test]
	fn missing_root_is_an_error() {
		let ast = SchemaAst {
			root_uri: "https://x/s#".into(),
			nodes: Vec::new(),
			document_pointers: Default::default(),
		};
		assert!(matches!(compile(&ast), Err(GraphError::MalformedAst { .. })));
	}

	#[test]
	fn uris_without_fragment_fall_back_to_parent_paths() {
		let ast = SchemaAst {
			root_uri: "https://x/s#".into(),
			nodes: vec![
				(
					"https://x/s#".into(),
					AstNode::Keywords(vec![crate::schema::KeywordEntry {
						keyword: "not".into(),
						location: "https://x/s#/not".into(),
						value: KeywordValue::Subschema("inline".into()),
					}]),
				),
				("inline".into(), AstNode::Boolean(false)),
			],
			document_pointers: Default::default(),
		};
		let graph = compile(&ast).unwrap();
		assert_eq!(graph.nodes[1].id, "https://x/s#/not");
		assert_eq!(graph.nodes[1].pointer, "/not");
		assert_eq!(graph.edges[0].target, "https://x/s#/not");
	}

	#[test]
	fn nodes_carry_their_pointer_from_the_document_root() {
		let graph = compile_value(json!({
			"properties": {
				"inner": { "$id": "https://example.com/inner.json", "items": { "$ref": "#" } }
			}
		}));
		let pointers: Vec<_> = graph
			.nodes
			.iter()
			.map(|n| (n.id.as_str(), n.pointer.as_str()))
			.collect();
		assert_eq!(
			pointers,
			[
				("https://x/s#", ""),
				("https://example.com/inner.json#", "/properties/inner"),
				("https://example.com/inner.json#/items", "/properties/inner/items"),
			]
		);
	}
}
