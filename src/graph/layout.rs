use std::collections::HashMap;

use log::debug;
use serde::{Deserialize, Serialize};

use super::dagre::{DagreLayout, Extent, LayeredLayout, LayoutGraph};
use super::types::{GraphEdge, GraphNode, HandlePosition, Point, Size};

/// Nominal node width used for layout.
pub const NODE_WIDTH: f64 = 172.0;
/// Nominal node height, also the header height.
pub const NODE_HEIGHT: f64 = 36.0;
/// Gap between depth bands in left-to-right layouts.
pub const HORIZONTAL_GAP: f64 = 150.0;
/// Gap between depth bands in top-to-bottom layouts.
pub const VERTICAL_GAP: f64 = 80.0;

/// Axis that depth grows along.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LayoutDirection {
	/// Depth grows to the right.
	#[default]
	LeftToRight,
	/// Depth grows downwards.
	TopToBottom,
}

impl LayoutDirection {
	/// Sides that target and source handles attach to.
	pub fn handle_sides(self) -> (HandlePosition, HandlePosition) {
		match self {
			LayoutDirection::LeftToRight => (HandlePosition::Left, HandlePosition::Right),
			LayoutDirection::TopToBottom => (HandlePosition::Top, HandlePosition::Bottom),
		}
	}

	/// Coordinate shared by every node of `depth`.
	pub fn band(self, depth: usize) -> f64 {
		match self {
			LayoutDirection::LeftToRight => depth as f64 * (NODE_WIDTH + HORIZONTAL_GAP),
			LayoutDirection::TopToBottom => depth as f64 * (NODE_HEIGHT + VERTICAL_GAP),
		}
	}

	/// The other direction.
	pub fn toggled(self) -> Self {
		match self {
			LayoutDirection::LeftToRight => LayoutDirection::TopToBottom,
			LayoutDirection::TopToBottom => LayoutDirection::LeftToRight,
		}
	}
}

/// Size every node is laid out at before measurement.
pub const fn nominal_size() -> Size {
	Size::new(NODE_WIDTH, NODE_HEIGHT)
}

/// Position nodes with the default [`DagreLayout`] engine.
pub fn layout(nodes: &mut [GraphNode], edges: &[GraphEdge], direction: LayoutDirection) {
	layout_with(&DagreLayout::default(), nodes, edges, direction);
}

/// Position nodes with `engine`, then band them by depth.
///
/// The engine only decides the order and spacing within a band. The band
/// coordinate is a pure function of `depth`, so subtrees that the engine puts
/// on a shared layer still line up with their own depth.
pub fn layout_with(
	engine: &impl LayeredLayout,
	nodes: &mut [GraphNode],
	edges: &[GraphEdge],
	direction: LayoutDirection,
) {
	let index: HashMap<&str, usize> = nodes
		.iter()
		.enumerate()
		.map(|(i, node)| (node.id.as_str(), i))
		.collect();

	let extent = match direction {
		LayoutDirection::LeftToRight => Extent {
			rank: NODE_WIDTH,
			cross: NODE_HEIGHT,
		},
		LayoutDirection::TopToBottom => Extent {
			rank: NODE_HEIGHT,
			cross: NODE_WIDTH,
		},
	};
	let graph = LayoutGraph {
		vertices: vec![extent; nodes.len()],
		edges: edges
			.iter()
			.filter_map(|edge| Some((*index.get(edge.source.as_str())?, *index.get(edge.target.as_str())?)))
			.collect(),
	};
	let placed = engine.place(&graph);

	let (target_side, source_side) = direction.handle_sides();
	for (node, at) in nodes.iter_mut().zip(&placed) {
		let band = direction.band(node.depth);
		node.position = match direction {
			LayoutDirection::LeftToRight => Point::new(band, at.across - NODE_HEIGHT / 2.0),
			LayoutDirection::TopToBottom => Point::new(at.across - NODE_WIDTH / 2.0, band),
		};
		for handle in &mut node.target_handles {
			handle.position = target_side;
		}
		for handle in &mut node.source_handles {
			handle.position = source_side;
		}
	}

	debug!(
		"laid out {} nodes and {} edges ({direction:?})",
		nodes.len(),
		graph.edges.len()
	);
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::compiler::compile;
	use crate::graph::order::order_ast;
	use crate::schema::compile_schema;
	use serde_json::{Value, json};

	fn compiled(schema: Value) -> (Vec<GraphNode>, Vec<GraphEdge>) {
		let ast = compile_schema(&schema, "https://x/s").unwrap();
		let graph = compile(&order_ast(&ast)).unwrap();
		(graph.nodes, graph.edges)
	}

	fn sample() -> Value {
		json!({
			"type": "object",
			"properties": {
				"id": { "type": "integer" },
				"tags": { "type": "array", "items": { "type": "string" } },
				"owner": { "$ref": "#/$defs/person" }
			},
			"$defs": {
				"person": {
					"properties": { "name": { "type": "string" }, "manager": { "$ref": "#/$defs/person" } }
				}
			}
		})
	}

	#[test]
	fn nodes_of_one_depth_share_a_band() {
		let (mut nodes, edges) = compiled(sample());
		layout(&mut nodes, &edges, LayoutDirection::LeftToRight);

		let mut bands: HashMap<usize, f64> = HashMap::new();
		for node in &nodes {
			let x = *bands.entry(node.depth).or_insert(node.position.x);
			assert_eq!(x, node.position.x, "{} is off its band", node.id);
		}
		let mut depths: Vec<_> = bands.into_iter().collect();
		depths.sort_by_key(|(depth, _)| *depth);
		assert!(depths.windows(2).all(|w| w[0].1 < w[1].1));
		assert_eq!(depths[0].1, 0.0);
		assert_eq!(depths[1].1, NODE_WIDTH + HORIZONTAL_GAP);
	}

	#[test]
	fn siblings_do_not_overlap_at_nominal_size() {
		let (mut nodes, edges) = compiled(json!({
			"properties": { "a": true, "b": true, "c": true, "d": true }
		}));
		layout(&mut nodes, &edges, LayoutDirection::LeftToRight);

		let mut ys: Vec<f64> = nodes
			.iter()
			.filter(|n| n.depth == 1)
			.map(|n| n.position.y)
			.collect();
		assert_eq!(ys.len(), 4);
		ys.sort_by(f64::total_cmp);
		assert!(ys.windows(2).all(|w| w[1] - w[0] >= NODE_HEIGHT));
	}

	#[test]
	fn top_to_bottom_bands_vertically_and_moves_handles() {
		let (mut nodes, edges) = compiled(sample());
		layout(&mut nodes, &edges, LayoutDirection::TopToBottom);

		for node in &nodes {
			assert_eq!(node.position.y, node.depth as f64 * (NODE_HEIGHT + VERTICAL_GAP));
			assert!(node.target_handles.iter().all(|h| h.position == HandlePosition::Top));
			assert!(node.source_handles.iter().all(|h| h.position == HandlePosition::Bottom));
		}
	}

	#[test]
	fn layout_is_deterministic() {
		let (mut first, edges) = compiled(sample());
		let mut second = first.clone();
		layout(&mut first, &edges, LayoutDirection::LeftToRight);
		layout(&mut second, &edges, LayoutDirection::LeftToRight);
		assert_eq!(first, second);
	}

	#[test]
	fn direction_defaults_and_toggles() {
		assert_eq!(LayoutDirection::default(), LayoutDirection::LeftToRight);
		assert_eq!(LayoutDirection::LeftToRight.toggled(), LayoutDirection::TopToBottom);
		assert_eq!(
			serde_json::to_string(&LayoutDirection::TopToBottom).unwrap(),
			"\"top-to-bottom\""
		);
	}

	#[test]
	fn empty_graph_is_a_no_op() {
		let mut nodes: Vec<GraphNode> = Vec::new();
		layout(&mut nodes, &[], LayoutDirection::LeftToRight);
		assert!(nodes.is_empty());
	}
}
