//! Layered layout backed by `dugong`, a port of dagre.
//!
//! The engine knows nothing about schema nodes: vertices are indices with an
//! extent along the rank axis and across it. Ranking, crossing reduction and
//! coordinate assignment all happen inside `dugong`; this module only builds
//! its input graph and reads back the vertex centres.

use dugong::graphlib::{Graph, GraphOptions};
use dugong::{EdgeLabel, GraphLabel, NodeLabel, RankDir};

/// Extent of a vertex. `rank` runs along the layer axis, `cross` within a layer.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Extent {
	/// Size along the rank axis.
	pub rank: f64,
	/// Size within a layer.
	pub cross: f64,
}

/// Input of a layered layout: vertex extents and directed edges by index.
#[derive(Clone, Debug, Default)]
pub struct LayoutGraph {
	/// One extent per vertex.
	pub vertices: Vec<Extent>,
	/// `(source, target)` pairs. Out-of-range indices are ignored.
	pub edges: Vec<(usize, usize)>,
}

/// Centre of a vertex as placed by a layered layout.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LayeredPosition {
	/// Centre along the rank axis.
	pub along: f64,
	/// Centre within the layer.
	pub across: f64,
}

/// Layered graph layout, one position per input vertex.
pub trait LayeredLayout {
	/// Place every vertex of `graph`, in input order.
	fn place(&self, graph: &LayoutGraph) -> Vec<LayeredPosition>;
}

/// Spacing handed to dagre.
#[derive(Clone, Debug, PartialEq)]
pub struct DagreLayout {
	/// Gap between consecutive layers.
	pub rank_sep: f64,
	/// Gap between neighbours within a layer.
	pub node_sep: f64,
}

impl Default for DagreLayout {
	fn default() -> Self {
		Self {
			rank_sep: 50.0,
			node_sep: 50.0,
		}
	}
}

fn vertex_key(v: usize) -> String {
	format!("v{v}")
}

impl LayeredLayout for DagreLayout {
	fn place(&self, graph: &LayoutGraph) -> Vec<LayeredPosition> {
		let n = graph.vertices.len();
		if n == 0 {
			return Vec::new();
		}

		let mut g: Graph<NodeLabel, EdgeLabel, GraphLabel> = Graph::new(GraphOptions {
			multigraph: true,
			compound: false,
			directed: true,
		});
		// ranks grow downwards, so `y` is the rank axis and `x` the cross axis
		g.set_graph(GraphLabel {
			rankdir: RankDir::TB,
			nodesep: self.node_sep,
			ranksep: self.rank_sep,
			..Default::default()
		});
		for (v, extent) in graph.vertices.iter().enumerate() {
			g.set_node(
				vertex_key(v),
				NodeLabel {
					width: extent.cross,
					height: extent.rank,
					..Default::default()
				},
			);
		}
		for (i, &(u, v)) in graph.edges.iter().enumerate() {
			if u >= n || v >= n {
				continue;
			}
			let label = EdgeLabel {
				minlen: 1,
				weight: 1.0,
				..Default::default()
			};
			g.set_edge_named(vertex_key(u), vertex_key(v), Some(format!("e{i}")), Some(label));
		}

		dugong::layout_dagreish(&mut g);

		(0..n)
			.map(|v| {
				let placed = g.node(&vertex_key(v));
				LayeredPosition {
					along: placed.and_then(|label| label.y).unwrap_or_default(),
					across: placed.and_then(|label| label.x).unwrap_or_default(),
				}
			})
			.collect()
	}
}
