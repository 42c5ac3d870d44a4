//! Overlap removal on measured node boxes.
//!
//! Runs after the presentation layer has measured every node. Nodes only move
//! along the cross axis of the layout, so depth bands stay aligned.

use log::debug;
use serde::{Deserialize, Serialize};

use super::layout::LayoutDirection;
use super::types::{GraphNode, Size};
use crate::error::GraphError;

/// Tunables of [`resolve_collisions`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionOptions {
	/// Upper bound on relaxation sweeps.
	pub max_iterations: usize,
	/// Overlap in pixels tolerated on each axis.
	pub overlap_threshold: f64,
	/// Space kept between boxes, split evenly around each box.
	pub margin: f64,
	/// Layout the nodes came from; picks the axis nodes move along.
	pub direction: LayoutDirection,
}

impl Default for CollisionOptions {
	fn default() -> Self {
		Self {
			max_iterations: 500,
			overlap_threshold: 0.5,
			margin: 20.0,
			direction: LayoutDirection::default(),
		}
	}
}

/// Outcome of one collision pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollisionReport {
	/// Sweeps that moved at least one node.
	pub iterations: usize,
	/// `false` when `max_iterations` ran out with overlaps left.
	pub converged: bool,
}

/// Axis-aligned box expanded by half the margin on every side.
#[derive(Clone, Copy, Debug)]
struct Bounds {
	min: (f64, f64),
	max: (f64, f64),
}

impl Bounds {
	fn of(node: &GraphNode, size: Size, margin: f64) -> Self {
		let pad = margin / 2.0;
		Self {
			min: (node.position.x - pad, node.position.y - pad),
			max: (
				node.position.x + size.width + pad,
				node.position.y + size.height + pad,
			),
		}
	}

	fn overlap(&self, other: &Self) -> (f64, f64) {
		(
			self.max.0.min(other.max.0) - self.min.0.max(other.min.0),
			self.max.1.min(other.max.1) - self.min.1.max(other.min.1),
		)
	}

	fn center(&self) -> (f64, f64) {
		((self.min.0 + self.max.0) / 2.0, (self.min.1 + self.max.1) / 2.0)
	}
}

/// Push overlapping nodes apart until no pair overlaps by more than the
/// threshold on both axes, or `max_iterations` sweeps have run.
///
/// Every node must carry a positive measured size.
pub fn resolve_collisions(
	nodes: &mut [GraphNode],
	options: &CollisionOptions,
) -> Result<CollisionReport, GraphError> {
	let sizes = nodes
		.iter()
		.map(|node| {
			node.measured
				.filter(Size::is_positive)
				.ok_or_else(|| GraphError::LayoutPrecondition {
					node: node.id.clone(),
				})
		})
		.collect::<Result<Vec<_>, _>>()?;

	for iteration in 0..options.max_iterations {
		if !sweep(nodes, &sizes, options) {
			debug!("collisions resolved after {iteration} iterations");
			return Ok(CollisionReport {
				iterations: iteration,
				converged: true,
			});
		}
	}

	let converged = !has_overlap(nodes, &sizes, options);
	if !converged {
		debug!(
			"collision resolution stopped at {} iterations with overlaps left",
			options.max_iterations
		);
	}
	Ok(CollisionReport {
		iterations: options.max_iterations,
		converged,
	})
}

fn overlaps_beyond(overlap: (f64, f64), threshold: f64) -> bool {
	overlap.0 > threshold && overlap.1 > threshold
}

/// One pass over all pairs. Returns whether anything moved.
fn sweep(nodes: &mut [GraphNode], sizes: &[Size], options: &CollisionOptions) -> bool {
	let mut moved = false;
	for i in 0..nodes.len() {
		for j in i + 1..nodes.len() {
			let a = Bounds::of(&nodes[i], sizes[i], options.margin);
			let b = Bounds::of(&nodes[j], sizes[j], options.margin);
			let overlap = a.overlap(&b);
			if !overlaps_beyond(overlap, options.overlap_threshold) {
				continue;
			}

			let (a_center, b_center, depth) = match options.direction {
				LayoutDirection::LeftToRight => (a.center().1, b.center().1, overlap.1),
				LayoutDirection::TopToBottom => (a.center().0, b.center().0, overlap.0),
			};
			// the node nearer the origin moves back, ties go by compile order
			let shift = if a_center <= b_center {
				depth / 2.0
			} else {
				-depth / 2.0
			};
			match options.direction {
				LayoutDirection::LeftToRight => {
					nodes[i].position.y -= shift;
					nodes[j].position.y += shift;
				}
				LayoutDirection::TopToBottom => {
					nodes[i].position.x -= shift;
					nodes[j].position.x += shift;
				}
			}
			moved = true;
		}
	}
	moved
}

fn has_overlap(nodes: &[GraphNode], sizes: &[Size], options: &CollisionOptions) -> bool {
	(0..nodes.len()).any(|i| {
		(i + 1..nodes.len()).any(|j| {
			let a = Bounds::of(&nodes[i], sizes[i], options.margin);
			let b = Bounds::of(&nodes[j], sizes[j], options.margin);
			overlaps_beyond(a.overlap(&b), options.overlap_threshold)
		})
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::style::SchemaKind;
	use crate::graph::types::{NodeData, NodeStyle, Point};

	fn node(id: &str, x: f64, y: f64, measured: Option<Size>) -> GraphNode {
		GraphNode {
			id: id.to_string(),
			pointer: String::new(),
			depth: 0,
			position: Point::new(x, y),
			label: id.to_string(),
			data: NodeData::default(),
			style: NodeStyle {
				color: SchemaKind::Unknown.color().to_string(),
			},
			kind: SchemaKind::Unknown,
			is_boolean_node: false,
			target_handles: Vec::new(),
			source_handles: Vec::new(),
			measured,
			selected: false,
		}
	}

	fn boxed(id: &str, x: f64, y: f64) -> GraphNode {
		node(id, x, y, Some(Size::new(200.0, 60.0)))
	}

	fn assert_no_overlap(nodes: &[GraphNode], options: &CollisionOptions) {
		let sizes: Vec<_> = nodes.iter().map(|n| n.measured.unwrap()).collect();
		assert!(!has_overlap(nodes, &sizes, options));
	}

	#[test]
	fn unmeasured_node_is_a_precondition_error() {
		let mut nodes = vec![boxed("a", 0.0, 0.0), node("b", 0.0, 10.0, None)];
		let err = resolve_collisions(&mut nodes, &CollisionOptions::default()).unwrap_err();
		assert!(matches!(err, GraphError::LayoutPrecondition { node } if node == "b"));

		let mut nodes = vec![node("c", 0.0, 0.0, Some(Size::new(0.0, 20.0)))];
		assert!(resolve_collisions(&mut nodes, &CollisionOptions::default()).is_err());
	}

	#[test]
	fn overlapping_pair_separates_vertically() {
		let options = CollisionOptions::default();
		let mut nodes = vec![boxed("a", 0.0, 0.0), boxed("b", 0.0, 30.0)];
		let report = resolve_collisions(&mut nodes, &options).unwrap();

		assert!(report.converged);
		assert_eq!(report.iterations, 1);
		assert_eq!(nodes[0].position.x, 0.0);
		assert_eq!(nodes[1].position.x, 0.0);
		assert!(nodes[0].position.y < nodes[1].position.y);
		// 60px boxes plus the 20px margin
		assert!(nodes[1].position.y - nodes[0].position.y >= 80.0 - options.overlap_threshold);
	}

	#[test]
	fn stacked_nodes_spread_out_and_keep_their_band() {
		let options = CollisionOptions::default();
		let mut nodes: Vec<_> = (0..5).map(|i| boxed(&format!("n{i}"), 322.0, 0.0)).collect();
		let report = resolve_collisions(&mut nodes, &options).unwrap();

		assert!(report.converged);
		assert!(nodes.iter().all(|n| n.position.x == 322.0));
		assert_no_overlap(&nodes, &options);
	}

	#[test]
	fn resolved_layout_needs_no_iterations() {
		let options = CollisionOptions::default();
		let mut nodes = vec![boxed("a", 0.0, 0.0), boxed("b", 0.0, 0.0), boxed("c", 0.0, 10.0)];
		resolve_collisions(&mut nodes, &options).unwrap();
		let settled = nodes.clone();

		let report = resolve_collisions(&mut nodes, &options).unwrap();
		assert_eq!(
			report,
			CollisionReport {
				iterations: 0,
				converged: true
			}
		);
		assert_eq!(nodes, settled);
	}

	#[test]
	fn top_to_bottom_moves_along_x() {
		let options = CollisionOptions {
			direction: LayoutDirection::TopToBottom,
			..CollisionOptions::default()
		};
		let mut nodes = vec![boxed("a", 0.0, 116.0), boxed("b", 50.0, 116.0)];
		resolve_collisions(&mut nodes, &options).unwrap();

		assert!(nodes.iter().all(|n| n.position.y == 116.0));
		assert!(nodes[1].position.x - nodes[0].position.x >= 220.0 - options.overlap_threshold);
	}

	#[test]
	fn separate_boxes_stay_put() {
		let mut nodes = vec![boxed("a", 0.0, 0.0), boxed("b", 400.0, 0.0), boxed("c", 0.0, 200.0)];
		let before = nodes.clone();
		let report = resolve_collisions(&mut nodes, &CollisionOptions::default()).unwrap();
		assert_eq!(report.iterations, 0);
		assert_eq!(nodes, before);
	}

	#[test]
	fn iteration_budget_bounds_the_work() {
		let options = CollisionOptions {
			max_iterations: 0,
			..CollisionOptions::default()
		};
		let mut nodes = vec![boxed("a", 0.0, 0.0), boxed("b", 0.0, 0.0)];
		let report = resolve_collisions(&mut nodes, &options).unwrap();
		assert_eq!(
			report,
			CollisionReport {
				iterations: 0,
				converged: false
			}
		);
	}
}
