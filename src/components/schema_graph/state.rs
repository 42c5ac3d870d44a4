use std::collections::HashMap;

use crate::graph::{
	CollisionOptions, CollisionReport, GraphEdge, GraphNode, LayoutDirection, NODE_HEIGHT,
	NODE_WIDTH, NavDirection, Point, SchemaGraph, SearchMatch, Size, nominal_size,
};

/// Height of one data row under the node header.
pub const ROW_HEIGHT: f64 = 20.0;
/// Inner horizontal padding of a node box.
pub const NODE_PADDING: f64 = 10.0;
/// Space between a row key and its value.
pub const KEY_GAP: f64 = 16.0;

const CAMERA_SECONDS: f64 = 0.45;
const FIT_MARGIN: f64 = 48.0;
/// Screen distance within which the pointer hovers an edge.
const EDGE_HIT_PX: f64 = 6.0;
const EDGE_SAMPLES: usize = 24;

/// Requests from the panels around the canvas, applied to the canvas state.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphCommand {
	Search(String),
	Navigate(NavDirection),
	Focus(String),
	ClearSelection,
}

/// Search position shown next to the search box.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MatchStatus {
	pub current: Option<usize>,
	pub count: usize,
}

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Eased camera move towards a translation.
#[derive(Clone, Debug)]
pub struct CameraTween {
	from: (f64, f64),
	to: (f64, f64),
	t: f64,
}

pub fn ease_out_cubic(t: f64) -> f64 {
	1.0 - (1.0 - t).powi(3)
}

/// Control points of an edge curve and the unit direction it arrives in.
pub fn edge_curve(from: Point, to: Point, direction: LayoutDirection) -> (Point, Point, (f64, f64)) {
	match direction {
		LayoutDirection::LeftToRight => {
			let bend = ((to.x - from.x).abs() / 2.0).max(40.0);
			(
				Point::new(from.x + bend, from.y),
				Point::new(to.x - bend, to.y),
				(1.0, 0.0),
			)
		}
		LayoutDirection::TopToBottom => {
			let bend = ((to.y - from.y).abs() / 2.0).max(30.0);
			(
				Point::new(from.x, from.y + bend),
				Point::new(to.x, to.y - bend),
				(0.0, 1.0),
			)
		}
	}
}

fn bezier_at(p0: Point, p1: Point, p2: Point, p3: Point, t: f64) -> Point {
	let u = 1.0 - t;
	let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
	Point::new(
		a * p0.x + b * p1.x + c * p2.x + d * p3.x,
		a * p0.y + b * p1.y + c * p2.y + d * p3.y,
	)
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
	let (dx, dy) = (b.x - a.x, b.y - a.y);
	let len2 = dx * dx + dy * dy;
	let t = if len2 > 0.0 {
		(((p.x - a.x) * dx + (p.y - a.y) * dy) / len2).clamp(0.0, 1.0)
	} else {
		0.0
	};
	((p.x - a.x - t * dx).powi(2) + (p.y - a.y - t * dy).powi(2)).sqrt()
}

/// Box of `node` once drawn: header plus one row per displayed value.
///
/// `text_width` measures a string in the canvas font.
pub fn node_box(node: &GraphNode, text_width: impl Fn(&str) -> f64) -> Size {
	let mut width = text_width(&node.label) + 2.0 * NODE_PADDING;
	for (key, entry) in node.data.iter() {
		for (i, row) in entry.display_rows().into_iter().enumerate() {
			let key_width = if i == 0 { text_width(key) } else { 0.0 };
			width = width.max(key_width + KEY_GAP + text_width(row) + 2.0 * NODE_PADDING);
		}
	}
	let rows = node.data.row_count() as f64;
	Size::new(
		width.max(NODE_WIDTH).ceil(),
		NODE_HEIGHT + rows * ROW_HEIGHT + if rows > 0.0 { NODE_PADDING / 2.0 } else { 0.0 },
	)
}

pub struct CanvasState {
	pub graph: Option<SchemaGraph>,
	pub transform: ViewTransform,
	pub pan: PanState,
	pub camera: Option<CameraTween>,
	pub hover: Option<usize>,
	/// Id of the edge under the pointer while no node is.
	pub hover_edge: Option<String>,
	pub width: f64,
	pub height: f64,
	index: HashMap<String, usize>,
}

impl CanvasState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			graph: None,
			transform: ViewTransform { x: 0.0, y: 0.0, k: 1.0 },
			pan: PanState::default(),
			camera: None,
			hover: None,
			hover_edge: None,
			width,
			height,
			index: HashMap::new(),
		}
	}

	/// Replace the displayed graph and bring its root into view.
	pub fn set_graph(&mut self, graph: SchemaGraph) {
		self.index = graph
			.nodes()
			.iter()
			.enumerate()
			.map(|(i, node)| (node.id.clone(), i))
			.collect();
		self.graph = Some(graph);
		self.hover = None;
		self.hover_edge = None;
		self.camera = None;
		self.fit_root();
	}

	pub fn relayout(&mut self, direction: LayoutDirection) {
		if let Some(graph) = &mut self.graph {
			graph.relayout(direction);
			self.fit_root();
		}
	}

	pub fn fit_root(&mut self) {
		let Some(graph) = &self.graph else {
			return;
		};
		let Some(root) = graph.nodes().first() else {
			return;
		};
		let (origin, center, direction) = (root.position, self.node_center(root), graph.direction());
		self.transform.k = 1.0;
		match direction {
			LayoutDirection::LeftToRight => {
				self.transform.x = FIT_MARGIN - origin.x;
				self.transform.y = self.height / 2.0 - center.y;
			}
			LayoutDirection::TopToBottom => {
				self.transform.x = self.width / 2.0 - center.x;
				self.transform.y = FIT_MARGIN - origin.y;
			}
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	pub fn node_by_id(&self, id: &str) -> Option<&GraphNode> {
		let graph = self.graph.as_ref()?;
		self.index.get(id).and_then(|&i| graph.nodes().get(i))
	}

	pub fn node_size(node: &GraphNode) -> Size {
		node.size_or(nominal_size())
	}

	pub fn node_center(&self, node: &GraphNode) -> Point {
		let size = Self::node_size(node);
		Point::new(
			node.position.x + size.width / 2.0,
			node.position.y + size.height / 2.0,
		)
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under a screen position.
	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let graph = self.graph.as_ref()?;
		let (gx, gy) = self.screen_to_graph(sx, sy);
		graph.nodes().iter().rposition(|node| {
			let size = Self::node_size(node);
			gx >= node.position.x
				&& gx <= node.position.x + size.width
				&& gy >= node.position.y
				&& gy <= node.position.y + size.height
		})
	}

	/// Closest edge curve within a few screen pixels of a position.
	pub fn edge_at_position(&self, sx: f64, sy: f64) -> Option<String> {
		let graph = self.graph.as_ref()?;
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let pointer = Point::new(gx, gy);
		let tolerance = EDGE_HIT_PX / self.transform.k;

		let mut best: Option<(f64, &GraphEdge)> = None;
		for edge in graph.edges() {
			let Some((from, to)) = self.edge_anchors(edge) else {
				continue;
			};
			let (c1, c2, _) = edge_curve(from, to, graph.direction());
			let mut previous = from;
			let mut distance = f64::INFINITY;
			for i in 1..=EDGE_SAMPLES {
				let next = bezier_at(from, c1, c2, to, i as f64 / EDGE_SAMPLES as f64);
				distance = distance.min(segment_distance(pointer, previous, next));
				previous = next;
			}
			if distance <= tolerance && best.is_none_or(|(d, _)| distance < d) {
				best = Some((distance, edge));
			}
		}
		best.map(|(_, edge)| edge.id.clone())
	}

	/// Hover state for a pointer position: a node wins over an edge.
	pub fn hover_at(&mut self, sx: f64, sy: f64) {
		self.hover = self.node_at_position(sx, sy);
		self.hover_edge = match self.hover {
			Some(_) => None,
			None => self.edge_at_position(sx, sy),
		};
	}

	/// Whether `edge` is drawn emphasised.
	pub fn is_highlighted(&self, edge: &GraphEdge) -> bool {
		edge.selected || self.hover_edge.as_deref() == Some(edge.id.as_str())
	}

	/// Ease the camera so `point` ends up in the middle of the canvas.
	pub fn center_on(&mut self, point: Point) {
		self.camera = Some(CameraTween {
			from: (self.transform.x, self.transform.y),
			to: (
				self.width / 2.0 - point.x * self.transform.k,
				self.height / 2.0 - point.y * self.transform.k,
			),
			t: 0.0,
		});
	}

	pub fn tick(&mut self, dt: f64) {
		let Some(tween) = &mut self.camera else {
			return;
		};
		tween.t = (tween.t + dt / CAMERA_SECONDS).min(1.0);
		let e = ease_out_cubic(tween.t);
		self.transform.x = tween.from.0 + (tween.to.0 - tween.from.0) * e;
		self.transform.y = tween.from.1 + (tween.to.1 - tween.from.1) * e;
		if tween.t >= 1.0 {
			self.camera = None;
		}
	}

	/// Whether some node still lacks a rendered size.
	pub fn needs_measure(&self) -> bool {
		self.graph.as_ref().is_some_and(|g| !g.all_measured())
	}

	/// Record rendered sizes for every node.
	pub fn measure(&mut self, text_width: impl Fn(&str) -> f64) {
		let Some(graph) = &mut self.graph else {
			return;
		};
		let sizes: Vec<(String, Size)> = graph
			.nodes()
			.iter()
			.map(|node| (node.id.clone(), node_box(node, &text_width)))
			.collect();
		for (id, size) in sizes {
			graph.set_measured(&id, size);
		}
	}

	/// Second layout phase, once per layout.
	pub fn resolve(&mut self) -> Option<CollisionReport> {
		self.graph.as_mut()?.try_resolve(&CollisionOptions::default())
	}

	/// Select a node and centre the camera on it.
	pub fn focus(&mut self, id: &str) -> bool {
		let Some(center) = self.node_by_id(id).map(|node| self.node_center(node)) else {
			return false;
		};
		if let Some(graph) = &mut self.graph {
			graph.select(Some(id));
		}
		self.center_on(center);
		true
	}

	pub fn clear_selection(&mut self) {
		if let Some(graph) = &mut self.graph {
			graph.select(None);
		}
	}

	/// Select and centre on a search match.
	pub fn follow_match(&mut self, hit: SearchMatch) {
		if let Some(graph) = &mut self.graph {
			graph.select(Some(&hit.node_id));
		}
		self.center_on(hit.center);
	}

	pub fn match_status(&self) -> MatchStatus {
		self.graph
			.as_ref()
			.map(|g| MatchStatus {
				current: g.search_index().current_index(),
				count: g.search_index().match_count(),
			})
			.unwrap_or_default()
	}

	/// Start and end points of an edge: the source row handle and the target
	/// header.
	pub fn edge_anchors(&self, edge: &GraphEdge) -> Option<(Point, Point)> {
		let source = self.node_by_id(&edge.source)?;
		let target = self.node_by_id(&edge.target)?;
		let (s, t) = (Self::node_size(source), Self::node_size(target));
		let row = source
			.source_handles
			.iter()
			.find(|h| h.handle_id == edge.source_handle)
			.and_then(|h| h.row);
		let direction = self.graph.as_ref().map(SchemaGraph::direction).unwrap_or_default();

		Some(match direction {
			LayoutDirection::LeftToRight => {
				let sy = match row {
					Some(row) => NODE_HEIGHT + row as f64 * ROW_HEIGHT + ROW_HEIGHT / 2.0,
					None => NODE_HEIGHT / 2.0,
				};
				(
					Point::new(source.position.x + s.width, source.position.y + sy),
					Point::new(target.position.x, target.position.y + NODE_HEIGHT / 2.0),
				)
			}
			LayoutDirection::TopToBottom => (
				Point::new(source.position.x + s.width / 2.0, source.position.y + s.height),
				Point::new(target.position.x + t.width / 2.0, target.position.y),
			),
		})
	}
}
