use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::state::{CanvasState, NODE_PADDING, ROW_HEIGHT, edge_curve};
use crate::graph::{GraphEdge, GraphNode, NODE_HEIGHT, Point};

const BACKGROUND: &str = "#1a1a2e";
const NODE_FILL: &str = "#16213e";
const KEY_COLOR: &str = "#9aa5b1";
const VALUE_COLOR: &str = "#e0e0e0";
const MATCH_COLOR: &str = "#ffd166";
const FONT: &str = "12px sans-serif";
const LABEL_FONT: &str = "bold 12px sans-serif";

const HOVER_EDGE_COLOR: &str = "#ffffff";

/// Measure every node with the canvas font and store the sizes.
pub fn measure(state: &mut CanvasState, ctx: &CanvasRenderingContext2d) {
	// label and rows share one metric, bold text gets the padding slack
	ctx.set_font(FONT);
	state.measure(|text| {
		ctx.measure_text(text)
			.map(|metrics| metrics.width())
			.unwrap_or(text.chars().count() as f64 * 7.0)
	});
}

pub fn render(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	if state.graph.is_none() {
		return;
	}
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, ctx);
	draw_nodes(state, ctx);
	ctx.restore();
}

fn draw_edges(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let Some(graph) = &state.graph else {
		return;
	};
	let k = state.transform.k;
	let direction = graph.direction();

	for edge in graph.ordered_edges() {
		let Some((from, to)) = state.edge_anchors(edge) else {
			continue;
		};
		let hovered = state.hover_edge.as_deref() == Some(edge.id.as_str());
		let (alpha, width) = if state.is_highlighted(edge) {
			(1.0, 2.5 / k)
		} else {
			(0.6, 1.5 / k)
		};
		let color = if hovered { HOVER_EDGE_COLOR } else { edge.data.color.as_str() };

		ctx.set_global_alpha(alpha);
		ctx.set_stroke_style_str(color);
		ctx.set_line_width(width);
		let dash = if edge.is_reference {
			js_sys::Array::of2(&JsValue::from_f64(6.0 / k), &JsValue::from_f64(4.0 / k))
		} else {
			js_sys::Array::new()
		};
		let _ = ctx.set_line_dash(&dash);

		let arrow = 7.0 / k;
		let (c1, c2, tip_dir) = edge_curve(from, to, direction);
		let end = Point::new(to.x - tip_dir.0 * arrow, to.y - tip_dir.1 * arrow);
		ctx.begin_path();
		ctx.move_to(from.x, from.y);
		ctx.bezier_curve_to(c1.x, c1.y, c2.x, c2.y, end.x, end.y);
		ctx.stroke();

		let _ = ctx.set_line_dash(&js_sys::Array::new());
		ctx.set_fill_style_str(color);
		let (px, py) = (-tip_dir.1 * arrow * 0.5, tip_dir.0 * arrow * 0.5);
		ctx.begin_path();
		ctx.move_to(to.x, to.y);
		ctx.line_to(end.x + px, end.y + py);
		ctx.line_to(end.x - px, end.y - py);
		ctx.close_path();
		ctx.fill();

		if state.is_highlighted(edge) {
			draw_edge_label(edge, from, to, k, ctx);
		}
	}
	ctx.set_global_alpha(1.0);
}

fn draw_edge_label(edge: &GraphEdge, from: Point, to: Point, k: f64, ctx: &CanvasRenderingContext2d) {
	let (mx, my) = ((from.x + to.x) / 2.0, (from.y + to.y) / 2.0);
	ctx.set_font(&format!("{}px sans-serif", 11.0 / k.max(0.5)));
	ctx.set_text_align("center");
	ctx.set_text_baseline("bottom");
	ctx.set_fill_style_str(VALUE_COLOR);
	let _ = ctx.fill_text(&edge.label, mx, my - 4.0 / k);
	ctx.set_text_align("left");
}

fn draw_nodes(state: &CanvasState, ctx: &CanvasRenderingContext2d) {
	let Some(graph) = &state.graph else {
		return;
	};
	let current = graph.search_index().current().map(|hit| hit.node_id.as_str());

	for (idx, node) in graph.nodes().iter().enumerate() {
		let is_match = current == Some(node.id.as_str());
		draw_node(node, state.hover == Some(idx), is_match, state.transform.k, ctx);
	}
}

fn draw_node(
	node: &GraphNode,
	hovered: bool,
	is_match: bool,
	k: f64,
	ctx: &CanvasRenderingContext2d,
) {
	let size = CanvasState::node_size(node);
	let (x, y) = (node.position.x, node.position.y);

	if is_match {
		ctx.set_stroke_style_str(MATCH_COLOR);
		ctx.set_line_width(4.0 / k);
		ctx.stroke_rect(x - 4.0, y - 4.0, size.width + 8.0, size.height + 8.0);
	}

	ctx.set_fill_style_str(NODE_FILL);
	ctx.fill_rect(x, y, size.width, size.height);

	ctx.set_global_alpha(if node.selected || hovered { 1.0 } else { 0.85 });
	ctx.set_fill_style_str(&node.style.color);
	ctx.fill_rect(x, y, size.width, NODE_HEIGHT);
	ctx.set_global_alpha(1.0);

	ctx.set_stroke_style_str(if node.selected { "white" } else { node.style.color.as_str() });
	ctx.set_line_width(if node.selected { 2.0 / k } else { 1.0 / k });
	ctx.stroke_rect(x, y, size.width, size.height);

	ctx.set_text_baseline("middle");
	ctx.set_font(LABEL_FONT);
	ctx.set_fill_style_str("white");
	let _ = ctx.fill_text(&node.label, x + NODE_PADDING, y + NODE_HEIGHT / 2.0);

	ctx.set_font(FONT);
	let mut row_y = y + NODE_HEIGHT + ROW_HEIGHT / 2.0;
	for (key, entry) in node.data.iter() {
		let rows = entry.display_rows();
		if rows.is_empty() {
			ctx.set_fill_style_str(KEY_COLOR);
			let _ = ctx.fill_text(key, x + NODE_PADDING, row_y);
			row_y += ROW_HEIGHT;
			continue;
		}
		for (i, row) in rows.into_iter().enumerate() {
			if i == 0 {
				ctx.set_fill_style_str(KEY_COLOR);
				let _ = ctx.fill_text(key, x + NODE_PADDING, row_y);
			}
			ctx.set_fill_style_str(VALUE_COLOR);
			ctx.set_text_align("right");
			let _ = ctx.fill_text(row, x + size.width - NODE_PADDING, row_y);
			ctx.set_text_align("left");
			row_y += ROW_HEIGHT;
		}
	}
}
