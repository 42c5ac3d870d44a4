use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use log::{debug, error, warn};
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::render;
use super::state::{CanvasState, GraphCommand, MatchStatus};
use crate::components::breadcrumbs::Breadcrumbs;
use crate::components::node_details::NodeDetails;
use crate::components::search_bar::SearchBar;
use crate::graph::{FEEDBACK_DISMISS_MS, GraphNode, LayoutDirection, SchemaGraph};
use crate::schema::pointer::resolve_pointer;
use crate::schema::{DEFAULT_BASE_URI, SchemaFormat};

const FRAME_SECONDS: f64 = 0.016;
/// Pointer travel below which a press counts as a click.
const CLICK_SLOP: f64 = 3.0;

/// Reactive state shown by the panels around the canvas.
#[derive(Clone, Copy)]
struct Panels {
	selected: RwSignal<Option<GraphNode>>,
	subschema: RwSignal<Option<String>>,
	matches: RwSignal<MatchStatus>,
	feedback: RwSignal<Option<String>>,
	error: RwSignal<Option<String>>,
}

impl Panels {
	fn new() -> Self {
		Self {
			selected: RwSignal::new(None),
			subschema: RwSignal::new(None),
			matches: RwSignal::new(MatchStatus::default()),
			feedback: RwSignal::new(None),
			error: RwSignal::new(None),
		}
	}

	/// Copy selection and search position out of the canvas state.
	fn publish(self, state: &CanvasState) {
		let graph = state.graph.as_ref();
		let selected = graph.and_then(SchemaGraph::selected).cloned();
		let subschema = selected
			.as_ref()
			.and_then(|node| resolve_pointer(graph?.schema()?, &node.pointer))
			.and_then(|value| serde_json::to_string_pretty(value).ok());
		self.selected.set(selected);
		self.subschema.set(subschema);
		self.matches.set(state.match_status());
	}

	/// Show a transient notice, cleared after [`FEEDBACK_DISMISS_MS`] unless
	/// replaced in the meantime.
	fn notify(self, text: String) {
		let feedback = self.feedback;
		feedback.set(Some(text.clone()));
		let dismiss = Closure::once_into_js(move || {
			feedback.update(|current| {
				if current.as_deref() == Some(text.as_str()) {
					*current = None;
				}
			});
		});
		if let Some(window) = web_sys::window() {
			let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
				dismiss.unchecked_ref(),
				FEEDBACK_DISMISS_MS,
			);
		}
	}
}

fn apply(command: GraphCommand, state: &mut CanvasState, panels: Panels) {
	match command {
		GraphCommand::Search(query) => {
			let Some(graph) = state.graph.as_mut() else {
				return;
			};
			let outcome = graph.search(&query);
			debug!("search '{query}': {outcome:?}");
			if let Some(text) = outcome.feedback() {
				panels.notify(text);
			}
			let hit = graph.search_index().current().cloned();
			if let Some(hit) = hit {
				state.follow_match(hit);
			}
		}
		GraphCommand::Navigate(direction) => {
			let hit = state
				.graph
				.as_mut()
				.and_then(|graph| graph.navigate(direction).cloned());
			if let Some(hit) = hit {
				state.follow_match(hit);
			}
		}
		GraphCommand::Focus(id) => {
			if !state.focus(&id) {
				warn!("no node with id {id}");
			}
		}
		GraphCommand::ClearSelection => state.clear_selection(),
	}
	panels.publish(state);
}

fn canvas_size(canvas: &HtmlCanvasElement, window: &Window) -> (f64, f64) {
	canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or_else(|| {
			(
				window.inner_width().ok().and_then(|w| w.as_f64()).unwrap_or(800.0),
				window.inner_height().ok().and_then(|h| h.as_f64()).unwrap_or(600.0),
			)
		})
}

/// Interactive view of a schema: canvas, search bar, breadcrumbs and the
/// details panel of the selected node.
///
/// The graph is rebuilt whenever `schema` or `format` changes. A schema that
/// fails to parse leaves the previous graph on screen and shows the error.
#[component]
pub fn SchemaGraphView(
	#[prop(into)] schema: Signal<String>,
	#[prop(into)] format: Signal<SchemaFormat>,
	#[prop(into)] direction: Signal<LayoutDirection>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let state: Rc<RefCell<CanvasState>> = Rc::new(RefCell::new(CanvasState::new(800.0, 600.0)));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let commands = RwSignal::new(None::<GraphCommand>);
	let panels = Panels::new();

	let (state_init, animate_init, resize_cb_init) =
		(state.clone(), animate.clone(), resize_cb.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let (w, h) = canvas_size(&canvas, &window);
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|ctx| ctx.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			error!("2d canvas context unavailable");
			return;
		};
		{
			let mut s = state_init.borrow_mut();
			s.resize(w, h);
			s.fit_root();
		}

		let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
		*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
			let Some(win) = web_sys::window() else {
				return;
			};
			let (nw, nh) = canvas_size(&canvas_resize, &win);
			canvas_resize.set_width(nw as u32);
			canvas_resize.set_height(nh as u32);
			state_resize.borrow_mut().resize(nw, nh);
		}));
		if let Some(ref cb) = *resize_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (state_anim, animate_inner) = (state_init.clone(), animate_init.clone());
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			{
				let mut s = state_anim.borrow_mut();
				s.tick(FRAME_SECONDS);
				// measure on one frame, resolve collisions on the next
				if s.needs_measure() {
					render::measure(&mut s, &ctx);
				} else if let Some(report) = s.resolve() {
					debug!(
						"collision pass: {} iterations, converged: {}",
						report.iterations, report.converged
					);
				}
				render::render(&s, &ctx);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				if let Some(win) = web_sys::window() {
					let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
				}
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_build = state.clone();
	Effect::new(move |_| {
		let (text, format) = (schema.get(), format.get());
		match SchemaGraph::from_text(&text, format, DEFAULT_BASE_URI, direction.get_untracked()) {
			Ok(graph) => {
				let skipped = graph.diagnostics().len();
				panels.error.set((skipped > 0).then(|| {
					format!("{skipped} subschema(s) could not be drawn, see the console")
				}));
				let mut s = state_build.borrow_mut();
				s.set_graph(graph);
				panels.publish(&s);
			}
			Err(err) => {
				error!("schema rejected: {err}");
				panels.error.set(Some(err.to_string()));
			}
		}
	});

	let state_dir = state.clone();
	Effect::new(move |previous: Option<LayoutDirection>| {
		let current = direction.get();
		if previous.is_some_and(|p| p != current) {
			state_dir.borrow_mut().relayout(current);
		}
		current
	});

	let state_cmd = state.clone();
	Effect::new(move |_| {
		if let Some(command) = commands.get() {
			apply(command, &mut state_cmd.borrow_mut(), panels);
		}
	});

	let pointer = move |ev: &MouseEvent| -> Option<(f64, f64)> {
		let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
		let rect = canvas.get_bounding_client_rect();
		Some((
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		))
	};

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		let mut s = state_md.borrow_mut();
		s.camera = None;
		s.pan.active = true;
		s.pan.moved = false;
		s.pan.start_x = x;
		s.pan.start_y = y;
		s.pan.transform_start_x = s.transform.x;
		s.pan.transform_start_y = s.transform.y;
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		let mut s = state_mm.borrow_mut();
		if !s.pan.active {
			s.hover_at(x, y);
			return;
		}
		let (dx, dy) = (x - s.pan.start_x, y - s.pan.start_y);
		if dx.abs() > CLICK_SLOP || dy.abs() > CLICK_SLOP {
			s.pan.moved = true;
		}
		if s.pan.moved {
			s.transform.x = s.pan.transform_start_x + dx;
			s.transform.y = s.pan.transform_start_y + dy;
		}
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let mut s = state_mu.borrow_mut();
		let clicked = s.pan.active && !s.pan.moved;
		s.pan.active = false;
		if !clicked {
			return;
		}
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		let id = s
			.node_at_position(x, y)
			.and_then(|idx| s.graph.as_ref()?.nodes().get(idx))
			.map(|node| node.id.clone());
		if let Some(graph) = s.graph.as_mut() {
			graph.select(id.as_deref());
		}
		panels.publish(&s);
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		let mut s = state_ml.borrow_mut();
		s.pan.active = false;
		s.hover = None;
		s.hover_edge = None;
	};

	let state_wh = state.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(&ev) else {
			return;
		};
		let mut s = state_wh.borrow_mut();
		s.camera = None;
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		let new_k = (s.transform.k * factor).clamp(0.1, 4.0);
		let ratio = new_k / s.transform.k;
		s.transform.x = x - (x - s.transform.x) * ratio;
		s.transform.y = y - (y - s.transform.y) * ratio;
		s.transform.k = new_k;
	};

	let selected_id =
		Signal::derive(move || panels.selected.with(|node| node.as_ref().map(|n| n.id.clone())));

	view! {
		<div class="schema-graph">
			<canvas
				node_ref=canvas_ref
				class="schema-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<SearchBar
				commands=commands.write_only()
				matches=panels.matches
				feedback=panels.feedback
			/>
			<Breadcrumbs selected=selected_id commands=commands.write_only() />
			<NodeDetails
				node=panels.selected
				subschema=panels.subschema
				commands=commands.write_only()
			/>
			{move || panels.error.get().map(|text| view! { <div class="schema-error">{text}</div> })}
		</div>
	}
}
