//! Leptos component wrapping the force-directed graph canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel event
//! handlers for node dragging, focusing, panning, and zooming, plus a sidebar
//! with search, relation filters, the weight display toggle and the pin list.
//! An animation loop runs via `requestAnimationFrame`, stepping the
//! simulation and redrawing each frame.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, Event, HtmlCanvasElement, HtmlInputElement, KeyboardEvent,
	MouseEvent, WheelEvent, Window,
};

use super::graph;
use super::render;
use super::scale::ScaleConfig;
use super::state::{DragState, ForceGraphState, NodeEntry, frame_seconds};
use super::theme::Theme;
use super::types::GraphData;

/// Pointer travel, in pixels, that turns a click into a drag.
const DRAG_THRESHOLD: f64 = 3.0;

/// Bundles graph simulation state with visual configuration.
struct GraphContext {
	state: ForceGraphState,
	scale: ScaleConfig,
	theme: Theme,
}

/// Reactive copies of the state the sidebar shows.
#[derive(Clone, Copy)]
struct Panels {
	nodes: RwSignal<Vec<NodeEntry>>,
	relations: RwSignal<Vec<(String, bool)>>,
	notice: RwSignal<Option<String>>,
	diagnostic: RwSignal<bool>,
}

impl Panels {
	fn sync(&self, state: &ForceGraphState) {
		self.nodes.set(state.node_list());
		self.relations.set(state.relation_toggles());
		self.notice.set(state.notice.clone());
	}
}

fn input_target(ev: &Event) -> Option<HtmlInputElement> {
	ev.target()?.dyn_into::<HtmlInputElement>().ok()
}

fn pointer(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

/// Renders an interactive, focus-weighted force-directed graph.
///
/// Pass graph data via the reactive `data` signal. The component sizes itself
/// to its parent container by default; set `fullscreen = true` to fill the
/// viewport and resize automatically with the window.
#[component]
pub fn ForceGraphCanvas(
	#[prop(into)] data: Signal<GraphData>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());

	let panels = Panels {
		nodes: RwSignal::new(Vec::new()),
		relations: RwSignal::new(Vec::new()),
		notice: RwSignal::new(None),
		diagnostic: RwSignal::new(false),
	};

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let viewport = |w: &Window| {
			(
				w.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(800.0),
				w.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(600.0),
			)
		};
		let (w, h) = if fullscreen {
			viewport(&window)
		} else {
			let parent = canvas.parent_element();
			(
				width.unwrap_or_else(|| parent.as_ref().map_or(800.0, |p| p.client_width() as f64)),
				height.unwrap_or_else(|| parent.as_ref().map_or(600.0, |p| p.client_height() as f64)),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::warn!("focus-graph: canvas has no 2d context");
			return;
		};

		let theme = Theme::default();
		let state = ForceGraphState::new(&data.get(), w, h, &theme);
		panels.sync(&state);
		*context_init.borrow_mut() = Some(GraphContext {
			state,
			scale: ScaleConfig::default(),
			theme,
		});

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = viewport(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.state.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		let mut last_frame: Option<f64> = None;
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let now = web_sys::window().and_then(|w| w.performance()).map(|p| p.now());
			let elapsed = now.map_or(0.0, |now| frame_seconds(last_frame.replace(now), now));
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				c.state.tick(elapsed);
				render::render(&c.state, &ctx, &c.scale, &c.theme);
			}
			if let (Some(cb), Some(win)) = (&*animate_inner.borrow(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};

		if let Some(ref mut c) = *context_md.borrow_mut() {
			if let Some(node) = c.state.node_at_position(x, y, &c.scale) {
				let (nx, ny) = c.state.position(node);
				c.state.drag = DragState {
					active: true,
					node: Some(node),
					start_x: x,
					start_y: y,
					node_start_x: nx,
					node_start_y: ny,
					moved: false,
				};
			} else {
				c.state.pan.active = true;
				c.state.pan.start_x = x;
				c.state.pan.start_y = y;
				c.state.pan.transform_start_x = c.state.transform.x;
				c.state.pan.transform_start_y = c.state.transform.y;
			}
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};

		if let Some(ref mut c) = *context_mm.borrow_mut() {
			if c.state.drag.active {
				let drag = &mut c.state.drag;
				let (dx, dy) = (x - drag.start_x, y - drag.start_y);
				if !drag.moved && dx.hypot(dy) < DRAG_THRESHOLD {
					return;
				}
				drag.moved = true;
				if let Some(node) = drag.node {
					let k = c.state.transform.k;
					let (nx, ny) = (drag.node_start_x + dx / k, drag.node_start_y + dy / k);
					c.state.drag_node_to(node, nx, ny);
				}
			} else if c.state.pan.active {
				c.state.transform.x = c.state.pan.transform_start_x + (x - c.state.pan.start_x);
				c.state.transform.y = c.state.pan.transform_start_y + (y - c.state.pan.start_y);
			}
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_mu.borrow_mut() {
			if let (true, Some(node)) = (c.state.drag.active, c.state.drag.node) {
				if c.state.drag.moved {
					c.state.release_drag(node);
				} else {
					c.state.focus_node(node);
					panels.sync(&c.state);
				}
			}
			c.state.drag = Default::default();
			c.state.pan.active = false;
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			if let Some(node) = c.state.drag.node {
				c.state.release_drag(node);
			}
			c.state.drag = Default::default();
			c.state.pan.active = false;
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = pointer(canvas_ref, &ev) else {
			return;
		};

		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (c.state.transform.k * factor).clamp(0.1, 10.0);
			let ratio = new_k / c.state.transform.k;
			c.state.transform.x = x - (x - c.state.transform.x) * ratio;
			c.state.transform.y = y - (y - c.state.transform.y) * ratio;
			c.state.transform.k = new_k;
		}
	};

	let context_search = context.clone();
	let on_search = move |ev: KeyboardEvent| {
		if ev.key() != "Enter" {
			return;
		}
		let query = event_target_value(&ev);
		if let Some(ref mut c) = *context_search.borrow_mut() {
			// A miss is reported through the notice; nothing else changes.
			let _ = c.state.search(&query);
			panels.sync(&c.state);
		}
	};

	let context_text = context.clone();
	let on_text_mode = move |_: Event| {
		if let Some(ref mut c) = *context_text.borrow_mut() {
			c.state.toggle_text_mode();
			panels.diagnostic.update(|d| *d = !*d);
		}
	};

	let context_filter = context.clone();
	let on_filter = move |ev: Event| {
		let Some(input) = input_target(&ev) else {
			return;
		};
		if let Some(ref mut c) = *context_filter.borrow_mut() {
			c.state.set_relation_enabled(&input.value(), input.checked());
			panels.sync(&c.state);
		}
	};

	let context_pin = context.clone();
	let on_pin = move |ev: Event| {
		let Some(input) = input_target(&ev) else {
			return;
		};
		let Ok(index) = input.value().parse::<usize>() else {
			return;
		};
		if let Some(ref mut c) = *context_pin.borrow_mut() {
			c.state.set_pinned(graph::NodeRef(index), input.checked());
			panels.sync(&c.state);
		}
	};

	view! {
		<div class="force-graph">
			<canvas
				node_ref=canvas_ref
				class="force-graph-canvas"
				on:mousedown=on_mousedown
				on:mousemove=on_mousemove
				on:mouseup=on_mouseup
				on:mouseleave=on_mouseleave
				on:wheel=on_wheel
				style="display: block; cursor: grab;"
			/>
			<aside class="graph-sidebar">
				<input type="search" placeholder="Focus node id, then Enter" on:keydown=on_search />
				<p class="graph-notice">{move || panels.notice.get()}</p>
				<label>
					<input type="checkbox" prop:checked=move || panels.diagnostic.get() on:change=on_text_mode />
					" Show weights"
				</label>
				<ul class="relation-filter" on:change=on_filter>
					{move || {
						panels
							.relations
							.get()
							.into_iter()
							.map(|(name, enabled)| {
								view! {
									<li>
										<label>
											<input type="checkbox" value=name.clone() prop:checked=enabled />
											" "
											{name}
										</label>
									</li>
								}
							})
							.collect_view()
					}}
				</ul>
				<ul class="node-list" on:change=on_pin>
					{move || {
						panels
							.nodes
							.get()
							.into_iter()
							.map(|entry| {
								view! {
									<li>
										<label>
											<input
												type="checkbox"
												value=entry.index.to_string()
												prop:checked=entry.pinned
											/>
											" "
											{entry.text}
										</label>
									</li>
								}
							})
							.collect_view()
					}}
				</ul>
			</aside>
		</div>
	}
}
