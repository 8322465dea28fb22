//! Leptos component wrapping the linkage graph canvas.
//!
//! The component creates an HTML canvas element and wires up mouse/wheel event
//! handlers for node dragging, edge inspection, panning, and zooming. An
//! animation loop runs via `requestAnimationFrame`, advancing the layout and
//! rendering each frame. Graph data flows in through reactive signals;
//! expansion and edge-inspection requests flow out through `on_command`, so
//! the host decides how (and whether) to talk to a backend.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent, Window};

use super::filter::FilterState;
use super::render;
use super::scale::{ScaleConfig, ScaledValues};
use super::state::LinkageGraphState;
use super::theme::Theme;
use super::types::{EdgeDetail, GraphCommand, GraphSnapshot};

/// Seed for the layout jitter. Fixed so replaying the same snapshot sequence
/// reproduces the same layout.
const LAYOUT_SEED: u64 = 42;

/// Mouse-up within this many screen pixels of mouse-down counts as a click
/// rather than a pan.
const CLICK_SLOP: f64 = 4.0;

/// Bundles graph state with visual configuration (scaling, theme).
struct GraphContext {
	state: LinkageGraphState,
	scale: ScaleConfig,
	theme: Theme,
}

/// Renders an interactive entity-linkage graph on a canvas element.
///
/// Pass the current dataset via the reactive `snapshot` signal; `None` idles
/// the view. Dragging a node pins it to the pointer, clicking an edge opens
/// its order detail, double-clicking a node emits
/// [`GraphCommand::ExpandNode`]. The component sizes itself to its parent
/// container by default; set `fullscreen = true` to fill the viewport and
/// resize automatically with the window. Explicit `width`/`height` override
/// automatic sizing.
#[component]
pub fn LinkageGraphCanvas(
	#[prop(into)] snapshot: Signal<Option<GraphSnapshot>>,
	#[prop(into)] filter: Signal<FilterState>,
	#[prop(optional, into)] detail: Option<Signal<Option<EdgeDetail>>>,
	#[prop(optional, into)] on_command: Option<Callback<GraphCommand>>,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: Rc<RefCell<Option<GraphContext>>> = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	// Screen position of the last mouse-down, for click-vs-pan discrimination.
	let press: Rc<Cell<(f64, f64)>> = Rc::new(Cell::new((0.0, 0.0)));
	// Cleared on unmount so the rAF chain stops rescheduling itself.
	let running: Arc<AtomicBool> = Arc::new(AtomicBool::new(true));
	let (context_init, animate_init, resize_cb_init) =
		(context.clone(), animate.clone(), resize_cb.clone());
	let running_init = running.clone();

	on_cleanup(move || running.store(false, Ordering::Relaxed));

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let window: Window = web_sys::window().unwrap();

		let (w, h) = if fullscreen {
			(
				window.inner_width().unwrap().as_f64().unwrap(),
				window.inner_height().unwrap().as_f64().unwrap(),
			)
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = canvas
			.get_context("2d")
			.unwrap()
			.unwrap()
			.dyn_into()
			.unwrap();

		let mut state = LinkageGraphState::new(w, h, LAYOUT_SEED);
		state.set_filter(filter.get_untracked());
		if let Some(snap) = snapshot.get_untracked() {
			let token = state.begin_build();
			state.install_snapshot(token, snap);
		}
		*context_init.borrow_mut() = Some(GraphContext {
			state,
			scale: ScaleConfig::default(),
			theme: Theme::default(),
		});

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let win: Window = web_sys::window().unwrap();
				let (nw, nh) = (
					win.inner_width().unwrap().as_f64().unwrap(),
					win.inner_height().unwrap().as_f64().unwrap(),
				);
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

		let (context_anim, animate_inner, running_anim) = (
			context_init.clone(),
			animate_init.clone(),
			running_init.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			if !running_anim.load(Ordering::Relaxed) {
				return;
			}
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				c.state.tick();
				render::render(&c.state, &ctx, &c.scale, &c.theme);
			}
			if let Some(ref cb) = *animate_inner.borrow() {
				let _ = web_sys::window()
					.unwrap()
					.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// Dataset changes route through the epoch guard; an update superseded
	// before it lands is dropped inside the engine.
	let context_data = context.clone();
	Effect::new(move |_| {
		let snap = snapshot.get();
		if let Some(ref mut c) = *context_data.borrow_mut() {
			match snap {
				Some(snap) => {
					let token = c.state.begin_build();
					c.state.install_snapshot(token, snap);
				}
				None => c.state.clear(),
			}
		}
	});

	let context_filter = context.clone();
	Effect::new(move |_| {
		let f = filter.get();
		if let Some(ref mut c) = *context_filter.borrow_mut() {
			c.state.set_filter(f);
		}
	});

	if let Some(detail) = detail {
		let context_detail = context.clone();
		Effect::new(move |_| {
			let d = detail.get();
			if let Some(ref mut c) = *context_detail.borrow_mut() {
				match d {
					Some(EdgeDetail { a, b, status }) => c.state.resolve_detail(&a, &b, status),
					None => c.state.close_detail(),
				}
			}
		});
	}

	let (context_md, press_md) = (context.clone(), press.clone());
	let on_mousedown = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);
		press_md.set((x, y));

		if let Some(ref mut c) = *context_md.borrow_mut() {
			let (gx, gy) = c.state.screen_to_graph(x, y);
			let scaled = ScaledValues::new(&c.scale, c.state.transform.k);
			let hit = c.state.node_at(gx, gy, scaled.hit_radius).map(|n| n.key());
			if let Some(key) = hit {
				c.state.begin_drag(&key, gx, gy);
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
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(ref mut c) = *context_mm.borrow_mut() {
			if c.state.drag().is_some() {
				let (gx, gy) = c.state.screen_to_graph(x, y);
				c.state.update_drag(gx, gy);
			} else if c.state.pan.active {
				c.state.transform.x = c.state.pan.transform_start_x + (x - c.state.pan.start_x);
				c.state.transform.y = c.state.pan.transform_start_y + (y - c.state.pan.start_y);
			}
		}
	};

	let (context_mu, press_mu) = (context.clone(), press.clone());
	let on_mouseup = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(ref mut c) = *context_mu.borrow_mut() {
			let was_dragging = c.state.drag().is_some();
			c.state.end_drag();
			c.state.pan.active = false;

			let (px, py) = press_mu.get();
			let clicked = (x - px).hypot(y - py) < CLICK_SLOP;
			if was_dragging || !clicked {
				return;
			}

			let (gx, gy) = c.state.screen_to_graph(x, y);
			let scaled = ScaledValues::new(&c.scale, c.state.transform.k);
			let hit = c
				.state
				.edge_at(gx, gy, scaled.edge_tolerance)
				.map(|e| (e.a.clone(), e.b.clone()));
			match hit {
				Some((a, b)) => {
					c.state.open_detail(a.clone(), b.clone());
					if let Some(cb) = on_command {
						cb.run(GraphCommand::InspectEdge { a, b });
					}
				}
				None => c.state.close_detail(),
			}
		}
	};

	let context_dc = context.clone();
	let on_dblclick = move |ev: MouseEvent| {
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(ref c) = *context_dc.borrow() {
			let (gx, gy) = c.state.screen_to_graph(x, y);
			let scaled = ScaledValues::new(&c.scale, c.state.transform.k);
			if let Some(node) = c.state.node_at(gx, gy, scaled.hit_radius) {
				if let Some(cb) = on_command {
					cb.run(GraphCommand::ExpandNode(node.key()));
				}
			}
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.state.end_drag();
			c.state.pan.active = false;
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let canvas: HtmlCanvasElement = canvas_ref.get().unwrap().into();
		let rect = canvas.get_bounding_client_rect();
		let (x, y) = (
			ev.client_x() as f64 - rect.left(),
			ev.client_y() as f64 - rect.top(),
		);

		if let Some(ref mut c) = *context_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
			let new_k = (c.state.transform.k * factor).clamp(0.1, 10.0);
			let ratio = new_k / c.state.transform.k;
			c.state.transform.x = x - (x - c.state.transform.x) * ratio;
			c.state.transform.y = y - (y - c.state.transform.y) * ratio;
			c.state.transform.k = new_k;
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="linkage-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:dblclick=on_dblclick
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
