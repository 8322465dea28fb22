//! linkage-graph: Interactive entity-linkage investigation graph.
//!
//! This crate provides a WASM-based graph visualization component for fraud
//! review: typed entities (uids, devices, IPs, vendors, phones) linked by
//! shared orders, laid out with a force simulation, with pan/zoom, node
//! dragging, edge inspection, and type/weight filtering.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{HtmlAnchorElement, HtmlScriptElement, Window};

pub mod components;

pub use components::linkage_graph::{
	Edge, EdgeDetail, EdgeDetailRequest, EdgeDetailResponse, EdgeDetailStatus, Entity, EntityKey,
	EntityType, FilterState, GraphBuildRequest, GraphCommand, GraphSnapshot, LinkageGraphCanvas,
	LinkageGraphState, OrderRef, SimParams, Theme,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("linkage-graph: logging initialized");
}

/// Load a graph snapshot from a script element with id="linkage-data".
/// Expected format: the backend's snapshot JSON with { nodes, edges,
/// orderCount, truncated }.
fn load_snapshot() -> Option<GraphSnapshot> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("linkage-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<GraphSnapshot>(&json_text) {
		Ok(snapshot) => {
			info!(
				"linkage-graph: loaded {} nodes, {} edges from {} orders",
				snapshot.nodes.len(),
				snapshot.edges.len(),
				snapshot.order_count
			);
			Some(snapshot)
		}
		Err(e) => {
			warn!("linkage-graph: failed to parse linkage data: {}", e);
			None
		}
	}
}

/// Serialize the snapshot and hand it to the browser as a JSON download.
fn download_snapshot(snapshot: &GraphSnapshot) -> Result<(), JsValue> {
	let json =
		serde_json::to_string_pretty(snapshot).map_err(|e| JsValue::from_str(&e.to_string()))?;
	let parts = js_sys::Array::of1(&JsValue::from_str(&json));
	let options = web_sys::BlobPropertyBag::new();
	options.set_type("application/json");
	let blob = web_sys::Blob::new_with_str_sequence_and_options(&parts, &options)?;
	let url = web_sys::Url::create_object_url_with_blob(&blob)?;

	let document = web_sys::window()
		.ok_or_else(|| JsValue::from_str("no window"))?
		.document()
		.ok_or_else(|| JsValue::from_str("no document"))?;
	let anchor: HtmlAnchorElement = document.create_element("a")?.dyn_into()?;
	anchor.set_href(&url);
	anchor.set_download(&format!("linkage-graph-{}.json", js_sys::Date::now() as u64));
	anchor.click();
	web_sys::Url::revoke_object_url(&url)?;
	Ok(())
}

/// Main application component.
/// Loads a snapshot from the DOM and renders the linkage graph with filter
/// controls and a JSON export button.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let snapshot = RwSignal::new(load_snapshot());
	let filter = RwSignal::new(FilterState::default());
	let detail = RwSignal::new(None::<EdgeDetail>);

	// Static demo host: expansion would rebuild through the backend, edge
	// inspection resolves empty because there is no order service to ask.
	let on_command = Callback::new(move |cmd: GraphCommand| match cmd {
		GraphCommand::ExpandNode(key) => {
			info!("linkage-graph: expand requested for {key}");
		}
		GraphCommand::InspectEdge { a, b } => {
			info!("linkage-graph: inspecting edge {a} - {b}");
			detail.set(Some(EdgeDetail {
				a,
				b,
				status: EdgeDetailStatus::Loaded(Vec::new()),
			}));
		}
	});

	let export = move |_| {
		if let Some(snap) = snapshot.get() {
			if let Err(e) = download_snapshot(&snap) {
				warn!("linkage-graph: export failed: {e:?}");
			}
		}
	};

	let detail_signal: Signal<Option<EdgeDetail>> = detail.into();

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Entity Linkage" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<LinkageGraphCanvas
				snapshot=snapshot
				filter=filter
				detail=detail_signal
				on_command=on_command
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Entity Linkage"</h1>
				<p class="subtitle">
					"Drag nodes to reposition. Click an edge for its orders. Double-click a node to expand. Scroll to zoom."
				</p>
				<div class="filter-controls">
					{EntityType::ALL
						.into_iter()
						.map(|t| {
							view! {
								<label>
									<input
										type="checkbox"
										prop:checked=move || filter.get().is_enabled(t)
										on:change=move |ev| {
											filter
												.update(|f| {
													f.set_enabled(t, event_target_checked(&ev))
												});
										}
									/>
									{t.label()}
								</label>
							}
						})
						.collect_view()}
					<label>
						"min weight"
						<input
							type="number"
							min="1"
							prop:value=move || filter.get().min_weight.to_string()
							on:input=move |ev| {
								let v = event_target_value(&ev).parse().unwrap_or(1);
								filter.update(|f| f.min_weight = v);
							}
						/>
					</label>
					<button on:click=export>"Export JSON"</button>
				</div>
			</div>
		</div>
	}
}
