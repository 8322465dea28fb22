//! Owned simulation state for the linkage graph.
//!
//! [`LinkageGraphState`] holds the authoritative snapshot, the filtered node
//! and edge sets the simulation runs over, the pan/zoom view transform, and
//! the interaction state. It is created when the component mounts, then
//! mutated each frame by the animation loop; network requests never touch it
//! directly, they install snapshots through the epoch-guarded entry points.

use std::collections::HashMap;
use std::f64::consts::PI;

use log::{debug, info};
use rand::SeedableRng;
use rand::rngs::SmallRng;

use super::filter::{self, FilterState};
use super::sim::{self, DragState, SimNode, SimParams};
use super::types::{Edge, EdgeDetail, EdgeDetailStatus, EntityKey, GraphSnapshot};

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0 by the wheel handler).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Core graph state: authoritative snapshot, visible subgraph, simulation
/// nodes, and interaction tracking.
pub struct LinkageGraphState {
	snapshot: Option<GraphSnapshot>,
	filter: FilterState,
	nodes: Vec<SimNode>,
	edges: Vec<Edge>,
	index: HashMap<EntityKey, usize>,
	drag: Option<DragState>,
	epoch: u64,
	rng: SmallRng,
	pub params: SimParams,
	pub transform: ViewTransform,
	pub pan: PanState,
	/// Edge currently under inspection, if any.
	pub detail: Option<EdgeDetail>,
	pub width: f64,
	pub height: f64,
}

impl LinkageGraphState {
	pub fn new(width: f64, height: f64, rng_seed: u64) -> Self {
		Self {
			snapshot: None,
			filter: FilterState::default(),
			nodes: Vec::new(),
			edges: Vec::new(),
			index: HashMap::new(),
			drag: None,
			epoch: 0,
			rng: SmallRng::seed_from_u64(rng_seed),
			params: SimParams::default(),
			transform: ViewTransform::default(),
			pan: PanState::default(),
			detail: None,
			width,
			height,
		}
	}

	pub fn snapshot(&self) -> Option<&GraphSnapshot> {
		self.snapshot.as_ref()
	}

	pub fn filter(&self) -> &FilterState {
		&self.filter
	}

	pub fn nodes(&self) -> &[SimNode] {
		&self.nodes
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	pub fn node_by_key(&self, key: &EntityKey) -> Option<&SimNode> {
		self.index.get(key).map(|&i| &self.nodes[i])
	}

	pub fn drag(&self) -> Option<&DragState> {
		self.drag.as_ref()
	}

	/// Whether the frame loop has anything to relax.
	pub fn is_running(&self) -> bool {
		!self.nodes.is_empty()
	}

	/// Starts a build/expand request. The returned token must accompany the
	/// resulting snapshot; a token superseded by a newer `begin_build` is
	/// rejected, so a late response cannot clobber a newer graph.
	pub fn begin_build(&mut self) -> u64 {
		self.epoch += 1;
		self.epoch
	}

	/// Installs a snapshot if `token` is still current, carrying positions
	/// over by `(type, value)` identity. Returns whether it was applied.
	pub fn install_snapshot(&mut self, token: u64, snapshot: GraphSnapshot) -> bool {
		if token != self.epoch {
			debug!(
				"linkage-graph: dropping stale snapshot (token {token}, current {})",
				self.epoch
			);
			return false;
		}
		info!(
			"linkage-graph: snapshot installed, {} nodes / {} edges from {} orders{}",
			snapshot.nodes.len(),
			snapshot.edges.len(),
			snapshot.order_count,
			if snapshot.truncated { " (truncated)" } else { "" }
		);
		self.snapshot = Some(snapshot);
		self.rebuild();
		true
	}

	/// Drops the dataset entirely; the simulation idles until the next
	/// snapshot arrives.
	pub fn clear(&mut self) {
		self.snapshot = None;
		self.detail = None;
		self.rebuild();
	}

	/// Replaces the filter and re-derives the visible subgraph. Positions of
	/// nodes that remain visible are preserved; the snapshot is untouched.
	pub fn set_filter(&mut self, filter: FilterState) {
		self.filter = filter;
		self.rebuild();
	}

	fn rebuild(&mut self) {
		let (cx, cy) = (self.width / 2.0, self.height / 2.0);
		let (nodes, edges) = match &self.snapshot {
			Some(snapshot) => {
				let (entities, edges) = filter::visible_subgraph(snapshot, &self.filter);
				let prev: HashMap<EntityKey, (f64, f64, f64, f64)> = self
					.nodes
					.iter()
					.map(|n| (n.key(), (n.x, n.y, n.vx, n.vy)))
					.collect();
				let total = entities.len().max(1);
				let spawn_radius = self.params.spawn_radius;
				let nodes: Vec<SimNode> = entities
					.iter()
					.enumerate()
					.map(|(i, entity)| {
						// Known nodes keep their motion; new ones spawn on a
						// ring so no pair starts at zero separation.
						let (x, y, vx, vy) =
							prev.get(&entity.key()).copied().unwrap_or_else(|| {
								let angle = (i as f64) * 2.0 * PI / total as f64;
								(
									cx + spawn_radius * angle.cos(),
									cy + spawn_radius * angle.sin(),
									0.0,
									0.0,
								)
							});
						SimNode {
							entity: (*entity).clone(),
							x,
							y,
							vx,
							vy,
						}
					})
					.collect();
				let edges = edges.into_iter().cloned().collect();
				(nodes, edges)
			}
			None => (Vec::new(), Vec::new()),
		};
		self.index = nodes
			.iter()
			.enumerate()
			.map(|(i, n)| (n.key(), i))
			.collect();
		self.nodes = nodes;
		self.edges = edges;
		if let Some(d) = &self.drag {
			if !self.index.contains_key(&d.key) {
				self.drag = None;
			}
		}
	}

	/// One simulation tick; a no-op while the graph is empty.
	pub fn tick(&mut self) {
		if self.nodes.is_empty() {
			return;
		}
		let center = (self.width / 2.0, self.height / 2.0);
		sim::step(
			&mut self.nodes,
			&self.edges,
			&self.index,
			self.drag.as_ref(),
			center,
			&self.params,
			&mut self.rng,
		);
	}

	/// Starts dragging a node at the given graph-space point. Rejected while
	/// another drag is active or the node is not visible.
	pub fn begin_drag(&mut self, key: &EntityKey, x: f64, y: f64) -> bool {
		if self.drag.is_some() || !self.index.contains_key(key) {
			return false;
		}
		self.drag = Some(DragState {
			key: key.clone(),
			x,
			y,
		});
		true
	}

	/// Moves the active drag's target; no effect without an active drag.
	pub fn update_drag(&mut self, x: f64, y: f64) {
		if let Some(d) = &mut self.drag {
			d.x = x;
			d.y = y;
		}
	}

	/// Releases the dragged node back to full physics control.
	pub fn end_drag(&mut self) {
		self.drag = None;
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node within `hit_radius` of a graph-space point.
	pub fn node_at(&self, gx: f64, gy: f64, hit_radius: f64) -> Option<&SimNode> {
		let mut found = None;
		for node in &self.nodes {
			let (dx, dy) = (node.x - gx, node.y - gy);
			if (dx * dx + dy * dy).sqrt() < hit_radius {
				found = Some(node);
			}
		}
		found
	}

	/// Edge nearest to a graph-space point, within `tolerance` of its
	/// segment.
	pub fn edge_at(&self, gx: f64, gy: f64, tolerance: f64) -> Option<&Edge> {
		let mut best: Option<(&Edge, f64)> = None;
		for edge in &self.edges {
			let (Some(a), Some(b)) = (self.node_by_key(&edge.a), self.node_by_key(&edge.b))
			else {
				continue;
			};
			let d = segment_distance(gx, gy, a.x, a.y, b.x, b.y);
			if d < tolerance && best.is_none_or(|(_, bd)| d < bd) {
				best = Some((edge, d));
			}
		}
		best.map(|(e, _)| e)
	}

	/// Marks an edge as under inspection while the order lookup is in
	/// flight.
	pub fn open_detail(&mut self, a: EntityKey, b: EntityKey) {
		self.detail = Some(EdgeDetail {
			a,
			b,
			status: EdgeDetailStatus::Loading,
		});
	}

	/// Records a lookup outcome for the inspected edge; results for an edge
	/// no longer under inspection are ignored. Empty orders are a normal
	/// outcome, not a failure.
	pub fn resolve_detail(&mut self, a: &EntityKey, b: &EntityKey, status: EdgeDetailStatus) {
		if let Some(d) = &mut self.detail {
			if (d.a == *a && d.b == *b) || (d.a == *b && d.b == *a) {
				d.status = status;
			}
		}
	}

	pub fn close_detail(&mut self) {
		self.detail = None;
	}

	/// Human-readable line for the inspected edge, shown in the status area.
	pub fn detail_line(&self) -> Option<String> {
		let d = self.detail.as_ref()?;
		let line = match &d.status {
			EdgeDetailStatus::Loading => format!("{} - {}: loading orders...", d.a, d.b),
			EdgeDetailStatus::Loaded(orders) if orders.is_empty() => {
				format!("{} - {}: no orders (possibly filtered)", d.a, d.b)
			}
			EdgeDetailStatus::Loaded(orders) => {
				let numbers: Vec<&str> =
					orders.iter().map(|o| o.order_number.as_str()).collect();
				format!("{} - {}: {}", d.a, d.b, numbers.join(", "))
			}
			EdgeDetailStatus::Failed(err) => {
				format!("{} - {}: lookup failed ({err})", d.a, d.b)
			}
		};
		Some(line)
	}

	/// Serializes the authoritative snapshot for offline analysis. Pure read
	/// of engine state, no network round trip.
	pub fn export_json(&self) -> Option<String> {
		let snapshot = self.snapshot.as_ref()?;
		serde_json::to_string_pretty(snapshot).ok()
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

/// Distance from a point to the segment (x1,y1)-(x2,y2).
fn segment_distance(px: f64, py: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
	let (dx, dy) = (x2 - x1, y2 - y1);
	let len2 = dx * dx + dy * dy;
	if len2 < f64::EPSILON {
		return (px - x1).hypot(py - y1);
	}
	let t = ((px - x1) * dx + (py - y1) * dy) / len2;
	let t = t.clamp(0.0, 1.0);
	(px - (x1 + t * dx)).hypot(py - (y1 + t * dy))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::linkage_graph::types::{Entity, EntityType, OrderRef};

	fn entity(entity_type: EntityType, value: &str, layer: u32) -> Entity {
		Entity {
			entity_type,
			value: value.to_string(),
			count: 2,
			layer,
		}
	}

	fn snapshot() -> GraphSnapshot {
		let u1 = entity(EntityType::Uid, "U1", 0);
		let d1 = entity(EntityType::Device, "D1", 1);
		let i1 = entity(EntityType::Ip, "1.2.3.4", 1);
		GraphSnapshot {
			edges: vec![
				Edge {
					a: u1.key(),
					b: d1.key(),
					count: 3,
				},
				Edge {
					a: u1.key(),
					b: i1.key(),
					count: 1,
				},
			],
			nodes: vec![u1, d1, i1],
			order_count: 4,
			truncated: false,
		}
	}

	fn state_with_snapshot() -> LinkageGraphState {
		let mut st = LinkageGraphState::new(420.0, 420.0, 42);
		let token = st.begin_build();
		assert!(st.install_snapshot(token, snapshot()));
		st
	}

	#[test]
	fn fresh_nodes_spawn_away_from_each_other() {
		let st = state_with_snapshot();
		assert_eq!(st.nodes().len(), 3);
		for (i, a) in st.nodes().iter().enumerate() {
			for b in &st.nodes()[i + 1..] {
				let d = (a.x - b.x).hypot(a.y - b.y);
				assert!(d > 1.0, "nodes spawned on top of each other");
			}
		}
	}

	#[test]
	fn positions_carry_over_between_snapshots() {
		let mut st = state_with_snapshot();
		for _ in 0..30 {
			st.tick();
		}
		let u1 = EntityKey::new(EntityType::Uid, "U1");
		let before = {
			let n = st.node_by_key(&u1).unwrap();
			(n.x, n.y)
		};

		let token = st.begin_build();
		assert!(st.install_snapshot(token, snapshot()));
		let n = st.node_by_key(&u1).unwrap();
		assert_eq!((n.x, n.y), before);
	}

	#[test]
	fn stale_snapshot_is_rejected() {
		let mut st = LinkageGraphState::new(420.0, 420.0, 42);
		let stale = st.begin_build();
		let current = st.begin_build();
		assert!(!st.install_snapshot(stale, snapshot()));
		assert!(st.snapshot().is_none());
		assert!(st.install_snapshot(current, snapshot()));
		assert_eq!(st.nodes().len(), 3);
	}

	#[test]
	fn filter_change_preserves_positions_and_is_reversible() {
		let mut st = state_with_snapshot();
		for _ in 0..10 {
			st.tick();
		}
		let d1 = EntityKey::new(EntityType::Device, "D1");
		let before = {
			let n = st.node_by_key(&d1).unwrap();
			(n.x, n.y)
		};
		let (n_before, e_before) = (st.nodes().len(), st.edges().len());

		let mut f = FilterState::default();
		f.set_enabled(EntityType::Ip, false);
		st.set_filter(f);
		assert!(st.node_by_key(&EntityKey::new(EntityType::Ip, "1.2.3.4")).is_none());
		let n = st.node_by_key(&d1).unwrap();
		assert_eq!((n.x, n.y), before);

		st.set_filter(FilterState::default());
		assert_eq!(st.nodes().len(), n_before);
		assert_eq!(st.edges().len(), e_before);
	}

	#[test]
	fn drag_protocol_rejects_concurrent_drags_and_pins_exactly() {
		let mut st = state_with_snapshot();
		let u1 = EntityKey::new(EntityType::Uid, "U1");
		let d1 = EntityKey::new(EntityType::Device, "D1");

		assert!(st.begin_drag(&u1, 10.0, 20.0));
		assert!(!st.begin_drag(&d1, 0.0, 0.0), "second drag must be a no-op");

		st.update_drag(77.0, 88.0);
		st.tick();
		let held = st.node_by_key(&u1).unwrap();
		assert_eq!((held.x, held.y), (77.0, 88.0));

		st.end_drag();
		assert!(st.drag().is_none());
		// Still exactly at the release point; physics resumes on later ticks.
		let released = st.node_by_key(&u1).unwrap();
		assert_eq!((released.x, released.y), (77.0, 88.0));
	}

	#[test]
	fn update_drag_without_active_drag_is_a_no_op() {
		let mut st = state_with_snapshot();
		st.update_drag(5.0, 5.0);
		assert!(st.drag().is_none());
	}

	#[test]
	fn drag_is_dropped_when_its_node_is_filtered_out() {
		let mut st = state_with_snapshot();
		let i1 = EntityKey::new(EntityType::Ip, "1.2.3.4");
		assert!(st.begin_drag(&i1, 0.0, 0.0));
		let mut f = FilterState::default();
		f.set_enabled(EntityType::Ip, false);
		st.set_filter(f);
		assert!(st.drag().is_none());
	}

	#[test]
	fn empty_snapshot_idles_the_simulation() {
		let mut st = LinkageGraphState::new(420.0, 420.0, 42);
		let token = st.begin_build();
		st.install_snapshot(token, GraphSnapshot::default());
		assert!(!st.is_running());
		st.tick();
		assert!(st.nodes().is_empty());
	}

	#[test]
	fn edge_detail_with_zero_orders_reads_as_no_orders() {
		let mut st = state_with_snapshot();
		let u1 = EntityKey::new(EntityType::Uid, "U1");
		let d1 = EntityKey::new(EntityType::Device, "D1");
		st.open_detail(u1.clone(), d1.clone());
		assert!(st.detail_line().unwrap().contains("loading"));

		// Endpoints reversed, as a backend might echo them.
		st.resolve_detail(&d1, &u1, EdgeDetailStatus::Loaded(Vec::new()));
		assert!(st.detail_line().unwrap().contains("no orders"));
	}

	#[test]
	fn edge_detail_lists_order_numbers() {
		let mut st = state_with_snapshot();
		let u1 = EntityKey::new(EntityType::Uid, "U1");
		let d1 = EntityKey::new(EntityType::Device, "D1");
		st.open_detail(u1.clone(), d1.clone());
		st.resolve_detail(
			&u1,
			&d1,
			EdgeDetailStatus::Loaded(vec![OrderRef {
				id: "o1".into(),
				order_number: "ORD-1001".into(),
			}]),
		);
		assert!(st.detail_line().unwrap().contains("ORD-1001"));
		st.close_detail();
		assert!(st.detail_line().is_none());
	}

	#[test]
	fn edge_hit_testing_resolves_the_nearest_segment() {
		let mut st = state_with_snapshot();
		// Pin the triangle so the geometry is known.
		let u1 = EntityKey::new(EntityType::Uid, "U1");
		let d1 = EntityKey::new(EntityType::Device, "D1");
		assert!(st.begin_drag(&u1, 0.0, 0.0));
		st.tick();
		st.end_drag();
		assert!(st.begin_drag(&d1, 100.0, 0.0));
		st.tick();
		st.end_drag();

		let a = st.node_by_key(&u1).unwrap();
		let b = st.node_by_key(&d1).unwrap();
		let (mx, my) = ((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
		let edge = st.edge_at(mx, my, 6.0).expect("midpoint should hit the edge");
		assert!(edge.connects(&u1, &d1));
		assert!(st.edge_at(mx + 500.0, my + 500.0, 6.0).is_none());
	}

	#[test]
	fn export_serializes_the_authoritative_snapshot() {
		let mut st = state_with_snapshot();
		// Exported data ignores the filter: it is the authoritative set.
		let mut f = FilterState::default();
		f.set_enabled(EntityType::Ip, false);
		st.set_filter(f);

		let json = st.export_json().unwrap();
		assert!(json.contains("orderCount"));
		assert!(json.contains("1.2.3.4"));
		assert!(json.contains("truncated"));

		let empty = LinkageGraphState::new(420.0, 420.0, 42);
		assert!(empty.export_json().is_none());
	}

	#[test]
	fn screen_to_graph_inverts_the_view_transform() {
		let mut st = LinkageGraphState::new(420.0, 420.0, 42);
		st.transform = ViewTransform {
			x: 50.0,
			y: -20.0,
			k: 2.0,
		};
		let (gx, gy) = st.screen_to_graph(150.0, 80.0);
		assert_eq!((gx, gy), (50.0, 50.0));
	}
}
