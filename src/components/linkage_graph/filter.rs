//! Filter state and visible-subgraph derivation.
//!
//! A filter is a pure view over the authoritative snapshot: it never mutates
//! the snapshot, so toggling a type off and back on restores the full dataset
//! without a fresh fetch.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::types::{Edge, Entity, EntityKey, EntityType, GraphSnapshot};

/// Which entity types are visible, and the minimum edge weight to show.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
	/// Edges below this order count are hidden.
	pub min_weight: u64,
	/// Per-type visibility; types absent from the map are enabled.
	types_enabled: HashMap<EntityType, bool>,
}

impl Default for FilterState {
	fn default() -> Self {
		Self {
			min_weight: 1,
			types_enabled: HashMap::new(),
		}
	}
}

impl FilterState {
	pub fn is_enabled(&self, entity_type: EntityType) -> bool {
		self.types_enabled.get(&entity_type).copied().unwrap_or(true)
	}

	pub fn set_enabled(&mut self, entity_type: EntityType, enabled: bool) {
		self.types_enabled.insert(entity_type, enabled);
	}

	/// Whether an edge survives the weight threshold and type toggles.
	pub fn passes_edge(&self, edge: &Edge) -> bool {
		edge.count >= self.min_weight
			&& self.is_enabled(edge.a.entity_type)
			&& self.is_enabled(edge.b.entity_type)
	}
}

/// Derives the visible subgraph of a snapshot under a filter.
///
/// A node is visible when its type is enabled and it is either a seed or an
/// endpoint of a surviving edge; satellites whose every edge fell below the
/// weight threshold disappear with their edges. Edges referencing a node the
/// snapshot never declared (malformed input) are dropped from the visible set
/// silently. The snapshot itself is never touched.
pub fn visible_subgraph<'a>(
	snapshot: &'a GraphSnapshot,
	filter: &FilterState,
) -> (Vec<&'a Entity>, Vec<&'a Edge>) {
	let declared: HashSet<EntityKey> = snapshot
		.nodes
		.iter()
		.filter(|n| filter.is_enabled(n.entity_type))
		.map(|n| n.key())
		.collect();

	let edges: Vec<&Edge> = snapshot
		.edges
		.iter()
		.filter(|e| filter.passes_edge(e) && declared.contains(&e.a) && declared.contains(&e.b))
		.collect();

	let mut incident: HashSet<&EntityKey> = HashSet::new();
	for e in &edges {
		incident.insert(&e.a);
		incident.insert(&e.b);
	}

	let nodes = snapshot
		.nodes
		.iter()
		.filter(|n| {
			filter.is_enabled(n.entity_type) && (n.is_seed() || incident.contains(&n.key()))
		})
		.collect();
	(nodes, edges)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn entity(entity_type: EntityType, value: &str, layer: u32) -> Entity {
		Entity {
			entity_type,
			value: value.to_string(),
			count: 1,
			layer,
		}
	}

	fn edge(a: &Entity, b: &Entity, count: u64) -> Edge {
		Edge {
			a: a.key(),
			b: b.key(),
			count,
		}
	}

	fn weighted_snapshot() -> GraphSnapshot {
		let u1 = entity(EntityType::Uid, "U1", 0);
		let d1 = entity(EntityType::Device, "D1", 1);
		let i1 = entity(EntityType::Ip, "1.1.1.1", 1);
		let v1 = entity(EntityType::Vendor, "V1", 1);
		let p1 = entity(EntityType::Phone, "+155500", 1);
		let edges = vec![
			edge(&u1, &d1, 1),
			edge(&u1, &i1, 3),
			edge(&u1, &v1, 5),
			edge(&u1, &p1, 9),
		];
		GraphSnapshot {
			nodes: vec![u1, d1, i1, v1, p1],
			edges,
			order_count: 18,
			truncated: false,
		}
	}

	#[test]
	fn min_weight_keeps_only_heavy_edges() {
		let snapshot = weighted_snapshot();
		let filter = FilterState {
			min_weight: 5,
			..FilterState::default()
		};
		let (_, edges) = visible_subgraph(&snapshot, &filter);
		let mut counts: Vec<u64> = edges.iter().map(|e| e.count).collect();
		counts.sort_unstable();
		assert_eq!(counts, vec![5, 9]);
	}

	#[test]
	fn no_dangling_edges_after_type_toggle() {
		let snapshot = weighted_snapshot();
		let mut filter = FilterState::default();
		filter.set_enabled(EntityType::Device, false);
		let (nodes, edges) = visible_subgraph(&snapshot, &filter);
		let present: HashSet<EntityKey> = nodes.iter().map(|n| n.key()).collect();
		for e in &edges {
			assert!(present.contains(&e.a));
			assert!(present.contains(&e.b));
		}
		assert_eq!(nodes.len(), 4);
		assert_eq!(edges.len(), 3);
	}

	#[test]
	fn toggling_a_type_off_and_on_is_lossless() {
		let snapshot = weighted_snapshot();
		let mut filter = FilterState::default();
		let (nodes_before, edges_before) = visible_subgraph(&snapshot, &filter);
		let (n, e) = (nodes_before.len(), edges_before.len());

		filter.set_enabled(EntityType::Ip, false);
		let (nodes_off, _) = visible_subgraph(&snapshot, &filter);
		assert_eq!(nodes_off.len(), n - 1);

		filter.set_enabled(EntityType::Ip, true);
		let (nodes_after, edges_after) = visible_subgraph(&snapshot, &filter);
		assert_eq!(nodes_after.len(), n);
		assert_eq!(edges_after.len(), e);
	}

	#[test]
	fn malformed_edge_with_missing_endpoint_is_dropped() {
		let u1 = entity(EntityType::Uid, "U1", 0);
		let ghost = entity(EntityType::Device, "GHOST", 1);
		let snapshot = GraphSnapshot {
			edges: vec![edge(&u1, &ghost, 4)],
			nodes: vec![u1],
			order_count: 4,
			truncated: false,
		};
		let (nodes, edges) = visible_subgraph(&snapshot, &FilterState::default());
		assert_eq!(nodes.len(), 1);
		assert!(edges.is_empty());
	}

	#[test]
	fn seed_scenario_with_min_weight_two() {
		// Seed uid:U1, depth 1: backend returns U1, D1, I1 with edges
		// (U1,D1,3) and (U1,I1,1). min_weight=2 must leave exactly U1, D1
		// and the edge between them; I1 and its weak edge are excluded.
		let u1 = entity(EntityType::Uid, "U1", 0);
		let d1 = entity(EntityType::Device, "D1", 1);
		let i1 = entity(EntityType::Ip, "9.9.9.9", 1);
		let snapshot = GraphSnapshot {
			edges: vec![edge(&u1, &d1, 3), edge(&u1, &i1, 1)],
			nodes: vec![u1.clone(), d1.clone(), i1],
			order_count: 4,
			truncated: false,
		};
		let filter = FilterState {
			min_weight: 2,
			..FilterState::default()
		};
		let (nodes, edges) = visible_subgraph(&snapshot, &filter);
		let mut values: Vec<&str> = nodes.iter().map(|n| n.value.as_str()).collect();
		values.sort_unstable();
		assert_eq!(values, vec!["D1", "U1"]);
		assert_eq!(edges.len(), 1);
		assert!(edges[0].connects(&u1.key(), &d1.key()));
	}

	#[test]
	fn isolated_seeds_stay_visible() {
		let snapshot = GraphSnapshot {
			nodes: vec![entity(EntityType::Uid, "U1", 0)],
			edges: Vec::new(),
			order_count: 0,
			truncated: false,
		};
		let (nodes, edges) = visible_subgraph(&snapshot, &FilterState::default());
		assert_eq!(nodes.len(), 1);
		assert!(edges.is_empty());
	}

	#[test]
	fn empty_snapshot_yields_empty_subgraph() {
		let snapshot = GraphSnapshot::default();
		let (nodes, edges) = visible_subgraph(&snapshot, &FilterState::default());
		assert!(nodes.is_empty());
		assert!(edges.is_empty());
	}
}
