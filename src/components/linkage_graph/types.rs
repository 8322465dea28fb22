//! Data model and wire types for the linkage graph.
//!
//! Entities are identified by their `(type, value)` pair. Edges reference
//! endpoints by [`EntityKey`] rather than by object identity, so they survive
//! node-set rebuilds when a new snapshot arrives. The serde shapes match the
//! linkage backend; unknown fields (node `id`, edge `orderIds`) are ignored.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Kind of fraud-relevant identifier an entity represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
	Uid,
	Vendor,
	Device,
	Ip,
	Phone,
}

impl EntityType {
	/// All entity types, in display order.
	pub const ALL: [EntityType; 5] = [
		EntityType::Uid,
		EntityType::Vendor,
		EntityType::Device,
		EntityType::Ip,
		EntityType::Phone,
	];

	/// Lowercase wire/display name.
	pub fn label(self) -> &'static str {
		match self {
			EntityType::Uid => "uid",
			EntityType::Vendor => "vendor",
			EntityType::Device => "device",
			EntityType::Ip => "ip",
			EntityType::Phone => "phone",
		}
	}
}

impl fmt::Display for EntityType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.label())
	}
}

/// Identity of an entity: the `(type, value)` pair.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityKey {
	/// Entity kind.
	#[serde(rename = "type")]
	pub entity_type: EntityType,
	/// String identifier within that kind.
	pub value: String,
}

impl EntityKey {
	pub fn new(entity_type: EntityType, value: impl Into<String>) -> Self {
		Self {
			entity_type,
			value: value.into(),
		}
	}
}

impl fmt::Display for EntityKey {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}:{}", self.entity_type, self.value)
	}
}

/// A typed identifier participating in the investigation, as produced by the
/// linkage backend. Immutable for the lifetime of a snapshot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Entity {
	/// Entity kind.
	#[serde(rename = "type")]
	pub entity_type: EntityType,
	/// String identifier.
	pub value: String,
	/// Number of orders touching this entity.
	#[serde(default)]
	pub count: u64,
	/// Hop distance from the seed set; 0 marks a seed.
	#[serde(default)]
	pub layer: u32,
}

impl Entity {
	pub fn key(&self) -> EntityKey {
		EntityKey::new(self.entity_type, self.value.clone())
	}

	/// Seeds are the investigation's anchor entities (layer 0).
	pub fn is_seed(&self) -> bool {
		self.layer == 0
	}
}

/// An unordered entity pair plus the number of orders connecting it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Edge {
	/// One endpoint.
	pub a: EntityKey,
	/// The other endpoint.
	pub b: EntityKey,
	/// Number of orders connecting the pair.
	#[serde(default)]
	pub count: u64,
}

impl Edge {
	/// Whether this edge connects the two given keys, in either order.
	pub fn connects(&self, a: &EntityKey, b: &EntityKey) -> bool {
		(self.a == *a && self.b == *b) || (self.a == *b && self.b == *a)
	}
}

/// One complete graph dataset returned by a build/expand request.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphSnapshot {
	pub nodes: Vec<Entity>,
	pub edges: Vec<Edge>,
	/// Number of orders the backend analyzed to produce this snapshot.
	#[serde(default)]
	pub order_count: u64,
	/// Set when the backend capped traversal (depth or per-layer limit).
	/// Must be surfaced rather than presenting a complete-looking graph.
	#[serde(default)]
	pub truncated: bool,
}

/// Request body for building a graph, seeds grouped by type.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphBuildRequest {
	pub uids: Vec<String>,
	pub devices: Vec<String>,
	pub ips: Vec<String>,
	pub vendors: Vec<String>,
	pub phones: Vec<String>,
	/// Hop limit (the backend clamps to 1..4).
	pub depth: u32,
	/// Per-layer order cap.
	pub limit: u32,
}

impl GraphBuildRequest {
	/// Groups a flat seed list into the backend's per-type arrays.
	pub fn from_seeds(seeds: &[EntityKey], depth: u32, limit: u32) -> Self {
		let mut req = Self {
			depth,
			limit,
			..Self::default()
		};
		for seed in seeds {
			let bucket = match seed.entity_type {
				EntityType::Uid => &mut req.uids,
				EntityType::Vendor => &mut req.vendors,
				EntityType::Device => &mut req.devices,
				EntityType::Ip => &mut req.ips,
				EntityType::Phone => &mut req.phones,
			};
			bucket.push(seed.value.clone());
		}
		req
	}
}

/// Query for the concrete orders behind an edge's weight.
#[derive(Clone, Debug)]
pub struct EdgeDetailRequest {
	pub a: EntityKey,
	pub b: EntityKey,
	/// Result cap.
	pub limit: u32,
}

impl EdgeDetailRequest {
	/// Query-string pairs in the backend's `aType`/`aValue`/... contract.
	pub fn query_pairs(&self) -> [(&'static str, String); 5] {
		[
			("aType", self.a.entity_type.label().to_string()),
			("aValue", self.a.value.clone()),
			("bType", self.b.entity_type.label().to_string()),
			("bValue", self.b.value.clone()),
			("limit", self.limit.to_string()),
		]
	}
}

/// An order reference connecting two entities.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRef {
	pub id: String,
	pub order_number: String,
}

/// Orders returned for an edge-detail request. Empty is a normal result: the
/// edge may have come from a broader traversal than the queried window.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EdgeDetailResponse {
	#[serde(default)]
	pub orders: Vec<OrderRef>,
}

/// A request the interaction layer emits toward the orchestrator.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GraphCommand {
	/// Rebuild the graph with this entity added to the seed set.
	ExpandNode(EntityKey),
	/// Fetch the orders that produced this edge's weight.
	InspectEdge { a: EntityKey, b: EntityKey },
}

/// Outcome of an edge-detail lookup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EdgeDetailStatus {
	Loading,
	Loaded(Vec<OrderRef>),
	Failed(String),
}

/// State of the edge currently under inspection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EdgeDetail {
	pub a: EntityKey,
	pub b: EntityKey,
	pub status: EdgeDetailStatus,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn decodes_backend_snapshot_with_extra_fields() {
		let json = r#"{
			"nodes": [
				{ "id": "uid:U1", "type": "uid", "value": "U1", "count": 7, "layer": 0 },
				{ "id": "device:D1", "type": "device", "value": "D1", "count": 3, "layer": 1 }
			],
			"edges": [
				{
					"a": { "type": "uid", "value": "U1" },
					"b": { "type": "device", "value": "D1" },
					"count": 3,
					"orderIds": ["o1", "o2", "o3"]
				}
			],
			"orderCount": 7,
			"depthUsed": 1,
			"truncated": true
		}"#;
		let snapshot: GraphSnapshot = serde_json::from_str(json).unwrap();
		assert_eq!(snapshot.nodes.len(), 2);
		assert_eq!(snapshot.edges.len(), 1);
		assert_eq!(snapshot.order_count, 7);
		assert!(snapshot.truncated);
		assert!(snapshot.nodes[0].is_seed());
		assert!(!snapshot.nodes[1].is_seed());
		assert_eq!(snapshot.edges[0].a.entity_type, EntityType::Uid);
	}

	#[test]
	fn missing_counts_default_to_zero() {
		let json = r#"{ "nodes": [{ "type": "ip", "value": "1.2.3.4" }], "edges": [] }"#;
		let snapshot: GraphSnapshot = serde_json::from_str(json).unwrap();
		assert_eq!(snapshot.nodes[0].count, 0);
		assert_eq!(snapshot.order_count, 0);
		assert!(!snapshot.truncated);
	}

	#[test]
	fn build_request_groups_seeds_by_type() {
		let seeds = vec![
			EntityKey::new(EntityType::Uid, "U1"),
			EntityKey::new(EntityType::Ip, "1.1.1.1"),
			EntityKey::new(EntityType::Uid, "U2"),
			EntityKey::new(EntityType::Phone, "+15551234567"),
		];
		let req = GraphBuildRequest::from_seeds(&seeds, 2, 400);
		assert_eq!(req.uids, vec!["U1", "U2"]);
		assert_eq!(req.ips, vec!["1.1.1.1"]);
		assert_eq!(req.phones, vec!["+15551234567"]);
		assert!(req.devices.is_empty());
		assert_eq!(req.depth, 2);

		let body = serde_json::to_value(&req).unwrap();
		assert_eq!(body["uids"][0], "U1");
		assert_eq!(body["limit"], 400);
	}

	#[test]
	fn edge_detail_query_matches_backend_contract() {
		let req = EdgeDetailRequest {
			a: EntityKey::new(EntityType::Uid, "U1"),
			b: EntityKey::new(EntityType::Device, "D1"),
			limit: 50,
		};
		let pairs = req.query_pairs();
		assert_eq!(pairs[0], ("aType", "uid".to_string()));
		assert_eq!(pairs[3], ("bValue", "D1".to_string()));
		assert_eq!(pairs[4], ("limit", "50".to_string()));
	}

	#[test]
	fn edge_connects_in_either_order() {
		let u1 = EntityKey::new(EntityType::Uid, "U1");
		let d1 = EntityKey::new(EntityType::Device, "D1");
		let edge = Edge {
			a: u1.clone(),
			b: d1.clone(),
			count: 3,
		};
		assert!(edge.connects(&u1, &d1));
		assert!(edge.connects(&d1, &u1));
		assert!(!edge.connects(&u1, &EntityKey::new(EntityType::Ip, "1.1.1.1")));
	}

	#[test]
	fn empty_edge_detail_is_a_normal_result() {
		let resp: EdgeDetailResponse = serde_json::from_str(r#"{ "orders": [] }"#).unwrap();
		assert!(resp.orders.is_empty());
		let resp: EdgeDetailResponse = serde_json::from_str("{}").unwrap();
		assert!(resp.orders.is_empty());
	}
}
