//! Force-directed layout step.
//!
//! A discrete-time relaxation run once per animation frame: spring forces
//! along visible edges, pairwise repulsion between all nodes, a weak pull
//! toward the canvas center, and damped integration. The repulsion pass is
//! O(n²) per frame, which is fine at the low hundreds of nodes this view is
//! scoped to. There is no converged state; damping suppresses visible motion
//! once the layout settles.

use std::collections::HashMap;

use rand::Rng;
use rand::rngs::SmallRng;

use super::types::{Edge, Entity, EntityKey};

/// Layout tuning constants. The defaults were arrived at visually; they are
/// configuration, not correctness requirements.
#[derive(Clone, Debug)]
pub struct SimParams {
	/// Spring impulse coefficient along edges.
	pub spring: f64,
	/// Repulsion numerator between node pairs.
	pub repulsion: f64,
	/// Softening added to the squared distance in the repulsion denominator.
	pub softening: f64,
	/// Per-tick velocity retention.
	pub damping: f64,
	/// Pull toward the canvas center, per unit of offset.
	pub centering: f64,
	/// Distance floor for the spring pass.
	pub min_distance: f64,
	/// Base spring rest length.
	pub rest_base: f64,
	/// Rest-length growth per ln(count + 1).
	pub rest_weight_scale: f64,
	/// Extra rest length when either endpoint is a seed, keeping anchor
	/// entities visually distinct from discovered satellites.
	pub seed_margin: f64,
	/// Ring radius for placing freshly introduced nodes.
	pub spawn_radius: f64,
}

impl Default for SimParams {
	fn default() -> Self {
		Self {
			spring: 0.02,
			repulsion: 800.0,
			softening: 80.0,
			damping: 0.9,
			centering: 0.0005,
			min_distance: 4.0,
			rest_base: 50.0,
			rest_weight_scale: 6.0,
			seed_margin: 15.0,
			spawn_radius: 160.0,
		}
	}
}

impl SimParams {
	/// Spring rest length for an edge of the given weight.
	pub fn rest_length(&self, count: u64, seed_endpoint: bool) -> f64 {
		let base = self.rest_base + self.rest_weight_scale * ((count + 1) as f64).ln();
		if seed_endpoint {
			base + self.seed_margin
		} else {
			base
		}
	}
}

/// An entity with its mutable simulation state.
#[derive(Clone, Debug)]
pub struct SimNode {
	pub entity: Entity,
	pub x: f64,
	pub y: f64,
	pub vx: f64,
	pub vy: f64,
}

impl SimNode {
	pub fn key(&self) -> EntityKey {
		self.entity.key()
	}

	/// Identity check without allocating a key.
	pub fn is(&self, key: &EntityKey) -> bool {
		self.entity.entity_type == key.entity_type && self.entity.value == key.value
	}
}

/// Pointer override for the node currently held by the analyst. Exists only
/// between pointer-down and pointer-up; at most one drag is active at a time.
#[derive(Clone, Debug)]
pub struct DragState {
	pub key: EntityKey,
	pub x: f64,
	pub y: f64,
}

/// Advances the relaxation by one tick.
///
/// Edge endpoints resolve through `index`; edges referencing a missing node
/// are skipped rather than treated as errors. The dragged node, if any, has
/// its velocity zeroed and its position pinned to the pointer after all
/// forces accumulate, so releasing it leaves it exactly where it was held.
pub fn step(
	nodes: &mut [SimNode],
	edges: &[Edge],
	index: &HashMap<EntityKey, usize>,
	drag: Option<&DragState>,
	center: (f64, f64),
	params: &SimParams,
	rng: &mut SmallRng,
) {
	// Spring pass: pull each connected pair toward its rest length.
	for edge in edges {
		let (Some(&ai), Some(&bi)) = (index.get(&edge.a), index.get(&edge.b)) else {
			continue;
		};
		if ai == bi {
			continue;
		}
		let dx = nodes[bi].x - nodes[ai].x;
		let dy = nodes[bi].y - nodes[ai].y;
		let dist = (dx * dx + dy * dy).sqrt().max(params.min_distance);
		let seed_endpoint = nodes[ai].entity.is_seed() || nodes[bi].entity.is_seed();
		let rest = params.rest_length(edge.count, seed_endpoint);
		let diff = (dist - rest) / dist;
		let fx = dx * diff * params.spring;
		let fy = dy * diff * params.spring;
		nodes[ai].vx += fx;
		nodes[ai].vy += fy;
		nodes[bi].vx -= fx;
		nodes[bi].vy -= fy;
	}

	// Repulsion pass over all unordered pairs. Coincident nodes get a random
	// push so the force direction is defined.
	for i in 0..nodes.len() {
		for j in (i + 1)..nodes.len() {
			let mut dx = nodes[j].x - nodes[i].x;
			let mut dy = nodes[j].y - nodes[i].y;
			let mut d2 = dx * dx + dy * dy;
			if d2 < 1.0 {
				dx = rng.gen_range(-0.5..0.5);
				dy = rng.gen_range(-0.5..0.5);
				d2 = 1.0;
			}
			let rep = params.repulsion / (d2 + params.softening);
			let dist = d2.sqrt();
			let fx = dx / dist * rep;
			let fy = dy / dist * rep;
			nodes[i].vx -= fx;
			nodes[i].vy -= fy;
			nodes[j].vx += fx;
			nodes[j].vy += fy;
		}
	}

	// Centering, drag override, damped integration.
	for node in nodes.iter_mut() {
		node.vx += (center.0 - node.x) * params.centering;
		node.vy += (center.1 - node.y) * params.centering;
		if let Some(d) = drag {
			if node.is(&d.key) {
				node.vx = 0.0;
				node.vy = 0.0;
				node.x = d.x;
				node.y = d.y;
			}
		}
		node.x += node.vx;
		node.y += node.vy;
		node.vx *= params.damping;
		node.vy *= params.damping;
	}
}
