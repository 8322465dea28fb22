//! Zoom-dependent scaling for graph visuals.
//!
//! Centralizes how visual sizes behave across zoom levels. World-space sizes
//! scale with the canvas transform; screen-space sizes divide by the zoom
//! factor `k` to stay a constant pixel size.

/// Defines how a visual property scales with zoom level.
#[derive(Clone, Debug)]
#[allow(
	dead_code,
	reason = "World/Screen variants complete the API for hosts customizing ScaleConfig"
)]
pub enum ScaleBehavior {
	/// Constant world-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels). Unaffected by zoom.
	Screen,
	/// World-space scaling, clamped to min/max screen-space bounds.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// Compute the world-space value for a base value and zoom level.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Configuration for node visual scaling.
#[derive(Clone, Debug)]
pub struct NodeScaleConfig {
	/// Base node radius in world units.
	pub radius: f64,
	/// How the node radius scales with zoom.
	pub radius_behavior: ScaleBehavior,
	/// Hit detection radius in world units.
	pub hit_radius: f64,
	/// How hit radius scales with zoom.
	pub hit_behavior: ScaleBehavior,
	/// Label font size in screen pixels.
	pub label_size: f64,
	/// Minimum zoom level for label font scaling.
	pub label_min_k: f64,
	/// Stroke width of the seed/satellite ring in screen pixels.
	pub ring_width: f64,
}

/// Configuration for edge visual scaling.
#[derive(Clone, Debug)]
pub struct EdgeScaleConfig {
	/// Base line width in world units before the weight term.
	pub width_base: f64,
	/// Width growth per ln(count + 1).
	pub width_weight_scale: f64,
	/// Cap on the weighted line width.
	pub width_max: f64,
	/// Click tolerance around an edge segment, in screen pixels.
	pub click_tolerance: f64,
}

/// Complete scale configuration for all graph elements.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	pub node: NodeScaleConfig,
	pub edge: EdgeScaleConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				radius: 14.0,
				radius_behavior: ScaleBehavior::Clamped {
					min_screen: 6.0,
					max_screen: f64::INFINITY,
				},
				hit_radius: 16.0,
				hit_behavior: ScaleBehavior::Clamped {
					min_screen: 8.0,
					max_screen: f64::INFINITY,
				},
				label_size: 8.0,
				label_min_k: 0.5,
				ring_width: 2.0,
			},
			edge: EdgeScaleConfig {
				width_base: 1.0,
				width_weight_scale: 1.0,
				width_max: 6.0,
				click_tolerance: 6.0,
			},
		}
	}
}

/// Pre-computed scale values for a specific zoom level.
///
/// Create this once per frame and pass it to rendering and hit testing. All
/// sizes are in world-space, ready to use after the canvas transform.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Current zoom level.
	pub k: f64,
	/// Node radius in world-space.
	pub node_radius: f64,
	/// Hit detection radius in world-space.
	pub hit_radius: f64,
	/// Label font string (e.g., "8px sans-serif").
	pub label_font: String,
	/// Ring stroke width in world-space.
	pub ring_width: f64,
	/// Edge click tolerance in world-space.
	pub edge_tolerance: f64,
	width_base: f64,
	width_weight_scale: f64,
	width_max: f64,
}

impl ScaledValues {
	/// Compute scaled values from configuration and current zoom level.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let label_font_size = config.node.label_size / k.max(config.node.label_min_k);
		Self {
			k,
			node_radius: config.node.radius_behavior.apply(config.node.radius, k),
			hit_radius: config.node.hit_behavior.apply(config.node.hit_radius, k),
			label_font: format!("{label_font_size}px sans-serif"),
			ring_width: config.node.ring_width / k,
			edge_tolerance: config.edge.click_tolerance / k,
			width_base: config.edge.width_base,
			width_weight_scale: config.edge.width_weight_scale,
			width_max: config.edge.width_max,
		}
	}

	/// Line width for an edge of the given order count, heavier links drawn
	/// thicker on a log scale.
	pub fn edge_width(&self, count: u64) -> f64 {
		(self.width_base + self.width_weight_scale * ((count + 1) as f64).ln())
			.min(self.width_max)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn edge_width_is_logarithmic_and_capped() {
		let scale = ScaledValues::new(&ScaleConfig::default(), 1.0);
		assert!(scale.edge_width(1) < scale.edge_width(10));
		assert_eq!(scale.edge_width(100_000), 6.0);
	}

	#[test]
	fn clamped_behavior_holds_screen_size_when_zoomed_out() {
		let behavior = ScaleBehavior::Clamped {
			min_screen: 6.0,
			max_screen: f64::INFINITY,
		};
		// Zoomed out 10x, a 14-unit radius would be 1.4px; clamp to 6px.
		assert_eq!(behavior.apply(14.0, 0.1), 60.0);
		// At 1:1 the world size wins.
		assert_eq!(behavior.apply(14.0, 1.0), 14.0);
	}
}
