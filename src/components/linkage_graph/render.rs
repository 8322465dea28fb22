//! Canvas rendering for the linkage graph.
//!
//! Drawing runs in passes for correct z-ordering: background, then edges and
//! nodes in world space under the pan/zoom transform, then the screen-space
//! status strip (counts, truncation warning, edge-detail line).

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::scale::{ScaleConfig, ScaledValues};
use super::state::LinkageGraphState;
use super::theme::Theme;
use super::types::Entity;

/// Renders the complete graph to the canvas.
pub fn render(
	state: &LinkageGraphState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let scale = ScaledValues::new(config, state.transform.k);

	draw_background(state, ctx, theme);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	draw_edges(state, ctx, &scale, theme);
	draw_nodes(state, ctx, &scale, theme);

	ctx.restore();

	draw_status(state, ctx, theme);
}

fn draw_background(state: &LinkageGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	if theme.background.use_gradient {
		let gradient = ctx
			.create_radial_gradient(
				state.width / 2.0,
				state.height / 2.0,
				0.0,
				state.width / 2.0,
				state.height / 2.0,
				(state.width.max(state.height)) * 0.8,
			)
			.unwrap();

		gradient
			.add_color_stop(0.0, &theme.background.color_secondary.to_css())
			.unwrap();
		gradient
			.add_color_stop(1.0, &theme.background.color.to_css())
			.unwrap();

		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
	} else {
		ctx.set_fill_style_str(&theme.background.color.to_css());
	}

	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_edges(
	state: &LinkageGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	for edge in state.edges() {
		let (Some(a), Some(b)) = (state.node_by_key(&edge.a), state.node_by_key(&edge.b))
		else {
			continue;
		};
		let selected = state
			.detail
			.as_ref()
			.is_some_and(|d| edge.connects(&d.a, &d.b));
		let color = if selected {
			theme.edge.selected_color
		} else {
			theme.edge.color
		};
		let width = scale.edge_width(edge.count) * if selected { 1.5 } else { 1.0 };

		ctx.set_stroke_style_str(&color.to_css());
		ctx.set_line_width(width);
		ctx.begin_path();
		ctx.move_to(a.x, a.y);
		ctx.line_to(b.x, b.y);
		ctx.stroke();
	}
}

fn draw_nodes(
	state: &LinkageGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
) {
	for node in state.nodes() {
		let radius = scale.node_radius;
		let color = theme.palette.get(node.entity.entity_type);

		if theme.node.use_gradient {
			let gradient = ctx
				.create_radial_gradient(
					node.x - radius * 0.3,
					node.y - radius * 0.3,
					0.0,
					node.x,
					node.y,
					radius,
				)
				.unwrap();
			gradient
				.add_color_stop(0.0, &color.lighten(0.4).to_css())
				.unwrap();
			gradient.add_color_stop(0.7, &color.to_css()).unwrap();
			gradient
				.add_color_stop(1.0, &color.darken(0.2).to_css())
				.unwrap();

			ctx.begin_path();
			let _ = ctx.arc(node.x, node.y, radius, 0.0, 2.0 * PI);
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
			ctx.fill();
		} else {
			ctx.begin_path();
			let _ = ctx.arc(node.x, node.y, radius, 0.0, 2.0 * PI);
			ctx.set_fill_style_str(&color.to_css());
			ctx.fill();
		}

		// Seeds carry a heavier white ring than discovered satellites.
		let (ring, ring_width) = if node.entity.is_seed() {
			(theme.node.seed_ring, scale.ring_width * 1.6)
		} else {
			(theme.node.satellite_ring, scale.ring_width)
		};
		ctx.begin_path();
		let _ = ctx.arc(node.x, node.y, radius, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(&ring.to_css());
		ctx.set_line_width(ring_width);
		ctx.stroke();

		ctx.set_fill_style_str(&theme.node.label.to_css());
		ctx.set_font(&scale.label_font);
		ctx.set_text_align("center");
		let _ = ctx.fill_text(&abbreviate(&node.entity), node.x, node.y + radius * 0.2);
	}
	ctx.set_text_align("start");
}

fn draw_status(state: &LinkageGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let Some(snapshot) = state.snapshot() else {
		return;
	};

	ctx.set_font("11px sans-serif");
	let y = state.height - 10.0;
	let line = format!(
		"nodes: {} | edges: {} | orders analyzed: {}",
		state.nodes().len(),
		state.edges().len(),
		snapshot.order_count
	);
	ctx.set_fill_style_str(&theme.status.text.to_css());
	let _ = ctx.fill_text(&line, 10.0, y);

	if snapshot.truncated {
		ctx.set_fill_style_str(&theme.status.warn.to_css());
		let _ = ctx.fill_text("TRUNCATED", 10.0 + (line.len() as f64) * 6.0, y);
	}

	if let Some(detail) = state.detail_line() {
		ctx.set_fill_style_str(&theme.status.text.to_css());
		let _ = ctx.fill_text(&detail, 10.0, y - 16.0);
	}
}

/// Short label drawn inside a node: IPs collapse to their first two octets,
/// other values truncate to four characters.
fn abbreviate(entity: &Entity) -> String {
	use super::types::EntityType;
	if entity.entity_type == EntityType::Ip {
		let octets: Vec<&str> = entity.value.split('.').take(2).collect();
		format!("{}*", octets.join("."))
	} else {
		entity.value.chars().take(4).collect()
	}
}
