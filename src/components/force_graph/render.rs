//! Canvas rendering for the risk graph.
//!
//! Drawing happens in passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Edges, colored by edge risk and sized by strength (world space)
//! 3. Dimmed nodes, then highlighted and selected nodes on top
//! 4. Vignette (screen space)

use std::collections::HashMap;
use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use super::scale::{ScaleConfig, ScaledValues};
use super::state::ForceGraphState;
use super::theme::{Color, Theme};
use crate::graph::{Avatar, ConnectionKind, Edge, Node, initials, placeholder_color};

/// Avatar images keyed by source URL. Each image is requested once; nodes
/// show their placeholder until it has decoded.
#[derive(Default)]
pub struct ImageCache {
	images: HashMap<String, HtmlImageElement>,
}

impl ImageCache {
	/// The decoded image for `src`, starting the download on first use.
	fn ready(&mut self, src: &str) -> Option<&HtmlImageElement> {
		if !self.images.contains_key(src) {
			let image = HtmlImageElement::new().ok()?;
			image.set_src(src);
			self.images.insert(src.to_string(), image);
		}
		self.images
			.get(src)
			.filter(|image| image.complete() && image.natural_width() > 0)
	}
}

fn smooth_step(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

/// Renders the complete graph to the canvas.
pub fn render(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
	images: &mut ImageCache,
) {
	let scale = ScaledValues::new(config, state.transform.k);

	draw_background(state, ctx, theme);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	draw_edges(state, ctx, config, &scale, theme);
	draw_nodes(state, ctx, &scale, theme, images);

	ctx.restore();

	if theme.background.vignette > 0.0 {
		draw_vignette(state, ctx, theme);
	}
}

fn draw_background(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let (cx, cy) = (state.width / 2.0, state.height / 2.0);
	let gradient = theme
		.background
		.use_gradient
		.then(|| {
			ctx.create_radial_gradient(cx, cy, 0.0, cx, cy, state.width.max(state.height) * 0.8)
				.ok()
		})
		.flatten();

	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &theme.background.color_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &theme.background.color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&theme.background.color.to_css()),
	}

	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_vignette(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let (cx, cy) = (state.width / 2.0, state.height / 2.0);
	let Ok(gradient) = ctx.create_radial_gradient(
		cx,
		cy,
		state.width.min(state.height) * 0.3,
		cx,
		cy,
		state.width.max(state.height) * 0.7,
	) else {
		return;
	};

	let _ = gradient.add_color_stop(0.0, "rgba(0, 0, 0, 0)");
	let _ = gradient.add_color_stop(
		1.0,
		&Color::rgba(0, 0, 0, theme.background.vignette).to_css(),
	);

	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_edges(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	scale: &ScaledValues,
	theme: &Theme,
) {
	let dash_offset = scale.dash_offset(state.flow_time, config.edge.flow_speed);
	let max_t = smooth_step(state.highlight.max_intensity());

	for edge in &state.graph.edges {
		let (Some(s), Some(t)) = (state.index_of(edge.source), state.index_of(edge.target)) else {
			continue;
		};
		let (Some(p1), Some(p2)) = (state.position(s), state.position(t)) else {
			continue;
		};
		let edge_t = smooth_step(state.highlight.edge_intensity(s, t));
		draw_edge(ctx, scale, theme, edge, p1, p2, edge_t, max_t, dash_offset);
	}

	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

#[allow(clippy::too_many_arguments)]
fn draw_edge(
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	edge: &Edge,
	(x1, y1): (f64, f64),
	(x2, y2): (f64, f64),
	edge_t: f64,
	max_t: f64,
	dash_offset: f64,
) {
	let (dx, dy) = (x2 - x1, y2 - y1);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < scale.node_radius * 2.0 {
		return;
	}

	let base_width = scale.edge_width(edge.strength);
	let (alpha, width) = if edge_t > 0.01 {
		(
			theme.edge_alpha + (1.0 - theme.edge_alpha) * edge_t,
			base_width * (1.0 + 0.4 * edge_t),
		)
	} else if max_t > 0.01 {
		(theme.edge_alpha * (1.0 - 0.7 * max_t), base_width)
	} else {
		(theme.edge_alpha, base_width)
	};

	let color = theme.risk.edge(edge.risk);
	ctx.set_stroke_style_str(&color.with_alpha(alpha * color.a).to_css());
	ctx.set_line_width(width);

	// Suspicious links flow; dashes fade to solid when zoomed out.
	let gap = scale.dash_pattern.1 * scale.dash_alpha;
	if edge.kind == ConnectionKind::SuspiciousActivity && gap > 0.1 {
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(scale.dash_pattern.0),
			&JsValue::from_f64(gap),
		));
		ctx.set_line_dash_offset(dash_offset);
	} else {
		let _ = ctx.set_line_dash(&js_sys::Array::new());
	}

	let (ux, uy) = (dx / dist, dy / dist);
	ctx.begin_path();
	ctx.move_to(x1 + ux * scale.node_radius, y1 + uy * scale.node_radius);
	ctx.line_to(x2 - ux * scale.node_radius, y2 - uy * scale.node_radius);
	ctx.stroke();
}

fn draw_nodes(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	images: &mut ImageCache,
) {
	let max_t = smooth_step(state.highlight.max_intensity());
	let has_highlight = max_t > 0.01;
	let dim_alpha = if has_highlight { 1.0 - 0.6 * max_t } else { 1.0 };

	// Pass 1: everything outside the highlight, dimmed while one is active.
	for (idx, node) in state.graph.nodes.iter().enumerate() {
		if state.highlight.node_intensity(idx) > 0.001 || state.is_selected(idx) {
			continue;
		}
		if let Some(pos) = state.position(idx) {
			draw_node(ctx, scale, theme, images, node, pos, dim_alpha, 1.0);
		}
	}

	// Pass 2: highlighted and selected nodes on top.
	for (idx, node) in state.graph.nodes.iter().enumerate() {
		let node_t = smooth_step(state.highlight.node_intensity(idx));
		let selected = state.is_selected(idx);
		if node_t <= 0.001 && !selected {
			continue;
		}
		let Some((x, y)) = state.position(idx) else {
			continue;
		};

		let alpha = if selected {
			1.0
		} else {
			dim_alpha + (1.0 - dim_alpha) * node_t
		};
		let hover_t = smooth_step(state.highlight.ring_intensity(idx));
		let radius_mult = 1.0 + 0.15 * node_t + 0.1 * hover_t;
		draw_node(ctx, scale, theme, images, node, (x, y), alpha, radius_mult);

		let radius = scale.node_radius * radius_mult + scale.risk_ring_width / 2.0;
		if selected {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + scale.ring_offset, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&theme.selection.to_css());
			ctx.set_line_width(scale.selected_ring_width);
			ctx.stroke();
		}
		if hover_t > 0.01 {
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + scale.ring_offset * 2.5, 0.0, 2.0 * PI);
			ctx.set_stroke_style_str(&Color::rgba(255, 255, 255, 0.4 * hover_t).to_css());
			ctx.set_line_width(scale.selected_ring_width * 0.5);
			ctx.stroke();
		}
	}
}

/// Fill color and initials drawn inside a node's avatar circle. Image avatars
/// fall back to the name-keyed placeholder until their image has loaded.
fn avatar_visual(node: &Node) -> (Color, String) {
	match &node.avatar {
		Avatar::Placeholder { color, initials: letters } => (Color::parse(color), letters.clone()),
		Avatar::Image(_) => (Color::parse(placeholder_color(&node.name)), initials(&node.name)),
	}
}

fn avatar_image(node: &Node) -> Option<&str> {
	match &node.avatar {
		Avatar::Image(src) => Some(src.as_str()),
		Avatar::Placeholder { .. } => None,
	}
}

#[allow(clippy::too_many_arguments)]
fn draw_node(
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	images: &mut ImageCache,
	node: &Node,
	(x, y): (f64, f64),
	alpha: f64,
	radius_mult: f64,
) {
	let radius = scale.node_radius * radius_mult;
	let (fill, letters) = avatar_visual(node);

	ctx.set_global_alpha(alpha);

	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	let gradient = theme
		.node_gradient
		.then(|| {
			ctx.create_radial_gradient(x - radius * 0.3, y - radius * 0.3, 0.0, x, y, radius)
				.ok()
		})
		.flatten();
	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &fill.lighten(0.3).to_css());
			let _ = gradient.add_color_stop(0.7, &fill.to_css());
			let _ = gradient.add_color_stop(1.0, &fill.darken(0.2).to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&fill.to_css()),
	}
	ctx.fill();

	let image = avatar_image(node).and_then(|src| images.ready(src));
	if let Some(image) = image {
		ctx.save();
		ctx.clip();
		let _ = ctx.draw_image_with_html_image_element_and_dw_and_dh(
			image,
			x - radius,
			y - radius,
			radius * 2.0,
			radius * 2.0,
		);
		ctx.restore();
	}

	// Risk ring, on the avatar path still current after the clip.
	ctx.set_stroke_style_str(&theme.risk.level(node.risk_level).to_css());
	ctx.set_line_width(scale.risk_ring_width);
	ctx.stroke();

	ctx.set_text_align("center");
	if image.is_none() {
		ctx.set_fill_style_str("#ffffff");
		ctx.set_font(&scale.initials_font);
		ctx.set_text_baseline("middle");
		let _ = ctx.fill_text(&letters, x, y);
	}

	if scale.show_labels {
		ctx.set_fill_style_str(&theme.label.to_css());
		ctx.set_font(&scale.label_font);
		ctx.set_text_baseline("top");
		let _ = ctx.fill_text(&node.name, x, y + radius + scale.risk_ring_width + 2.0 / scale.k);
	}

	ctx.set_text_align("start");
	ctx.set_text_baseline("alphabetic");
	ctx.set_global_alpha(1.0);
}
