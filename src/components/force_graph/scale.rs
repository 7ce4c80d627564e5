//! Zoom-dependent sizing of graph visuals and the zoom limits themselves.
//!
//! # Coordinate Spaces
//!
//! - **World-space**: the coordinate system of the layout simulation. Values in
//!   world-space appear larger when zoomed in.
//! - **Screen-space**: canvas pixels. Values in screen-space keep their size
//!   regardless of zoom.
//!
//! Every visual property picks a [`ScaleBehavior`]; [`ScaledValues`] resolves
//! them once per frame for the current zoom factor `k`.

/// How a size reacts to the zoom factor.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant world-space size.
	World,
	/// Constant screen-space size.
	Screen,
	/// World-space size kept within `min_screen..=max_screen` pixels.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// World-space value for `base` at zoom `k`.
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

/// How an opacity multiplier reacts to the zoom factor.
#[derive(Clone, Debug)]
pub enum AlphaBehavior {
	Constant,
	/// Invisible at `zero_alpha_k`, fully visible at `full_alpha_k`.
	Fade { zero_alpha_k: f64, full_alpha_k: f64 },
}

impl AlphaBehavior {
	pub fn apply(&self, k: f64) -> f64 {
		match self {
			AlphaBehavior::Constant => 1.0,
			AlphaBehavior::Fade {
				zero_alpha_k,
				full_alpha_k,
			} => {
				if zero_alpha_k == full_alpha_k {
					return 1.0;
				}
				((k - zero_alpha_k) / (full_alpha_k - zero_alpha_k)).clamp(0.0, 1.0)
			}
		}
	}
}

/// Node avatar sizing.
#[derive(Clone, Debug)]
pub struct NodeScaleConfig {
	/// Avatar radius in world units.
	pub radius: f64,
	pub radius_behavior: ScaleBehavior,
	/// Pointer hit radius in world units.
	pub hit_radius: f64,
	pub hit_behavior: ScaleBehavior,
	/// Name label size in screen pixels.
	pub label_size: f64,
	/// Labels stop shrinking below this zoom.
	pub label_min_k: f64,
	/// Labels are hidden below this zoom.
	pub label_hide_k: f64,
}

/// Edge sizing. Width is interpolated by relationship strength.
#[derive(Clone, Debug)]
pub struct EdgeScaleConfig {
	/// Width in screen pixels of a strength-0 edge.
	pub min_width: f64,
	/// Width in screen pixels of a strength-1 edge.
	pub max_width: f64,
	/// Dash pattern (dash, gap) in world units for suspicious-activity edges.
	pub dash_pattern: (f64, f64),
	/// Dash flow speed in world units per second.
	pub flow_speed: f64,
	pub dash_alpha_behavior: AlphaBehavior,
}

/// Hover and selection rings.
#[derive(Clone, Debug)]
pub struct RingScaleConfig {
	/// Risk ring width in screen pixels.
	pub risk_width: f64,
	/// Selection ring width in screen pixels.
	pub selected_width: f64,
	/// Gap between avatar and outer rings in screen pixels.
	pub offset: f64,
	/// Glow radius multiplier for hovered nodes.
	pub glow_radius: f64,
}

/// Bounds and step of the view zoom.
#[derive(Clone, Debug)]
pub struct ZoomConfig {
	/// Smallest zoom factor.
	pub min_k: f64,
	/// Largest zoom factor.
	pub max_k: f64,
	/// Multiplier applied per wheel notch.
	pub wheel_step: f64,
}

impl ZoomConfig {
	/// Clamps `k` into the zoom bounds.
	pub fn clamp(&self, k: f64) -> f64 {
		k.clamp(self.min_k, self.max_k)
	}
}

/// Complete scale configuration.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Avatar, hit target and label sizing.
	pub node: NodeScaleConfig,
	/// Edge widths and dash flow.
	pub edge: EdgeScaleConfig,
	/// Risk and selection rings.
	pub ring: RingScaleConfig,
	/// Zoom bounds.
	pub zoom: ZoomConfig,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				radius: 18.0,
				radius_behavior: ScaleBehavior::World,
				hit_radius: 20.0,
				hit_behavior: ScaleBehavior::Clamped {
					min_screen: 8.0,
					max_screen: f64::INFINITY,
				},
				label_size: 11.0,
				label_min_k: 0.75,
				label_hide_k: 0.6,
			},
			edge: EdgeScaleConfig {
				min_width: 1.0,
				max_width: 4.0,
				dash_pattern: (8.0, 5.0),
				flow_speed: 14.0,
				dash_alpha_behavior: AlphaBehavior::Fade {
					zero_alpha_k: 0.5,
					full_alpha_k: 0.9,
				},
			},
			ring: RingScaleConfig {
				risk_width: 3.0,
				selected_width: 2.0,
				offset: 3.0,
				glow_radius: 2.2,
			},
			zoom: ZoomConfig {
				min_k: 0.5,
				max_k: 3.0,
				wheel_step: 1.1,
			},
		}
	}
}

/// Scale values resolved for one zoom level. Build once per frame.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	pub k: f64,
	pub node_radius: f64,
	pub hit_radius: f64,
	pub label_font: String,
	pub initials_font: String,
	pub show_labels: bool,
	pub edge_min_width: f64,
	pub edge_max_width: f64,
	pub dash_pattern: (f64, f64),
	pub dash_alpha: f64,
	pub risk_ring_width: f64,
	pub selected_ring_width: f64,
	pub ring_offset: f64,
}

impl ScaledValues {
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let node_radius = config.node.radius_behavior.apply(config.node.radius, k);
		let label_size = config.node.label_size / k.max(config.node.label_min_k);
		Self {
			k,
			node_radius,
			hit_radius: config.node.hit_behavior.apply(config.node.hit_radius, k),
			label_font: format!("{}px sans-serif", label_size),
			initials_font: format!("bold {}px sans-serif", node_radius * 0.8),
			show_labels: k >= config.node.label_hide_k,
			edge_min_width: config.edge.min_width / k,
			edge_max_width: config.edge.max_width / k,
			dash_pattern: config.edge.dash_pattern,
			dash_alpha: config.edge.dash_alpha_behavior.apply(k),
			risk_ring_width: config.ring.risk_width / k,
			selected_ring_width: config.ring.selected_width / k,
			ring_offset: config.ring.offset / k,
		}
	}

	/// Edge width for a relationship strength in `[0, 1]`.
	pub fn edge_width(&self, strength: f64) -> f64 {
		let t = strength.clamp(0.0, 1.0);
		self.edge_min_width + (self.edge_max_width - self.edge_min_width) * t
	}

	/// Dash offset for the flow animation at `flow_time` seconds.
	pub fn dash_offset(&self, flow_time: f64, flow_speed: f64) -> f64 {
		-flow_time * flow_speed
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clamped_behavior_respects_screen_bounds() {
		let b = ScaleBehavior::Clamped {
			min_screen: 8.0,
			max_screen: 30.0,
		};
		// At k = 0.25 a world radius of 20 would be 5px on screen.
		assert_eq!(b.apply(20.0, 0.25), 32.0);
		assert_eq!(b.apply(20.0, 1.0), 20.0);
		assert_eq!(b.apply(20.0, 3.0), 10.0);
		assert_eq!(ScaleBehavior::Screen.apply(4.0, 2.0), 2.0);
		assert_eq!(ScaleBehavior::World.apply(4.0, 2.0), 4.0);
	}

	#[test]
	fn dash_fades_out_when_zoomed_out() {
		let config = ScaleConfig::default();
		assert_eq!(ScaledValues::new(&config, 0.5).dash_alpha, 0.0);
		assert_eq!(ScaledValues::new(&config, 1.0).dash_alpha, 1.0);
	}

	#[test]
	fn edge_width_tracks_strength() {
		let scaled = ScaledValues::new(&ScaleConfig::default(), 1.0);
		assert_eq!(scaled.edge_width(0.0), 1.0);
		assert_eq!(scaled.edge_width(1.0), 4.0);
		assert_eq!(scaled.edge_width(7.0), 4.0);
	}

	#[test]
	fn zoom_is_bounded() {
		let zoom = ScaleConfig::default().zoom;
		assert_eq!(zoom.clamp(0.1), 0.5);
		assert_eq!(zoom.clamp(10.0), 3.0);
		assert_eq!(zoom.clamp(1.7), 1.7);
	}
}
