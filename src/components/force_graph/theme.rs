//! Visual theming for the risk graph.
//!
//! Colors are keyed by risk so analysts read severity before anything else:
//! avatar rings by entity risk level, edges by edge risk.

use crate::graph::{EdgeRisk, RiskLevel};

/// RGBA color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten towards white (0.0 = unchanged, 1.0 = white).
	pub fn lighten(self, factor: f64) -> Self {
		self.lerp(Color::rgba(255, 255, 255, self.a), factor)
	}

	/// Darken towards black (0.0 = unchanged, 1.0 = black).
	pub fn darken(self, factor: f64) -> Self {
		self.lerp(Color::rgba(0, 0, 0, self.a), factor)
	}

	/// Linear blend towards `other`, `t` clamped to `[0, 1]`.
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
		Self {
			r: mix(self.r, other.r),
			g: mix(self.g, other.g),
			b: mix(self.b, other.b),
			a: self.a * (1.0 - t) + other.a * t,
		}
	}

	/// CSS color string, hex when opaque.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}

	/// Parses `#rrggbb`, `rgb(..)` and `rgba(..)`. Anything else is mid gray.
	pub fn parse(css: &str) -> Color {
		let fallback = Color::rgb(128, 128, 128);
		if let Some(hex) = css.strip_prefix('#') {
			if hex.len() != 6 || !hex.is_ascii() {
				return fallback;
			}
			let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).unwrap_or(128);
			return Color::rgb(channel(0), channel(2), channel(4));
		}
		if css.starts_with("rgb") {
			let parts: Vec<&str> = css
				.trim_start_matches("rgba(")
				.trim_start_matches("rgb(")
				.trim_end_matches(')')
				.split(',')
				.map(str::trim)
				.collect();
			let channel = |i: usize| parts.get(i).and_then(|s| s.parse().ok()).unwrap_or(128);
			let alpha = parts.get(3).and_then(|s| s.parse().ok()).unwrap_or(1.0);
			return Color::rgba(channel(0), channel(1), channel(2), alpha);
		}
		fallback
	}
}

/// Per-level colors for entity risk rings.
#[derive(Clone, Debug)]
pub struct RiskPalette {
	pub low: Color,
	pub medium: Color,
	pub high: Color,
	pub critical: Color,
}

impl RiskPalette {
	/// Ring color for an entity risk level.
	pub fn level(&self, level: RiskLevel) -> Color {
		match level {
			RiskLevel::Low => self.low,
			RiskLevel::Medium => self.medium,
			RiskLevel::High => self.high,
			RiskLevel::Critical => self.critical,
		}
	}

	/// Stroke color for an edge risk.
	pub fn edge(&self, risk: EdgeRisk) -> Color {
		match risk {
			EdgeRisk::Low => self.low,
			EdgeRisk::Medium => self.medium,
			EdgeRisk::High => self.high,
		}
	}
}

/// Background fill.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	pub color: Color,
	pub color_secondary: Color,
	pub use_gradient: bool,
	/// Vignette intensity (0.0 = none).
	pub vignette: f64,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Name accepted by [`Theme::by_name`].
	pub name: &'static str,
	/// Canvas fill behind the graph.
	pub background: BackgroundStyle,
	/// Ring and edge colors by risk.
	pub risk: RiskPalette,
	/// Base opacity of edges when nothing is highlighted.
	pub edge_alpha: f64,
	/// Node label text.
	pub label: Color,
	/// Ring around the selected node.
	pub selection: Color,
	/// Shade avatars with a radial gradient.
	pub node_gradient: bool,
}

impl Theme {
	/// Slate background with conventional traffic-light risk colors.
	pub fn default_theme() -> Self {
		Self {
			name: "default",
			background: BackgroundStyle {
				color: Color::rgb(22, 27, 34),
				color_secondary: Color::rgb(30, 35, 42),
				use_gradient: true,
				vignette: 0.15,
			},
			risk: RiskPalette {
				low: Color::rgb(76, 175, 80),
				medium: Color::rgb(255, 193, 7),
				high: Color::rgb(255, 112, 67),
				critical: Color::rgb(229, 57, 53),
			},
			edge_alpha: 0.55,
			label: Color::rgba(255, 255, 255, 0.85),
			selection: Color::rgb(100, 181, 246),
			node_gradient: true,
		}
	}

	/// Darker, flatter variant for dim rooms.
	pub fn midnight() -> Self {
		Self {
			name: "midnight",
			background: BackgroundStyle {
				color: Color::rgb(18, 20, 28),
				color_secondary: Color::rgb(18, 20, 28),
				use_gradient: false,
				vignette: 0.2,
			},
			risk: RiskPalette {
				low: Color::rgb(102, 187, 106).darken(0.15),
				medium: Color::rgb(255, 213, 79).darken(0.15),
				high: Color::rgb(255, 138, 101).darken(0.15),
				critical: Color::rgb(239, 83, 80).darken(0.1),
			},
			edge_alpha: 0.45,
			label: Color::rgba(220, 225, 235, 0.8),
			selection: Color::rgb(144, 202, 249),
			node_gradient: false,
		}
	}

	/// Looks a theme up by name, falling back to the default.
	pub fn by_name(name: &str) -> Self {
		match name {
			"midnight" => Self::midnight(),
			_ => Self::default_theme(),
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_hex_and_functional_notation() {
		assert_eq!(Color::parse("#1976d2"), Color::rgb(0x19, 0x76, 0xd2));
		assert_eq!(
			Color::parse("rgba(10, 20, 30, 0.5)"),
			Color::rgba(10, 20, 30, 0.5)
		);
		assert_eq!(Color::parse("rgb(1,2,3)"), Color::rgb(1, 2, 3));
		assert_eq!(Color::parse("teal"), Color::rgb(128, 128, 128));
	}

	#[test]
	fn css_output_drops_opaque_alpha() {
		assert_eq!(Color::rgb(255, 0, 16).to_css(), "#ff0010");
		assert_eq!(
			Color::rgb(255, 0, 16).with_alpha(0.5).to_css(),
			"rgba(255, 0, 16, 0.5)"
		);
	}

	#[test]
	fn unknown_theme_name_falls_back() {
		assert_eq!(Theme::by_name("midnight").name, "midnight");
		assert_eq!(Theme::by_name("neon").name, "default");
	}
}
