//! Dashboard configuration.
//!
//! Read once at start-up from the inline `<script id="dashboard-config">`
//! JSON. Every field is optional; missing fields take the defaults below.

use serde::Deserialize;

use crate::components::force_graph::SimulationConfig;

/// Default number of evidence records requested per investigation.
pub const DEFAULT_EVIDENCE_LIMIT: usize = 50;

/// Start-up settings for the dashboard.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
	/// Base URL of the entity/investigation API, without trailing slash.
	pub api_base: String,
	/// Evidence records requested per investigation. `null` means no limit.
	pub evidence_limit: Option<usize>,
	/// Canvas theme name, see [`Theme::by_name`](crate::components::force_graph::Theme::by_name).
	pub theme: String,
	/// Layout overrides.
	pub simulation: SimulationConfig,
}

impl Default for DashboardConfig {
	fn default() -> Self {
		Self {
			api_base: "/api".to_string(),
			evidence_limit: Some(DEFAULT_EVIDENCE_LIMIT),
			theme: "default".to_string(),
			simulation: SimulationConfig::default(),
		}
	}
}

impl DashboardConfig {
	/// Parses the inline config JSON. Unknown fields are ignored.
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn empty_object_uses_defaults() {
		assert_eq!(DashboardConfig::from_json("{}").unwrap(), DashboardConfig::default());
	}

	#[test]
	fn partial_overrides_keep_other_defaults() {
		let config = DashboardConfig::from_json(
			r#"{
				"api_base": "https://soc.example/api",
				"evidence_limit": null,
				"simulation": { "link_distance": 140 }
			}"#,
		)
		.unwrap();
		assert_eq!(config.api_base, "https://soc.example/api");
		assert_eq!(config.evidence_limit, None);
		assert_eq!(config.theme, "default");
		assert_eq!(config.simulation.link_distance, 140.0);
		assert_eq!(
			config.simulation.collide_radius,
			SimulationConfig::default().collide_radius
		);
	}

	#[test]
	fn malformed_json_is_an_error() {
		assert!(DashboardConfig::from_json("{\"api_base\": 3}").is_err());
	}
}
