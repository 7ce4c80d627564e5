//! Entity, node and edge types shared by the builder, selector and layout.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a monitored entity. Serialized as a bare number.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// Ordinal risk category assigned to an entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
	/// Routine activity.
	#[serde(alias = "low", alias = "LOW")]
	Low,
	/// Worth a look.
	#[serde(alias = "medium", alias = "MEDIUM")]
	Medium,
	/// Needs review.
	#[serde(alias = "high", alias = "HIGH")]
	High,
	/// Needs review now.
	#[serde(alias = "critical", alias = "CRITICAL")]
	Critical,
}

impl RiskLevel {
	/// Every level, least severe first.
	pub const ALL: [RiskLevel; 4] = [
		RiskLevel::Low,
		RiskLevel::Medium,
		RiskLevel::High,
		RiskLevel::Critical,
	];

	/// Display name, as used in the risk filter and evidence panel.
	pub fn as_str(self) -> &'static str {
		match self {
			RiskLevel::Low => "Low",
			RiskLevel::Medium => "Medium",
			RiskLevel::High => "High",
			RiskLevel::Critical => "Critical",
		}
	}

	/// High and Critical entities are treated alike when pairing edges.
	pub fn is_elevated(self) -> bool {
		matches!(self, RiskLevel::High | RiskLevel::Critical)
	}
}

impl fmt::Display for RiskLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A monitored subject as supplied by the entity source.
///
/// Entities are immutable snapshots; nothing in the graph subsystem writes to
/// them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Entity {
	/// Unique id.
	pub id: EntityId,
	/// Display name.
	pub name: String,
	/// Group label, usually the department.
	#[serde(alias = "department")]
	pub group: String,
	/// Opaque risk score in `0..=100`.
	#[serde(default)]
	pub risk_score: f64,
	/// Category driving edge derivation and the ring color.
	pub risk_level: RiskLevel,
	/// Optional image reference used to decorate the node.
	#[serde(default, alias = "profile_image")]
	pub image: Option<String>,
}

/// How a node is decorated on the canvas.
#[derive(Clone, Debug, PartialEq)]
pub enum Avatar {
	/// Image reference supplied with the entity.
	Image(String),
	/// Generated placeholder keyed by display name.
	Placeholder {
		/// Palette fill, as a CSS hex color.
		color: String,
		/// Up to two letters drawn on the fill.
		initials: String,
	},
}

/// Graph representation of an [`Entity`].
///
/// Position is not stored here: the layout engine owns it for as long as the
/// node is on screen.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
	/// Id of the entity this node stands for.
	pub id: EntityId,
	/// Label drawn under the avatar.
	pub name: String,
	/// Group label copied from the entity.
	pub group: String,
	/// Score copied from the entity.
	pub risk_score: f64,
	/// Level copied from the entity.
	pub risk_level: RiskLevel,
	/// Avatar decoration.
	pub avatar: Avatar,
}

/// Discrete category of an inferred relationship.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ConnectionKind {
	/// Baseline link between low-risk entities.
	Communication,
	/// Link involving medium risk.
	FileSharing,
	/// Both ends elevated. Drawn with flowing dashes.
	SuspiciousActivity,
	/// Working relationship.
	Collaboration,
}

impl ConnectionKind {
	/// Lower-case label for tooltips.
	pub fn label(self) -> &'static str {
		match self {
			ConnectionKind::Communication => "communication",
			ConnectionKind::FileSharing => "file sharing",
			ConnectionKind::SuspiciousActivity => "suspicious activity",
			ConnectionKind::Collaboration => "collaboration",
		}
	}
}

/// Rendering-only risk label of an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeRisk {
	/// Pair with no elevated member and at most one medium one.
	Low,
	/// Pair of medium levels, or medium with elevated.
	Medium,
	/// Pair of elevated levels.
	High,
}

/// Weighted, undirected relationship between two nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	/// One endpoint. Undirected, so the order carries no meaning.
	pub source: EntityId,
	/// The other endpoint.
	pub target: EntityId,
	/// Relationship strength in `[0, 1]`.
	pub strength: f64,
	/// Relationship category.
	pub kind: ConnectionKind,
	/// Cosmetic interaction count. Never used for selection or layout.
	pub frequency: u32,
	/// Stroke color key.
	pub risk: EdgeRisk,
}

impl Edge {
	/// True when `id` is either endpoint.
	pub fn touches(&self, id: EntityId) -> bool {
		self.source == id || self.target == id
	}

	/// The endpoint opposite `id`, if `id` is an endpoint.
	pub fn other(&self, id: EntityId) -> Option<EntityId> {
		if self.source == id {
			Some(self.target)
		} else if self.target == id {
			Some(self.source)
		} else {
			None
		}
	}
}

/// Nodes plus edges. Used both for the full graph and for filtered views.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Graph {
	/// Nodes in entity order.
	pub nodes: Vec<Node>,
	/// Edges whose endpoints are both in `nodes`.
	pub edges: Vec<Edge>,
}

impl Graph {
	/// True when there are no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Node for `id`, if present.
	pub fn node(&self, id: EntityId) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}
}
