//! Relationship graph derived from the entity snapshot.
//!
//! The builder turns a flat entity list into nodes and weighted edges; the
//! selector projects that graph down to the neighborhood an analyst is looking
//! at. Both are pure functions over immutable inputs.

mod avatar;
mod builder;
mod select;
mod types;

pub use avatar::{PLACEHOLDER_PALETTE, initials, placeholder_color};
pub use builder::{JitterSource, build_graph};
pub use select::{RiskFilter, select_subgraph};
pub use types::{
	Avatar, ConnectionKind, Edge, EdgeRisk, Entity, EntityId, Graph, Node, RiskLevel,
};
