//! Derives nodes and weighted edges from an entity snapshot.

use log::debug;
use rand::{Rng, RngCore};

use super::avatar::{initials, placeholder_color};
use super::types::{Avatar, ConnectionKind, Edge, EdgeRisk, Entity, Graph, Node, RiskLevel};

/// Strength contributed by two entities sharing a group.
const SAME_GROUP: f64 = 0.3;
/// Both entities High or Critical.
const ELEVATED_PAIR: f64 = 0.6;
/// Both Medium, or one Medium and one elevated.
const MEDIUM_PAIR: f64 = 0.4;
/// Any other pairing.
const BASELINE_PAIR: f64 = 0.2;
/// Edges at or below this accumulated strength are not emitted.
const KEEP_THRESHOLD: f64 = 0.3;
/// Interaction counts get `0..FREQUENCY_JITTER` added on top.
const FREQUENCY_JITTER: u32 = 20;

/// Source of the cosmetic jitter added to interaction frequencies.
///
/// Every [`RngCore`] is a jitter source, so callers pass a seeded
/// `StdRng` when they need reproducible output.
pub trait JitterSource {
	/// Returns a value in `0..bound`, or 0 when `bound` is 0.
	fn jitter(&mut self, bound: u32) -> u32;
}

impl<R: RngCore + ?Sized> JitterSource for R {
	fn jitter(&mut self, bound: u32) -> u32 {
		if bound == 0 {
			return 0;
		}
		self.gen_range(0..bound)
	}
}

/// Builds the relationship graph for a full entity snapshot.
///
/// Nodes map 1:1 onto entities in input order. Every unordered pair is
/// considered exactly once; lists with fewer than two entities produce no
/// edges.
pub fn build_graph<J: JitterSource + ?Sized>(entities: &[Entity], jitter: &mut J) -> Graph {
	let nodes: Vec<Node> = entities.iter().map(node_for).collect();

	let mut edges = Vec::new();
	for (i, a) in entities.iter().enumerate() {
		for b in &entities[i + 1..] {
			if a.id == b.id {
				continue;
			}
			if let Some(edge) = edge_between(a, b, jitter) {
				edges.push(edge);
			}
		}
	}

	debug!(
		"risk-graph: built {} nodes, {} edges from {} entities",
		nodes.len(),
		edges.len(),
		entities.len()
	);

	Graph { nodes, edges }
}

fn node_for(entity: &Entity) -> Node {
	let avatar = match &entity.image {
		Some(image) if !image.is_empty() => Avatar::Image(image.clone()),
		_ => Avatar::Placeholder {
			color: placeholder_color(&entity.name).to_string(),
			initials: initials(&entity.name),
		},
	};
	Node {
		id: entity.id,
		name: entity.name.clone(),
		group: entity.group.clone(),
		risk_score: entity.risk_score,
		risk_level: entity.risk_level,
		avatar,
	}
}

/// Category, edge risk and strength contribution for a pair of risk levels.
fn classify(a: RiskLevel, b: RiskLevel) -> (ConnectionKind, EdgeRisk, f64) {
	let medium = RiskLevel::Medium;
	if a.is_elevated() && b.is_elevated() {
		(ConnectionKind::SuspiciousActivity, EdgeRisk::High, ELEVATED_PAIR)
	} else if (a == medium && b == medium)
		|| (a.is_elevated() && b == medium)
		|| (a == medium && b.is_elevated())
	{
		(ConnectionKind::FileSharing, EdgeRisk::Medium, MEDIUM_PAIR)
	} else {
		(ConnectionKind::Communication, EdgeRisk::Low, BASELINE_PAIR)
	}
}

fn edge_between<J: JitterSource + ?Sized>(a: &Entity, b: &Entity, jitter: &mut J) -> Option<Edge> {
	let mut accumulated = 0.0;
	if a.group == b.group {
		accumulated += SAME_GROUP;
	}
	let (kind, risk, contribution) = classify(a.risk_level, b.risk_level);
	accumulated += contribution;

	// Threshold and frequency both read the pre-clamp value.
	if accumulated <= KEEP_THRESHOLD {
		return None;
	}

	let frequency = (accumulated * 50.0).floor() as u32 + jitter.jitter(FREQUENCY_JITTER);
	Some(Edge {
		source: a.id,
		target: b.id,
		strength: accumulated.min(1.0),
		kind,
		frequency,
		risk,
	})
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;
	use crate::graph::types::EntityId;

	fn entity(id: u64, name: &str, group: &str, level: RiskLevel) -> Entity {
		Entity {
			id: EntityId(id),
			name: name.to_string(),
			group: group.to_string(),
			risk_score: 50.0,
			risk_level: level,
			image: None,
		}
	}

	fn scenario() -> Vec<Entity> {
		vec![
			entity(1, "Alice", "Finance", RiskLevel::Critical),
			entity(2, "Bob", "Finance", RiskLevel::Critical),
			entity(3, "Carol", "IT", RiskLevel::Low),
		]
	}

	fn rng() -> StdRng {
		StdRng::seed_from_u64(7)
	}

	#[test]
	fn empty_and_single_entity_lists_have_no_edges() {
		let graph = build_graph(&[], &mut rng());
		assert!(graph.is_empty());
		assert!(graph.edges.is_empty());

		let one = [entity(1, "Alice", "Finance", RiskLevel::High)];
		let graph = build_graph(&one, &mut rng());
		assert_eq!(graph.nodes.len(), 1);
		assert!(graph.edges.is_empty());
	}

	#[test]
	fn scenario_keeps_only_the_critical_pair() {
		let graph = build_graph(&scenario(), &mut rng());
		assert_eq!(graph.nodes.len(), 3);
		assert_eq!(graph.edges.len(), 1);

		let edge = &graph.edges[0];
		assert_eq!((edge.source, edge.target), (EntityId(1), EntityId(2)));
		assert_eq!(edge.kind, ConnectionKind::SuspiciousActivity);
		assert_eq!(edge.risk, EdgeRisk::High);
		assert!((edge.strength - 0.9).abs() < 1e-9);
		assert!((45..45 + FREQUENCY_JITTER).contains(&edge.frequency));
	}

	#[test]
	fn same_group_elevated_pairs_all_connect() {
		let levels = [RiskLevel::High, RiskLevel::Critical];
		let entities: Vec<Entity> = (0..6)
			.map(|i| entity(i, &format!("E{i}"), "Ops", levels[i as usize % 2]))
			.collect();
		let graph = build_graph(&entities, &mut rng());

		assert_eq!(graph.edges.len(), 6 * 5 / 2);
		let mut pairs = HashSet::new();
		for edge in &graph.edges {
			assert_ne!(edge.source, edge.target);
			assert!((edge.strength - 0.9).abs() < 1e-9);
			assert_eq!(edge.kind, ConnectionKind::SuspiciousActivity);
			let key = (edge.source.min(edge.target), edge.source.max(edge.target));
			assert!(pairs.insert(key), "duplicate pair {key:?}");
		}
	}

	#[test]
	fn medium_pairings_share_files() {
		let entities = [
			entity(1, "A", "Sales", RiskLevel::Medium),
			entity(2, "B", "Legal", RiskLevel::High),
			entity(3, "C", "HR", RiskLevel::Medium),
		];
		let graph = build_graph(&entities, &mut rng());
		assert_eq!(graph.edges.len(), 3);
		for edge in &graph.edges {
			assert_eq!(edge.kind, ConnectionKind::FileSharing);
			assert_eq!(edge.risk, EdgeRisk::Medium);
			assert!((edge.strength - 0.4).abs() < 1e-9);
		}
	}

	#[test]
	fn low_risk_pairs_need_a_shared_group() {
		let entities = [
			entity(1, "A", "IT", RiskLevel::Low),
			entity(2, "B", "IT", RiskLevel::Low),
			entity(3, "C", "HR", RiskLevel::Low),
			entity(4, "D", "HR", RiskLevel::Critical),
		];
		let graph = build_graph(&entities, &mut rng());
		let pairs: Vec<(u64, u64)> = graph
			.edges
			.iter()
			.map(|e| (e.source.0, e.target.0))
			.collect();
		// (3, 4) is Low/Critical in the same group: 0.3 + 0.2.
		assert_eq!(pairs, vec![(1, 2), (3, 4)]);
		for edge in &graph.edges {
			assert_eq!(edge.kind, ConnectionKind::Communication);
			assert!((edge.strength - 0.5).abs() < 1e-9);
		}
	}

	#[test]
	fn seeded_jitter_is_reproducible() {
		let entities: Vec<Entity> = (0..8)
			.map(|i| entity(i, &format!("E{i}"), "Ops", RiskLevel::High))
			.collect();
		let first = build_graph(&entities, &mut StdRng::seed_from_u64(42));
		let second = build_graph(&entities, &mut StdRng::seed_from_u64(42));
		assert_eq!(first, second);
	}

	#[test]
	fn image_reference_overrides_placeholder() {
		let mut with_image = entity(1, "Dana Scully", "X", RiskLevel::Low);
		with_image.image = Some("/img/dana.png".into());
		let without = entity(2, "Fox Mulder", "X", RiskLevel::Low);
		let graph = build_graph(&[with_image, without], &mut rng());

		assert_eq!(graph.nodes[0].avatar, Avatar::Image("/img/dana.png".into()));
		match &graph.nodes[1].avatar {
			Avatar::Placeholder { initials, color } => {
				assert_eq!(initials, "FM");
				assert!(color.starts_with('#'));
			}
			other => panic!("expected placeholder, got {other:?}"),
		}
	}
}
