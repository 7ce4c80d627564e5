//! Search and risk-filter projection of the relationship graph.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use super::types::{EntityId, Graph, RiskLevel};

/// Risk-level restriction applied after the search step.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum RiskFilter {
	#[default]
	All,
	Level(RiskLevel),
}

impl RiskFilter {
	fn admits(self, level: RiskLevel) -> bool {
		match self {
			RiskFilter::All => true,
			RiskFilter::Level(wanted) => wanted == level,
		}
	}
}

impl fmt::Display for RiskFilter {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			RiskFilter::All => f.write_str("all"),
			RiskFilter::Level(level) => f.write_str(level.as_str()),
		}
	}
}

impl FromStr for RiskFilter {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.eq_ignore_ascii_case("all") {
			return Ok(RiskFilter::All);
		}
		RiskLevel::ALL
			.into_iter()
			.find(|level| level.as_str().eq_ignore_ascii_case(s))
			.map(RiskFilter::Level)
			.ok_or_else(|| format!("unknown risk filter: {s}"))
	}
}

/// Computes the subgraph shown for a search term and risk filter.
///
/// A non-empty term keeps the matched nodes, every edge touching one of them,
/// and the direct neighbors reached through those edges. Neighbors of
/// neighbors are not followed. An unmatched term yields an empty graph. The
/// risk filter then keeps only nodes of the requested level and the edges
/// whose endpoints both survive. Input order is preserved.
pub fn select_subgraph(graph: &Graph, search: &str, filter: RiskFilter) -> Graph {
	let mut selected = if search.is_empty() {
		graph.clone()
	} else {
		search_neighborhood(graph, search)
	};

	if filter != RiskFilter::All {
		selected.nodes.retain(|node| filter.admits(node.risk_level));
		let surviving: HashSet<EntityId> = selected.nodes.iter().map(|n| n.id).collect();
		selected
			.edges
			.retain(|edge| surviving.contains(&edge.source) && surviving.contains(&edge.target));
	}

	selected
}

fn search_neighborhood(graph: &Graph, search: &str) -> Graph {
	let needle = search.to_lowercase();
	let matched: HashSet<EntityId> = graph
		.nodes
		.iter()
		.filter(|node| {
			node.name.to_lowercase().contains(&needle) || node.group.to_lowercase().contains(&needle)
		})
		.map(|node| node.id)
		.collect();

	if matched.is_empty() {
		return Graph::default();
	}

	let edges: Vec<_> = graph
		.edges
		.iter()
		.filter(|edge| matched.contains(&edge.source) || matched.contains(&edge.target))
		.cloned()
		.collect();

	let mut connected = matched;
	for edge in &edges {
		connected.insert(edge.source);
		connected.insert(edge.target);
	}

	let nodes = graph
		.nodes
		.iter()
		.filter(|node| connected.contains(&node.id))
		.cloned()
		.collect();

	Graph { nodes, edges }
}

#[cfg(test)]
mod tests {
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	use super::*;
	use crate::graph::builder::build_graph;
	use crate::graph::types::Entity;

	fn entity(id: u64, name: &str, group: &str, level: RiskLevel) -> Entity {
		Entity {
			id: EntityId(id),
			name: name.to_string(),
			group: group.to_string(),
			risk_score: 0.0,
			risk_level: level,
			image: None,
		}
	}

	fn build(entities: &[Entity]) -> Graph {
		build_graph(entities, &mut StdRng::seed_from_u64(1))
	}

	fn ids(graph: &Graph) -> Vec<u64> {
		graph.nodes.iter().map(|n| n.id.0).collect()
	}

	/// Chain a-b-c-d in one group at Medium risk plus an unrelated Low node.
	fn chain() -> Graph {
		let mut graph = build(&[
			entity(1, "Ann", "Legal", RiskLevel::Medium),
			entity(2, "Ben", "Legal", RiskLevel::Critical),
			entity(3, "Cat", "Legal", RiskLevel::Medium),
			entity(4, "Dan", "Legal", RiskLevel::Critical),
			entity(5, "Eve", "Ops", RiskLevel::Low),
		]);
		// Keep only the chain edges so one-hop expansion is observable.
		let chain = [(1, 2), (2, 3), (3, 4)];
		graph
			.edges
			.retain(|e| chain.contains(&(e.source.0, e.target.0)));
		graph
	}

	#[test]
	fn empty_search_and_all_filter_is_identity() {
		let graph = chain();
		assert_eq!(select_subgraph(&graph, "", RiskFilter::All), graph);
	}

	#[test]
	fn search_expands_exactly_one_hop() {
		let graph = chain();
		let view = select_subgraph(&graph, "ann", RiskFilter::All);
		assert_eq!(ids(&view), vec![1, 2]);
		assert_eq!(view.edges.len(), 1);

		let view = select_subgraph(&graph, "CAT", RiskFilter::All);
		assert_eq!(ids(&view), vec![2, 3, 4]);
		assert_eq!(view.edges.len(), 2);
	}

	#[test]
	fn search_matches_group_label() {
		let graph = chain();
		let view = select_subgraph(&graph, "ops", RiskFilter::All);
		assert_eq!(ids(&view), vec![5]);
		assert!(view.edges.is_empty());
	}

	#[test]
	fn unmatched_search_is_empty_result() {
		let graph = chain();
		let view = select_subgraph(&graph, "zelda", RiskFilter::All);
		assert!(view.is_empty());
		assert!(view.edges.is_empty());
	}

	#[test]
	fn scenario_search_for_carol_is_isolated() {
		let graph = build(&[
			entity(1, "Alice", "Finance", RiskLevel::Critical),
			entity(2, "Bob", "Finance", RiskLevel::Critical),
			entity(3, "Carol", "IT", RiskLevel::Low),
		]);
		let view = select_subgraph(&graph, "carol", RiskFilter::All);
		assert_eq!(ids(&view), vec![3]);
		assert!(view.edges.is_empty());
	}

	#[test]
	fn critical_filter_keeps_closed_edge_set() {
		let graph = chain();
		let view = select_subgraph(&graph, "", RiskFilter::Level(RiskLevel::Critical));
		assert_eq!(ids(&view), vec![2, 4]);
		for node in &view.nodes {
			assert_eq!(node.risk_level, RiskLevel::Critical);
		}
		let surviving: HashSet<_> = view.nodes.iter().map(|n| n.id).collect();
		for edge in &view.edges {
			assert!(surviving.contains(&edge.source) && surviving.contains(&edge.target));
		}
		// 2 and 4 are not directly linked in the chain.
		assert!(view.edges.is_empty());
	}

	#[test]
	fn search_then_filter_drops_dangling_edges() {
		let graph = chain();
		let view = select_subgraph(&graph, "cat", RiskFilter::Level(RiskLevel::Medium));
		assert_eq!(ids(&view), vec![3]);
		assert!(view.edges.is_empty());
	}

	#[test]
	fn selection_is_idempotent_and_connected() {
		let graph = build(
			&(0..20)
				.map(|i| {
					let level = RiskLevel::ALL[i as usize % 4];
					let group = ["Sales", "Ops", "Legal"][i as usize % 3];
					entity(i, &format!("User {i}"), group, level)
				})
				.collect::<Vec<_>>(),
		);
		let first = select_subgraph(&graph, "user 1", RiskFilter::All);
		let second = select_subgraph(&graph, "user 1", RiskFilter::All);
		assert_eq!(first, second);

		let matched: HashSet<EntityId> = first
			.nodes
			.iter()
			.filter(|n| n.name.to_lowercase().contains("user 1"))
			.map(|n| n.id)
			.collect();
		for node in &first.nodes {
			let reachable = matched.contains(&node.id)
				|| first.edges.iter().any(|e| {
					e.other(node.id)
						.is_some_and(|other| matched.contains(&other))
				});
			assert!(reachable, "node {} is not adjacent to a match", node.id);
		}
	}

	#[test]
	fn risk_filter_parses_from_control_values() {
		assert_eq!("all".parse::<RiskFilter>(), Ok(RiskFilter::All));
		assert_eq!(
			"critical".parse::<RiskFilter>(),
			Ok(RiskFilter::Level(RiskLevel::Critical))
		);
		assert!("severe".parse::<RiskFilter>().is_err());
		assert_eq!(RiskFilter::Level(RiskLevel::High).to_string(), "High");
	}
}
