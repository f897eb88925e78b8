//! Link resolution.
//!
//! Raw link records name their endpoints by string id. Before the first
//! layout every endpoint is resolved to a [`NodeRef`] once; records that
//! cannot be resolved are dropped here so that later passes never meet a
//! dangling reference.

use std::collections::HashMap;

use log::warn;

use super::types::{Direction, GraphData, GraphNode};

/// Stable index of a node in [`ResolvedGraph::nodes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeRef(pub usize);

/// Stable index of a link in [`ResolvedGraph::links`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LinkRef(pub usize);

/// A link whose endpoints have been resolved to node references.
#[derive(Clone, Debug)]
pub struct ResolvedLink {
	/// Source endpoint.
	pub source: NodeRef,
	/// Target endpoint.
	pub target: NodeRef,
	/// Relation category.
	pub relation: String,
	/// Display text for the relation.
	pub relation_comment: String,
	/// Arrowheads to draw.
	pub direction: Direction,
}

impl ResolvedLink {
	/// The endpoint across `node`, if the link touches it.
	pub fn other(&self, node: NodeRef) -> Option<NodeRef> {
		if self.source == node {
			Some(self.target)
		} else if self.target == node {
			Some(self.source)
		} else {
			None
		}
	}
}

/// Counts of records dropped while loading and resolving.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolveReport {
	/// Node records that did not parse.
	pub unparsed_nodes: usize,
	/// Link records that did not parse.
	pub unparsed_links: usize,
	/// Nodes with an empty id.
	pub empty_ids: usize,
	/// Nodes whose id was already taken.
	pub duplicate_nodes: usize,
	/// Links with an endpoint that names no node.
	pub dangling_links: usize,
}

impl ResolveReport {
	/// All dropped records.
	pub fn total(&self) -> usize {
		self.unparsed_nodes
			+ self.unparsed_links
			+ self.empty_ids
			+ self.duplicate_nodes
			+ self.dangling_links
	}
}

/// Nodes and links after one-time endpoint resolution.
#[derive(Clone, Debug, Default)]
pub struct ResolvedGraph {
	nodes: Vec<GraphNode>,
	links: Vec<ResolvedLink>,
	index_by_id: HashMap<String, NodeRef>,
	report: ResolveReport,
}

impl ResolvedGraph {
	/// Resolves every link endpoint once, dropping what cannot be resolved.
	pub fn resolve(data: &GraphData) -> Self {
		let mut report = ResolveReport {
			unparsed_nodes: data.rejected_nodes,
			unparsed_links: data.rejected_links,
			..Default::default()
		};
		let mut nodes = Vec::with_capacity(data.nodes.len());
		let mut index_by_id = HashMap::with_capacity(data.nodes.len());

		for node in &data.nodes {
			if node.id.is_empty() {
				report.empty_ids += 1;
				continue;
			}
			if index_by_id.contains_key(&node.id) {
				warn!("focus-graph: duplicate node id {:?}, keeping the first", node.id);
				report.duplicate_nodes += 1;
				continue;
			}
			index_by_id.insert(node.id.clone(), NodeRef(nodes.len()));
			nodes.push(node.clone());
		}

		let mut links = Vec::with_capacity(data.links.len());
		for link in &data.links {
			let (Some(&source), Some(&target)) =
				(index_by_id.get(&link.source), index_by_id.get(&link.target))
			else {
				warn!(
					"focus-graph: dropping link {:?} -> {:?}, unknown endpoint",
					link.source, link.target
				);
				report.dangling_links += 1;
				continue;
			};
			links.push(ResolvedLink {
				source,
				target,
				relation: link.relation.clone(),
				relation_comment: link.relation_comment.clone(),
				direction: link.direction,
			});
		}

		if report.total() > 0 {
			warn!("focus-graph: {} malformed records skipped: {:?}", report.total(), report);
		}

		Self {
			nodes,
			links,
			index_by_id,
			report,
		}
	}

	/// Surviving nodes, indexed by [`NodeRef`].
	pub fn nodes(&self) -> &[GraphNode] {
		&self.nodes
	}

	/// Surviving links, indexed by [`LinkRef`].
	pub fn links(&self) -> &[ResolvedLink] {
		&self.links
	}

	/// The node behind `node`.
	pub fn node(&self, node: NodeRef) -> Option<&GraphNode> {
		self.nodes.get(node.0)
	}

	/// The link behind `link`.
	pub fn link(&self, link: LinkRef) -> Option<&ResolvedLink> {
		self.links.get(link.0)
	}

	/// Every node reference in index order.
	pub fn node_refs(&self) -> impl Iterator<Item = NodeRef> + '_ {
		(0..self.nodes.len()).map(NodeRef)
	}

	/// The node with id `id`.
	pub fn lookup(&self, id: &str) -> Option<NodeRef> {
		self.index_by_id.get(id).copied()
	}

	/// What was dropped on the way in.
	pub fn report(&self) -> &ResolveReport {
		&self.report
	}

	/// Distinct relation categories in first-seen order.
	pub fn relations(&self) -> Vec<String> {
		let mut seen = Vec::new();
		for link in &self.links {
			if !seen.contains(&link.relation) {
				seen.push(link.relation.clone());
			}
		}
		seen
	}

	/// Links whose relation passes `enabled`, in link-array order.
	pub fn filtered_links(&self, mut enabled: impl FnMut(&str) -> bool) -> Vec<LinkRef> {
		self.links
			.iter()
			.enumerate()
			.filter(|(_, link)| enabled(&link.relation))
			.map(|(i, _)| LinkRef(i))
			.collect()
	}
}

#[cfg(test)]
pub(crate) mod tests {
	use super::*;
	use crate::components::force_graph::types::GraphLink;

	pub(crate) fn node(id: &str) -> GraphNode {
		GraphNode {
			id: id.to_string(),
			label: None,
			color: None,
			group: None,
		}
	}

	pub(crate) fn link(source: &str, target: &str, relation: &str) -> GraphLink {
		GraphLink {
			source: source.to_string(),
			target: target.to_string(),
			relation: relation.to_string(),
			relation_comment: format!("{source} {relation} {target}"),
			direction: Direction::Forward,
		}
	}

	/// Nodes A..D with links A-B and B-C; D is isolated.
	pub(crate) fn abcd() -> ResolvedGraph {
		ResolvedGraph::resolve(&GraphData {
			nodes: ["A", "B", "C", "D"].into_iter().map(node).collect(),
			links: vec![link("A", "B", "knows"), link("B", "C", "owes")],
			..Default::default()
		})
	}

	#[test]
	fn resolves_endpoints_to_node_refs() {
		let graph = abcd();
		assert_eq!(graph.nodes().len(), 4);
		assert_eq!(graph.links().len(), 2);
		assert_eq!(graph.links()[1].source, NodeRef(1));
		assert_eq!(graph.links()[1].target, NodeRef(2));
		assert_eq!(graph.lookup("D"), Some(NodeRef(3)));
		assert_eq!(graph.report().total(), 0);
	}

	#[test]
	fn drops_malformed_records_before_any_pass() {
		let graph = ResolvedGraph::resolve(&GraphData {
			nodes: vec![node("A"), node("B"), node("A"), node("")],
			links: vec![
				link("A", "B", "knows"),
				link("A", "ghost", "knows"),
				link("", "B", "knows"),
			],
			..Default::default()
		});

		assert_eq!(graph.nodes().len(), 2);
		assert_eq!(graph.links().len(), 1);
		assert_eq!(
			graph.report(),
			&ResolveReport {
				empty_ids: 1,
				duplicate_nodes: 1,
				dangling_links: 2,
				..Default::default()
			}
		);
	}

	#[test]
	fn unparsed_records_reach_the_report() {
		let data: GraphData = serde_json::from_str(
			r#"{
				"nodes": [{"id": "A"}, {"group": "g"}, {"id": "B"}],
				"links": [
					{"source": "A", "target": "B", "relation": "knows"},
					{"source": "A", "relation": "knows"},
					{"source": "B", "target": "A", "relation": "owes", "direction": "backward"}
				]
			}"#,
		)
		.unwrap();
		let graph = ResolvedGraph::resolve(&data);

		assert_eq!(graph.nodes().len(), 2);
		assert_eq!(graph.links().len(), 2);
		assert_eq!(graph.links()[1].direction, Direction::None);
		assert_eq!(graph.relations(), vec!["knows", "owes"]);
		assert_eq!(graph.report().unparsed_nodes, 1);
		assert_eq!(graph.report().unparsed_links, 1);
		assert_eq!(graph.report().total(), 2);
	}

	#[test]
	fn relations_in_first_seen_order() {
		let graph = ResolvedGraph::resolve(&GraphData {
			nodes: vec![node("A"), node("B"), node("C")],
			links: vec![
				link("A", "B", "owes"),
				link("B", "C", "knows"),
				link("A", "C", "owes"),
			],
			..Default::default()
		});
		assert_eq!(graph.relations(), vec!["owes", "knows"]);
		assert_eq!(
			graph.filtered_links(|r| r == "owes"),
			vec![LinkRef(0), LinkRef(2)]
		);
	}
}
