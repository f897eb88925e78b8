//! Per-node incident link counts.

use log::warn;

use super::graph::{NodeRef, ResolvedLink};
use super::types::GraphNode;

/// Incident link count for every known node under one filtered link set.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DegreeMap {
	counts: Vec<usize>,
	skipped: usize,
}

impl DegreeMap {
	/// Degree of `node`; 0 for anything outside the node set.
	pub fn get(&self, node: NodeRef) -> usize {
		self.counts.get(node.0).copied().unwrap_or(0)
	}

	/// Links ignored because an endpoint was not a known node.
	pub fn skipped(&self) -> usize {
		self.skipped
	}

	/// Sum of all degrees; twice the counted links.
	pub fn total(&self) -> usize {
		self.counts.iter().sum()
	}

	/// Every node with its degree, in index order.
	pub fn iter(&self) -> impl Iterator<Item = (NodeRef, usize)> + '_ {
		self.counts.iter().enumerate().map(|(i, &c)| (NodeRef(i), c))
	}
}

/// Counts links touching each node. A self-loop counts twice.
pub fn compute_degrees<'a>(
	nodes: &[GraphNode],
	links: impl IntoIterator<Item = &'a ResolvedLink>,
) -> DegreeMap {
	let mut counts = vec![0usize; nodes.len()];
	let mut skipped = 0;

	for link in links {
		if link.source.0 >= counts.len() || link.target.0 >= counts.len() {
			warn!(
				"focus-graph: link {:?} -> {:?} has no matching node, not counted",
				link.source, link.target
			);
			skipped += 1;
			continue;
		}
		counts[link.source.0] += 1;
		counts[link.target.0] += 1;
	}

	DegreeMap { counts, skipped }
}
