//! Breadth-first layer assignment from the focus node.
//!
//! Links are traversed as undirected edges; their direction only matters to
//! the renderer. Nodes that cannot be reached under the current filter are
//! left out of the [`LayerMap`] and callers must treat them as unreached.

use std::collections::{HashMap, VecDeque};

use super::graph::{NodeRef, ResolvedLink};
use super::types::GraphNode;

/// BFS distance from the focus for every reached node.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LayerMap {
	layers: HashMap<NodeRef, u32>,
	/// Reached nodes in visiting order.
	order: Vec<NodeRef>,
}

impl LayerMap {
	/// Layer of `node`, or `None` when it was not reached.
	pub fn get(&self, node: NodeRef) -> Option<u32> {
		self.layers.get(&node).copied()
	}

	/// Whether the BFS reached `node`.
	pub fn contains(&self, node: NodeRef) -> bool {
		self.layers.contains_key(&node)
	}

	/// Number of reached nodes.
	pub fn len(&self) -> usize {
		self.layers.len()
	}

	/// True when nothing was reached.
	pub fn is_empty(&self) -> bool {
		self.layers.is_empty()
	}

	/// Reached nodes in the order BFS settled them.
	pub fn visit_order(&self) -> &[NodeRef] {
		&self.order
	}

	/// Deepest layer reached, if any node was.
	pub fn depth(&self) -> Option<u32> {
		self.layers.values().copied().max()
	}
}

/// Runs a BFS from `focus` over `links`.
///
/// Same-layer ties are broken by link-array order, so the result is
/// deterministic for a fixed focus and link ordering. A focus outside the
/// node set produces an empty map.
pub fn assign_layers<'a>(
	focus: NodeRef,
	nodes: &[GraphNode],
	links: impl IntoIterator<Item = &'a ResolvedLink>,
) -> LayerMap {
	let mut result = LayerMap::default();
	if focus.0 >= nodes.len() {
		return result;
	}

	// Adjacency in link order, so neighbour order matches a scan of the links.
	let mut neighbors: Vec<Vec<NodeRef>> = vec![Vec::new(); nodes.len()];
	for link in links {
		if link.source.0 >= nodes.len() || link.target.0 >= nodes.len() {
			continue;
		}
		neighbors[link.source.0].push(link.target);
		if link.source != link.target {
			neighbors[link.target.0].push(link.source);
		}
	}

	let mut visited = vec![false; nodes.len()];
	let mut queue = VecDeque::from([(focus, 0u32)]);

	while let Some((node, layer)) = queue.pop_front() {
		if visited[node.0] {
			continue;
		}
		visited[node.0] = true;
		result.layers.insert(node, layer);
		result.order.push(node);

		for &next in &neighbors[node.0] {
			if !visited[next.0] {
				queue.push_back((next, layer + 1));
			}
		}
	}

	result
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::graph::ResolvedGraph;
	use crate::components::force_graph::graph::tests::{abcd, link, node};
	use crate::components::force_graph::types::GraphData;

	#[test]
	fn layers_from_a() {
		let graph = abcd();
		let layers = assign_layers(graph.lookup("A").unwrap(), graph.nodes(), graph.links());

		let of = |id| layers.get(graph.lookup(id).unwrap());
		assert_eq!((of("A"), of("B"), of("C")), (Some(0), Some(1), Some(2)));
		assert_eq!(of("D"), None);
		assert_eq!(layers.len(), 3);
	}

	#[test]
	fn layers_from_c_ignore_direction() {
		let graph = abcd();
		let layers = assign_layers(graph.lookup("C").unwrap(), graph.nodes(), graph.links());

		let of = |id| layers.get(graph.lookup(id).unwrap());
		assert_eq!((of("C"), of("B"), of("A")), (Some(0), Some(1), Some(2)));
		assert!(!layers.contains(graph.lookup("D").unwrap()));
	}

	#[test]
	fn only_focus_is_layer_zero_and_neighbours_differ_by_at_most_one() {
		let graph = ResolvedGraph::resolve(&GraphData {
			nodes: ["a", "b", "c", "d", "e", "f"].into_iter().map(node).collect(),
			links: vec![
				link("a", "b", "r"),
				link("c", "a", "r"),
				link("b", "d", "r"),
				link("c", "d", "r"),
				link("d", "e", "r"),
				link("e", "b", "r"),
				link("f", "f", "r"),
			],
			..Default::default()
		});
		let focus = graph.lookup("a").unwrap();
		let layers = assign_layers(focus, graph.nodes(), graph.links());

		let zeros: Vec<_> = graph.node_refs().filter(|&n| layers.get(n) == Some(0)).collect();
		assert_eq!(zeros, vec![focus]);

		for l in graph.links() {
			if let (Some(s), Some(t)) = (layers.get(l.source), layers.get(l.target)) {
				assert!(s.abs_diff(t) <= 1, "{:?} -> {:?}", l.source, l.target);
			}
		}
		assert_eq!(layers.get(graph.lookup("e").unwrap()), Some(2));
		assert_eq!(layers.get(graph.lookup("f").unwrap()), None);
	}

	#[test]
	fn visit_order_follows_link_order() {
		let graph = ResolvedGraph::resolve(&GraphData {
			nodes: ["hub", "x", "y", "z"].into_iter().map(node).collect(),
			links: vec![
				link("hub", "z", "r"),
				link("x", "hub", "r"),
				link("hub", "y", "r"),
			],
			..Default::default()
		});
		let layers = assign_layers(graph.lookup("hub").unwrap(), graph.nodes(), graph.links());
		let ids: Vec<_> = layers
			.visit_order()
			.iter()
			.map(|&n| graph.node(n).unwrap().id.as_str())
			.collect();
		assert_eq!(ids, vec!["hub", "z", "x", "y"]);
	}

	#[test]
	fn unknown_focus_yields_empty_map() {
		let graph = abcd();
		let layers = assign_layers(NodeRef(99), graph.nodes(), graph.links());
		assert!(layers.is_empty());
		assert_eq!(layers.depth(), None);
	}
}
