//! Focus controller.
//!
//! Owns the single recomputation context. Every transition (focus change,
//! filter change) takes one snapshot of the filtered links and runs degree
//! counting, layer assignment and weight mapping against it in that order,
//! so the three results never mix snapshots.
//!
//! A new focus is anchored for [`FocusConfig::release_delay`] seconds. The
//! release is a clock-driven pending action that any newer focus replaces.

use std::collections::HashSet;

use log::{debug, info};
use serde::Deserialize;
use thiserror::Error;

use super::degree::{DegreeMap, compute_degrees};
use super::graph::{LinkRef, NodeRef, ResolvedGraph};
use super::layers::{LayerMap, assign_layers};
use super::weight::{BlurRegistry, TextMode, VisualWeights, WeightConfig, map_weights};

/// Focus timing.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct FocusConfig {
	/// Seconds a newly focused node stays anchored.
	pub release_delay: f64,
}

impl Default for FocusConfig {
	fn default() -> Self {
		Self { release_delay: 2.0 }
	}
}

/// Why a focus request was refused.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FocusError {
	/// Search named no known node.
	#[error("no node with id {0:?}")]
	NotFound(String),
}

/// Outputs of one recomputation, all derived from `filtered`.
#[derive(Clone, Debug, Default)]
pub struct FocusContext {
	/// Links whose relation is enabled, in link order.
	pub filtered: Vec<LinkRef>,
	/// Degrees under `filtered`.
	pub degrees: DegreeMap,
	/// BFS layers from the focus under `filtered`.
	pub layers: LayerMap,
	/// Opacities from `layers` and `degrees`.
	pub weights: VisualWeights,
}

/// What the simulation has to apply after a focus change.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FocusChange {
	/// Node to anchor at the viewport centre.
	pub anchor: NodeRef,
	/// Earlier anchor whose pending release was cancelled and which should
	/// now move freely again.
	pub released: Option<NodeRef>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct PendingRelease {
	node: NodeRef,
	due_at: f64,
}

/// Owns the focus, the relation filter, user pins and the pending release.
pub struct FocusController {
	current_focus: Option<NodeRef>,
	active_relations: HashSet<String>,
	context: FocusContext,
	blur: BlurRegistry,
	pinned: HashSet<NodeRef>,
	pending_release: Option<PendingRelease>,
	clock: f64,
	text_mode: TextMode,
	weight_config: WeightConfig,
	config: FocusConfig,
}

impl FocusController {
	/// Starts with every relation enabled and no focus.
	pub fn new(graph: &ResolvedGraph, weight_config: WeightConfig, config: FocusConfig) -> Self {
		let mut controller = Self {
			current_focus: None,
			active_relations: graph.relations().into_iter().collect(),
			context: FocusContext::default(),
			blur: BlurRegistry::default(),
			pinned: HashSet::new(),
			pending_release: None,
			clock: 0.0,
			text_mode: TextMode::default(),
			weight_config,
			config,
		};
		controller.recompute(graph);
		controller
	}

	/// The focused node, if any.
	pub fn current_focus(&self) -> Option<NodeRef> {
		self.current_focus
	}

	/// Snapshot from the last recomputation.
	pub fn context(&self) -> &FocusContext {
		&self.context
	}

	/// Blur resources written so far.
	pub fn blur(&self) -> &BlurRegistry {
		&self.blur
	}

	/// What labels show.
	pub fn text_mode(&self) -> TextMode {
		self.text_mode
	}

	/// Switches labels. Weights are unaffected.
	pub fn set_text_mode(&mut self, mode: TextMode) {
		self.text_mode = mode;
	}

	/// Whether `relation` passes the filter.
	pub fn is_relation_enabled(&self, relation: &str) -> bool {
		self.active_relations.contains(relation)
	}

	/// Whether the user pinned `node`.
	pub fn is_pinned(&self, node: NodeRef) -> bool {
		self.pinned.contains(&node)
	}

	/// Whether `node` is held by a pending focus release.
	pub fn is_anchored(&self, node: NodeRef) -> bool {
		self.pending_release.is_some_and(|p| p.node == node)
	}

	/// Whether the simulation must keep `node` fixed.
	pub fn is_fixed(&self, node: NodeRef) -> bool {
		self.is_pinned(node) || self.is_anchored(node)
	}

	/// Marks a node as user-pinned or frees it.
	pub fn set_pinned(&mut self, node: NodeRef, pinned: bool) {
		if pinned {
			self.pinned.insert(node);
		} else {
			self.pinned.remove(&node);
		}
	}

	/// Moves the focus to `node`, anchors it and recomputes.
	pub fn set_focus(&mut self, graph: &ResolvedGraph, node: NodeRef) -> FocusChange {
		let released = self
			.pending_release
			.take()
			.map(|p| p.node)
			.filter(|&n| n != node && !self.is_pinned(n));

		self.current_focus = Some(node);
		self.pending_release = Some(PendingRelease {
			node,
			due_at: self.clock + self.config.release_delay,
		});
		self.recompute(graph);

		info!(
			"focus-graph: focus on {:?}, {} nodes reached",
			graph.node(node).map(|n| n.id.as_str()),
			self.context.layers.len()
		);
		FocusChange {
			anchor: node,
			released,
		}
	}

	/// Focus by node id. A miss leaves every piece of state untouched.
	pub fn focus_by_id(&mut self, graph: &ResolvedGraph, id: &str) -> Result<FocusChange, FocusError> {
		let node = graph
			.lookup(id)
			.ok_or_else(|| FocusError::NotFound(id.to_string()))?;
		Ok(self.set_focus(graph, node))
	}

	/// Replaces the enabled relation set and recomputes with the current focus.
	pub fn change_filter<I, S>(&mut self, graph: &ResolvedGraph, relations: I)
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		self.active_relations = relations.into_iter().map(Into::into).collect();
		self.recompute(graph);
	}

	/// Enables or disables one relation, recomputing on change.
	pub fn set_relation_enabled(&mut self, graph: &ResolvedGraph, relation: &str, enabled: bool) {
		let changed = if enabled {
			self.active_relations.insert(relation.to_string())
		} else {
			self.active_relations.remove(relation)
		};
		if changed {
			self.recompute(graph);
		}
	}

	/// Advances the clock by `dt` seconds and returns a node whose anchor
	/// just expired. A user-pinned node is never returned.
	pub fn advance(&mut self, dt: f64) -> Option<NodeRef> {
		self.clock += dt;
		let pending = self.pending_release?;
		if self.clock < pending.due_at {
			return None;
		}
		self.pending_release = None;
		debug!("focus-graph: releasing anchor {:?}", pending.node);
		(!self.is_pinned(pending.node)).then_some(pending.node)
	}

	/// Nodes by descending degree, ties in node order.
	pub fn nodes_by_degree(&self, graph: &ResolvedGraph) -> Vec<NodeRef> {
		let mut nodes: Vec<NodeRef> = graph.node_refs().collect();
		nodes.sort_by_key(|&n| std::cmp::Reverse(self.context.degrees.get(n)));
		nodes
	}

	/// Sidebar entry for a node: id and current degree.
	pub fn list_entry(&self, graph: &ResolvedGraph, node: NodeRef) -> String {
		let id = graph.node(node).map(|n| n.id.as_str()).unwrap_or_default();
		format!("{} ({})", id, self.context.degrees.get(node))
	}

	fn recompute(&mut self, graph: &ResolvedGraph) {
		let filtered = graph.filtered_links(|r| self.active_relations.contains(r));
		let links = || filtered.iter().filter_map(|&l| graph.link(l));

		let degrees = compute_degrees(graph.nodes(), links());
		let layers = match self.current_focus {
			Some(focus) => assign_layers(focus, graph.nodes(), links()),
			None => LayerMap::default(),
		};
		let weights = map_weights(
			graph,
			&filtered,
			&layers,
			&degrees,
			&self.weight_config,
			&mut self.blur,
		);

		self.context = FocusContext {
			filtered,
			degrees,
			layers,
			weights,
		};
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::graph::tests::abcd;

	fn controller(graph: &ResolvedGraph) -> FocusController {
		FocusController::new(graph, WeightConfig::default(), FocusConfig::default())
	}

	fn layer(c: &FocusController, g: &ResolvedGraph, id: &str) -> Option<u32> {
		c.context().layers.get(g.lookup(id).unwrap())
	}

	fn degree(c: &FocusController, g: &ResolvedGraph, id: &str) -> usize {
		c.context().degrees.get(g.lookup(id).unwrap())
	}

	fn opacity(c: &FocusController, g: &ResolvedGraph, id: &str) -> f64 {
		c.context().weights.node_opacity(g.lookup(id).unwrap())
	}

	#[test]
	fn focus_on_a() {
		let g = abcd();
		let mut c = controller(&g);
		c.focus_by_id(&g, "A").unwrap();

		assert_eq!(
			(layer(&c, &g, "A"), layer(&c, &g, "B"), layer(&c, &g, "C")),
			(Some(0), Some(1), Some(2))
		);
		assert_eq!(layer(&c, &g, "D"), None);
		assert_eq!(
			["A", "B", "C", "D"].map(|id| degree(&c, &g, id)),
			[1, 2, 1, 0]
		);
		let weights = WeightConfig::default();
		assert_eq!(opacity(&c, &g, "D"), weights.isolated_opacity);
		assert_eq!(opacity(&c, &g, "A"), weights.max_opacity);
		assert!(opacity(&c, &g, "C") < opacity(&c, &g, "B"));
		assert!(opacity(&c, &g, "B") < opacity(&c, &g, "A"));
	}

	#[test]
	fn refocus_keeps_degrees() {
		let g = abcd();
		let mut c = controller(&g);
		c.focus_by_id(&g, "A").unwrap();
		let degrees = c.context().degrees.clone();

		c.focus_by_id(&g, "C").unwrap();
		assert_eq!(
			(layer(&c, &g, "C"), layer(&c, &g, "B"), layer(&c, &g, "A")),
			(Some(0), Some(1), Some(2))
		);
		assert_eq!(layer(&c, &g, "D"), None);
		assert_eq!(c.context().degrees, degrees);
	}

	#[test]
	fn filter_removes_relation() {
		let g = abcd();
		let mut c = controller(&g);
		c.focus_by_id(&g, "A").unwrap();

		c.set_relation_enabled(&g, "owes", false);
		assert_eq!(c.current_focus(), g.lookup("A"));
		assert_eq!((degree(&c, &g, "B"), degree(&c, &g, "C")), (1, 0));
		assert_eq!(layer(&c, &g, "C"), None);
		assert_eq!(opacity(&c, &g, "C"), WeightConfig::default().isolated_opacity);
		assert_eq!(c.context().filtered, vec![LinkRef(0)]);
		assert_eq!(c.context().weights.link_opacity(LinkRef(1)), None);
	}

	#[test]
	fn unreached_node_with_links_gets_depth_floor() {
		let g = abcd();
		let mut c = controller(&g);
		c.focus_by_id(&g, "A").unwrap();

		c.change_filter(&g, ["owes"]);
		assert_eq!(degree(&c, &g, "C"), 1);
		assert_eq!(layer(&c, &g, "C"), None);
		assert_eq!(opacity(&c, &g, "C"), WeightConfig::default().min_opacity);
	}

	#[test]
	fn recomputation_is_idempotent() {
		let g = abcd();
		let mut c = controller(&g);
		c.focus_by_id(&g, "B").unwrap();
		let before = c.context().clone();
		let blur_size = c.blur().len();

		c.recompute(&g);
		let after = c.context();
		assert_eq!(after.filtered, before.filtered);
		assert_eq!(after.layers, before.layers);
		assert_eq!(after.degrees, before.degrees);
		assert_eq!(after.weights, before.weights);
		assert_eq!(c.blur().len(), blur_size);
	}

	#[test]
	fn search_miss_changes_nothing() {
		let g = abcd();
		let mut c = controller(&g);
		c.focus_by_id(&g, "A").unwrap();
		let before = c.context().clone();

		let err = c.focus_by_id(&g, "nobody").unwrap_err();
		assert_eq!(err, FocusError::NotFound("nobody".into()));
		assert_eq!(err.to_string(), "no node with id \"nobody\"");
		assert_eq!(c.current_focus(), g.lookup("A"));
		assert_eq!(c.context().layers, before.layers);
		assert_eq!(c.context().degrees, before.degrees);
		assert_eq!(c.context().weights, before.weights);
		assert!(c.is_anchored(g.lookup("A").unwrap()));
	}

	#[test]
	fn anchor_released_after_delay() {
		let g = abcd();
		let mut c = controller(&g);
		let a = c.focus_by_id(&g, "A").unwrap().anchor;

		assert_eq!(c.advance(1.0), None);
		assert!(c.is_fixed(a));
		assert_eq!(c.advance(1.5), Some(a));
		assert!(!c.is_fixed(a));
		assert_eq!(c.advance(5.0), None);
	}

	#[test]
	fn newer_focus_cancels_pending_release() {
		let g = abcd();
		let mut c = controller(&g);
		let a = g.lookup("A").unwrap();
		let c_ref = g.lookup("C").unwrap();

		c.set_focus(&g, a);
		c.advance(1.5);
		let change = c.set_focus(&g, c_ref);
		assert_eq!(change.released, Some(a));

		// A's original deadline passes without unpinning the new focus.
		assert_eq!(c.advance(1.0), None);
		assert!(c.is_anchored(c_ref));
		assert_eq!(c.advance(1.0), Some(c_ref));
	}

	#[test]
	fn user_pin_survives_release() {
		let g = abcd();
		let mut c = controller(&g);
		let b = g.lookup("B").unwrap();
		c.set_pinned(b, true);
		c.set_focus(&g, b);

		assert_eq!(c.advance(3.0), None);
		assert!(c.is_fixed(b));

		let change = c.focus_by_id(&g, "A").unwrap();
		assert_eq!(change.released, None);
		c.set_pinned(b, false);
		assert!(!c.is_fixed(b));
	}

	#[test]
	fn node_list_by_degree() {
		let g = abcd();
		let c = controller(&g);
		let ids: Vec<_> = c
			.nodes_by_degree(&g)
			.into_iter()
			.map(|n| c.list_entry(&g, n))
			.collect();
		assert_eq!(ids, vec!["B (2)", "A (1)", "C (1)", "D (0)"]);
	}

	#[test]
	fn no_focus_dims_everything() {
		let g = abcd();
		let c = controller(&g);
		let weights = WeightConfig::default();
		assert!(c.context().layers.is_empty());
		assert_eq!(opacity(&c, &g, "B"), weights.min_opacity);
		assert_eq!(opacity(&c, &g, "D"), weights.isolated_opacity);
	}
}
