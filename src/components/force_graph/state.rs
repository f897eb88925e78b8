//! Graph simulation state and interaction tracking.
//!
//! Binds the [`FocusController`] to the `force_graph` physics simulation:
//! focus anchors and user pins become anchored simulation nodes, degrees
//! become node masses, and every tick reads positions back for rendering.
//! Layering and weighting never run on a tick; only focus and filter
//! changes trigger them.

use std::collections::HashMap;
use std::f64::consts::PI;

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData};
use log::{info, warn};

use super::focus::{FocusChange, FocusController, FocusError};
use super::forces::{ForceConfig, repulsion_strength, simulation_mass};
use super::graph::{NodeRef, ResolvedGraph};
use super::scale::{ScaleConfig, ScaledValues};
use super::theme::{Color, Theme, parse_color};
use super::types::GraphData;
use super::weight::TextMode;

/// Longest physics step. Slower frames still advance the focus clock in full.
const MAX_PHYSICS_STEP: f64 = 0.05;

/// Seconds between two `performance.now()` readings; 0 on the first frame.
pub fn frame_seconds(previous_ms: Option<f64>, now_ms: f64) -> f64 {
	previous_ms.map_or(0.0, |previous| ((now_ms - previous) / 1000.0).max(0.0))
}

/// Per-node data attached to each simulation node.
#[derive(Clone, Debug)]
pub struct NodeInfo {
	pub node: NodeRef,
	pub color: Color,
}

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
	pub k: f64,
}

/// Tracks an in-progress node drag operation.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node: Option<NodeRef>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
	/// Set once the pointer has moved far enough to count as a drag.
	pub moved: bool,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Core graph state combining the physics simulation with focus weighting.
pub struct ForceGraphState {
	pub graph: ForceGraph<NodeInfo, ()>,
	pub data: ResolvedGraph,
	pub focus: FocusController,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	pub animation_running: bool,
	/// Last user-visible notice, e.g. a search miss.
	pub notice: Option<String>,
	force_config: ForceConfig,
	colors: Vec<Color>,
	positions: Vec<(f64, f64)>,
}

impl ForceGraphState {
	pub fn new(data: &GraphData, width: f64, height: f64, theme: &Theme) -> Self {
		let resolved = ResolvedGraph::resolve(data);
		let mut focus = FocusController::new(
			&resolved,
			data.config.weight.clone(),
			data.config.focus.clone(),
		);

		let mut groups: HashMap<&str, usize> = HashMap::new();
		let colors = resolved
			.nodes()
			.iter()
			.map(|node| {
				// Explicit color > group palette > default.
				node.color
					.as_deref()
					.and_then(parse_color)
					.or_else(|| {
						let group = node.group.as_deref()?;
						let next = groups.len();
						let index = *groups.entry(group).or_insert(next);
						Some(theme.palette.get(index))
					})
					.unwrap_or(theme.node.default_color)
			})
			.collect();

		let count = resolved.nodes().len().max(1) as f64;
		let positions = (0..resolved.nodes().len())
			.map(|i| {
				let angle = i as f64 * 2.0 * PI / count;
				(150.0 * angle.cos(), 150.0 * angle.sin())
			})
			.collect();

		let initial = focus.nodes_by_degree(&resolved).first().copied();
		let change = initial.map(|node| focus.set_focus(&resolved, node));

		let mut state = Self {
			graph: ForceGraph::new(data.config.force.simulation_parameters()),
			data: resolved,
			focus,
			transform: ViewTransform {
				x: width / 2.0,
				y: height / 2.0,
				k: 1.0,
			},
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
			animation_running: true,
			notice: None,
			force_config: data.config.force.clone(),
			colors,
			positions,
		};
		if let Some(change) = change {
			state.positions[change.anchor.0] = state.anchor_point();
		}
		state.rebuild_simulation();

		info!(
			"focus-graph: {} nodes, {} links, {} relations",
			state.data.nodes().len(),
			state.data.links().len(),
			state.data.relations().len()
		);
		state
	}

	/// Recreates the simulation over the current filtered links, keeping
	/// positions and anchors.
	fn rebuild_simulation(&mut self) {
		let mut graph = ForceGraph::new(self.force_config.simulation_parameters());
		let context = self.focus.context();

		let sim_index: Vec<DefaultNodeIdx> = self
			.data
			.node_refs()
			.map(|node| {
				let (x, y) = self.positions[node.0];
				let strength = repulsion_strength(node, &context.degrees, &self.force_config);
				graph.add_node(NodeData {
					x: x as f32,
					y: y as f32,
					mass: simulation_mass(strength, &self.force_config),
					is_anchor: self.focus.is_fixed(node),
					user_data: NodeInfo {
						node,
						color: self.colors[node.0],
					},
				})
			})
			.collect();

		for link in context.filtered.iter().filter_map(|&l| self.data.link(l)) {
			graph.add_edge(sim_index[link.source.0], sim_index[link.target.0], EdgeData::default());
		}

		self.graph = graph;
	}

	/// Re-derives every node's mass from the current degrees.
	fn apply_forces(&mut self) {
		let (degrees, config) = (&self.focus.context().degrees, &self.force_config);
		self.graph.visit_nodes_mut(|node| {
			let strength = repulsion_strength(node.data.user_data.node, degrees, config);
			node.data.mass = simulation_mass(strength, config);
		});
	}

	/// Syncs each simulation node's anchor flag with the controller.
	fn apply_anchors(&mut self) {
		let focus = &self.focus;
		self.graph.visit_nodes_mut(|node| {
			node.data.is_anchor = focus.is_fixed(node.data.user_data.node);
		});
	}

	fn read_positions(&mut self) {
		let positions = &mut self.positions;
		self.graph.visit_nodes(|node| {
			positions[node.data.user_data.node.0] = (node.x() as f64, node.y() as f64);
		});
	}

	/// Graph-space point under the viewport centre.
	pub fn anchor_point(&self) -> (f64, f64) {
		self.screen_to_graph(self.width / 2.0, self.height / 2.0)
	}

	fn apply_focus_change(&mut self, change: FocusChange) {
		let (ax, ay) = self.anchor_point();
		self.graph.visit_nodes_mut(|node| {
			if node.data.user_data.node == change.anchor {
				node.data.x = ax as f32;
				node.data.y = ay as f32;
			}
		});
		self.apply_anchors();
		self.apply_forces();
		self.read_positions();
		self.animation_running = true;
	}

	/// Focuses a node, e.g. after a click.
	pub fn focus_node(&mut self, node: NodeRef) {
		let change = self.focus.set_focus(&self.data, node);
		self.notice = None;
		self.apply_focus_change(change);
	}

	/// Focuses the node with `id`. A miss only sets [`Self::notice`].
	pub fn search(&mut self, id: &str) -> Result<(), FocusError> {
		match self.focus.focus_by_id(&self.data, id.trim()) {
			Ok(change) => {
				self.notice = None;
				self.apply_focus_change(change);
				Ok(())
			}
			Err(e) => {
				warn!("focus-graph: search failed: {}", e);
				self.notice = Some(e.to_string());
				Err(e)
			}
		}
	}

	pub fn set_relation_enabled(&mut self, relation: &str, enabled: bool) {
		self.focus.set_relation_enabled(&self.data, relation, enabled);
		self.rebuild_simulation();
		self.animation_running = true;
	}

	pub fn toggle_text_mode(&mut self) {
		let mode = match self.focus.text_mode() {
			TextMode::Semantic => TextMode::Diagnostic,
			TextMode::Diagnostic => TextMode::Semantic,
		};
		self.focus.set_text_mode(mode);
	}

	/// User pin: fixes the node where it is, or frees it.
	pub fn set_pinned(&mut self, node: NodeRef, pinned: bool) {
		self.focus.set_pinned(node, pinned);
		self.apply_anchors();
	}

	/// Ends a drag; the node stays fixed only if something still holds it.
	pub fn release_drag(&mut self, node: NodeRef) {
		let fixed = self.focus.is_fixed(node);
		self.graph.visit_nodes_mut(|n| {
			if n.data.user_data.node == node {
				n.data.is_anchor = fixed;
			}
		});
	}

	/// Moves a node and holds it in place while dragging.
	pub fn drag_node_to(&mut self, node: NodeRef, x: f64, y: f64) {
		self.graph.visit_nodes_mut(|n| {
			if n.data.user_data.node == node {
				n.data.x = x as f32;
				n.data.y = y as f32;
				n.data.is_anchor = true;
			}
		});
		self.positions[node.0] = (x, y);
	}

	pub fn position(&self, node: NodeRef) -> (f64, f64) {
		self.positions.get(node.0).copied().unwrap_or_default()
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn node_at_position(&self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<NodeRef> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let scale = ScaledValues::new(config, self.transform.k);
		self.data
			.node_refs()
			.filter(|&node| {
				let (x, y) = self.position(node);
				((x - gx).powi(2) + (y - gy).powi(2)).sqrt() < scale.hit_radius
			})
			.last()
	}

	/// Steps the physics, reads positions and fires due anchor releases.
	/// Advances physics and the focus clock by `elapsed` wall-clock seconds.
	pub fn tick(&mut self, elapsed: f64) {
		let elapsed = elapsed.max(0.0);
		if self.animation_running {
			self.graph.update(elapsed.min(MAX_PHYSICS_STEP) as f32);
			self.read_positions();
		}
		if self.focus.advance(elapsed).is_some() {
			self.apply_anchors();
		}
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}

	/// Sidebar rows, most connected first.
	pub fn node_list(&self) -> Vec<NodeEntry> {
		self.focus
			.nodes_by_degree(&self.data)
			.into_iter()
			.map(|node| NodeEntry {
				index: node.0,
				text: self.focus.list_entry(&self.data, node),
				pinned: self.focus.is_pinned(node),
			})
			.collect()
	}

	/// Every relation category with its filter state.
	pub fn relation_toggles(&self) -> Vec<(String, bool)> {
		self.data
			.relations()
			.into_iter()
			.map(|r| {
				let enabled = self.focus.is_relation_enabled(&r);
				(r, enabled)
			})
			.collect()
	}
}

/// One row of the node sidebar.
#[derive(Clone, Debug, PartialEq)]
pub struct NodeEntry {
	pub index: usize,
	pub text: String,
	pub pinned: bool,
}
