//! Visual weight mapping.
//!
//! Turns layers and degrees into the opacity and blur each node and link is
//! drawn with. This module is the only writer of opacity values and of the
//! per-entity blur registry; it never touches layers, degrees or positions.

use std::collections::HashMap;

use serde::Deserialize;

use super::degree::DegreeMap;
use super::graph::{LinkRef, NodeRef, ResolvedGraph, ResolvedLink};
use super::layers::LayerMap;

/// Opacity curve and blur constants.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct WeightConfig {
	/// Opacity of the focus node itself.
	pub max_opacity: f64,
	/// Opacity lost per layer for nodes.
	pub node_step: f64,
	/// Opacity lost per averaged layer for links.
	pub link_step: f64,
	/// Floor for deep and unreached elements.
	pub min_opacity: f64,
	/// Opacity of nodes with no incident link, whatever their layer.
	pub isolated_opacity: f64,
	/// Blur radius at opacity 0.
	pub blur_scale: f64,
}

impl Default for WeightConfig {
	fn default() -> Self {
		Self {
			max_opacity: 1.0,
			node_step: 0.2,
			link_step: 0.25,
			min_opacity: 0.1,
			isolated_opacity: 0.3,
			blur_scale: 10.0,
		}
	}
}

impl WeightConfig {
	fn floor(&self) -> f64 {
		self.min_opacity.clamp(0.0, 1.0)
	}

	fn decay(&self, layer: u32, step: f64) -> f64 {
		(self.max_opacity - layer as f64 * step).clamp(self.floor(), 1.0)
	}
}

/// What labels show.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TextMode {
	/// Node id (or label) and the relation comment.
	#[default]
	Semantic,
	/// The computed weight values behind each element.
	Diagnostic,
}

/// Stable identity of a blur resource.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BlurKey {
	/// Node disc.
	Node(NodeRef),
	/// Node label text.
	NodeLabel(NodeRef),
	/// Link stroke and its label.
	Link(LinkRef),
}

/// A blur filter owned by one entity.
#[derive(Clone, Debug, PartialEq)]
pub struct BlurResource {
	/// Owning entity.
	pub key: BlurKey,
	/// Blur radius in pixels.
	pub radius: f64,
	/// How many times this resource has been written.
	pub revision: u64,
}

impl BlurResource {
	/// Canvas `filter` value for this resource.
	pub fn css_filter(&self) -> String {
		if self.radius < 0.01 {
			"none".to_string()
		} else {
			format!("blur({:.2}px)", self.radius)
		}
	}
}

/// Entity id to blur resource index. Writes are upserts.
#[derive(Clone, Debug, Default)]
pub struct BlurRegistry {
	resources: HashMap<BlurKey, BlurResource>,
}

impl BlurRegistry {
	/// Creates the resource for `key` or updates the existing one in place.
	pub fn upsert(&mut self, key: BlurKey, radius: f64) -> &BlurResource {
		let resource = self.resources.entry(key).or_insert(BlurResource {
			key,
			radius,
			revision: 0,
		});
		resource.radius = radius;
		resource.revision += 1;
		resource
	}

	/// Resource for `key`, if it was ever written.
	pub fn get(&self, key: BlurKey) -> Option<&BlurResource> {
		self.resources.get(&key)
	}

	/// Number of resources.
	pub fn len(&self) -> usize {
		self.resources.len()
	}

	/// True before the first write.
	pub fn is_empty(&self) -> bool {
		self.resources.is_empty()
	}
}

/// Opacity of a node. Isolated nodes get the isolated floor; unreached nodes
/// get the depth floor.
pub fn compute_node_opacity(
	node: NodeRef,
	layers: &LayerMap,
	degrees: &DegreeMap,
	config: &WeightConfig,
) -> f64 {
	if degrees.get(node) == 0 {
		return config.isolated_opacity.clamp(0.0, 1.0);
	}
	match layers.get(node) {
		Some(layer) => config.decay(layer, config.node_step),
		None => config.floor(),
	}
}

/// Rounded mean of the endpoint layers, `None` if either end is unreached.
pub fn averaged_layer(link: &ResolvedLink, layers: &LayerMap) -> Option<u32> {
	let source = layers.get(link.source)?;
	let target = layers.get(link.target)?;
	Some(((source + target) as f64 / 2.0).round() as u32)
}

/// Link opacity from its averaged layer; unreached links get the floor.
pub fn compute_link_opacity(link: &ResolvedLink, layers: &LayerMap, config: &WeightConfig) -> f64 {
	match averaged_layer(link, layers) {
		Some(layer) => config.decay(layer, config.link_step),
		None => config.floor(),
	}
}

/// Blur radius, growing as opacity falls.
pub fn compute_blur(opacity: f64, config: &WeightConfig) -> f64 {
	(1.0 - opacity.clamp(0.0, 1.0)) * config.blur_scale
}

/// Opacity values for one recomputation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VisualWeights {
	node_opacity: Vec<f64>,
	link_opacity: HashMap<LinkRef, f64>,
}

impl VisualWeights {
	/// Opacity of a node.
	pub fn node_opacity(&self, node: NodeRef) -> f64 {
		self.node_opacity.get(node.0).copied().unwrap_or(0.0)
	}

	/// Opacity of a link, `None` when the link is filtered out.
	pub fn link_opacity(&self, link: LinkRef) -> Option<f64> {
		self.link_opacity.get(&link).copied()
	}
}

/// Recomputes every node and filtered link weight and upserts their blur.
pub fn map_weights(
	graph: &ResolvedGraph,
	filtered: &[LinkRef],
	layers: &LayerMap,
	degrees: &DegreeMap,
	config: &WeightConfig,
	blur: &mut BlurRegistry,
) -> VisualWeights {
	let mut weights = VisualWeights {
		node_opacity: Vec::with_capacity(graph.nodes().len()),
		link_opacity: HashMap::with_capacity(filtered.len()),
	};

	for node in graph.node_refs() {
		let opacity = compute_node_opacity(node, layers, degrees, config);
		let radius = compute_blur(opacity, config);
		blur.upsert(BlurKey::Node(node), radius);
		blur.upsert(BlurKey::NodeLabel(node), radius);
		weights.node_opacity.push(opacity);
	}

	for &link_ref in filtered {
		let Some(link) = graph.link(link_ref) else {
			continue;
		};
		let opacity = compute_link_opacity(link, layers, config);
		blur.upsert(BlurKey::Link(link_ref), compute_blur(opacity, config));
		weights.link_opacity.insert(link_ref, opacity);
	}

	weights
}

fn layer_text(layer: Option<u32>) -> String {
	layer.map_or_else(|| "-".to_string(), |l| l.to_string())
}

/// Label for a node under `mode`.
pub fn node_label(
	graph: &ResolvedGraph,
	node: NodeRef,
	mode: TextMode,
	weights: &VisualWeights,
	layers: &LayerMap,
	degrees: &DegreeMap,
) -> String {
	match mode {
		TextMode::Semantic => graph
			.node(node)
			.map(|n| n.label.clone().unwrap_or_else(|| n.id.clone()))
			.unwrap_or_default(),
		TextMode::Diagnostic => format!(
			"{:.2}; layer {}; degree {}",
			weights.node_opacity(node),
			layer_text(layers.get(node)),
			degrees.get(node)
		),
	}
}

/// Label for a link under `mode`.
pub fn link_label(
	graph: &ResolvedGraph,
	link_ref: LinkRef,
	mode: TextMode,
	weights: &VisualWeights,
	layers: &LayerMap,
) -> String {
	let Some(link) = graph.link(link_ref) else {
		return String::new();
	};
	match mode {
		TextMode::Semantic => link.relation_comment.clone(),
		TextMode::Diagnostic => format!(
			"{:.2}; layer {}",
			weights.link_opacity(link_ref).unwrap_or(0.0),
			layer_text(averaged_layer(link, layers))
		),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::degree::compute_degrees;
	use crate::components::force_graph::graph::tests::abcd;
	use crate::components::force_graph::layers::assign_layers;

	struct Fixture {
		graph: ResolvedGraph,
		filtered: Vec<LinkRef>,
		layers: LayerMap,
		degrees: DegreeMap,
	}

	fn focused_on(id: &str) -> Fixture {
		let graph = abcd();
		let filtered = graph.filtered_links(|_| true);
		let layers = assign_layers(graph.lookup(id).unwrap(), graph.nodes(), graph.links());
		let degrees = compute_degrees(graph.nodes(), graph.links());
		Fixture {
			graph,
			filtered,
			layers,
			degrees,
		}
	}

	#[test]
	fn opacity_falls_with_distance() {
		let f = focused_on("A");
		let config = WeightConfig::default();
		let opacity = |id| compute_node_opacity(f.graph.lookup(id).unwrap(), &f.layers, &f.degrees, &config);

		assert_eq!(opacity("A"), config.max_opacity);
		assert!(opacity("C") < opacity("B") && opacity("B") < opacity("A"));
		assert_eq!(opacity("D"), config.isolated_opacity);
	}

	#[test]
	fn deep_layers_clamp_to_floor() {
		let f = focused_on("A");
		let config = WeightConfig {
			node_step: 0.6,
			..Default::default()
		};
		let c = compute_node_opacity(f.graph.lookup("C").unwrap(), &f.layers, &f.degrees, &config);
		assert_eq!(c, config.min_opacity);

		let mut last = f64::INFINITY;
		for layer in 0..20 {
			let value = config.decay(layer, config.node_step);
			assert!((0.0..=1.0).contains(&value));
			assert!(value <= last);
			last = value;
		}
	}

	#[test]
	fn isolated_node_ignores_layer() {
		let f = focused_on("D");
		let config = WeightConfig::default();
		let d = f.graph.lookup("D").unwrap();
		assert_eq!(f.layers.get(d), Some(0));
		assert_eq!(
			compute_node_opacity(d, &f.layers, &f.degrees, &config),
			config.isolated_opacity
		);
	}

	#[test]
	fn link_opacity_uses_rounded_average_layer() {
		let f = focused_on("A");
		let config = WeightConfig::default();
		let links = f.graph.links();

		// A(0)-B(1) averages 0.5, rounded to 1.
		assert_eq!(averaged_layer(&links[0], &f.layers), Some(1));
		assert_eq!(compute_link_opacity(&links[0], &f.layers, &config), 0.75);
		// B(1)-C(2) averages 1.5, rounded to 2.
		assert_eq!(compute_link_opacity(&links[1], &f.layers, &config), 0.5);

		let unreached = assign_layers(f.graph.lookup("D").unwrap(), f.graph.nodes(), links);
		assert_eq!(
			compute_link_opacity(&links[0], &unreached, &config),
			config.min_opacity
		);
	}

	#[test]
	fn blur_is_inverse_linear() {
		let config = WeightConfig::default();
		assert_eq!(compute_blur(1.0, &config), 0.0);
		assert!((compute_blur(0.3, &config) - 7.0).abs() < 1e-9);
		assert_eq!(compute_blur(-1.0, &config), config.blur_scale);
	}

	#[test]
	fn blur_registry_updates_in_place() {
		let f = focused_on("A");
		let config = WeightConfig::default();
		let mut blur = BlurRegistry::default();

		map_weights(&f.graph, &f.filtered, &f.layers, &f.degrees, &config, &mut blur);
		let size = blur.len();
		assert_eq!(size, 2 * f.graph.nodes().len() + f.filtered.len());

		let from_c = assign_layers(f.graph.lookup("C").unwrap(), f.graph.nodes(), f.graph.links());
		map_weights(&f.graph, &f.filtered, &from_c, &f.degrees, &config, &mut blur);
		assert_eq!(blur.len(), size);

		let a = blur.get(BlurKey::Node(f.graph.lookup("A").unwrap())).unwrap();
		assert_eq!(a.revision, 2);
		assert!((a.radius - compute_blur(0.6, &config)).abs() < 1e-9);
		assert_eq!(a.css_filter(), "blur(4.00px)");
	}

	#[test]
	fn labels_follow_text_mode() {
		let f = focused_on("A");
		let config = WeightConfig::default();
		let mut blur = BlurRegistry::default();
		let weights = map_weights(&f.graph, &f.filtered, &f.layers, &f.degrees, &config, &mut blur);
		let b = f.graph.lookup("B").unwrap();
		let d = f.graph.lookup("D").unwrap();

		let label = |node, mode| node_label(&f.graph, node, mode, &weights, &f.layers, &f.degrees);
		assert_eq!(label(b, TextMode::Semantic), "B");
		assert_eq!(label(b, TextMode::Diagnostic), "0.80; layer 1; degree 2");
		assert_eq!(label(d, TextMode::Diagnostic), "0.30; layer -; degree 0");

		let link = |mode| link_label(&f.graph, LinkRef(1), mode, &weights, &f.layers);
		assert_eq!(link(TextMode::Semantic), "B owes C");
		assert_eq!(link(TextMode::Diagnostic), "0.50; layer 2");
	}
}
