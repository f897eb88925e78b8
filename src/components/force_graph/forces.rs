//! Degree-driven repulsion for the layout simulation.
//!
//! Strength follows the d3 convention: negative means repulsive, and every
//! incident link makes a node push harder so hubs do not crowd their
//! neighbourhood. `force_graph` has no per-node charge; its charge force
//! scales with the product of node masses, so strength is expressed as mass.

use force_graph::SimulationParameters;
use serde::Deserialize;

use super::degree::DegreeMap;
use super::graph::NodeRef;

/// Repulsion curve and `force_graph` tuning.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ForceConfig {
	/// Repulsion of a node with no links.
	pub base_strength: f64,
	/// Extra repulsion per incident link.
	pub per_degree_strength: f64,
	/// Simulation mass matching `base_strength`.
	pub node_mass: f32,
	/// Charge constant of the simulation.
	pub force_charge: f32,
	/// Spring constant of link edges.
	pub force_spring: f32,
	/// Upper bound on the force a node receives.
	pub force_max: f32,
	/// Speed cap per step.
	pub node_speed: f32,
	/// Velocity kept between steps.
	pub damping_factor: f32,
}

impl Default for ForceConfig {
	fn default() -> Self {
		Self {
			base_strength: -300.0,
			per_degree_strength: -30.0,
			node_mass: 10.0,
			force_charge: 150.0,
			force_spring: 0.05,
			force_max: 100.0,
			node_speed: 3000.0,
			damping_factor: 0.9,
		}
	}
}

impl ForceConfig {
	/// Global parameters for `force_graph`.
	pub fn simulation_parameters(&self) -> SimulationParameters {
		SimulationParameters {
			force_charge: self.force_charge,
			force_spring: self.force_spring,
			force_max: self.force_max,
			node_speed: self.node_speed,
			damping_factor: self.damping_factor,
		}
	}
}

/// Repulsion strength of `node` under the current degrees. Reads nothing else.
pub fn repulsion_strength(node: NodeRef, degrees: &DegreeMap, config: &ForceConfig) -> f64 {
	config.base_strength + config.per_degree_strength * degrees.get(node) as f64
}

/// Mass that gives the simulation's charge force the requested strength.
pub fn simulation_mass(strength: f64, config: &ForceConfig) -> f32 {
	let base = config.base_strength.abs().max(f64::EPSILON);
	let ratio = (strength.abs() / base).max(0.1);
	config.node_mass * ratio as f32
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::force_graph::degree::compute_degrees;
	use crate::components::force_graph::graph::tests::abcd;

	#[test]
	fn hubs_repel_harder() {
		let graph = abcd();
		let degrees = compute_degrees(graph.nodes(), graph.links());
		let config = ForceConfig::default();
		let strength = |id| repulsion_strength(graph.lookup(id).unwrap(), &degrees, &config);

		assert_eq!(strength("D"), config.base_strength);
		assert_eq!(strength("A"), -330.0);
		assert_eq!(strength("B"), -360.0);
		assert!(strength("B") < strength("A"));
	}

	#[test]
	fn mass_scales_with_strength() {
		let config = ForceConfig::default();
		assert_eq!(simulation_mass(config.base_strength, &config), config.node_mass);
		assert!(simulation_mass(-600.0, &config) > simulation_mass(-330.0, &config));
		assert!(simulation_mass(0.0, &config) > 0.0);
	}
}
