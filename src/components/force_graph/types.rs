//! Graph data structures for input to the force graph component.
//!
//! Nodes and links are parsed one record at a time: a record that does not
//! fit its shape is counted and skipped, the rest of the graph still loads.

use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::focus::FocusConfig;
use super::forces::ForceConfig;
use super::weight::WeightConfig;

/// A node in the graph.
#[derive(Clone, Debug, Deserialize)]
pub struct GraphNode {
	/// Unique identifier for this node. Used to reference nodes in links.
	pub id: String,
	/// Optional display label, shown instead of the id in semantic text mode.
	#[serde(default)]
	pub label: Option<String>,
	/// Optional CSS color override (e.g., "#ff0000" or "rgb(255, 0, 0)").
	/// If not set, color is derived from the theme palette based on `group`.
	#[serde(default)]
	pub color: Option<String>,
	/// Optional category tag used for coloring.
	#[serde(default)]
	pub group: Option<String>,
}

/// How a relation is drawn. Traversal always ignores it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Direction {
	/// No arrowheads.
	#[default]
	None,
	/// Source to target.
	Forward,
	/// Arrowheads at both ends.
	Bidirectional,
}

impl Direction {
	/// Reads a direction name. Unknown names fall back to [`Direction::None`].
	pub fn parse(name: &str) -> Self {
		match name.trim().to_ascii_lowercase().as_str() {
			"" | "none" => Direction::None,
			"forward" | "directed" => Direction::Forward,
			"bidirectional" => Direction::Bidirectional,
			other => {
				warn!("focus-graph: unknown direction {:?}, drawing undirected", other);
				Direction::None
			}
		}
	}
}

fn lenient_direction<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Direction, D::Error> {
	let name = Option::<String>::deserialize(deserializer)?;
	Ok(name.as_deref().map(Direction::parse).unwrap_or_default())
}

/// A typed relation between two nodes.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphLink {
	/// Source node ID.
	pub source: String,
	/// Target node ID.
	pub target: String,
	/// Relation category, the unit of filtering.
	#[serde(default)]
	pub relation: String,
	/// Display text for the relation.
	#[serde(default)]
	pub relation_comment: String,
	/// Arrowheads to draw.
	#[serde(default, deserialize_with = "lenient_direction")]
	pub direction: Direction,
}

/// Optional tuning block carried next to the graph data.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
	/// Opacity and blur curves.
	pub weight: WeightConfig,
	/// Simulation tuning.
	pub force: ForceConfig,
	/// Pin timing.
	pub focus: FocusConfig,
}

/// Complete graph data: nodes, links and optional tuning.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(from = "RawGraphData")]
pub struct GraphData {
	/// Nodes that parsed.
	pub nodes: Vec<GraphNode>,
	/// Links that parsed.
	pub links: Vec<GraphLink>,
	/// Tuning, defaulted when absent.
	pub config: GraphConfig,
	/// Node records skipped because they did not parse.
	pub rejected_nodes: usize,
	/// Link records skipped because they did not parse.
	pub rejected_links: usize,
}

#[derive(Deserialize)]
struct RawGraphData {
	#[serde(default)]
	nodes: Vec<Value>,
	#[serde(default)]
	links: Vec<Value>,
	#[serde(default)]
	config: GraphConfig,
}

/// Parses each record on its own, returning the survivors and the reject count.
fn parse_records<T: DeserializeOwned>(kind: &str, raw: Vec<Value>) -> (Vec<T>, usize) {
	let mut rejected = 0;
	let records = raw
		.into_iter()
		.enumerate()
		.filter_map(|(i, value)| match serde_json::from_value(value) {
			Ok(record) => Some(record),
			Err(e) => {
				warn!("focus-graph: skipping {} record {}: {}", kind, i, e);
				rejected += 1;
				None
			}
		})
		.collect();
	(records, rejected)
}

impl From<RawGraphData> for GraphData {
	fn from(raw: RawGraphData) -> Self {
		let (nodes, rejected_nodes) = parse_records("node", raw.nodes);
		let (links, rejected_links) = parse_records("link", raw.links);
		Self {
			nodes,
			links,
			config: raw.config,
			rejected_nodes,
			rejected_links,
		}
	}
}
