//! Focus-weighted force-directed graph component.
//!
//! Renders an interactive relationship graph on an HTML canvas with:
//! - Physics-based layout via the `force_graph` simulation, with repulsion
//!   scaled by node degree
//! - BFS layers measured from a focus node, chosen by click or search
//! - Opacity and blur derived from layer and degree
//! - Relation filters, user pins and a diagnostic label mode
//!
//! The weighting engine (`degree`, `layers`, `weight`, `forces`, `focus`)
//! has no DOM dependency and can be driven directly:
//!
//! ```ignore
//! let graph = ResolvedGraph::resolve(&data);
//! let mut focus = FocusController::new(&graph, WeightConfig::default(), FocusConfig::default());
//! focus.focus_by_id(&graph, "A")?;
//! let opacity = focus.context().weights.node_opacity(graph.lookup("B").unwrap());
//! ```

mod component;
pub mod degree;
pub mod focus;
pub mod forces;
pub mod graph;
pub mod layers;
mod render;
pub mod scale;
mod state;
pub mod theme;
mod types;
pub mod weight;

pub use component::ForceGraphCanvas;
pub use focus::{FocusConfig, FocusController, FocusError};
pub use graph::{NodeRef, ResolvedGraph};
pub use theme::Theme;
pub use types::{Direction, GraphConfig, GraphData, GraphLink, GraphNode};
pub use weight::{TextMode, WeightConfig};
