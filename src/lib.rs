//! focus-graph: interactive relationship graph weighted by distance from a focus node.
//!
//! This crate provides a WASM-based graph component that lays out typed
//! relations with a force simulation and fades nodes and links by their
//! breadth-first distance from the focused node.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::force_graph::{ForceGraphCanvas, GraphData, GraphLink, GraphNode};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("focus-graph: logging initialized");
}

/// Load graph data from a script element with id="graph-data".
/// Expected format: JSON with { nodes: [...], links: [...], config?: {...} }
fn load_graph_data() -> Option<GraphData> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("graph-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<GraphData>(&json_text) {
		Ok(data) => {
			info!(
				"focus-graph: loaded {} nodes, {} links",
				data.nodes.len(),
				data.links.len()
			);
			if data.rejected_nodes + data.rejected_links > 0 {
				warn!(
					"focus-graph: skipped {} node and {} link records that did not parse",
					data.rejected_nodes, data.rejected_links
				);
			}
			Some(data)
		}
		Err(e) => {
			warn!("focus-graph: failed to parse graph data: {}", e);
			None
		}
	}
}

/// Main application component.
/// Loads graph data from DOM and renders the focus-weighted visualization.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let graph_data = load_graph_data().unwrap_or_default();
	let graph_signal = Signal::derive(move || graph_data.clone());

	view! {
		<Html attr:lang="en" attr:dir="ltr" />
		<Title text="Relation Graph" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<ForceGraphCanvas data=graph_signal fullscreen=true />
			<div class="graph-overlay">
				<h1>"Relation Graph"</h1>
				<p class="subtitle">"Click a node to focus it. Drag to move, scroll to zoom, drag the background to pan."</p>
			</div>
		</div>
	}
}
