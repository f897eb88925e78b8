//! Zoom-dependent sizes for graph visuals.
//!
//! World-space values scale with zoom; screen-space values keep their pixel
//! size by dividing by the zoom factor `k`.

/// How a size reacts to the zoom level.
#[derive(Clone, Debug)]
pub enum ScaleBehavior {
	/// Constant screen-space size.
	Screen,
	/// World-space size kept within `(min_screen, max_screen)` pixels.
	Clamped {
		/// Smallest on-screen size in pixels.
		min_screen: f64,
		/// Largest on-screen size in pixels.
		max_screen: f64,
	},
}

impl ScaleBehavior {
	/// World-space value for `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Base sizes and how each follows the zoom.
#[derive(Clone, Debug)]
pub struct ScaleConfig {
	/// Node radius in world units.
	pub node_radius: f64,
	/// How the node radius follows the zoom.
	pub node_radius_behavior: ScaleBehavior,
	/// Hit test radius in world units.
	pub hit_radius: f64,
	/// Label font size in screen pixels.
	pub label_size: f64,
	/// Below this zoom, labels stop shrinking.
	pub label_min_k: f64,
	/// Link stroke in screen pixels.
	pub link_width: f64,
	/// Arrowhead length in world units.
	pub arrow_size: f64,
	/// How arrowheads follow the zoom.
	pub arrow_behavior: ScaleBehavior,
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node_radius: 10.0,
			node_radius_behavior: ScaleBehavior::Clamped {
				min_screen: 4.0,
				max_screen: f64::INFINITY,
			},
			hit_radius: 14.0,
			label_size: 11.0,
			label_min_k: 0.5,
			link_width: 2.0,
			arrow_size: 7.0,
			arrow_behavior: ScaleBehavior::Clamped {
				min_screen: 3.0,
				max_screen: 18.0,
			},
		}
	}
}

/// Sizes resolved for one zoom level; build once per frame.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	/// Node radius in world units.
	pub node_radius: f64,
	/// Hit test radius in world units.
	pub hit_radius: f64,
	/// Canvas font string for labels.
	pub label_font: String,
	/// Link stroke in world units.
	pub link_width: f64,
	/// Arrowhead length in world units.
	pub arrow_size: f64,
	/// Focus and pin ring stroke in world units.
	pub ring_width: f64,
}

impl ScaledValues {
	/// Resolves `config` at zoom `k`.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let node_radius = config.node_radius_behavior.apply(config.node_radius, k);
		let label_font_size = config.label_size / k.max(config.label_min_k);

		Self {
			node_radius,
			hit_radius: config.hit_radius.max(node_radius),
			label_font: format!("{}px sans-serif", label_font_size),
			link_width: ScaleBehavior::Screen.apply(config.link_width, k),
			arrow_size: config.arrow_behavior.apply(config.arrow_size, k),
			ring_width: ScaleBehavior::Screen.apply(2.0, k),
		}
	}
}
