//! Canvas rendering for the force graph.
//!
//! Draws the state left by the last recomputation: links first, then nodes,
//! then labels. Opacity and blur come from the focus context and blur
//! registry; nothing here reads a value back from the canvas.

use std::f64::consts::PI;

use web_sys::CanvasRenderingContext2d;

use super::graph::{LinkRef, ResolvedLink};
use super::scale::{ScaleConfig, ScaledValues};
use super::state::{ForceGraphState, NodeInfo};
use super::theme::Theme;
use super::types::Direction;
use super::weight::{BlurKey, link_label, node_label};

/// Renders the complete graph to the canvas.
pub fn render(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let scale = ScaledValues::new(config, state.transform.k);

	ctx.set_fill_style_str(&theme.background.to_css());
	ctx.fill_rect(0.0, 0.0, state.width, state.height);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	for &link_ref in &state.focus.context().filtered {
		if let Some(link) = state.data.link(link_ref) {
			draw_link(state, ctx, &scale, theme, link_ref, link);
		}
	}

	state.graph.visit_nodes(|node| {
		draw_node(state, ctx, &scale, theme, node);
	});

	ctx.restore();

	if let Some(notice) = &state.notice {
		ctx.set_fill_style_str("rgba(180, 40, 40, 0.9)");
		ctx.set_font("13px sans-serif");
		let _ = ctx.fill_text(notice, 16.0, state.height - 16.0);
	}
}

fn set_blur(state: &ForceGraphState, ctx: &CanvasRenderingContext2d, key: BlurKey) {
	let filter = state
		.focus
		.blur()
		.get(key)
		.map(|b| b.css_filter())
		.unwrap_or_else(|| "none".to_string());
	ctx.set_filter(&filter);
}

fn draw_link(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	link_ref: LinkRef,
	link: &ResolvedLink,
) {
	let context = state.focus.context();
	let Some(opacity) = context.weights.link_opacity(link_ref) else {
		return;
	};
	let (x1, y1) = state.position(link.source);
	let (x2, y2) = state.position(link.target);
	let (dx, dy) = (x2 - x1, y2 - y1);
	let dist = (dx * dx + dy * dy).sqrt();
	if dist < 0.001 {
		return;
	}
	let (ux, uy) = (dx / dist, dy / dist);
	let r = scale.node_radius;

	set_blur(state, ctx, BlurKey::Link(link_ref));
	let color = theme.link.color.faded(opacity).to_css();
	ctx.set_stroke_style_str(&color);
	ctx.set_fill_style_str(&color);
	ctx.set_line_width(scale.link_width);

	ctx.begin_path();
	ctx.move_to(x1 + ux * r, y1 + uy * r);
	ctx.line_to(x2 - ux * r, y2 - uy * r);
	ctx.stroke();

	match link.direction {
		Direction::None => {}
		Direction::Forward => draw_arrow(ctx, scale, x2 - ux * r, y2 - uy * r, ux, uy),
		Direction::Bidirectional => {
			draw_arrow(ctx, scale, x2 - ux * r, y2 - uy * r, ux, uy);
			draw_arrow(ctx, scale, x1 + ux * r, y1 + uy * r, -ux, -uy);
		}
	}

	let text = link_label(
		&state.data,
		link_ref,
		state.focus.text_mode(),
		&context.weights,
		&context.layers,
	);
	if !text.is_empty() {
		ctx.set_fill_style_str(&theme.link.label_color.faded(opacity).to_css());
		ctx.set_font(&scale.label_font);
		let _ = ctx.fill_text(&text, (x1 + x2) / 2.0, (y1 + y2) / 2.0);
	}
	ctx.set_filter("none");
}

/// Arrowhead with its tip at `(tip_x, tip_y)` pointing along `(ux, uy)`.
fn draw_arrow(
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	tip_x: f64,
	tip_y: f64,
	ux: f64,
	uy: f64,
) {
	let (back_x, back_y) = (tip_x - ux * scale.arrow_size, tip_y - uy * scale.arrow_size);
	let (px, py) = (-uy * scale.arrow_size * 0.5, ux * scale.arrow_size * 0.5);

	ctx.begin_path();
	ctx.move_to(tip_x, tip_y);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn draw_node(
	state: &ForceGraphState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	node: &force_graph::Node<NodeInfo>,
) {
	let info = &node.data.user_data;
	let context = state.focus.context();
	let opacity = context.weights.node_opacity(info.node);
	let (x, y) = (node.x() as f64, node.y() as f64);
	let radius = scale.node_radius;

	set_blur(state, ctx, BlurKey::Node(info.node));
	ctx.set_global_alpha(opacity);
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&info.color.to_css());
	ctx.fill();

	let ring = if state.focus.current_focus() == Some(info.node) {
		Some(theme.node.focus_color)
	} else if state.focus.is_pinned(info.node) {
		Some(theme.node.pin_color)
	} else {
		None
	};
	if let Some(ring) = ring {
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius + scale.ring_width, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(&ring.to_css());
		ctx.set_line_width(scale.ring_width);
		ctx.stroke();
	}

	set_blur(state, ctx, BlurKey::NodeLabel(info.node));
	let text = node_label(
		&state.data,
		info.node,
		state.focus.text_mode(),
		&context.weights,
		&context.layers,
		&context.degrees,
	);
	ctx.set_fill_style_str(&theme.node.label_color.to_css());
	ctx.set_font(&scale.label_font);
	let _ = ctx.fill_text(&text, x + radius + 4.0, y + 3.0);

	ctx.set_global_alpha(1.0);
	ctx.set_filter("none");
}
