//! Colors and visual style.

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	/// Red.
	pub r: u8,
	/// Green.
	pub g: u8,
	/// Blue.
	pub b: u8,
	/// Alpha in `[0, 1]`.
	pub a: f64,
}

impl Color {
	/// Opaque color.
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	/// Color with alpha.
	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Same color with its alpha multiplied by `factor`.
	pub fn faded(self, factor: f64) -> Self {
		Self {
			a: self.a * factor.clamp(0.0, 1.0),
			..self
		}
	}

	/// `rgba(...)` string for canvas styles.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {:.3})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Colors assigned to node groups in first-seen order.
#[derive(Clone, Debug)]
pub struct NodePalette {
	/// Colors cycled through by group index.
	pub colors: Vec<Color>,
}

impl NodePalette {
	/// Teal-led default, matching the classic `#69b3a2` node fill.
	pub fn teal() -> Self {
		Self {
			colors: vec![
				Color::rgb(105, 179, 162),
				Color::rgb(94, 129, 172),
				Color::rgb(191, 144, 96),
				Color::rgb(150, 120, 170),
				Color::rgb(196, 108, 108),
				Color::rgb(120, 160, 100),
				Color::rgb(200, 180, 110),
				Color::rgb(130, 150, 160),
			],
		}
	}

	/// Color for group `index`, wrapping around.
	pub fn get(&self, index: usize) -> Color {
		self.colors[index % self.colors.len()]
	}
}

/// Link stroke and label colors.
#[derive(Clone, Debug)]
pub struct LinkStyle {
	/// Stroke and arrowhead color.
	pub color: Color,
	/// Relation label text.
	pub label_color: Color,
}

/// Node fill, label and ring colors.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	/// Fill for nodes without a group or color override.
	pub default_color: Color,
	/// Node label text.
	pub label_color: Color,
	/// Ring drawn around user-pinned nodes.
	pub pin_color: Color,
	/// Ring drawn around the focus node.
	pub focus_color: Color,
}

/// Colors for the whole canvas.
#[derive(Clone, Debug)]
pub struct Theme {
	/// Canvas fill.
	pub background: Color,
	/// Group colors.
	pub palette: NodePalette,
	/// Link colors.
	pub link: LinkStyle,
	/// Node colors.
	pub node: NodeStyle,
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			background: Color::rgb(250, 250, 248),
			palette: NodePalette::teal(),
			link: LinkStyle {
				color: Color::rgb(153, 153, 153),
				label_color: Color::rgb(90, 90, 90),
			},
			node: NodeStyle {
				default_color: Color::rgb(105, 179, 162),
				label_color: Color::rgb(40, 40, 40),
				pin_color: Color::rgb(60, 60, 60),
				focus_color: Color::rgb(230, 120, 40),
			},
		}
	}
}

/// Parses a CSS color string into a [`Color`].
/// Supports hex (`#RRGGBB`) and `rgb()`/`rgba()` functional notation.
pub fn parse_color(color_str: &str) -> Option<Color> {
	if let Some(hex) = color_str.strip_prefix('#') {
		if hex.len() != 6 {
			return None;
		}
		let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
		return Some(Color::rgb(channel(0)?, channel(2)?, channel(4)?));
	}

	let inner = color_str
		.strip_prefix("rgba(")
		.or_else(|| color_str.strip_prefix("rgb("))?
		.strip_suffix(')')?;
	let parts: Vec<&str> = inner.split(',').map(str::trim).collect();
	let r = parts.first()?.parse().ok()?;
	let g = parts.get(1)?.parse().ok()?;
	let b = parts.get(2)?.parse().ok()?;
	let a = parts.get(3).and_then(|s| s.parse().ok()).unwrap_or(1.0);
	Some(Color::rgba(r, g, b, a))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn parses_hex_and_rgb() {
		assert_eq!(parse_color("#69b3a2"), Some(Color::rgb(105, 179, 162)));
		assert_eq!(parse_color("rgb(1, 2, 3)"), Some(Color::rgb(1, 2, 3)));
		assert_eq!(
			parse_color("rgba(1,2,3,0.5)"),
			Some(Color::rgba(1, 2, 3, 0.5))
		);
		assert_eq!(parse_color("teal"), None);
		assert_eq!(parse_color("#fff"), None);
	}

	#[test]
	fn faded_color_is_css_rgba() {
		let c = Color::rgb(153, 153, 153).faded(0.25);
		assert_eq!(c.to_css(), "rgba(153, 153, 153, 0.250)");
		assert_eq!(Color::rgb(153, 153, 153).to_css(), "#999999");
	}
}
