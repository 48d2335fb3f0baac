//! Visual theming for the waste-flow chart.

use super::graph::Disposal;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Lighten the color by a factor (0.0 = unchanged, 1.0 = white)
	pub fn lighten(self, factor: f64) -> Self {
		let f = factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 + (255.0 - self.r as f64) * f) as u8,
			g: (self.g as f64 + (255.0 - self.g as f64) * f) as u8,
			b: (self.b as f64 + (255.0 - self.b as f64) * f) as u8,
			a: self.a,
		}
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	/// Primary background color
	pub color: Color,
	/// Secondary color for gradients
	pub color_secondary: Color,
	/// Whether to use radial gradient
	pub use_gradient: bool,
	/// Vignette intensity (0.0 = none, 1.0 = strong)
	pub vignette: f64,
}

/// Colors of the flow categories. Country and `_generated` nodes, and the
/// links leaving them, take the `generated` color; disposal links take their
/// terminal's color.
#[derive(Clone, Debug)]
pub struct FlowColors {
	pub generated: Color,
	pub incinerated: Color,
	pub recycled: Color,
	pub residual: Color,
}

impl FlowColors {
	pub fn for_disposal(&self, disposal: Disposal) -> Color {
		match disposal {
			Disposal::Incinerated => self.incinerated,
			Disposal::Recycled => self.recycled,
			Disposal::Residual => self.residual,
		}
	}
}

/// Timeline band colors.
#[derive(Clone, Debug)]
pub struct TimelineColors {
	/// Marker outline and connecting line.
	pub stroke: Color,
	/// Fill of the selected year's marker.
	pub selected_fill: Color,
	/// Fill of a hovered, unselected marker.
	pub hover_fill: Color,
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub name: &'static str,
	pub background: BackgroundStyle,
	pub flow: FlowColors,
	pub text: Color,
	pub node_stroke: Color,
	pub link_opacity: f64,
	pub timeline: TimelineColors,
}

impl Theme {
	/// Purple/orange/green palette on a dark slate background (default)
	pub fn default_theme() -> Self {
		Self {
			name: "default",
			background: BackgroundStyle {
				color: Color::rgb(33, 37, 41),
				color_secondary: Color::rgb(41, 46, 52),
				use_gradient: true,
				vignette: 0.15,
			},
			flow: FlowColors {
				generated: Color::rgb(0x75, 0x70, 0xb3),
				incinerated: Color::rgb(0xd9, 0x5f, 0x02),
				recycled: Color::rgb(0x1b, 0x9e, 0x77),
				// Residual reads as generated waste that never left.
				residual: Color::rgb(0x75, 0x70, 0xb3),
			},
			text: Color::rgb(255, 255, 255),
			node_stroke: Color::rgb(0, 0, 0),
			link_opacity: 0.7,
			timeline: TimelineColors {
				stroke: Color::rgb(255, 255, 255),
				selected_fill: Color::rgb(255, 255, 255),
				hover_fill: Color::rgba(255, 255, 255, 0.5),
			},
		}
	}

	/// Earlier gray/red/green palette
	pub fn classic() -> Self {
		Self {
			name: "classic",
			background: BackgroundStyle {
				color: Color::rgb(33, 37, 41),
				color_secondary: Color::rgb(33, 37, 41),
				use_gradient: false,
				vignette: 0.0,
			},
			flow: FlowColors {
				generated: Color::rgb(0x80, 0x80, 0x80),
				incinerated: Color::rgb(0xd7, 0x19, 0x1c),
				recycled: Color::rgb(0x1a, 0x98, 0x50),
				residual: Color::rgb(0x80, 0x80, 0x80),
			},
			text: Color::rgb(255, 255, 255),
			node_stroke: Color::rgb(0, 0, 0),
			link_opacity: 0.7,
			timeline: TimelineColors {
				stroke: Color::rgb(255, 255, 255),
				selected_fill: Color::rgb(255, 255, 255),
				hover_fill: Color::rgba(255, 255, 255, 0.5),
			},
		}
	}

	/// High-contrast palette with pure red/green terminals
	pub fn primary() -> Self {
		Self {
			name: "primary",
			background: BackgroundStyle {
				color: Color::rgb(33, 37, 41),
				color_secondary: Color::rgb(33, 37, 41),
				use_gradient: false,
				vignette: 0.0,
			},
			flow: FlowColors {
				generated: Color::rgb(0x80, 0x80, 0x80),
				incinerated: Color::rgb(0xff, 0x00, 0x00),
				recycled: Color::rgb(0x00, 0x80, 0x00),
				residual: Color::rgb(0x80, 0x80, 0x80),
			},
			text: Color::rgb(255, 255, 255),
			node_stroke: Color::rgb(0, 0, 0),
			link_opacity: 0.7,
			timeline: TimelineColors {
				stroke: Color::rgb(255, 255, 255),
				selected_fill: Color::rgb(255, 255, 255),
				hover_fill: Color::rgba(255, 255, 255, 0.5),
			},
		}
	}
}

impl Default for Theme {
	fn default() -> Self {
		Self::default_theme()
	}
}
