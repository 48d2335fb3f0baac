//! Value scales, number formatting, and chart geometry.
//!
//! Geometry values are the tuned constants of the chart: margins, node sizing,
//! and the timeline band. They are compile-time configuration; there is no
//! runtime settings surface.

/// Linear mapping from a data domain to a pixel range.
#[derive(Clone, Copy, Debug)]
pub struct LinearScale {
	pub domain: (f64, f64),
	pub range: (f64, f64),
}

impl LinearScale {
	pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
		Self { domain, range }
	}

	/// Maps a domain value into the range. A degenerate domain collapses to
	/// the start of the range.
	pub fn apply(&self, v: f64) -> f64 {
		let (d0, d1) = self.domain;
		let (r0, r1) = self.range;
		if d0 == d1 {
			return r0;
		}
		r0 + (v - d0) / (d1 - d0) * (r1 - r0)
	}

	/// Maps a range value back into the domain. Used by timeline hit testing.
	pub fn invert(&self, v: f64) -> f64 {
		let (d0, d1) = self.domain;
		let (r0, r1) = self.range;
		if r0 == r1 {
			return d0;
		}
		d0 + (v - r0) / (r1 - r0) * (d1 - d0)
	}
}

/// Compact magnitude formatting for node labels: `1.2M`, `3.4K`, `512`.
pub fn format_compact(value: f64) -> String {
	if value >= 1e6 {
		format!("{:.1}M", value / 1e6)
	} else if value >= 1e3 {
		format!("{:.1}K", value / 1e3)
	} else {
		format!("{value:.0}")
	}
}

/// Tooltip amount formatting with the unit spelled out.
pub fn format_tonnes(value: f64) -> String {
	if value >= 1e6 {
		format!("{:.1}M tonnes", value / 1e6)
	} else if value >= 1e3 {
		format!("{:.1}K tonnes", value / 1e3)
	} else {
		format!("{value:.0} tonnes")
	}
}

/// Thousands-grouped integer rendering for bar labels: `1,234,567`.
pub fn format_grouped(value: f64) -> String {
	let digits = format!("{:.0}", value.abs());
	let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
	for (i, c) in digits.chars().enumerate() {
		if i > 0 && (digits.len() - i) % 3 == 0 {
			grouped.push(',');
		}
		grouped.push(c);
	}
	if value < 0.0 {
		format!("-{grouped}")
	} else {
		grouped
	}
}

/// One-decimal percentage of `part` in `whole`. Zero when `whole` is zero,
/// so tooltips for empty totals stay readable.
pub fn percent_of(part: f64, whole: f64) -> f64 {
	if whole == 0.0 {
		return 0.0;
	}
	(part / whole * 1000.0).round() / 10.0
}

/// Timeline band geometry, drawn above the diagram.
#[derive(Clone, Debug)]
pub struct TimelineGeometry {
	/// Band height in pixels.
	pub height: f64,
	/// Year marker radius.
	pub marker_radius: f64,
	/// Connecting line width.
	pub line_width: f64,
	/// Horizontal inset of the first and last marker from the chart extent.
	pub inset: f64,
	/// Gap between the band and the top of the diagram.
	pub gap: f64,
}

/// Static layout constants for the whole chart.
#[derive(Clone, Debug)]
pub struct ChartGeometry {
	pub margin_top: f64,
	pub margin_right: f64,
	pub margin_bottom: f64,
	pub margin_left: f64,
	/// Width of node rectangles.
	pub node_width: f64,
	/// Vertical gap between stacked nodes in a column.
	pub node_padding: f64,
	/// Rectangles thinner than this are drawn at this height, centered.
	pub node_min_height: f64,
	/// Minimum ribbon stroke width so tiny flows stay visible.
	pub link_min_width: f64,
	pub label_font_size: f64,
	pub title_font_size: f64,
	pub timeline: TimelineGeometry,
}

impl Default for ChartGeometry {
	fn default() -> Self {
		Self {
			margin_top: 100.0,
			margin_right: 300.0,
			margin_bottom: 100.0,
			// Wide enough for country labels left of the first column.
			margin_left: 400.0,
			node_width: 35.0,
			node_padding: 63.0,
			node_min_height: 20.0,
			link_min_width: 1.0,
			label_font_size: 22.0,
			title_font_size: 24.0,
			timeline: TimelineGeometry {
				height: 50.0,
				marker_radius: 12.0,
				line_width: 2.0,
				inset: 100.0,
				gap: 100.0,
			},
		}
	}
}

impl ChartGeometry {
	/// Scale placing year markers across the drawable width.
	pub fn timeline_scale(&self, years: &[i32], width: f64) -> LinearScale {
		let min = years.first().copied().unwrap_or(0) as f64;
		let max = years.last().copied().unwrap_or(0) as f64;
		LinearScale::new(
			(min, max),
			(
				self.margin_left + self.timeline.inset,
				width - self.margin_right - self.timeline.inset,
			),
		)
	}

	/// Vertical center of the timeline band.
	pub fn timeline_y(&self) -> f64 {
		self.margin_top + self.timeline.height / 2.0
	}

	/// Top edge of the diagram extent, below the timeline band.
	pub fn diagram_top(&self) -> f64 {
		self.margin_top + self.timeline.height + self.timeline.gap
	}
}
