//! Canvas rendering for the waste-flow chart.
//!
//! Drawing happens in passes for correct z-ordering:
//! 1. Background (screen space)
//! 2. Timeline band (screen space, unaffected by pan/zoom)
//! 3. Link ribbons, then node rectangles and labels (world space)
//! 4. Tooltip box and vignette (screen space)
//!
//! The bar variant replaces pass 3 with the stacked bar columns and the
//! shared waste pile.

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::graph::NodeKind;
use super::scale::{format_compact, format_grouped};
use super::state::{ChartMode, Hover, SankeyState};
use super::theme::{Color, Theme};

/// Attempt to smooth values that would otherwise cause abrupt visual changes.
fn smooth_step(t: f64) -> f64 {
	t * t * (3.0 - 2.0 * t)
}

/// Renders the complete chart to the canvas.
pub fn render(state: &SankeyState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	draw_background(state, ctx, theme);

	match state.mode {
		ChartMode::Sankey => {
			draw_timeline(state, ctx, theme);

			ctx.save();
			let _ = ctx.translate(state.transform.x, state.transform.y);
			let _ = ctx.scale(state.transform.k, state.transform.k);
			draw_links(state, ctx, theme);
			draw_nodes(state, ctx, theme);
			ctx.restore();

			draw_tooltip(state, ctx, theme);
		}
		ChartMode::Bars => {
			ctx.save();
			let _ = ctx.translate(state.transform.x, state.transform.y);
			let _ = ctx.scale(state.transform.k, state.transform.k);
			draw_bars(state, ctx, theme);
			ctx.restore();
		}
	}

	if theme.background.vignette > 0.0 {
		draw_vignette(state, ctx, theme);
	}
}

fn draw_background(state: &SankeyState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	if theme.background.use_gradient {
		let gradient = ctx
			.create_radial_gradient(
				state.width / 2.0,
				state.height / 2.0,
				0.0,
				state.width / 2.0,
				state.height / 2.0,
				(state.width.max(state.height)) * 0.8,
			)
			.unwrap();

		gradient
			.add_color_stop(0.0, &theme.background.color_secondary.to_css())
			.unwrap();
		gradient
			.add_color_stop(1.0, &theme.background.color.to_css())
			.unwrap();

		#[allow(deprecated)]
		ctx.set_fill_style(&gradient);
	} else {
		ctx.set_fill_style_str(&theme.background.color.to_css());
	}

	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_vignette(state: &SankeyState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let gradient = ctx
		.create_radial_gradient(
			state.width / 2.0,
			state.height / 2.0,
			state.width.min(state.height) * 0.3,
			state.width / 2.0,
			state.height / 2.0,
			state.width.max(state.height) * 0.7,
		)
		.unwrap();

	gradient.add_color_stop(0.0, "rgba(0, 0, 0, 0)").unwrap();
	gradient
		.add_color_stop(
			1.0,
			&format!("rgba(0, 0, 0, {})", theme.background.vignette),
		)
		.unwrap();

	#[allow(deprecated)]
	ctx.set_fill_style(&gradient);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn draw_timeline(state: &SankeyState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	if state.years.is_empty() {
		return;
	}

	let geo = &state.geometry;
	let scale = geo.timeline_scale(&state.years, state.width);
	let cy = geo.timeline_y();
	let r = geo.timeline.marker_radius;

	// Connecting segments stop short of the markers on both sides.
	ctx.set_stroke_style_str(&theme.timeline.stroke.to_css());
	ctx.set_line_width(geo.timeline.line_width);
	for pair in state.years.windows(2) {
		let x1 = scale.apply(pair[0] as f64);
		let x2 = scale.apply(pair[1] as f64);
		ctx.begin_path();
		ctx.move_to(x1 + r, cy);
		ctx.line_to(x2 - r, cy);
		ctx.stroke();
	}

	ctx.set_font(&format!("bold {}px sans-serif", geo.label_font_size));
	ctx.set_text_align("center");

	for &year in &state.years {
		let cx = scale.apply(year as f64);
		let hover_t = smooth_step(state.highlight.intensity(Hover::YearMarker(year)));
		let selected = year == state.selected_year;
		let radius = if selected { r } else { r * (1.0 + 0.1 * hover_t) };

		ctx.begin_path();
		let _ = ctx.arc(cx, cy, radius, 0.0, 2.0 * PI);
		if selected {
			ctx.set_fill_style_str(&theme.timeline.selected_fill.to_css());
			ctx.fill();
		} else if hover_t > 0.01 {
			let fill = theme.timeline.hover_fill;
			ctx.set_fill_style_str(&fill.with_alpha(fill.a * hover_t).to_css());
			ctx.fill();
		}
		ctx.set_stroke_style_str(&theme.timeline.stroke.to_css());
		ctx.set_line_width(2.0);
		ctx.stroke();

		ctx.set_fill_style_str(&theme.text.to_css());
		let _ = ctx.fill_text(&year.to_string(), cx, cy - r * 2.0);
	}

	ctx.set_text_align("start");
}

fn draw_links(state: &SankeyState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let geo = &state.geometry;
	let max_t = smooth_step(state.highlight.max_intensity());

	for (i, link) in state.layout.links.iter().enumerate() {
		let entrance = state.entrance_alpha(i);
		if entrance <= 0.0 {
			continue;
		}

		let src = &state.layout.nodes[link.source];
		let tgt = &state.layout.nodes[link.target];
		let (x0, x1) = (src.x1, tgt.x0);
		if x1 <= x0 {
			continue;
		}

		let link_t = smooth_step(state.highlight.intensity(Hover::Link(i)));
		let dim = if link_t > 0.01 {
			1.0 + 0.3 * link_t
		} else if max_t > 0.01 {
			1.0 - 0.6 * max_t
		} else {
			1.0
		};
		let alpha = (theme.link_opacity * dim * entrance).clamp(0.0, 1.0);

		let color = match state.graph.nodes[link.target].kind {
			NodeKind::Terminal(d) => theme.flow.for_disposal(d),
			_ => theme.flow.generated,
		};
		ctx.set_stroke_style_str(&color.with_alpha(alpha).to_css());
		ctx.set_line_width(link.width.max(geo.link_min_width) * (1.0 + 0.4 * link_t));

		// Draw-on entrance: reveal the ribbon from its source end.
		if entrance < 1.0 {
			let approx_len = (x1 - x0) * 1.2 + (link.ty - link.sy).abs() * 0.3;
			let _ = ctx.set_line_dash(&js_sys::Array::of2(
				&JsValue::from_f64(approx_len),
				&JsValue::from_f64(approx_len),
			));
			ctx.set_line_dash_offset(approx_len * (1.0 - entrance));
		} else {
			let _ = ctx.set_line_dash(&js_sys::Array::new());
		}

		let mid = (x0 + x1) / 2.0;
		ctx.begin_path();
		ctx.move_to(x0, link.sy);
		let _ = ctx.bezier_curve_to(mid, link.sy, mid, link.ty, x1, link.ty);
		ctx.stroke();
	}

	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

/// Drawn rectangle of a node, expanded and centered when thinner than the
/// minimum height.
fn node_rect(state: &SankeyState, idx: usize) -> (f64, f64, f64, f64) {
	let node = &state.layout.nodes[idx];
	let min_h = state.geometry.node_min_height;
	let h = node.height();
	if h < min_h {
		(node.x0, node.y0 - (min_h - h) / 2.0, node.x1 - node.x0, min_h)
	} else {
		(node.x0, node.y0, node.x1 - node.x0, h)
	}
}

fn draw_nodes(state: &SankeyState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let geo = &state.geometry;
	let max_t = smooth_step(state.highlight.max_intensity());
	let label_font = format!("bold {}px sans-serif", geo.label_font_size);

	for (i, node) in state.graph.nodes.iter().enumerate() {
		let entrance = state.entrance_alpha(i);
		if entrance <= 0.0 {
			continue;
		}

		let node_t = smooth_step(state.highlight.intensity(Hover::Node(i)));
		let dim = if node_t > 0.01 {
			1.0
		} else if max_t > 0.01 {
			1.0 - 0.5 * max_t
		} else {
			1.0
		};
		let alpha = entrance * dim;

		let base = match node.kind {
			NodeKind::Terminal(d) => theme.flow.for_disposal(d),
			_ => theme.flow.generated,
		};
		let fill = base.lighten(0.25 * node_t);
		let (x, y, w, h) = node_rect(state, i);

		ctx.set_global_alpha(alpha);
		ctx.set_fill_style_str(&fill.to_css());
		ctx.fill_rect(x, y, w, h);
		ctx.set_stroke_style_str(&theme.node_stroke.to_css());
		ctx.set_line_width(1.5 / state.transform.k);
		ctx.stroke_rect(x, y, w, h);

		// Countries label to the left, terminals to the right; the
		// `_generated` intermediates repeat the country value and stay bare.
		let label = match node.kind {
			NodeKind::Country => Some((x - 10.0, "end")),
			NodeKind::Terminal(_) => Some((x + w + 10.0, "start")),
			NodeKind::Generated => None,
		};
		if let Some((lx, align)) = label {
			let value = state.layout.nodes[i].value;
			ctx.set_fill_style_str(&theme.text.to_css());
			ctx.set_font(&label_font);
			ctx.set_text_align(align);
			let _ = ctx.fill_text(
				&format!("{} ({})", node.name, format_compact(value)),
				lx,
				y + h / 2.0 + geo.label_font_size * 0.35,
			);
		}
		ctx.set_global_alpha(1.0);
	}

	ctx.set_text_align("start");
}

fn draw_tooltip(state: &SankeyState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let (Some(hover), Some((cx, cy))) = (state.highlight.hovered, state.cursor) else {
		return;
	};
	let Some(tip) = state.tooltip_for(hover) else {
		return;
	};

	const PAD: f64 = 10.0;
	const LINE_H: f64 = 20.0;
	let font = "14px sans-serif";
	let title_font = "bold 14px sans-serif";

	let measure = |text: &str| -> f64 {
		ctx.measure_text(text).map(|m| m.width()).unwrap_or(0.0)
	};
	ctx.set_font(title_font);
	let mut text_w = measure(&tip.title);
	ctx.set_font(font);
	for line in &tip.lines {
		text_w = text_w.max(measure(line));
	}

	let w = text_w + PAD * 2.0;
	let h = (tip.lines.len() + 1) as f64 * LINE_H + PAD * 2.0;
	// Offset from the cursor, flipped when it would leave the canvas.
	let x = if cx + 12.0 + w > state.width {
		cx - 12.0 - w
	} else {
		cx + 12.0
	};
	let y = if cy + 12.0 + h > state.height {
		cy - 12.0 - h
	} else {
		cy + 12.0
	};

	let accent = match tip.accent {
		Some(d) => theme.flow.for_disposal(d),
		None => theme.flow.generated,
	};

	ctx.set_fill_style_str(&Color::rgba(20, 22, 28, 0.95).to_css());
	ctx.fill_rect(x, y, w, h);
	ctx.set_stroke_style_str(&accent.to_css());
	ctx.set_line_width(2.0);
	ctx.stroke_rect(x, y, w, h);

	ctx.set_text_align("start");
	ctx.set_fill_style_str(&theme.text.to_css());
	ctx.set_font(title_font);
	let _ = ctx.fill_text(&tip.title, x + PAD, y + PAD + LINE_H * 0.7);
	ctx.set_font(font);
	for (i, line) in tip.lines.iter().enumerate() {
		let _ = ctx.fill_text(line, x + PAD, y + PAD + LINE_H * (i as f64 + 1.7));
	}
}

fn draw_bars(state: &SankeyState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let geo = &state.bar_geometry;
	let layout = &state.bar_layout;

	ctx.set_text_align("center");
	ctx.set_fill_style_str(&theme.text.to_css());
	ctx.set_font("24px sans-serif");
	for column in &layout.columns {
		let _ = ctx.fill_text(&column.name, column.center_x, geo.margin_top - 40.0);
	}

	for row in &layout.rows {
		for seg in &row.segments {
			ctx.set_fill_style_str(&theme.flow.for_disposal(seg.disposal).to_css());
			ctx.fill_rect(seg.x, row.y, seg.width, geo.bar_height);
			ctx.set_stroke_style_str(&theme.node_stroke.to_css());
			ctx.set_line_width(1.0);
			ctx.stroke_rect(seg.x, row.y, seg.width, geo.bar_height);
		}

		ctx.set_fill_style_str(&theme.text.to_css());
		ctx.set_font("12px sans-serif");
		ctx.set_text_align("center");
		let _ = ctx.fill_text(
			&format!("{} tonnes", format_grouped(row.generated)),
			layout.columns[row.country].center_x,
			row.y + geo.bar_height / 2.0 + 5.0,
		);

		// Year labels on the left, against the first column only.
		if row.country == 0 {
			ctx.set_font("14px sans-serif");
			ctx.set_text_align("start");
			let _ = ctx.fill_text(
				&row.year.to_string(),
				geo.margin_left,
				row.y + geo.bar_height / 2.0 + 5.0,
			);
			ctx.set_text_align("center");
		}

		// Pipe from each country's most recent bar down to the shared pile.
		if row.is_final {
			let from_x = row.x + row.segments[0].width + row.segments[1].width - 50.0;
			let from_y = row.y + geo.bar_height;
			ctx.set_stroke_style_str(
				&theme.flow.generated.with_alpha(0.4).to_css(),
			);
			ctx.set_line_width(2.0);
			ctx.begin_path();
			ctx.move_to(from_x, from_y);
			let _ = ctx.bezier_curve_to(
				from_x,
				from_y + 80.0,
				layout.pile.x,
				layout.pile.y - 100.0,
				layout.pile.x,
				layout.pile.y,
			);
			ctx.stroke();
		}
	}

	let pile = &layout.pile;
	ctx.begin_path();
	ctx.move_to(pile.x - pile.width / 2.0, pile.y);
	ctx.line_to(pile.x, pile.y - geo.pile_height);
	ctx.line_to(pile.x + pile.width / 2.0, pile.y);
	ctx.close_path();
	ctx.set_fill_style_str(&theme.flow.residual.to_css());
	ctx.fill();
	ctx.set_stroke_style_str(&Color::rgb(85, 85, 85).to_css());
	ctx.stroke();

	ctx.set_fill_style_str(&theme.text.to_css());
	ctx.set_font("14px sans-serif");
	let _ = ctx.fill_text(
		"Total unprocessed waste",
		pile.x,
		pile.y + 25.0,
	);
	ctx.set_text_align("start");
}
