//! Chart state and interaction tracking.
//!
//! Owns the loaded dataset, the flow graph and layout for the selected year,
//! the pan/zoom transform, and hover highlight state with smooth intensity
//! transitions. Selecting a year discards and rebuilds the graph and layout
//! from scratch; only the dataset itself persists.

use std::collections::{HashMap, HashSet};

use super::bars::{BarGeometry, BarLayout};
use super::graph::{Disposal, FlowGraph, NodeKind};
use super::layout::{Extent, SankeyLayout};
use super::scale::{ChartGeometry, format_tonnes, percent_of};
use super::types::Dataset;

/// Which of the two chart variants is being drawn.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ChartMode {
	#[default]
	Sankey,
	Bars,
}

/// An interactive element under the cursor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Hover {
	/// A node rectangle, by flow-graph node index.
	Node(usize),
	/// A link ribbon, by flow-graph edge index.
	Link(usize),
	/// A timeline year marker.
	YearMarker(i32),
}

/// Pan and zoom transform applied to the diagram (not the timeline band).
#[derive(Clone, Copy, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// Manages smooth highlight transitions with per-element intensity tracking.
///
/// Each hoverable element has its own intensity value (0.0 to 1.0) animated
/// with exponential smoothing toward membership in the active highlight set,
/// so hover effects ease in and out instead of flashing.
///
/// Includes a minimum hold time to prevent flashing when the mouse briefly
/// skirts the edge of an element's hover zone.
#[derive(Clone, Debug, Default)]
pub struct HighlightState {
	/// Currently hovered element (if any)
	pub hovered: Option<Hover>,
	/// Set of elements that should be highlighted (hovered + connected)
	target_set: HashSet<Hover>,
	/// Per-element highlight intensity. Elements not in this map are at 0.
	intensity: HashMap<Hover, f64>,
	/// Per-element hold timer - time remaining before fade-out can begin
	hold_timer: HashMap<Hover, f64>,
	/// Cached max intensity (updated each tick)
	cached_max: f64,
}

/// Minimum time (seconds) a highlight must be held before it can fade out.
const MIN_HOLD_TIME: f64 = 0.12;

impl HighlightState {
	/// Update the hovered element and recompute the target highlight set.
	/// Hovering a node pulls in its incident links and their far endpoints;
	/// hovering a link pulls in both endpoints.
	pub fn set_hover(&mut self, hover: Option<Hover>, graph: &FlowGraph) {
		if self.hovered == hover {
			return;
		}

		self.hovered = hover;
		self.target_set.clear();

		if let Some(element) = hover {
			self.target_set.insert(element);
			match element {
				Hover::Node(idx) => {
					for (e, edge) in graph.edges.iter().enumerate() {
						if edge.source == idx {
							self.target_set.insert(Hover::Link(e));
							self.target_set.insert(Hover::Node(edge.target));
						} else if edge.target == idx {
							self.target_set.insert(Hover::Link(e));
							self.target_set.insert(Hover::Node(edge.source));
						}
					}
				}
				Hover::Link(e) => {
					if let Some(edge) = graph.edges.get(e) {
						self.target_set.insert(Hover::Node(edge.source));
						self.target_set.insert(Hover::Node(edge.target));
					}
				}
				Hover::YearMarker(_) => {}
			}

			for &element in &self.target_set {
				self.hold_timer.insert(element, MIN_HOLD_TIME);
			}
		}
	}

	/// Animate all intensities towards their targets using exponential
	/// smoothing: value += (target - value) * (1 - e^(-speed * dt)).
	pub fn tick(&mut self, dt: f64) {
		const FADE_IN_SPEED: f64 = 6.0; // ~150ms to 95%
		const FADE_OUT_SPEED: f64 = 4.0; // ~250ms to 95%

		let fade_in_factor = 1.0 - (-FADE_IN_SPEED * dt).exp();
		let fade_out_decay = (-FADE_OUT_SPEED * dt).exp();

		for &element in &self.target_set {
			let intensity = self.intensity.entry(element).or_insert(0.0);
			*intensity += (1.0 - *intensity) * fade_in_factor;
		}

		self.hold_timer.retain(|element, timer| {
			if self.target_set.contains(element) {
				true
			} else {
				*timer -= dt;
				*timer > 0.0
			}
		});

		let mut new_max: f64 = 0.0;
		self.intensity.retain(|element, intensity| {
			if self.target_set.contains(element) {
				new_max = new_max.max(*intensity);
				true
			} else {
				let hold_remaining = self.hold_timer.get(element).copied().unwrap_or(0.0);
				if hold_remaining <= 0.0 {
					*intensity *= fade_out_decay;
				}
				new_max = new_max.max(*intensity);
				*intensity > 0.005
			}
		});

		self.cached_max = new_max;
	}

	/// Smoothed highlight intensity for an element.
	pub fn intensity(&self, element: Hover) -> f64 {
		self.intensity.get(&element).copied().unwrap_or(0.0)
	}

	/// Maximum intensity of any element (used for dimming the rest).
	pub fn max_intensity(&self) -> f64 {
		self.cached_max
	}
}

/// Tooltip content for the hovered element. Pure data; rendering draws it.
#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
	pub title: String,
	pub lines: Vec<String>,
	/// Border color category; `None` takes the generated color.
	pub accent: Option<Disposal>,
}

/// Core chart state combining data, layout, and interaction tracking.
///
/// Created once when the component mounts, then mutated by the animation loop
/// and event handlers. `select_year` throws away all per-year visual state.
pub struct SankeyState {
	pub dataset: Dataset,
	pub years: Vec<i32>,
	pub selected_year: i32,
	pub mode: ChartMode,
	pub graph: FlowGraph,
	pub layout: SankeyLayout,
	pub bar_layout: BarLayout,
	pub geometry: ChartGeometry,
	pub bar_geometry: BarGeometry,
	pub transform: ViewTransform,
	pub pan: PanState,
	pub highlight: HighlightState,
	pub width: f64,
	pub height: f64,
	/// Last known cursor position in screen coordinates; `None` once the
	/// pointer leaves the canvas. Anchors the tooltip box.
	pub cursor: Option<(f64, f64)>,
	pub animation_running: bool,
	/// Seconds since the current year's diagram was (re)built. Drives the
	/// staggered entrance animation.
	pub flow_time: f64,
}

/// Per-element entrance stagger (seconds between successive elements).
const ENTRANCE_STAGGER: f64 = 0.1;
/// Duration of each element's entrance fade.
const ENTRANCE_FADE: f64 = 0.8;

impl SankeyState {
	pub fn new(dataset: Dataset, mode: ChartMode, width: f64, height: f64) -> Self {
		let years = dataset.years();
		let selected_year = dataset.latest_year().unwrap_or(0);
		let mut state = Self {
			dataset,
			years,
			selected_year,
			mode,
			graph: FlowGraph::default(),
			layout: SankeyLayout::default(),
			bar_layout: BarLayout::default(),
			geometry: ChartGeometry::default(),
			bar_geometry: BarGeometry::default(),
			transform: ViewTransform::default(),
			pan: PanState::default(),
			highlight: HighlightState::default(),
			width,
			height,
			cursor: None,
			animation_running: true,
			flow_time: 0.0,
		};
		state.rebuild();
		state
	}

	/// Rebuilds graph and layouts for the current selection and canvas size.
	fn rebuild(&mut self) {
		self.graph = FlowGraph::build(&self.dataset.records, self.selected_year);
		let extent = Extent::from_geometry(&self.geometry, self.width, self.height);
		self.layout = SankeyLayout::compute(&self.graph, extent, &self.geometry);
		self.bar_layout = BarLayout::compute(
			&self.dataset.records,
			self.width,
			self.height,
			&self.bar_geometry,
		);
	}

	/// Switches to a year and rebuilds all visual state. Selecting the
	/// current year is a no-op (matches the timeline's click behavior).
	pub fn select_year(&mut self, year: i32) {
		if year == self.selected_year {
			return;
		}
		self.selected_year = year;
		self.flow_time = 0.0;
		self.highlight = HighlightState::default();
		self.rebuild();
	}

	pub fn set_hover(&mut self, hover: Option<Hover>) {
		self.highlight.set_hover(hover, &self.graph);
	}

	pub fn tick(&mut self, dt: f64) {
		self.flow_time += dt;
		self.highlight.tick(dt);
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
		self.rebuild();
	}

	pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Entrance alpha for the `index`-th element of a draw pass.
	pub fn entrance_alpha(&self, index: usize) -> f64 {
		((self.flow_time - index as f64 * ENTRANCE_STAGGER) / ENTRANCE_FADE).clamp(0.0, 1.0)
	}

	/// The interactive element under a screen position, if any. Timeline
	/// markers sit above the diagram and win; nodes win over ribbons.
	pub fn hover_at_position(&self, sx: f64, sy: f64) -> Option<Hover> {
		if self.mode != ChartMode::Sankey {
			return None;
		}
		if let Some(year) = self.year_marker_at_position(sx, sy) {
			return Some(Hover::YearMarker(year));
		}
		if let Some(idx) = self.node_at_position(sx, sy) {
			return Some(Hover::Node(idx));
		}
		self.link_at_position(sx, sy).map(Hover::Link)
	}

	/// Timeline markers are drawn in screen space, unaffected by pan/zoom.
	/// The bar variant shows all years at once and has no timeline.
	pub fn year_marker_at_position(&self, sx: f64, sy: f64) -> Option<i32> {
		if self.mode != ChartMode::Sankey {
			return None;
		}
		let scale = self.geometry.timeline_scale(&self.years, self.width);
		let cy = self.geometry.timeline_y();
		let hit = self.geometry.timeline.marker_radius + 4.0;
		self.years.iter().copied().find(|&year| {
			let cx = scale.apply(year as f64);
			let (dx, dy) = (sx - cx, sy - cy);
			(dx * dx + dy * dy).sqrt() < hit
		})
	}

	pub fn node_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (x, y) = self.screen_to_world(sx, sy);
		let min_h = self.geometry.node_min_height;
		self.layout.nodes.iter().position(|node| {
			// Thin nodes are drawn expanded to the minimum height, centered;
			// hit test the drawn rectangle.
			let (y0, y1) = if node.height() < min_h {
				let pad = (min_h - node.height()) / 2.0;
				(node.y0 - pad, node.y1 + pad)
			} else {
				(node.y0, node.y1)
			};
			x >= node.x0 && x <= node.x1 && y >= y0 && y <= y1
		})
	}

	pub fn link_at_position(&self, sx: f64, sy: f64) -> Option<usize> {
		let (x, y) = self.screen_to_world(sx, sy);
		let min_w = self.geometry.link_min_width;
		self.layout.links.iter().position(|link| {
			let src = &self.layout.nodes[link.source];
			let tgt = &self.layout.nodes[link.target];
			let (x0, x1) = (src.x1, tgt.x0);
			if x1 - x0 < 1.0 || x < x0 || x > x1 {
				return false;
			}
			// Ribbons ease between their anchors; smoothstep tracks the
			// rendered curve closely enough for hit testing.
			let t = (x - x0) / (x1 - x0);
			let ease = t * t * (3.0 - 2.0 * t);
			let yc = link.sy + (link.ty - link.sy) * ease;
			(y - yc).abs() <= link.width.max(min_w) / 2.0
		})
	}

	/// Tooltip content for an element, from the underlying records.
	pub fn tooltip_for(&self, hover: Hover) -> Option<Tooltip> {
		match hover {
			Hover::YearMarker(_) => None,
			Hover::Node(idx) => {
				let node = self.graph.nodes.get(idx)?;
				match node.kind {
					NodeKind::Terminal(disposal) => Some(self.terminal_tooltip(idx, disposal)),
					NodeKind::Country => self.country_tooltip(&node.name, None),
					NodeKind::Generated => {
						let country = node.name.strip_suffix("_generated")?.to_string();
						self.country_tooltip(&country, None)
					}
				}
			}
			Hover::Link(e) => {
				let edge = self.graph.edges.get(e)?;
				let country = self.graph.edge_country(edge)?.to_string();
				let accent = match self.graph.nodes[edge.target].kind {
					NodeKind::Terminal(d) => Some(d),
					_ => None,
				};
				self.country_tooltip(&country, accent)
			}
		}
	}

	fn country_tooltip(&self, country: &str, accent: Option<Disposal>) -> Option<Tooltip> {
		let record = self.dataset.find(country, self.selected_year)?;
		Some(Tooltip {
			title: country.to_string(),
			lines: vec![
				format!("Generated: {}", format_tonnes(record.generated)),
				format!(
					"Incinerated: {} ({:.1}% of generated)",
					format_tonnes(record.incinerated),
					percent_of(record.incinerated, record.generated)
				),
				format!(
					"Recycled: {} ({:.1}% of generated)",
					format_tonnes(record.recycled),
					percent_of(record.recycled, record.generated)
				),
			],
			accent,
		})
	}

	fn terminal_tooltip(&self, idx: usize, disposal: Disposal) -> Tooltip {
		let total = self.graph.node_value(idx);
		let mut lines = vec![
			format!("Total: {}", format_tonnes(total)),
			String::new(),
			"Sources (ordered by amount):".to_string(),
		];
		for (source, value) in self.graph.terminal_sources(idx) {
			let country = source.strip_suffix("_generated").unwrap_or(source);
			lines.push(format!("{country}: {}", format_tonnes(value)));
		}
		Tooltip {
			title: disposal.label().to_string(),
			lines,
			accent: Some(disposal),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::sankey::types::WasteRecord;

	fn record(country: &str, year: i32, generated: f64, incinerated: f64, recycled: f64) -> WasteRecord {
		WasteRecord {
			country: country.to_string(),
			year,
			generated,
			incinerated,
			recycled,
		}
	}

	fn state() -> SankeyState {
		let dataset = Dataset::new(vec![
			record("Germany", 2016, 200.0, 50.0, 50.0),
			record("Italy", 2016, 100.0, 25.0, 25.0),
			record("Germany", 2014, 180.0, 40.0, 30.0),
		]);
		SankeyState::new(dataset, ChartMode::Sankey, 1600.0, 1200.0)
	}

	#[test]
	fn starts_on_the_latest_year() {
		let state = state();
		assert_eq!(state.selected_year, 2016);
		assert_eq!(state.years, vec![2014, 2016]);
		assert_eq!(state.graph.country_count(), 2);
	}

	#[test]
	fn select_year_rebuilds_from_scratch() {
		let mut state = state();
		state.flow_time = 5.0;
		state.select_year(2014);

		assert_eq!(state.selected_year, 2014);
		assert_eq!(state.graph.country_count(), 1);
		assert_eq!(state.flow_time, 0.0);
		assert!(state.graph.node_index("Italy").is_none());
	}

	#[test]
	fn selecting_the_current_year_is_a_no_op() {
		let mut state = state();
		state.flow_time = 5.0;
		state.select_year(2016);
		assert_eq!(state.flow_time, 5.0);
	}

	#[test]
	fn year_marker_hit_testing_round_trips_through_the_scale() {
		let state = state();
		let scale = state.geometry.timeline_scale(&state.years, state.width);
		let cy = state.geometry.timeline_y();

		let x = scale.apply(2014.0);
		assert_eq!(state.year_marker_at_position(x, cy), Some(2014));
		assert_eq!(state.year_marker_at_position(x, cy + 200.0), None);
	}

	#[test]
	fn node_hit_testing_honors_the_transform() {
		let mut state = state();
		let idx = state.graph.node_index("Germany").unwrap();
		let node = state.layout.nodes[idx];
		let (cx, cy) = ((node.x0 + node.x1) / 2.0, node.center_y());

		assert_eq!(state.node_at_position(cx, cy), Some(idx));

		// Pan the diagram away; the old screen position no longer hits.
		state.transform.x = 5000.0;
		assert_eq!(state.node_at_position(cx, cy), None);
		assert_eq!(state.node_at_position(cx + 5000.0, cy), Some(idx));
	}

	#[test]
	fn link_hit_testing_finds_the_ribbon_midpoint() {
		let state = state();
		let link = state.layout.links[0];
		let src = state.layout.nodes[link.source];
		let tgt = state.layout.nodes[link.target];
		let x = (src.x1 + tgt.x0) / 2.0;
		let y = (link.sy + link.ty) / 2.0;

		assert_eq!(state.link_at_position(x, y), Some(0));
	}

	#[test]
	fn hovering_a_node_highlights_its_neighborhood() {
		let mut state = state();
		let r#gen = state.graph.node_index("Germany_generated").unwrap();
		state.highlight.set_hover(Some(Hover::Node(r#gen)), &state.graph);
		state.tick(1.0);

		assert!(state.highlight.intensity(Hover::Node(r#gen)) > 0.9);
		let country = state.graph.node_index("Germany").unwrap();
		assert!(state.highlight.intensity(Hover::Node(country)) > 0.9);
		// Unrelated country stays dark.
		let italy = state.graph.node_index("Italy").unwrap();
		assert_eq!(state.highlight.intensity(Hover::Node(italy)), 0.0);
	}

	#[test]
	fn highlight_decays_after_the_hold_time() {
		let mut state = state();
		state.highlight.set_hover(Some(Hover::Node(0)), &state.graph);
		state.tick(1.0);
		let peak = state.highlight.intensity(Hover::Node(0));

		state.highlight.set_hover(None, &state.graph);
		// Inside the hold window the intensity must not drop.
		state.tick(0.05);
		assert!(state.highlight.intensity(Hover::Node(0)) >= peak - 1e-9);
		// Well past it, the highlight fades out.
		state.tick(3.0);
		assert!(state.highlight.intensity(Hover::Node(0)) < 0.1);
	}

	#[test]
	fn country_tooltip_reports_amounts_and_percentages() {
		let state = state();
		let idx = state.graph.node_index("Germany").unwrap();
		let tip = state.tooltip_for(Hover::Node(idx)).unwrap();

		assert_eq!(tip.title, "Germany");
		assert_eq!(tip.lines[0], "Generated: 200 tonnes");
		assert_eq!(tip.lines[1], "Incinerated: 50 tonnes (25.0% of generated)");
		assert_eq!(tip.lines[2], "Recycled: 50 tonnes (25.0% of generated)");
		assert_eq!(tip.accent, None);
	}

	#[test]
	fn terminal_tooltip_lists_sources_largest_first() {
		let state = state();
		let idx = state.graph.node_index("Incinerated").unwrap();
		let tip = state.tooltip_for(Hover::Node(idx)).unwrap();

		assert_eq!(tip.title, "Incinerated");
		assert_eq!(tip.lines[0], "Total: 75 tonnes");
		assert_eq!(tip.lines[3], "Germany: 50 tonnes");
		assert_eq!(tip.lines[4], "Italy: 25 tonnes");
		assert_eq!(tip.accent, Some(Disposal::Incinerated));
	}

	#[test]
	fn disposal_link_tooltip_carries_the_target_accent() {
		let state = state();
		let recycled = state.graph.node_index("Recycled").unwrap();
		let e = state
			.graph
			.edges
			.iter()
			.position(|e| e.target == recycled)
			.unwrap();
		let tip = state.tooltip_for(Hover::Link(e)).unwrap();
		assert_eq!(tip.accent, Some(Disposal::Recycled));
	}

	#[test]
	fn entrance_alpha_staggers_elements() {
		let mut state = state();
		state.flow_time = 0.8;
		assert_eq!(state.entrance_alpha(0), 1.0);
		assert!(state.entrance_alpha(5) < 1.0);
		assert_eq!(state.entrance_alpha(30), 0.0);
	}
}
