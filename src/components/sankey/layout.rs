//! Sankey layout: assigns rectangles to flow-graph nodes and vertical anchors
//! to link ribbons.
//!
//! The graph always has three columns (countries, generated totals, disposal
//! terminals), so column assignment comes straight from the node kind and no
//! iterative relaxation is needed. Heights share a single value scale chosen
//! so the fullest column exactly fills the extent.

use super::graph::{FlowGraph, NodeKind};
use super::scale::ChartGeometry;

/// Drawable region of the diagram, inside the margins and below the timeline.
#[derive(Clone, Copy, Debug)]
pub struct Extent {
	pub x0: f64,
	pub y0: f64,
	pub x1: f64,
	pub y1: f64,
}

impl Extent {
	pub fn from_geometry(geo: &ChartGeometry, width: f64, height: f64) -> Self {
		Self {
			x0: geo.margin_left,
			y0: geo.diagram_top(),
			x1: (width - geo.margin_right).max(geo.margin_left + geo.node_width),
			y1: (height - geo.margin_bottom).max(geo.diagram_top() + 1.0),
		}
	}

	pub fn width(&self) -> f64 {
		self.x1 - self.x0
	}

	pub fn height(&self) -> f64 {
		self.y1 - self.y0
	}
}

/// A laid-out node rectangle.
#[derive(Clone, Copy, Debug)]
pub struct LayoutNode {
	pub x0: f64,
	pub y0: f64,
	pub x1: f64,
	pub y1: f64,
	/// The flow value the height encodes.
	pub value: f64,
}

impl LayoutNode {
	pub fn height(&self) -> f64 {
		self.y1 - self.y0
	}

	pub fn center_y(&self) -> f64 {
		(self.y0 + self.y1) / 2.0
	}
}

/// A laid-out link ribbon. Indices refer to the flow graph's node and edge
/// lists, which the layout preserves one-to-one.
#[derive(Clone, Copy, Debug)]
pub struct LayoutLink {
	pub source: usize,
	pub target: usize,
	/// Ribbon center y on the source node's right face.
	pub sy: f64,
	/// Ribbon center y on the target node's left face.
	pub ty: f64,
	/// Ribbon thickness.
	pub width: f64,
}

/// Complete layout for one flow graph.
#[derive(Clone, Debug, Default)]
pub struct SankeyLayout {
	pub nodes: Vec<LayoutNode>,
	pub links: Vec<LayoutLink>,
}

const COLUMNS: usize = 3;

fn column_of(kind: NodeKind) -> usize {
	match kind {
		NodeKind::Country => 0,
		NodeKind::Generated => 1,
		NodeKind::Terminal(_) => 2,
	}
}

impl SankeyLayout {
	pub fn compute(graph: &FlowGraph, extent: Extent, geo: &ChartGeometry) -> Self {
		let values: Vec<f64> = (0..graph.nodes.len()).map(|i| graph.node_value(i)).collect();

		// One shared value-to-pixels scale, limited by the fullest column.
		let mut ky = f64::INFINITY;
		for col in 0..COLUMNS {
			let (sum, count) = graph
				.nodes
				.iter()
				.zip(&values)
				.filter(|(n, _)| column_of(n.kind) == col)
				.fold((0.0, 0usize), |(s, c), (_, v)| (s + v, c + 1));
			if sum > 0.0 {
				let free = extent.height() - geo.node_padding * (count.saturating_sub(1)) as f64;
				ky = ky.min(free.max(0.0) / sum);
			}
		}
		if !ky.is_finite() {
			ky = 0.0;
		}

		let column_step = if COLUMNS > 1 {
			(extent.width() - geo.node_width) / (COLUMNS - 1) as f64
		} else {
			0.0
		};

		// Stack nodes top-down per column, in node-list order.
		let mut cursors = [extent.y0; COLUMNS];
		let nodes: Vec<LayoutNode> = graph
			.nodes
			.iter()
			.zip(&values)
			.map(|(node, &value)| {
				let col = column_of(node.kind);
				let x0 = extent.x0 + column_step * col as f64;
				let y0 = cursors[col];
				let h = value * ky;
				cursors[col] = y0 + h + geo.node_padding;
				LayoutNode {
					x0,
					y0,
					x1: x0 + geo.node_width,
					y1: y0 + h,
					value,
				}
			})
			.collect();

		// Stack ribbons along both faces in edge order.
		let mut out_offsets = vec![0.0f64; graph.nodes.len()];
		let mut in_offsets = vec![0.0f64; graph.nodes.len()];
		let links: Vec<LayoutLink> = graph
			.edges
			.iter()
			.map(|edge| {
				let width = edge.value * ky;
				let sy = nodes[edge.source].y0 + out_offsets[edge.source] + width / 2.0;
				let ty = nodes[edge.target].y0 + in_offsets[edge.target] + width / 2.0;
				out_offsets[edge.source] += width;
				in_offsets[edge.target] += width;
				LayoutLink {
					source: edge.source,
					target: edge.target,
					sy,
					ty,
					width,
				}
			})
			.collect();

		Self { nodes, links }
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::sankey::types::WasteRecord;

	fn record(country: &str, generated: f64, incinerated: f64, recycled: f64) -> WasteRecord {
		WasteRecord {
			country: country.to_string(),
			year: 2016,
			generated,
			incinerated,
			recycled,
		}
	}

	fn layout_for(records: &[WasteRecord]) -> (FlowGraph, SankeyLayout) {
		let graph = FlowGraph::build(records, 2016);
		let geo = ChartGeometry::default();
		let extent = Extent {
			x0: 0.0,
			y0: 0.0,
			x1: 1200.0,
			y1: 1000.0,
		};
		let layout = SankeyLayout::compute(&graph, extent, &geo);
		(graph, layout)
	}

	#[test]
	fn heights_are_proportional_within_a_column() {
		let (graph, layout) = layout_for(&[
			record("Germany", 200.0, 50.0, 50.0),
			record("Italy", 100.0, 25.0, 25.0),
		]);

		let de = layout.nodes[graph.node_index("Germany").unwrap()];
		let it = layout.nodes[graph.node_index("Italy").unwrap()];
		assert!(de.height() > 0.0);
		assert!((de.height() - 2.0 * it.height()).abs() < 1e-9);
	}

	#[test]
	fn stacked_nodes_do_not_overlap() {
		let (graph, layout) = layout_for(&[
			record("Austria", 100.0, 20.0, 30.0),
			record("Belgium", 150.0, 40.0, 40.0),
			record("Croatia", 80.0, 10.0, 20.0),
		]);

		for col in 0..3 {
			let mut column: Vec<&LayoutNode> = graph
				.nodes
				.iter()
				.enumerate()
				.filter(|(_, n)| column_of(n.kind) == col)
				.map(|(i, _)| &layout.nodes[i])
				.collect();
			column.sort_by(|a, b| a.y0.total_cmp(&b.y0));
			for pair in column.windows(2) {
				assert!(pair[0].y1 <= pair[1].y0 + 1e-9);
			}
		}
	}

	#[test]
	fn fullest_column_fills_the_extent() {
		let (_, layout) = layout_for(&[
			record("Germany", 200.0, 50.0, 50.0),
			record("Italy", 100.0, 25.0, 25.0),
		]);

		// Country and generated columns tie for the largest total, so the
		// bottom of a fullest column lands on the extent's bottom edge.
		let max_y1 = layout
			.nodes
			.iter()
			.map(|n| n.y1)
			.fold(f64::NEG_INFINITY, f64::max);
		assert!((max_y1 - 1000.0).abs() < 1e-6);
	}

	#[test]
	fn ribbon_widths_tile_both_node_faces() {
		let (graph, layout) = layout_for(&[
			record("Germany", 200.0, 50.0, 50.0),
			record("Italy", 100.0, 25.0, 25.0),
		]);

		for idx in 0..graph.nodes.len() {
			let out: f64 = layout
				.links
				.iter()
				.filter(|l| l.source == idx)
				.map(|l| l.width)
				.sum();
			let inc: f64 = layout
				.links
				.iter()
				.filter(|l| l.target == idx)
				.map(|l| l.width)
				.sum();
			let height = layout.nodes[idx].height();
			if out > 0.0 {
				assert!((out - height).abs() < 1e-9);
			}
			if inc > 0.0 {
				assert!((inc - height).abs() < 1e-9);
			}
		}
	}

	#[test]
	fn ribbons_anchor_inside_their_nodes() {
		let (_, layout) = layout_for(&[record("Germany", 200.0, 50.0, 50.0)]);

		for link in &layout.links {
			let src = &layout.nodes[link.source];
			let tgt = &layout.nodes[link.target];
			assert!(link.sy - link.width / 2.0 >= src.y0 - 1e-9);
			assert!(link.sy + link.width / 2.0 <= src.y1 + 1e-9);
			assert!(link.ty - link.width / 2.0 >= tgt.y0 - 1e-9);
			assert!(link.ty + link.width / 2.0 <= tgt.y1 + 1e-9);
		}
	}

	#[test]
	fn empty_graph_lays_out_without_panicking() {
		let (graph, layout) = layout_for(&[]);
		assert_eq!(layout.nodes.len(), 3);
		assert!(layout.links.is_empty());
		// Terminals exist but carry no flow.
		for (i, node) in layout.nodes.iter().enumerate() {
			assert_eq!(node.height(), 0.0);
			assert_eq!(graph.node_value(i), 0.0);
		}
	}
}
