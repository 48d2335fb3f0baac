//! Flow-graph builder: reshapes per-country waste records into the node and
//! weighted edge lists the Sankey layout consumes.
//!
//! For a selected year, each country feeds a synthetic `<country>_generated`
//! intermediate, which in turn splits into the three fixed disposal terminals:
//! Incinerated, Recycled, and Environmental Load (the unaccounted residual).

use log::warn;

use super::types::WasteRecord;

/// Disposal-method terminals on the right edge of the diagram.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Disposal {
	Incinerated,
	Recycled,
	/// Residual waste not covered by any reported disposal method.
	Residual,
}

impl Disposal {
	pub const ALL: [Disposal; 3] = [
		Disposal::Incinerated,
		Disposal::Recycled,
		Disposal::Residual,
	];

	/// Display name used for node labels and tooltips.
	pub fn label(self) -> &'static str {
		match self {
			Disposal::Incinerated => "Incinerated",
			Disposal::Recycled => "Recycled",
			Disposal::Residual => "Environmental Load",
		}
	}
}

/// Which column of the diagram a node belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
	/// Left column: one node per reporting country.
	Country,
	/// Middle column: the country's generated total.
	Generated,
	/// Right column: fixed disposal terminals.
	Terminal(Disposal),
}

/// A node in the flow graph. Position is assigned later by the layout.
#[derive(Clone, Debug)]
pub struct FlowNode {
	pub name: String,
	pub kind: NodeKind,
}

/// A directed weighted edge between two nodes, by index.
#[derive(Clone, Copy, Debug)]
pub struct FlowEdge {
	pub source: usize,
	pub target: usize,
	pub value: f64,
}

/// Node and edge lists for one selected year. Rebuilt from scratch on every
/// year selection; nothing carries over between rebuilds.
#[derive(Clone, Debug, Default)]
pub struct FlowGraph {
	pub nodes: Vec<FlowNode>,
	pub edges: Vec<FlowEdge>,
	countries: usize,
}

impl FlowGraph {
	/// Builds the graph for `year` from the full record set.
	///
	/// Node order is: countries (sorted, deduplicated), one `_generated`
	/// intermediate per country in the same order, then the three terminals.
	/// The terminals are present even when no record matches the year.
	///
	/// Per matching record, outgoing edges of its `_generated` node sum to the
	/// record's `generated` amount: incinerated, recycled (omitted when zero),
	/// and the residual. A negative residual means the source data is
	/// inconsistent; it is clamped to zero and logged rather than handed to
	/// the layout as a negative weight.
	pub fn build(records: &[WasteRecord], year: i32) -> Self {
		let year_records: Vec<&WasteRecord> =
			records.iter().filter(|r| r.year == year).collect();

		let mut countries: Vec<&str> = year_records
			.iter()
			.map(|r| r.country.as_str())
			.filter(|c| !c.is_empty())
			.collect();
		countries.sort_unstable();
		countries.dedup();

		let mut nodes: Vec<FlowNode> = countries
			.iter()
			.map(|c| FlowNode {
				name: c.to_string(),
				kind: NodeKind::Country,
			})
			.collect();
		nodes.extend(countries.iter().map(|c| FlowNode {
			name: format!("{c}_generated"),
			kind: NodeKind::Generated,
		}));
		nodes.extend(Disposal::ALL.map(|d| FlowNode {
			name: d.label().to_string(),
			kind: NodeKind::Terminal(d),
		}));

		let terminal_start = countries.len() * 2;
		let mut edges = Vec::new();

		for record in &year_records {
			// Countries filtered out above (empty names) have no node; skip
			// their records entirely.
			let Ok(country_idx) = countries.binary_search(&record.country.as_str()) else {
				continue;
			};
			let generated_idx = countries.len() + country_idx;

			edges.push(FlowEdge {
				source: country_idx,
				target: generated_idx,
				value: record.generated,
			});
			edges.push(FlowEdge {
				source: generated_idx,
				target: terminal_start,
				value: record.incinerated,
			});
			if record.recycled > 0.0 {
				edges.push(FlowEdge {
					source: generated_idx,
					target: terminal_start + 1,
					value: record.recycled,
				});
			}

			let residual = record.residual();
			if residual < 0.0 {
				warn!(
					"waste-flow: {} {} reports more disposed than generated ({:.1} over), clamping",
					record.country, record.year, -residual
				);
			}
			edges.push(FlowEdge {
				source: generated_idx,
				target: terminal_start + 2,
				value: residual.max(0.0),
			});
		}

		Self {
			nodes,
			edges,
			countries: countries.len(),
		}
	}

	/// Number of distinct countries in the selected year.
	pub fn country_count(&self) -> usize {
		self.countries
	}

	pub fn node_index(&self, name: &str) -> Option<usize> {
		self.nodes.iter().position(|n| n.name == name)
	}

	/// Node value as the layout sizes it: the larger of the incoming and
	/// outgoing edge sums.
	pub fn node_value(&self, idx: usize) -> f64 {
		let incoming: f64 = self
			.edges
			.iter()
			.filter(|e| e.target == idx)
			.map(|e| e.value)
			.sum();
		let outgoing: f64 = self
			.edges
			.iter()
			.filter(|e| e.source == idx)
			.map(|e| e.value)
			.sum();
		incoming.max(outgoing)
	}

	/// Incoming edges of a terminal with source names, sorted by value
	/// descending. Feeds the terminal tooltips.
	pub fn terminal_sources(&self, idx: usize) -> Vec<(&str, f64)> {
		let mut sources: Vec<(&str, f64)> = self
			.edges
			.iter()
			.filter(|e| e.target == idx)
			.map(|e| (self.nodes[e.source].name.as_str(), e.value))
			.collect();
		sources.sort_by(|a, b| b.1.total_cmp(&a.1));
		sources
	}

	/// Country whose flows an edge belongs to, regardless of which stage of
	/// the flow it sits in.
	pub fn edge_country(&self, edge: &FlowEdge) -> Option<&str> {
		match self.nodes[edge.source].kind {
			NodeKind::Country => Some(self.nodes[edge.source].name.as_str()),
			NodeKind::Generated => self.nodes[edge.source]
				.name
				.strip_suffix("_generated"),
			NodeKind::Terminal(_) => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn record(country: &str, year: i32, generated: f64, incinerated: f64, recycled: f64) -> WasteRecord {
		WasteRecord {
			country: country.to_string(),
			year,
			generated,
			incinerated,
			recycled,
		}
	}

	fn outgoing(graph: &FlowGraph, idx: usize) -> Vec<FlowEdge> {
		graph.edges.iter().filter(|e| e.source == idx).copied().collect()
	}

	#[test]
	fn generated_node_outflow_sums_to_generated_amount() {
		let records = vec![record("Germany", 2016, 100.0, 40.0, 35.0)];
		let graph = FlowGraph::build(&records, 2016);

		let gen_idx = graph.node_index("Germany_generated").unwrap();
		let out = outgoing(&graph, gen_idx);
		assert_eq!(out.len(), 3);
		let total: f64 = out.iter().map(|e| e.value).sum();
		assert_eq!(total, 100.0);
	}

	#[test]
	fn zero_recycled_omits_the_recycled_edge() {
		let records = vec![record("Malta", 2004, 50.0, 10.0, 0.0)];
		let graph = FlowGraph::build(&records, 2004);

		let gen_idx = graph.node_index("Malta_generated").unwrap();
		let out = outgoing(&graph, gen_idx);
		assert_eq!(out.len(), 2);
		let total: f64 = out.iter().map(|e| e.value).sum();
		assert_eq!(total, 50.0);

		let recycled_idx = graph.node_index("Recycled").unwrap();
		assert!(graph.edges.iter().all(|e| e.target != recycled_idx));
	}

	#[test]
	fn empty_year_keeps_only_the_fixed_terminals() {
		let records = vec![record("Italy", 2016, 10.0, 5.0, 2.0)];
		let graph = FlowGraph::build(&records, 2010);

		assert_eq!(graph.country_count(), 0);
		assert_eq!(graph.nodes.len(), 3);
		assert!(graph.edges.is_empty());
		assert_eq!(graph.nodes[0].name, "Incinerated");
		assert_eq!(graph.nodes[2].name, "Environmental Load");
	}

	#[test]
	fn duplicate_country_records_share_one_node() {
		let records = vec![
			record("France", 2016, 10.0, 2.0, 3.0),
			record("France", 2016, 20.0, 5.0, 5.0),
		];
		let graph = FlowGraph::build(&records, 2016);

		assert_eq!(graph.country_count(), 1);
		// 1 country + 1 generated + 3 terminals
		assert_eq!(graph.nodes.len(), 5);
		// Both records still contribute their full edge fan-out.
		assert_eq!(graph.edges.len(), 6);
	}

	#[test]
	fn countries_are_sorted_before_their_generated_block() {
		let records = vec![
			record("Spain", 2016, 10.0, 2.0, 1.0),
			record("Austria", 2016, 10.0, 2.0, 1.0),
		];
		let graph = FlowGraph::build(&records, 2016);

		assert_eq!(graph.nodes[0].name, "Austria");
		assert_eq!(graph.nodes[1].name, "Spain");
		assert_eq!(graph.nodes[2].name, "Austria_generated");
		assert_eq!(graph.nodes[3].name, "Spain_generated");
		assert_eq!(graph.nodes[2].kind, NodeKind::Generated);
	}

	#[test]
	fn records_with_empty_country_are_skipped() {
		let records = vec![
			record("", 2016, 10.0, 2.0, 1.0),
			record("Italy", 2016, 10.0, 2.0, 1.0),
		];
		let graph = FlowGraph::build(&records, 2016);

		assert_eq!(graph.country_count(), 1);
		assert_eq!(graph.edges.len(), 3);
	}

	#[test]
	fn inconsistent_record_clamps_residual_to_zero() {
		// Disposed exceeds generated; the residual edge must not go negative.
		let records = vec![record("Belgium", 2016, 100.0, 80.0, 30.0)];
		let graph = FlowGraph::build(&records, 2016);

		let load_idx = graph.node_index("Environmental Load").unwrap();
		let residual = graph
			.edges
			.iter()
			.find(|e| e.target == load_idx)
			.unwrap()
			.value;
		assert_eq!(residual, 0.0);
	}

	#[test]
	fn terminal_sources_are_sorted_descending() {
		let records = vec![
			record("Italy", 2016, 50.0, 10.0, 5.0),
			record("Germany", 2016, 200.0, 90.0, 40.0),
		];
		let graph = FlowGraph::build(&records, 2016);

		let inc_idx = graph.node_index("Incinerated").unwrap();
		let sources = graph.terminal_sources(inc_idx);
		assert_eq!(sources[0], ("Germany_generated", 90.0));
		assert_eq!(sources[1], ("Italy_generated", 10.0));
	}

	#[test]
	fn node_value_takes_the_larger_side() {
		let records = vec![record("Italy", 2016, 50.0, 10.0, 5.0)];
		let graph = FlowGraph::build(&records, 2016);

		let country = graph.node_index("Italy").unwrap();
		let generated = graph.node_index("Italy_generated").unwrap();
		assert_eq!(graph.node_value(country), 50.0);
		assert_eq!(graph.node_value(generated), 50.0);
		assert_eq!(graph.node_value(graph.node_index("Recycled").unwrap()), 5.0);
	}

	#[test]
	fn edge_country_resolves_both_flow_stages() {
		let records = vec![record("Italy", 2016, 50.0, 10.0, 5.0)];
		let graph = FlowGraph::build(&records, 2016);

		for edge in &graph.edges {
			assert_eq!(graph.edge_country(edge), Some("Italy"));
		}
	}
}
