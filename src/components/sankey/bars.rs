//! Stacked bar-chart variant: one column of horizontal bars per country, one
//! bar per reporting year, split into incinerated / residual / recycled
//! segments, plus a shared pile of the unprocessed remainder.

use super::graph::Disposal;
use super::scale::LinearScale;
use super::types::WasteRecord;

/// Tuned constants of the bar view.
#[derive(Clone, Debug)]
pub struct BarGeometry {
	pub bar_height: f64,
	pub bar_spacing: f64,
	/// x of the first country column.
	pub column_start: f64,
	/// Horizontal distance between country columns.
	pub column_step: f64,
	/// Offset from a column's base x to the bar center line.
	pub column_center: f64,
	/// Pixel range the generated amount maps into.
	pub width_range: (f64, f64),
	/// Tonnes per pixel of pile width.
	pub pile_scale: f64,
	pub pile_height: f64,
	pub margin_top: f64,
	pub margin_bottom: f64,
	pub margin_left: f64,
}

impl Default for BarGeometry {
	fn default() -> Self {
		Self {
			bar_height: 60.0,
			bar_spacing: 0.0,
			column_start: 300.0,
			column_step: 450.0,
			column_center: 100.0,
			width_range: (50.0, 400.0),
			pile_scale: 500_000.0,
			pile_height: 60.0,
			margin_top: 100.0,
			margin_bottom: 100.0,
			margin_left: 50.0,
		}
	}
}

/// One colored slice of a bar.
#[derive(Clone, Copy, Debug)]
pub struct BarSegment {
	pub x: f64,
	pub width: f64,
	pub disposal: Disposal,
}

/// One country/year bar.
#[derive(Clone, Debug)]
pub struct BarRow {
	pub country: usize,
	pub year: i32,
	pub x: f64,
	pub y: f64,
	pub total_width: f64,
	pub generated: f64,
	/// Whether this is the country's most recent reporting year. Final rows
	/// feed the shared pile and get a connecting pipe.
	pub is_final: bool,
	pub segments: Vec<BarSegment>,
}

/// A country column header.
#[derive(Clone, Debug)]
pub struct BarColumn {
	pub name: String,
	/// x of the column's bar center line.
	pub center_x: f64,
}

/// The shared unprocessed-waste pile at the bottom of the chart.
#[derive(Clone, Copy, Debug, Default)]
pub struct WastePile {
	pub x: f64,
	pub y: f64,
	pub width: f64,
	/// Sum over countries of the most recent year's residual.
	pub total: f64,
}

/// Complete bar-view layout.
#[derive(Clone, Debug, Default)]
pub struct BarLayout {
	pub columns: Vec<BarColumn>,
	pub rows: Vec<BarRow>,
	pub pile: WastePile,
}

impl BarLayout {
	pub fn compute(records: &[WasteRecord], width: f64, height: f64, geo: &BarGeometry) -> Self {
		// Countries in first-appearance order, each with its records sorted
		// by year.
		let mut columns: Vec<BarColumn> = Vec::new();
		let mut grouped: Vec<Vec<&WasteRecord>> = Vec::new();
		for record in records {
			match columns.iter().position(|c| c.name == record.country) {
				Some(i) => grouped[i].push(record),
				None => {
					columns.push(BarColumn {
						name: record.country.clone(),
						center_x: geo.column_start
							+ columns.len() as f64 * geo.column_step
							+ geo.column_center,
					});
					grouped.push(vec![record]);
				}
			}
		}
		for group in &mut grouped {
			group.sort_by_key(|r| r.year);
		}

		let max_generated = records
			.iter()
			.map(|r| r.generated)
			.fold(0.0f64, f64::max);
		let width_scale = LinearScale::new((0.0, max_generated), geo.width_range);

		let mut rows = Vec::new();
		let mut unprocessed = 0.0;
		for (country, group) in grouped.iter().enumerate() {
			for (i, record) in group.iter().enumerate() {
				let y = geo.margin_top + i as f64 * (geo.bar_height + geo.bar_spacing);
				let total_width = width_scale.apply(record.generated);
				let x = columns[country].center_x - total_width / 2.0;

				// Segment widths share the bar proportionally; the residual
				// takes whatever the reported methods leave, never negative.
				let frac = |amount: f64| {
					if record.generated > 0.0 {
						amount / record.generated * total_width
					} else {
						0.0
					}
				};
				let inc_w = frac(record.incinerated);
				let rec_w = frac(record.recycled);
				let res_w = (total_width - inc_w - rec_w).max(0.0);

				let mut segments = vec![
					BarSegment {
						x,
						width: inc_w,
						disposal: Disposal::Incinerated,
					},
					BarSegment {
						x: x + inc_w,
						width: res_w,
						disposal: Disposal::Residual,
					},
				];
				if rec_w > 0.0 {
					segments.push(BarSegment {
						x: x + inc_w + res_w,
						width: rec_w,
						disposal: Disposal::Recycled,
					});
				}

				let is_final = i == group.len() - 1;
				rows.push(BarRow {
					country,
					year: record.year,
					x,
					y,
					total_width,
					generated: record.generated,
					is_final,
					segments,
				});

				if is_final {
					unprocessed += record.residual().max(0.0);
				}
			}
		}

		let pile = WastePile {
			x: width / 2.0,
			y: height - geo.margin_bottom,
			width: unprocessed / geo.pile_scale,
			total: unprocessed,
		};

		Self {
			columns,
			rows,
			pile,
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

	#[test]
	fn segments_tile_the_full_bar_width() {
		let records = vec![record("Germany", 2016, 100.0, 30.0, 20.0)];
		let layout = BarLayout::compute(&records, 1400.0, 900.0, &BarGeometry::default());

		let row = &layout.rows[0];
		let total: f64 = row.segments.iter().map(|s| s.width).sum();
		assert!((total - row.total_width).abs() < 1e-9);
		// Segments are contiguous left to right.
		for pair in row.segments.windows(2) {
			assert!((pair[0].x + pair[0].width - pair[1].x).abs() < 1e-9);
		}
	}

	#[test]
	fn bar_width_scales_with_generated_amount() {
		let geo = BarGeometry::default();
		let records = vec![
			record("Germany", 2016, 200.0, 0.0, 0.0),
			record("Italy", 2016, 100.0, 0.0, 0.0),
		];
		let layout = BarLayout::compute(&records, 1400.0, 900.0, &geo);

		// The largest bar hits the top of the range.
		assert!((layout.rows[0].total_width - geo.width_range.1).abs() < 1e-9);
		assert!(layout.rows[1].total_width < layout.rows[0].total_width);
	}

	#[test]
	fn rows_within_a_country_are_ordered_by_year() {
		let records = vec![
			record("Italy", 2016, 100.0, 10.0, 10.0),
			record("Italy", 2004, 80.0, 10.0, 10.0),
		];
		let layout = BarLayout::compute(&records, 1400.0, 900.0, &BarGeometry::default());

		assert_eq!(layout.rows[0].year, 2004);
		assert_eq!(layout.rows[1].year, 2016);
		assert!(layout.rows[0].y < layout.rows[1].y);
	}

	#[test]
	fn pile_accumulates_final_year_residuals() {
		let records = vec![
			record("Italy", 2004, 100.0, 50.0, 0.0),
			record("Italy", 2016, 100.0, 30.0, 20.0),
			record("Germany", 2016, 200.0, 50.0, 50.0),
		];
		let layout = BarLayout::compute(&records, 1400.0, 900.0, &BarGeometry::default());

		// Italy 2016 residual (50) + Germany 2016 residual (100); 2004 is not
		// a final year and does not count.
		assert_eq!(layout.pile.total, 150.0);
	}

	#[test]
	fn zero_recycling_omits_the_recycled_segment() {
		let records = vec![record("Malta", 2004, 50.0, 10.0, 0.0)];
		let layout = BarLayout::compute(&records, 1400.0, 900.0, &BarGeometry::default());

		let row = &layout.rows[0];
		assert_eq!(row.segments.len(), 2);
		assert!(row
			.segments
			.iter()
			.all(|s| s.disposal != Disposal::Recycled));
	}
}
