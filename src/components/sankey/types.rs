//! Input data structures for the waste-flow chart.

use serde::Deserialize;

/// One country/year row of the hazardous-waste dataset.
#[derive(Clone, Debug, Deserialize)]
pub struct WasteRecord {
	/// Country name as reported (used verbatim as the node label).
	pub country: String,
	/// Reporting year.
	pub year: i32,
	/// Total hazardous waste generated, in tonnes.
	pub generated: f64,
	/// Tonnes incinerated.
	pub incinerated: f64,
	/// Tonnes recycled. Absent in early reporting years, defaults to zero.
	#[serde(default)]
	pub recycled: f64,
}

impl WasteRecord {
	/// Portion of `generated` not accounted for by incineration or recycling.
	pub fn residual(&self) -> f64 {
		self.generated - self.incinerated - self.recycled
	}
}

/// The full dataset, loaded once at startup and kept for the page's lifetime.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct Dataset {
	pub records: Vec<WasteRecord>,
}

impl Dataset {
	pub fn new(records: Vec<WasteRecord>) -> Self {
		Self { records }
	}

	/// Distinct reporting years, ascending. Drives the timeline markers.
	pub fn years(&self) -> Vec<i32> {
		let mut years: Vec<i32> = self.records.iter().map(|r| r.year).collect();
		years.sort_unstable();
		years.dedup();
		years
	}

	/// Most recent reporting year, if any. The initial selection.
	pub fn latest_year(&self) -> Option<i32> {
		self.records.iter().map(|r| r.year).max()
	}

	/// Records for a single reporting year.
	pub fn records_for(&self, year: i32) -> Vec<&WasteRecord> {
		self.records.iter().filter(|r| r.year == year).collect()
	}

	/// Lookup for tooltip content.
	pub fn find(&self, country: &str, year: i32) -> Option<&WasteRecord> {
		self.records
			.iter()
			.find(|r| r.year == year && r.country == country)
	}

	pub fn is_empty(&self) -> bool {
		self.records.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn record(country: &str, year: i32) -> WasteRecord {
		WasteRecord {
			country: country.to_string(),
			year,
			generated: 100.0,
			incinerated: 30.0,
			recycled: 20.0,
		}
	}

	#[test]
	fn years_are_distinct_and_ascending() {
		let data = Dataset::new(vec![
			record("Italy", 2016),
			record("Germany", 2004),
			record("Italy", 2004),
			record("Germany", 2016),
		]);
		assert_eq!(data.years(), vec![2004, 2016]);
		assert_eq!(data.latest_year(), Some(2016));
	}

	#[test]
	fn missing_recycled_defaults_to_zero() {
		let json = r#"{"country": "Malta", "year": 2004, "generated": 5.0, "incinerated": 1.0}"#;
		let rec: WasteRecord = serde_json::from_str(json).unwrap();
		assert_eq!(rec.recycled, 0.0);
		assert_eq!(rec.residual(), 4.0);
	}

	#[test]
	fn records_for_filters_by_year() {
		let data = Dataset::new(vec![record("Italy", 2016), record("Italy", 2014)]);
		assert_eq!(data.records_for(2016).len(), 1);
		assert!(data.records_for(2010).is_empty());
		assert!(data.find("Italy", 2014).is_some());
		assert!(data.find("Spain", 2014).is_none());
	}
}
