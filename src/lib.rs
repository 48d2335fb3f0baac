//! waste-flow: Interactive Sankey visualization of European hazardous-waste
//! statistics.
//!
//! This crate provides a WASM-based chart component that renders per-country
//! waste flows (generated → incinerated / recycled / environmental load) for a
//! selectable reporting year, with hover tooltips and smooth transitions.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::sankey::{ChartMode, Dataset, SankeyCanvas, WasteRecord};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("waste-flow: logging initialized");
}

/// Load the waste dataset from a script element with id="waste-data".
/// Expected format: a JSON array of records with country, year, generated,
/// incinerated, and (optionally) recycled fields.
fn load_dataset() -> Option<Dataset> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("waste-data")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	let json_text = script.text().ok()?;

	match serde_json::from_str::<Dataset>(&json_text) {
		Ok(data) => {
			info!(
				"waste-flow: loaded {} records across {} years",
				data.records.len(),
				data.years().len()
			);
			Some(data)
		}
		Err(e) => {
			warn!("waste-flow: failed to parse waste data: {}", e);
			None
		}
	}
}

/// Main application component.
/// Loads the dataset from the DOM and renders the flow visualization.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	// Loaded once; every year selection rebuilds the chart from this.
	let dataset = load_dataset().unwrap_or_default();
	let data_signal = Signal::derive(move || dataset.clone());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Hazardous Waste in Europe" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-chart">
			<SankeyCanvas data=data_signal fullscreen=true />
			<div class="chart-overlay">
				<h1>"Hazardous Waste in Europe"</h1>
				<p class="subtitle">
					"Click a year to switch. Hover flows for details. Scroll to zoom, drag to pan."
				</p>
			</div>
		</div>
	}
}
