//! Sankey-flow visualization of hazardous-waste statistics.
//!
//! Renders an interactive flow diagram on an HTML canvas with:
//! - A country → generated-total → disposal-method flow graph per year
//! - A clickable timeline for switching the reporting year
//! - Hover tooltips with amounts and disposal percentages
//! - Smooth highlight transitions, pan and zoom
//! - A stacked bar-chart variant showing all years side by side
//!
//! # Example
//!
//! ```ignore
//! use waste_flow::{SankeyCanvas, Dataset, WasteRecord};
//!
//! let data = Dataset::new(vec![
//!     WasteRecord { country: "Germany".into(), year: 2016, generated: 2.1e7, incinerated: 5.0e6, recycled: 8.0e6 },
//! ]);
//!
//! view! { <SankeyCanvas data=data.into() fullscreen=true /> }
//! ```

pub mod bars;
mod component;
pub mod graph;
pub mod layout;
mod render;
pub mod scale;
mod state;
pub mod theme;
mod types;

pub use component::SankeyCanvas;
pub use graph::{Disposal, FlowEdge, FlowGraph, FlowNode, NodeKind};
pub use state::{ChartMode, SankeyState};
pub use theme::Theme;
pub use types::{Dataset, WasteRecord};
