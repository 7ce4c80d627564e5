//! UI components.

mod evidence_panel;
mod filters;
pub mod force_graph;

pub use evidence_panel::EvidencePanel;
pub use filters::GraphFilters;
pub use force_graph::ForceGraphCanvas;
