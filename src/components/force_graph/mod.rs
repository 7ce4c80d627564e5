//! Force-directed risk graph.
//!
//! - [`Simulation`]: d3-style force layout (link, many-body, collision and
//!   centering forces with an alpha cooling schedule)
//! - [`ForceGraphState`]: the layout plus pan/zoom, drag pinning, hover
//!   highlight and selection
//! - [`ForceGraphCanvas`]: Leptos canvas component driving both from a
//!   `requestAnimationFrame` loop
//!
//! # Example
//!
//! ```ignore
//! let subgraph = Signal::derive(move || select_subgraph(&graph, &search.get(), filter.get()));
//!
//! view! { <ForceGraphCanvas data=subgraph on_select=move |id| open(id) fullscreen=true /> }
//! ```

mod component;
mod render;
mod scale;
mod simulation;
mod state;
mod theme;

pub use component::ForceGraphCanvas;
pub use scale::{ScaleConfig, ZoomConfig};
pub use simulation::{Body, Simulation, SimulationConfig};
pub use state::{DragRelease, ForceGraphState, ViewTransform};
pub use theme::Theme;
