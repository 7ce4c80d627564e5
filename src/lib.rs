//! risk-graph: Interactive risk relationship dashboard.
//!
//! Builds a relationship graph between monitored entities from shared
//! department and co-occurring risk, narrows it by search and risk level,
//! lays it out with a force simulation on a canvas, and loads the
//! investigation (violations and evidence) of whichever node is clicked.

use leptos::prelude::*;
use leptos::task::spawn_local;
use leptos_meta::*;
use log::{Level, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::de::DeserializeOwned;
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;
pub mod config;
pub mod error;
pub mod graph;
pub mod investigation;
pub mod source;

pub use components::force_graph::Theme;
pub use components::{EvidencePanel, ForceGraphCanvas, GraphFilters};
pub use config::DashboardConfig;
pub use error::FetchError;
pub use graph::{Entity, EntityId, Graph, RiskFilter, build_graph, select_subgraph};
pub use investigation::{InvestigationLoader, LoadTicket, fetch_investigation};
pub use source::{EntitySource, FetchClient, InvestigationSource};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("risk-graph: logging initialized");
}

/// Text of the inline `<script id=..>` element, if present.
fn inline_script(id: &str) -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id(id)?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

fn inline_json<T: DeserializeOwned>(id: &str) -> Option<T> {
	let text = inline_script(id)?;
	match serde_json::from_str::<T>(&text) {
		Ok(value) => Some(value),
		Err(e) => {
			warn!("risk-graph: failed to parse #{}: {}", id, e);
			None
		}
	}
}

/// Dashboard configuration from `<script id="dashboard-config">`, or defaults.
pub fn load_config() -> DashboardConfig {
	let Some(text) = inline_script("dashboard-config") else {
		return DashboardConfig::default();
	};
	DashboardConfig::from_json(&text).unwrap_or_else(|e| {
		warn!("risk-graph: failed to parse #dashboard-config: {}", e);
		DashboardConfig::default()
	})
}

/// Entity snapshot embedded in `<script id="entity-data">`, if any.
pub fn load_entities() -> Option<Vec<Entity>> {
	let entities: Vec<Entity> = inline_json("entity-data")?;
	info!("risk-graph: loaded {} inline entities", entities.len());
	Some(entities)
}

/// Fetches the investigation for `ticket` and hands the result back to the
/// loader, which ignores it if a newer selection was made meanwhile.
fn spawn_investigation(
	loader: RwSignal<InvestigationLoader>,
	client: FetchClient,
	ticket: LoadTicket,
	evidence_limit: Option<usize>,
) {
	spawn_local(async move {
		let result = fetch_investigation(&client, ticket.entity_id(), evidence_limit).await;
		loader.update(|l| {
			l.finish(ticket, result);
		});
	});
}

/// Main application component.
/// Loads entities, derives the graph and wires filters, canvas and panel.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_config();
	let client = FetchClient::new(config.api_base.clone());
	let evidence_limit = config.evidence_limit;
	let theme = Theme::by_name(&config.theme);

	let inline = load_entities();
	let needs_fetch = inline.is_none();
	let entities = RwSignal::new(inline.unwrap_or_default());

	let graph = Memo::new(move |_| {
		let mut rng = StdRng::seed_from_u64(js_sys::Date::now() as u64);
		entities.with(|list| build_graph(list, &mut rng))
	});

	let search = RwSignal::new(String::new());
	let filter = RwSignal::new(RiskFilter::All);
	let subgraph = Memo::new(move |_| graph.with(|g| select_subgraph(g, &search.get(), filter.get())));
	let counts = Signal::derive(move || {
		(
			subgraph.with(|g| g.nodes.len()),
			graph.with(|g| g.nodes.len()),
		)
	});

	let loader = RwSignal::new(InvestigationLoader::new());
	let selected = Signal::derive(move || loader.with(|l| l.selected()));

	let on_select = {
		let client = client.clone();
		move |id: EntityId| {
			let ticket = loader.write().begin(id);
			spawn_investigation(loader, client.clone(), ticket, evidence_limit);
		}
	};
	let on_retry = {
		let client = client.clone();
		move |()| {
			let ticket = loader.write().retry();
			if let Some(ticket) = ticket {
				spawn_investigation(loader, client.clone(), ticket, evidence_limit);
			}
		}
	};
	let on_close = move |()| loader.write().close();

	let refresh = move || {
		let client = client.clone();
		spawn_local(async move {
			match client.entities().await {
				Ok(list) => {
					info!("risk-graph: refreshed {} entities", list.len());
					entities.set(list);
				}
				Err(e) => warn!("risk-graph: entity refresh failed: {}", e),
			}
		});
	};
	if needs_fetch {
		refresh();
	}

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Risk Relationships" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<ForceGraphCanvas
				data=subgraph
				on_select=on_select
				selected=selected
				theme=theme
				simulation=config.simulation
				fullscreen=true
			/>
			<div class="graph-overlay">
				<h1>"Risk Relationships"</h1>
				<GraphFilters search=search filter=filter counts=counts />
				<button class="refresh" on:click=move |_| refresh()>"Refresh"</button>
				<p class="subtitle">"Click a node to investigate. Drag nodes to reposition. Scroll to zoom."</p>
			</div>
			<EvidencePanel loader=loader on_retry=on_retry on_close=on_close />
		</div>
	}
}
