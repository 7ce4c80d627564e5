//! Search box and risk filter controls above the graph.

use leptos::prelude::*;

use crate::graph::{RiskFilter, RiskLevel};

/// Binds the search term and risk filter signals to form controls.
#[component]
pub fn GraphFilters(
	/// Search term, matched case-insensitively against names and groups.
	search: RwSignal<String>,
	/// Risk level filter.
	filter: RwSignal<RiskFilter>,
	/// Shown next to the controls as `visible / total`.
	#[prop(into)]
	counts: Signal<(usize, usize)>,
) -> impl IntoView {
	let on_filter = move |ev: web_sys::Event| match event_target_value(&ev).parse::<RiskFilter>() {
		Ok(value) => filter.set(value),
		Err(e) => log::warn!("risk-graph: {}", e),
	};

	view! {
		<div class="graph-filters">
			<input
				type="search"
				placeholder="Search name or department"
				prop:value=move || search.get()
				on:input=move |ev| search.set(event_target_value(&ev))
			/>
			<select prop:value=move || filter.get().to_string() on:change=on_filter>
				<option value="all">"All risk levels"</option>
				{RiskLevel::ALL
					.into_iter()
					.map(|level| view! { <option value=level.as_str()>{level.as_str()}</option> })
					.collect_view()}
			</select>
			<span class="graph-counts">
				{move || {
					let (shown, total) = counts.get();
					format!("{shown} / {total} entities")
				}}
			</span>
		</div>
	}
}
