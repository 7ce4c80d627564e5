//! Side panel showing the investigation of the selected node.

use leptos::prelude::*;

use crate::graph::{Entity, initials, placeholder_color};
use crate::investigation::{EvidenceRecord, Investigation, InvestigationLoader, LoadState};

/// Loading, error and ready views for the current [`InvestigationLoader`].
/// Renders nothing while no node is selected.
#[component]
pub fn EvidencePanel(
	/// Panel state, shared with whoever starts the loads.
	loader: RwSignal<InvestigationLoader>,
	/// Retry button in the error view.
	#[prop(into)]
	on_retry: Callback<()>,
	/// Close button.
	#[prop(into)]
	on_close: Callback<()>,
) -> impl IntoView {
	// Row toggles change only the expanded set, which these memos filter out.
	let state = Memo::new(move |_| loader.with(|l| l.state().clone()));
	let open = Memo::new(move |_| loader.with(|l| l.selected().is_some()));
	let body = move || match state.get() {
		LoadState::Idle => ().into_any(),
		LoadState::Loading => view! { <p class="panel-status">"Loading investigation..."</p> }.into_any(),
		LoadState::Failed(message) => view! {
			<div class="panel-error">
				<p>{message}</p>
				<button on:click=move |_| on_retry.run(())>"Retry"</button>
			</div>
		}
		.into_any(),
		LoadState::Ready(investigation) => view! { <InvestigationView investigation=investigation loader=loader /> }.into_any(),
	};

	view! {
		<Show when=move || open.get()>
			<aside class="evidence-panel">
				<button class="panel-close" title="Close" on:click=move |_| on_close.run(())>
					"\u{00d7}"
				</button>
				{body}
			</aside>
		</Show>
	}
}

#[component]
fn InvestigationView(investigation: Investigation, loader: RwSignal<InvestigationLoader>) -> impl IntoView {
	let violations = investigation
		.violations
		.iter()
		.map(|v| {
			let supporting = investigation.evidence_for(&v.id).count();
			view! {
				<li>
					<span class="violation-title">{v.title()}</span>
					<span class="violation-evidence">{format!("{supporting} evidence")}</span>
				</li>
			}
		})
		.collect_view();

	let evidence = investigation
		.evidence
		.iter()
		.map(|record| {
			let linked = investigation.violation_for(record).map(|v| v.title());
			evidence_row(record.clone(), linked, loader)
		})
		.collect_view();

	view! {
		<EntityHeader entity=investigation.entity.clone() />
		<section>
			<h3>{format!("Violations ({})", investigation.violations.len())}</h3>
			<ul class="violations">{violations}</ul>
		</section>
		<section>
			<h3>{format!("Evidence ({})", investigation.evidence.len())}</h3>
			<ul class="evidence">{evidence}</ul>
		</section>
	}
}

#[component]
fn EntityHeader(entity: Entity) -> impl IntoView {
	let avatar = match entity.image.clone() {
		Some(src) => view! { <img class="avatar" src=src alt=entity.name.clone() /> }.into_any(),
		None => {
			let style = format!("background: {}", placeholder_color(&entity.name));
			view! { <span class="avatar placeholder" style=style>{initials(&entity.name)}</span> }
				.into_any()
		}
	};
	let risk_class = format!("risk risk-{}", entity.risk_level.as_str().to_lowercase());

	view! {
		<header class="entity-header">
			{avatar}
			<div>
				<h2>{entity.name.clone()}</h2>
				<p>{entity.group.clone()}</p>
				<p class=risk_class>
					{format!("{} risk, score {:.0}", entity.risk_level, entity.risk_score)}
				</p>
			</div>
		</header>
	}
}

fn evidence_row(
	record: EvidenceRecord,
	linked: Option<String>,
	loader: RwSignal<InvestigationLoader>,
) -> impl IntoView {
	let id = record.id.clone();
	let expanded = {
		let id = id.clone();
		move || loader.with(|l| l.is_expanded(&id))
	};
	let toggle = move |_| loader.update(|l| l.toggle_evidence(&id));
	let lines = record.detail_lines();

	view! {
		<li class="evidence-row">
			<button class="evidence-toggle" on:click=toggle>
				{record.summary()}
			</button>
			{linked.map(|title| view! { <span class="evidence-violation">{title}</span> })}
			<Show when=expanded.clone()>
				<dl class="evidence-detail">
					{lines
						.clone()
						.into_iter()
						.map(|(k, v)| view! { <dt>{k}</dt> <dd>{v}</dd> })
						.collect_view()}
				</dl>
			</Show>
		</li>
	}
}
