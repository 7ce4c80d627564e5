//! Investigation loading for the selected node.
//!
//! Selecting a node starts two independent reads (entity detail and evidence)
//! that run concurrently. The panel shows a loading state until both resolve,
//! an error when either fails, and the combined record otherwise. Every load
//! is stamped with a generation; a result arriving for anything other than
//! the latest generation is dropped, so the last request always wins.

use std::collections::BTreeSet;

use futures::future::try_join;
use log::{debug, warn};

use super::types::{Investigation, RecordId};
use crate::error::FetchError;
use crate::graph::EntityId;
use crate::source::InvestigationSource;

/// What the investigation panel is showing.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum LoadState {
	/// No node selected.
	#[default]
	Idle,
	/// Reads for the selected entity are in flight.
	Loading,
	/// Both reads finished.
	Ready(Investigation),
	/// Human-readable error message.
	Failed(String),
}

/// Handle for one in-flight load.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LoadTicket {
	generation: u64,
	entity_id: EntityId,
}

impl LoadTicket {
	/// Entity the load was started for.
	pub fn entity_id(&self) -> EntityId {
		self.entity_id
	}
}

/// Panel state machine. Owned by the UI; async work talks to it only through
/// [`begin`](Self::begin) and [`finish`](Self::finish).
#[derive(Clone, Debug, Default)]
pub struct InvestigationLoader {
	generation: u64,
	selected: Option<EntityId>,
	state: LoadState,
	expanded: BTreeSet<RecordId>,
}

impl InvestigationLoader {
	/// Idle loader with nothing selected.
	pub fn new() -> Self {
		Self::default()
	}

	/// Starts loading `id`, superseding whatever was loading or shown.
	pub fn begin(&mut self, id: EntityId) -> LoadTicket {
		self.generation += 1;
		self.selected = Some(id);
		self.state = LoadState::Loading;
		self.expanded.clear();
		debug!("risk-graph: loading investigation for {} (#{})", id, self.generation);
		LoadTicket {
			generation: self.generation,
			entity_id: id,
		}
	}

	/// Applies a load result. Returns `false` when the ticket is stale and the
	/// result was discarded.
	pub fn finish(&mut self, ticket: LoadTicket, result: Result<Investigation, FetchError>) -> bool {
		if !self.is_current(ticket) {
			debug!(
				"risk-graph: dropping stale investigation for {} (#{})",
				ticket.entity_id, ticket.generation
			);
			return false;
		}
		self.state = match result {
			Ok(investigation) => LoadState::Ready(investigation),
			Err(err) => {
				warn!("risk-graph: investigation for {} failed: {}", ticket.entity_id, err);
				LoadState::Failed(err.to_string())
			}
		};
		true
	}

	/// Starts a fresh load for the current selection.
	pub fn retry(&mut self) -> Option<LoadTicket> {
		self.selected.map(|id| self.begin(id))
	}

	/// Clears the selection. Pending loads become stale.
	pub fn close(&mut self) {
		self.generation += 1;
		self.selected = None;
		self.state = LoadState::Idle;
		self.expanded.clear();
	}

	/// Flips the expanded flag of one evidence record.
	pub fn toggle_evidence(&mut self, id: &RecordId) {
		if !self.expanded.remove(id) {
			self.expanded.insert(id.clone());
		}
	}

	/// True when the record's detail lines are shown.
	pub fn is_expanded(&self, id: &RecordId) -> bool {
		self.expanded.contains(id)
	}

	/// True when `ticket` belongs to the latest load.
	pub fn is_current(&self, ticket: LoadTicket) -> bool {
		ticket.generation == self.generation
	}

	/// Current panel state.
	pub fn state(&self) -> &LoadState {
		&self.state
	}

	/// Entity the panel is open for.
	pub fn selected(&self) -> Option<EntityId> {
		self.selected
	}

	/// True while a load is in flight.
	pub fn is_loading(&self) -> bool {
		matches!(self.state, LoadState::Loading)
	}

	/// The loaded investigation, once ready.
	pub fn investigation(&self) -> Option<&Investigation> {
		match &self.state {
			LoadState::Ready(investigation) => Some(investigation),
			_ => None,
		}
	}

	/// The failure message, if the last load failed.
	pub fn error(&self) -> Option<&str> {
		match &self.state {
			LoadState::Failed(message) => Some(message),
			_ => None,
		}
	}
}

/// Runs the detail and evidence reads concurrently and combines them. Fails
/// as soon as either read fails.
pub async fn fetch_investigation<S>(
	source: &S,
	id: EntityId,
	evidence_limit: Option<usize>,
) -> Result<Investigation, FetchError>
where
	S: InvestigationSource + ?Sized,
{
	let (detail, evidence) =
		try_join(source.entity_detail(id), source.evidence(id, evidence_limit)).await?;
	Ok(Investigation {
		entity: detail.entity,
		violations: detail.violations,
		evidence,
	})
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::collections::HashMap;

	use async_trait::async_trait;
	use futures::channel::oneshot;
	use futures::executor::block_on;
	use futures::future::join;

	use super::*;
	use crate::graph::{Entity, RiskLevel};
	use crate::investigation::{EntityDetail, EvidenceRecord};

	/// Begins a load, awaits both reads and applies the result the way the
	/// panel does. Returns whether the result was applied.
	async fn load_investigation<S: InvestigationSource>(
		loader: &RefCell<InvestigationLoader>,
		source: &S,
		id: EntityId,
		evidence_limit: Option<usize>,
	) -> bool {
		let ticket = loader.borrow_mut().begin(id);
		let result = fetch_investigation(source, id, evidence_limit).await;
		loader.borrow_mut().finish(ticket, result)
	}

	fn entity(id: u64, name: &str) -> Entity {
		Entity {
			id: EntityId(id),
			name: name.into(),
			group: "Finance".into(),
			risk_score: 50.0,
			risk_level: RiskLevel::High,
			image: None,
		}
	}

	fn evidence(id: &str, violation: Option<&str>) -> EvidenceRecord {
		EvidenceRecord {
			id: RecordId::from(id),
			violation_id: violation.map(RecordId::from),
			fields: Default::default(),
		}
	}

	/// Serves canned records. Detail reads for ids listed in `gates` block until
	/// the paired sender fires.
	#[derive(Default)]
	struct MockSource {
		entities: HashMap<u64, Entity>,
		evidence: HashMap<u64, Vec<EvidenceRecord>>,
		fail_evidence: bool,
		gates: RefCell<HashMap<u64, oneshot::Receiver<()>>>,
		limits: RefCell<Vec<Option<usize>>>,
	}

	impl MockSource {
		fn with(ids: &[(u64, &str)]) -> Self {
			let mut source = MockSource::default();
			for (id, name) in ids {
				source.entities.insert(*id, entity(*id, name));
				source
					.evidence
					.insert(*id, vec![evidence(&format!("e{}", id), None)]);
			}
			source
		}

		fn gate(&self, id: u64) -> oneshot::Sender<()> {
			let (tx, rx) = oneshot::channel();
			self.gates.borrow_mut().insert(id, rx);
			tx
		}
	}

	#[async_trait(?Send)]
	impl InvestigationSource for MockSource {
		async fn entity_detail(&self, id: EntityId) -> Result<EntityDetail, FetchError> {
			let gate = self.gates.borrow_mut().remove(&id.0);
			if let Some(gate) = gate {
				let _ = gate.await;
			}
			self.entities
				.get(&id.0)
				.cloned()
				.map(|entity| EntityDetail {
					entity,
					violations: Vec::new(),
				})
				.ok_or(FetchError::Status {
					url: format!("/entities/{}", id),
					status: 404,
				})
		}

		async fn evidence(
			&self,
			id: EntityId,
			limit: Option<usize>,
		) -> Result<Vec<EvidenceRecord>, FetchError> {
			self.limits.borrow_mut().push(limit);
			if self.fail_evidence {
				return Err(FetchError::Network {
					url: format!("/entities/{}/evidence", id),
					message: "connection reset".into(),
				});
			}
			Ok(self.evidence.get(&id.0).cloned().unwrap_or_default())
		}
	}

	#[test]
	fn begin_enters_loading_and_clears_previous() {
		let mut loader = InvestigationLoader::new();
		let ticket = loader.begin(EntityId(1));
		assert!(loader.is_loading());
		assert_eq!(loader.selected(), Some(EntityId(1)));
		assert_eq!(ticket.entity_id(), EntityId(1));

		loader.toggle_evidence(&RecordId::from("e1"));
		loader.begin(EntityId(2));
		assert!(!loader.is_expanded(&RecordId::from("e1")));
		assert!(loader.investigation().is_none());
	}

	#[test]
	fn successful_load_combines_both_reads() {
		let source = MockSource::with(&[(1, "Alice")]);
		let loader = RefCell::new(InvestigationLoader::new());

		assert!(block_on(load_investigation(&loader, &source, EntityId(1), Some(50))));

		let loader = loader.borrow();
		let investigation = loader.investigation().unwrap();
		assert_eq!(investigation.entity.name, "Alice");
		assert_eq!(investigation.evidence.len(), 1);
		assert_eq!(*source.limits.borrow(), vec![Some(50)]);
	}

	#[test]
	fn failure_of_either_read_fails_the_load() {
		let mut source = MockSource::with(&[(1, "Alice")]);
		source.fail_evidence = true;
		let loader = RefCell::new(InvestigationLoader::new());

		block_on(load_investigation(&loader, &source, EntityId(1), None));

		let loader = loader.borrow();
		assert!(!loader.is_loading());
		assert!(loader.investigation().is_none());
		assert!(loader.error().unwrap().contains("connection reset"));
	}

	#[test]
	fn unknown_entity_reports_status() {
		let source = MockSource::with(&[]);
		let loader = RefCell::new(InvestigationLoader::new());
		block_on(load_investigation(&loader, &source, EntityId(9), None));
		assert!(loader.borrow().error().unwrap().contains("404"));
	}

	#[test]
	fn last_request_wins() {
		let source = MockSource::with(&[(1, "Alice"), (2, "Bob")]);
		let release_first = source.gate(1);
		let loader = RefCell::new(InvestigationLoader::new());

		// Node 1 is selected, then node 2 before node 1's detail resolves.
		let first = load_investigation(&loader, &source, EntityId(1), None);
		let second = async {
			let applied = load_investigation(&loader, &source, EntityId(2), None).await;
			let _ = release_first.send(());
			applied
		};
		let (first_applied, second_applied) = block_on(join(first, second));

		assert!(!first_applied);
		assert!(second_applied);
		let loader = loader.borrow();
		assert_eq!(loader.selected(), Some(EntityId(2)));
		assert_eq!(loader.investigation().unwrap().entity.name, "Bob");
	}

	#[test]
	fn stale_results_are_dropped_after_close() {
		let mut loader = InvestigationLoader::new();
		let ticket = loader.begin(EntityId(1));
		loader.close();
		let applied = loader.finish(
			ticket,
			Err(FetchError::Status {
				url: "/entities/1".into(),
				status: 500,
			}),
		);
		assert!(!applied);
		assert_eq!(loader.state(), &LoadState::Idle);
		assert_eq!(loader.selected(), None);
	}

	#[test]
	fn retry_reloads_the_current_selection() {
		let mut loader = InvestigationLoader::new();
		assert!(loader.retry().is_none());

		let first = loader.begin(EntityId(4));
		loader.finish(first, Err(FetchError::NoWindow));
		assert!(loader.error().is_some());

		let again = loader.retry().unwrap();
		assert_eq!(again.entity_id(), EntityId(4));
		assert!(loader.is_loading());
		assert!(!loader.is_current(first));
	}

	#[test]
	fn toggling_evidence_leaves_load_state_untouched() {
		let mut source = MockSource::with(&[(1, "Alice")]);
		source
			.evidence
			.insert(1, vec![evidence("e1", None), evidence("e2", None)]);
		let loader = RefCell::new(InvestigationLoader::new());
		block_on(load_investigation(&loader, &source, EntityId(1), None));

		let mut loader = loader.into_inner();
		let before = loader.state().clone();
		loader.toggle_evidence(&RecordId::from("e2"));
		assert_eq!(loader.state(), &before);
		assert!(loader.is_expanded(&RecordId::from("e2")));
		assert!(!loader.is_expanded(&RecordId::from("e1")));
	}

	#[test]
	fn evidence_rows_toggle_independently() {
		let mut loader = InvestigationLoader::new();
		let a = RecordId::from("a");
		let b = RecordId::from("b");
		loader.toggle_evidence(&a);
		loader.toggle_evidence(&b);
		loader.toggle_evidence(&a);
		assert!(!loader.is_expanded(&a));
		assert!(loader.is_expanded(&b));
	}
}
