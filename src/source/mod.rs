//! Request/response contracts of the external collaborators.
//!
//! The dashboard never owns entity or evidence data; it reads full snapshots
//! through these traits. [`FetchClient`] is the browser implementation.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::graph::{Entity, EntityId};
use crate::investigation::{EntityDetail, EvidenceRecord};

mod http;

pub use http::FetchClient;

/// Bulk read of the monitored entities. Each call returns a complete
/// replacement snapshot, never a delta.
#[async_trait(?Send)]
pub trait EntitySource {
	/// Every entity currently monitored.
	async fn entities(&self) -> Result<Vec<Entity>, FetchError>;
}

/// Per-entity investigation reads.
#[async_trait(?Send)]
pub trait InvestigationSource {
	/// The entity together with its violation records.
	async fn entity_detail(&self, id: EntityId) -> Result<EntityDetail, FetchError>;

	/// Evidence records scoped to the entity, at most `limit` when given.
	async fn evidence(
		&self,
		id: EntityId,
		limit: Option<usize>,
	) -> Result<Vec<EvidenceRecord>, FetchError>;
}
