//! Investigation panel data: records and the loader that fetches them.

mod loader;
mod types;

pub use loader::{InvestigationLoader, LoadState, LoadTicket, fetch_investigation};
pub use types::{EntityDetail, EvidenceRecord, Investigation, RecordId, Violation};
