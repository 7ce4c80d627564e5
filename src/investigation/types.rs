//! Investigation records as delivered by the investigation source.
//!
//! Violation and evidence records are opaque: apart from their identifiers
//! (and the evidence-to-violation cross reference) every field is passed
//! through untouched for the panel to display.

use std::fmt;

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::graph::Entity;

/// Identifier of a violation or evidence record. Sources use both numeric and
/// string identifiers, so both are accepted and kept as text.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(from = "RawId")]
pub struct RecordId(pub String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
	Number(i64),
	Text(String),
}

impl From<RawId> for RecordId {
	fn from(raw: RawId) -> Self {
		match raw {
			RawId::Number(n) => RecordId(n.to_string()),
			RawId::Text(s) => RecordId(s),
		}
	}
}

impl From<&str> for RecordId {
	fn from(s: &str) -> Self {
		RecordId(s.to_string())
	}
}

impl fmt::Display for RecordId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// A policy violation attributed to the entity.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Violation {
	/// Record id, referenced by evidence.
	pub id: RecordId,
	/// Every other field, passed through untouched.
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}

impl Violation {
	/// Short human label for list rows.
	pub fn title(&self) -> String {
		first_text(&self.fields, &["title", "violation_type", "type", "description"])
			.unwrap_or_else(|| format!("Violation {}", self.id))
	}
}

/// A communication or other evidence record scoped to the entity.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EvidenceRecord {
	/// Record id, the key of the expanded set.
	pub id: RecordId,
	/// Violation this record supports, if any.
	#[serde(default)]
	pub violation_id: Option<RecordId>,
	/// Every other field, passed through untouched.
	#[serde(flatten)]
	pub fields: Map<String, Value>,
}

impl EvidenceRecord {
	/// Short human label for list rows.
	pub fn summary(&self) -> String {
		first_text(&self.fields, &["subject", "title", "summary", "type"])
			.unwrap_or_else(|| format!("Evidence {}", self.id))
	}

	/// Every passthrough field rendered as `key: value` lines, sorted by key.
	pub fn detail_lines(&self) -> Vec<(String, String)> {
		let mut lines: Vec<(String, String)> = self
			.fields
			.iter()
			.map(|(k, v)| {
				let text = match v {
					Value::String(s) => s.clone(),
					other => other.to_string(),
				};
				(k.clone(), text)
			})
			.collect();
		lines.sort();
		lines
	}
}

/// Entity detail read: the entity plus its violations.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EntityDetail {
	/// The entity fields at the top level of the response.
	#[serde(flatten)]
	pub entity: Entity,
	/// Violations attributed to the entity.
	#[serde(default)]
	pub violations: Vec<Violation>,
}

/// Everything loaded for one selected node.
#[derive(Clone, Debug, PartialEq)]
pub struct Investigation {
	/// Selected entity as reported by the detail read.
	pub entity: Entity,
	/// From the detail read.
	pub violations: Vec<Violation>,
	/// From the evidence read.
	pub evidence: Vec<EvidenceRecord>,
}

impl Investigation {
	/// The violation an evidence record points at, when it is part of this
	/// investigation.
	pub fn violation_for(&self, record: &EvidenceRecord) -> Option<&Violation> {
		let id = record.violation_id.as_ref()?;
		self.violations.iter().find(|v| &v.id == id)
	}

	/// Evidence supporting a violation.
	pub fn evidence_for<'a>(
		&'a self,
		violation: &'a RecordId,
	) -> impl Iterator<Item = &'a EvidenceRecord> + 'a {
		self.evidence
			.iter()
			.filter(move |e| e.violation_id.as_ref() == Some(violation))
	}
}

fn first_text(fields: &Map<String, Value>, keys: &[&str]) -> Option<String> {
	keys.iter()
		.filter_map(|k| fields.get(*k))
		.find_map(|v| v.as_str().filter(|s| !s.is_empty()).map(str::to_string))
}
