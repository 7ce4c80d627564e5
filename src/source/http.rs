//! Browser `fetch` implementation of the data sources.

use async_trait::async_trait;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use super::{EntitySource, InvestigationSource};
use crate::error::FetchError;
use crate::graph::{Entity, EntityId};
use crate::investigation::{EntityDetail, EvidenceRecord};

/// JSON-over-HTTP client rooted at the dashboard API base URL.
///
/// - `GET {base}/entities`
/// - `GET {base}/entities/{id}`
/// - `GET {base}/entities/{id}/evidence?limit={n}`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FetchClient {
	base_url: String,
}

impl FetchClient {
	/// Client for `base_url`. A trailing slash is dropped.
	pub fn new(base_url: impl Into<String>) -> Self {
		let base_url: String = base_url.into();
		Self {
			base_url: base_url.trim_end_matches('/').to_string(),
		}
	}

	/// URL of the entity snapshot.
	pub fn entities_url(&self) -> String {
		format!("{}/entities", self.base_url)
	}

	/// URL of one entity with its violations.
	pub fn detail_url(&self, id: EntityId) -> String {
		format!("{}/entities/{}", self.base_url, id)
	}

	/// URL of an entity's evidence, limited when `limit` is given.
	pub fn evidence_url(&self, id: EntityId, limit: Option<usize>) -> String {
		match limit {
			Some(limit) => format!("{}/entities/{}/evidence?limit={}", self.base_url, id, limit),
			None => format!("{}/entities/{}/evidence", self.base_url, id),
		}
	}

	async fn get_json<T: DeserializeOwned>(&self, url: String) -> Result<T, FetchError> {
		let network = |err: JsValue| FetchError::Network {
			url: url.clone(),
			message: js_message(&err),
		};

		let opts = RequestInit::new();
		opts.set_method("GET");
		opts.set_mode(RequestMode::Cors);
		let request = Request::new_with_str_and_init(&url, &opts).map_err(network)?;
		request
			.headers()
			.set("Accept", "application/json")
			.map_err(network)?;

		let window = web_sys::window().ok_or(FetchError::NoWindow)?;
		let response: Response = JsFuture::from(window.fetch_with_request(&request))
			.await
			.map_err(network)?
			.dyn_into()
			.map_err(network)?;

		if !response.ok() {
			warn!("risk-graph: {} answered {}", url, response.status());
			return Err(FetchError::Status {
				url,
				status: response.status(),
			});
		}

		let text = JsFuture::from(response.text().map_err(network)?)
			.await
			.map_err(network)?
			.as_string()
			.ok_or_else(|| FetchError::Decode {
				url: url.clone(),
				message: "response body is not text".into(),
			})?;
		debug!("risk-graph: {} returned {} bytes", url, text.len());

		serde_json::from_str(&text).map_err(|e| FetchError::Decode {
			url,
			message: e.to_string(),
		})
	}
}

#[async_trait(?Send)]
impl EntitySource for FetchClient {
	async fn entities(&self) -> Result<Vec<Entity>, FetchError> {
		self.get_json(self.entities_url()).await
	}
}

#[async_trait(?Send)]
impl InvestigationSource for FetchClient {
	async fn entity_detail(&self, id: EntityId) -> Result<EntityDetail, FetchError> {
		self.get_json(self.detail_url(id)).await
	}

	async fn evidence(
		&self,
		id: EntityId,
		limit: Option<usize>,
	) -> Result<Vec<EvidenceRecord>, FetchError> {
		self.get_json(self.evidence_url(id, limit)).await
	}
}

fn js_message(value: &JsValue) -> String {
	if let Some(err) = value.dyn_ref::<js_sys::Error>() {
		return String::from(err.message());
	}
	value
		.as_string()
		.unwrap_or_else(|| format!("{:?}", value))
}
