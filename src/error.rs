//! Errors raised at the data-source boundary.

use thiserror::Error;

/// Failure to read entities or investigation records from a source.
///
/// Messages are shown to analysts verbatim, so they read as sentences.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FetchError {
	/// Not running in a browser.
	#[error("no browser window is available to issue requests")]
	NoWindow,
	/// The request never produced a response.
	#[error("request to {url} failed: {message}")]
	Network {
		/// Requested URL.
		url: String,
		/// Error reported by the browser.
		message: String,
	},
	/// The server answered with a non-2xx status.
	#[error("{url} answered with HTTP {status}")]
	Status {
		/// Requested URL.
		url: String,
		/// HTTP status code.
		status: u16,
	},
	/// The body was not the expected JSON.
	#[error("could not read the response from {url}: {message}")]
	Decode {
		/// Requested URL.
		url: String,
		/// Parser error.
		message: String,
	},
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn messages_name_the_failing_url() {
		let err = FetchError::Status {
			url: "/api/entities/4".into(),
			status: 503,
		};
		assert_eq!(err.to_string(), "/api/entities/4 answered with HTTP 503");
		let decode = FetchError::Decode {
			url: "/api/entities".into(),
			message: "expected `[`".into(),
		};
		assert_eq!(
			decode.to_string(),
			"could not read the response from /api/entities: expected `[`"
		);
	}
}
