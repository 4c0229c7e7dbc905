//! Client-level error types shared across the session provider, transport, and resolver.

// self
use crate::_prelude::*;

/// Client-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical client error exposed by public APIs.
///
/// Every variant is fatal: the resolver never retries and never recovers, so the first error
/// aborts the whole traversal.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// Transport failure on a puzzle request (DNS, TCP, TLS, body read).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// Puzzle endpoint returned a body that is not a JSON object.
	#[error(transparent)]
	MalformedResponse(#[from] ResponseError),
	/// Puzzle response parsed but did not describe a secret or a way forward.
	#[error(transparent)]
	MalformedPuzzleResponse(#[from] PuzzleShapeError),

	/// The periodic session refresh failed; the request that needed it was never sent.
	#[error("Session bootstrap failed.")]
	SessionBootstrap {
		/// Transport failure raised while fetching the new session.
		#[source]
		source: TransportError,
	},
	/// The configured depth guard stopped the traversal.
	#[error("Endpoint `{endpoint}` lies deeper than the configured limit of {max_depth}.")]
	DepthExceeded {
		/// Endpoint that would have been fetched past the limit.
		endpoint: String,
		/// Configured maximum depth.
		max_depth: usize,
	},
}

/// Configuration and validation failures raised by the client.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// HTTP client could not be constructed.
	#[error("HTTP client could not be constructed.")]
	HttpClientBuild {
		/// Underlying transport builder failure.
		#[source]
		source: BoxError,
	},
	/// Base URL plus endpoint name does not form a valid URL.
	#[error("Endpoint `{endpoint}` does not form a valid URL.")]
	InvalidEndpoint {
		/// Endpoint name that failed to parse.
		endpoint: String,
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}
impl ConfigError {
	/// Wraps a transport's builder failure inside [`ConfigError`].
	pub fn http_client_build(src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::HttpClientBuild { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for ConfigError {
	fn from(e: ReqwestError) -> Self {
		Self::http_client_build(e)
	}
}

/// Transport-level failures (network, IO).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling `{url}`.")]
	Network {
		/// URL that was being fetched.
		url: String,
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the challenge API.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error raised while fetching `url`.
	pub fn network(url: &Url, src: impl 'static + Send + Sync + std::error::Error) -> Self {
		Self::Network { url: url.to_string(), source: Box::new(src) }
	}
}

/// Response bodies that could not be turned into a JSON object.
#[derive(Debug, ThisError)]
pub enum ResponseError {
	/// Body is not valid JSON.
	#[error("Endpoint `{endpoint}` returned malformed JSON.")]
	InvalidJson {
		/// Endpoint whose body failed to parse.
		endpoint: String,
		/// Structured parsing failure.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// Body holds a JSON value followed by more data.
	#[error("Endpoint `{endpoint}` returned trailing data after its JSON body.")]
	TrailingData {
		/// Endpoint whose body had trailing data.
		endpoint: String,
		/// Underlying parser failure.
		#[source]
		source: serde_json::Error,
	},
	/// Body is valid JSON but not an object.
	#[error("Endpoint `{endpoint}` returned JSON {kind} instead of an object.")]
	NotAnObject {
		/// Endpoint whose body had the wrong shape.
		endpoint: String,
		/// JSON kind that was received.
		kind: &'static str,
	},
}

/// Puzzle responses that parsed as objects but cannot be followed.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
pub enum PuzzleShapeError {
	/// Neither `secret` nor `next` is present.
	#[error("Endpoint `{endpoint}` returned neither `secret` nor `next`.")]
	MissingKeys {
		/// Endpoint whose response lacked both keys.
		endpoint: String,
	},
	/// `secret` is present but is not a string.
	#[error("Endpoint `{endpoint}` returned a non-string secret.")]
	NonStringSecret {
		/// Endpoint whose secret had the wrong type.
		endpoint: String,
	},
	/// An entry of `next` is not a string endpoint name.
	#[error("Endpoint `{endpoint}` listed a non-string next endpoint at position {index}.")]
	NonStringEndpoint {
		/// Endpoint whose `next` value had the wrong type.
		endpoint: String,
		/// Position of the offending entry after normalization.
		index: usize,
	},
}
