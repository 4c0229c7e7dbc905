//! Challenge descriptor: where the API lives and how the client walks it.
//!
//! A descriptor is plain, serializable data. Build one with [`ChallengeDescriptor::builder`]
//! or start from [`ChallengeDescriptor::default`], which targets the public challenge host.

/// Builder API for assembling challenge descriptors.
pub mod builder;

pub use builder::*;

// std
use std::{num::NonZeroUsize, time::Duration};
// self
use crate::{_prelude::*, error::ConfigError};

/// Base URL of the public challenge API.
pub const DEFAULT_BASE_URL: &str = "http://challenge.shopcurbside.com/";
/// Endpoint that mints session tokens.
pub const DEFAULT_SESSION_ENDPOINT: &str = "get-session";
/// Endpoint every traversal starts from.
pub const DEFAULT_START_ENDPOINT: &str = "start";

/// Immutable descriptor consumed by the session provider and the resolver.
///
/// Deserialization runs through [`ChallengeDescriptorBuilder`], so loaded descriptors are
/// normalized and validated exactly like built ones.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "ChallengeDescriptorBuilder")]
pub struct ChallengeDescriptor {
	/// Base URL; always ends with `/` and carries no query or fragment. Endpoint names are
	/// appended verbatim.
	pub base_url: Url,
	/// Endpoint returning a fresh plain-text session token.
	pub session_endpoint: String,
	/// Endpoint the traversal starts from.
	pub start_endpoint: String,
	/// Number of requests a single session token serves.
	pub refresh_period: NonZeroUsize,
	/// Optional recursion limit; `None` follows the server as deep as it goes.
	pub max_depth: Option<usize>,
	/// Optional per-request timeout applied to the default transport.
	pub timeout: Option<Duration>,
}
impl ChallengeDescriptor {
	/// Creates a new builder seeded with the public challenge defaults.
	pub fn builder() -> ChallengeDescriptorBuilder {
		ChallengeDescriptorBuilder::new()
	}

	/// Appends `endpoint` to the base URL.
	///
	/// Endpoint names are not validated; the concatenation only has to parse as a URL.
	pub fn endpoint_url(&self, endpoint: &str) -> Result<Url, ConfigError> {
		Url::parse(&format!("{}{endpoint}", self.base_url)).map_err(|source| {
			ConfigError::InvalidEndpoint { endpoint: endpoint.to_owned(), source }
		})
	}

	/// URL of the session bootstrap endpoint.
	pub fn session_url(&self) -> Result<Url, ConfigError> {
		self.endpoint_url(&self.session_endpoint)
	}
}
impl Default for ChallengeDescriptor {
	fn default() -> Self {
		Self {
			base_url: Url::parse(DEFAULT_BASE_URL).expect("Default base URL must parse."),
			session_endpoint: DEFAULT_SESSION_ENDPOINT.into(),
			start_endpoint: DEFAULT_START_ENDPOINT.into(),
			refresh_period: crate::session::SessionProvider::REFRESH_PERIOD,
			max_depth: None,
			timeout: None,
		}
	}
}
