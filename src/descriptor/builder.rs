// std
use std::{num::NonZeroUsize, time::Duration};
// self
use crate::{_prelude::*, descriptor::ChallengeDescriptor};

/// Errors raised while constructing or validating descriptors.
#[derive(Debug, PartialEq, Eq, ThisError)]
pub enum ChallengeDescriptorError {
	/// Base URL cannot have paths appended (e.g., `mailto:` or `data:` URLs).
	#[error("Base URL cannot be used as a base: {url}.")]
	CannotBeABase {
		/// Base URL that failed validation.
		url: String,
	},
	/// Endpoint names are appended to the base, so it cannot end in a query or fragment.
	#[error("Base URL must not carry a query or fragment: {url}.")]
	QueryOrFragment {
		/// Base URL that failed validation.
		url: String,
	},
	/// Base URL must be plain HTTP(S).
	#[error("Base URL must use http or https: {url}.")]
	UnsupportedScheme {
		/// Base URL that failed validation.
		url: String,
	},
	/// Sessions must serve at least one request.
	#[error("Session refresh period must be positive.")]
	ZeroRefreshPeriod,
	/// A depth guard of zero would forbid even the start endpoint.
	#[error("Maximum depth must be positive when set.")]
	ZeroMaxDepth,
	/// Endpoint names must not be empty.
	#[error("The {endpoint} endpoint name must not be empty.")]
	EmptyEndpoint {
		/// Which endpoint failed validation.
		endpoint: &'static str,
	},
}

/// Builder for [`ChallengeDescriptor`] values.
///
/// Also the serialized form of a descriptor; omitted fields fall back to the public defaults.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ChallengeDescriptorBuilder {
	/// Base URL; a trailing `/` is added on build when missing.
	pub base_url: Url,
	/// Session bootstrap endpoint name.
	pub session_endpoint: String,
	/// Traversal entry endpoint name.
	pub start_endpoint: String,
	/// Requests served per session token.
	pub refresh_period: usize,
	/// Optional recursion limit.
	pub max_depth: Option<usize>,
	/// Optional per-request timeout.
	pub timeout: Option<Duration>,
}
impl ChallengeDescriptorBuilder {
	/// Creates a new builder seeded with the public challenge defaults.
	pub fn new() -> Self {
		let defaults = ChallengeDescriptor::default();

		Self {
			base_url: defaults.base_url,
			session_endpoint: defaults.session_endpoint,
			start_endpoint: defaults.start_endpoint,
			refresh_period: defaults.refresh_period.get(),
			max_depth: defaults.max_depth,
			timeout: defaults.timeout,
		}
	}

	/// Sets the base URL.
	pub fn base_url(mut self, url: Url) -> Self {
		self.base_url = url;

		self
	}

	/// Overrides the session bootstrap endpoint name.
	pub fn session_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.session_endpoint = endpoint.into();

		self
	}

	/// Overrides the traversal entry endpoint name.
	pub fn start_endpoint(mut self, endpoint: impl Into<String>) -> Self {
		self.start_endpoint = endpoint.into();

		self
	}

	/// Overrides how many requests a session token serves (defaults to 10).
	pub fn refresh_period(mut self, period: usize) -> Self {
		self.refresh_period = period;

		self
	}

	/// Enables the recursion depth guard; the start endpoint sits at depth 1.
	pub fn max_depth(mut self, depth: usize) -> Self {
		self.max_depth = Some(depth);

		self
	}

	/// Applies a per-request timeout to the default transport.
	pub fn timeout(mut self, timeout: Duration) -> Self {
		self.timeout = Some(timeout);

		self
	}

	/// Consumes the builder and validates the resulting descriptor.
	pub fn build(self) -> Result<ChallengeDescriptor, ChallengeDescriptorError> {
		let refresh_period = NonZeroUsize::new(self.refresh_period)
			.ok_or(ChallengeDescriptorError::ZeroRefreshPeriod)?;
		let mut base_url = self.base_url;

		if !base_url.cannot_be_a_base() && !base_url.path().ends_with('/') {
			let path = format!("{}/", base_url.path());

			base_url.set_path(&path);
		}

		let descriptor = ChallengeDescriptor {
			base_url,
			session_endpoint: self.session_endpoint,
			start_endpoint: self.start_endpoint,
			refresh_period,
			max_depth: self.max_depth,
			timeout: self.timeout,
		};

		descriptor.validate()?;

		Ok(descriptor)
	}
}
impl Default for ChallengeDescriptorBuilder {
	fn default() -> Self {
		Self::new()
	}
}
impl TryFrom<ChallengeDescriptorBuilder> for ChallengeDescriptor {
	type Error = ChallengeDescriptorError;

	fn try_from(builder: ChallengeDescriptorBuilder) -> Result<Self, Self::Error> {
		builder.build()
	}
}

impl ChallengeDescriptor {
	/// Validates invariants for the descriptor.
	fn validate(&self) -> Result<(), ChallengeDescriptorError> {
		if self.base_url.cannot_be_a_base() {
			return Err(ChallengeDescriptorError::CannotBeABase {
				url: self.base_url.to_string(),
			});
		}
		if self.base_url.query().is_some() || self.base_url.fragment().is_some() {
			return Err(ChallengeDescriptorError::QueryOrFragment {
				url: self.base_url.to_string(),
			});
		}
		if !matches!(self.base_url.scheme(), "http" | "https") {
			return Err(ChallengeDescriptorError::UnsupportedScheme {
				url: self.base_url.to_string(),
			});
		}
		if self.max_depth == Some(0) {
			return Err(ChallengeDescriptorError::ZeroMaxDepth);
		}

		validate_endpoint("session", &self.session_endpoint)?;
		validate_endpoint("start", &self.start_endpoint)?;

		Ok(())
	}
}

fn validate_endpoint(name: &'static str, endpoint: &str) -> Result<(), ChallengeDescriptorError> {
	if endpoint.is_empty() {
		Err(ChallengeDescriptorError::EmptyEndpoint { endpoint: name })
	} else {
		Ok(())
	}
}
