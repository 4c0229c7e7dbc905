//! Transport primitives for challenge API calls.
//!
//! The module exposes [`ChallengeHttpClient`], the client's only dependency on an HTTP
//! stack, plus [`ChallengeRequest`] describing a single GET. The default implementation,
//! [`ReqwestHttpClient`], is available behind the `reqwest` feature; tests and custom
//! deployments can plug in their own transport.

// self
use crate::{_prelude::*, session::SessionToken};
#[cfg(feature = "reqwest")]
use crate::{descriptor::ChallengeDescriptor, error::ConfigError};

/// Header carrying the session token on authenticated requests.
pub const SESSION_HEADER: &str = "session";

/// Boxed future returned by [`ChallengeHttpClient::get`], resolving to the raw response body.
pub type HttpFuture<'a> = Pin<Box<dyn Future<Output = Result<String, TransportError>> + 'a + Send>>;

/// A single GET issued against the challenge API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChallengeRequest {
	/// Fully joined target URL.
	pub url: Url,
	/// Session attached as the [`SESSION_HEADER`] header; `None` only for the session bootstrap.
	pub session: Option<SessionToken>,
}
impl ChallengeRequest {
	/// Builds an unauthenticated request.
	pub fn new(url: Url) -> Self {
		Self { url, session: None }
	}

	/// Attaches a session token to the request.
	pub fn with_session(mut self, session: SessionToken) -> Self {
		self.session = Some(session);

		self
	}
}

/// Abstraction over HTTP transports capable of issuing challenge API GETs.
///
/// Implementations return the response body as text regardless of the status code; the
/// caller decides how to interpret it. Only failures to complete the exchange (connect, TLS,
/// body read) are reported as [`TransportError`].
pub trait ChallengeHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Issues `request` and yields the body text.
	fn get(&self, request: ChallengeRequest) -> HttpFuture<'_>;
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
#[cfg(feature = "reqwest")]
#[derive(Clone, Debug, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}

	/// Builds a client honoring the descriptor's transport settings (currently the timeout).
	pub fn from_descriptor(descriptor: &ChallengeDescriptor) -> Result<Self, ConfigError> {
		let mut builder = ReqwestClient::builder();

		if let Some(timeout) = descriptor.timeout {
			builder = builder.timeout(timeout);
		}

		Ok(Self::with_client(builder.build()?))
	}
}
#[cfg(feature = "reqwest")]
impl ChallengeHttpClient for ReqwestHttpClient {
	fn get(&self, request: ChallengeRequest) -> HttpFuture<'_> {
		Box::pin(async move {
			let ChallengeRequest { url, session } = request;
			let mut builder = self.0.get(url.clone());

			if let Some(session) = session.as_ref() {
				builder = builder.header(SESSION_HEADER, session.expose());
			}

			let response =
				builder.send().await.map_err(|source| TransportError::network(&url, source))?;

			#[cfg(feature = "tracing")]
			tracing::trace!(url = %url, status = response.status().as_u16(), "Received response.");

			response.text().await.map_err(|source| TransportError::network(&url, source))
		})
	}
}
