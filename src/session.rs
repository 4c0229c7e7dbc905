//! Session provider that rotates the challenge session on a fixed schedule.
//!
//! The challenge API only honors a session for a bounded number of requests. The
//! [`SessionProvider`] hands out one token per outgoing request and fetches a fresh one on
//! productions `0`, `period`, `2 * period`, … through a [`SessionSource`]. Every other
//! production returns the cached token unchanged. Productions are counted from the start of
//! the sequence, not from whatever the caller does with the token.

pub mod token;

pub use token::SessionToken;

// std
use std::num::NonZeroUsize;
// self
use crate::{
	_prelude::*,
	descriptor::ChallengeDescriptor,
	http::{ChallengeHttpClient, ChallengeRequest},
	obs::{self, FetchKind},
};

/// Boxed future returned by [`SessionSource::issue`].
pub type SessionFuture<'a> = Pin<Box<dyn Future<Output = Result<SessionToken>> + 'a + Send>>;

/// Mints fresh session tokens.
///
/// Implementations report failures as [`Error::SessionBootstrap`] (or [`Error::Config`] when
/// the request cannot even be formed); the provider propagates them untouched.
pub trait SessionSource
where
	Self: Send + Sync,
{
	/// Fetches a brand-new session token.
	fn issue(&self) -> SessionFuture<'_>;
}

/// [`SessionSource`] that calls the descriptor's session endpoint without a session header and
/// uses the plain-text body verbatim.
pub struct HttpSessionSource<C>
where
	C: ?Sized + ChallengeHttpClient,
{
	http_client: Arc<C>,
	descriptor: ChallengeDescriptor,
}
impl<C> HttpSessionSource<C>
where
	C: ?Sized + ChallengeHttpClient,
{
	/// Creates a source that fetches sessions through `http_client`.
	pub fn new(descriptor: ChallengeDescriptor, http_client: impl Into<Arc<C>>) -> Self {
		Self { http_client: http_client.into(), descriptor }
	}
}
impl<C> SessionSource for HttpSessionSource<C>
where
	C: ?Sized + ChallengeHttpClient,
{
	fn issue(&self) -> SessionFuture<'_> {
		Box::pin(obs::observe(FetchKind::Session, &self.descriptor.session_endpoint, async {
			let url = self.descriptor.session_url()?;
			let body = self
				.http_client
				.get(ChallengeRequest::new(url))
				.await
				.map_err(|source| Error::SessionBootstrap { source })?;

			Ok::<_, Error>(SessionToken::new(body))
		}))
	}
}
impl<C> Debug for HttpSessionSource<C>
where
	C: ?Sized + ChallengeHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("HttpSessionSource")
			.field("session_endpoint", &self.descriptor.session_endpoint)
			.finish()
	}
}

#[derive(Debug, Default)]
struct SessionState {
	productions: usize,
	current: Option<SessionToken>,
}

/// Hands out one session token per request, refreshing every `period` productions.
pub struct SessionProvider {
	source: Arc<dyn SessionSource>,
	period: NonZeroUsize,
	state: AsyncMutex<SessionState>,
}
impl SessionProvider {
	/// Number of requests a single session token serves by default.
	pub const REFRESH_PERIOD: NonZeroUsize = NonZeroUsize::new(10).unwrap();

	/// Creates a provider with the default refresh period.
	pub fn new(source: Arc<dyn SessionSource>) -> Self {
		Self::with_period(source, Self::REFRESH_PERIOD)
	}

	/// Creates a provider with a custom refresh period.
	pub fn with_period(source: Arc<dyn SessionSource>, period: NonZeroUsize) -> Self {
		Self { source, period, state: Default::default() }
	}

	/// Returns the token for the next production, refreshing it on period boundaries.
	///
	/// A failed refresh does not consume the production: the next call tries again rather
	/// than falling back to the stale token.
	pub async fn next_token(&self) -> Result<SessionToken> {
		let mut state = self.state.lock().await;
		let position = state.productions;
		let token = match state.current.clone() {
			Some(token) if position % self.period != 0 => token,
			_ => {
				#[cfg(feature = "tracing")]
				tracing::debug!(position, "Refreshing session.");

				let fresh = self.source.issue().await?;

				state.current = Some(fresh.clone());

				fresh
			},
		};

		state.productions += 1;

		Ok(token)
	}

	/// Number of tokens handed out so far.
	pub async fn productions(&self) -> usize {
		self.state.lock().await.productions
	}
}
impl Debug for SessionProvider {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SessionProvider").field("period", &self.period).finish()
	}
}
