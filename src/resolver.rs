//! Secret resolution: authenticated fetches plus the recursive walk over `next` pointers.
//!
//! [`SecretResolver`] owns the transport, the descriptor, and the [`SessionProvider`] it
//! injects into every request. Resolution is strictly sequential: each fetch is awaited
//! before the next one starts and `next` lists are walked in order, so the session
//! rotation observed by the server matches the traversal order exactly.

// self
use crate::{
	_prelude::*,
	descriptor::ChallengeDescriptor,
	http::{ChallengeHttpClient, ChallengeRequest},
	obs::{self, FetchKind},
	response::{PuzzleResponse, PuzzleStep},
	session::{HttpSessionSource, SessionProvider, SessionSource},
};
#[cfg(feature = "reqwest")] use crate::http::ReqwestHttpClient;

/// Boxed future returned by the recursive resolution step.
pub type ResolveFuture<'a> = Pin<Box<dyn Future<Output = Result<String>> + 'a + Send>>;

#[cfg(feature = "reqwest")]
/// Resolver specialized for the crate's default reqwest transport.
pub type ReqwestResolver = SecretResolver<ReqwestHttpClient>;

/// Walks the challenge graph and assembles the secret.
///
/// There is no cycle detection. A server that points back at an endpoint already on the
/// current path recurses until the optional depth guard ([`ChallengeDescriptor::max_depth`])
/// trips, or forever when the guard is unset.
pub struct SecretResolver<C>
where
	C: ?Sized + ChallengeHttpClient,
{
	/// HTTP client used for every puzzle request.
	pub http_client: Arc<C>,
	/// Descriptor naming the base URL, the start endpoint, and the limits.
	pub descriptor: ChallengeDescriptor,
	/// Session provider consulted once per puzzle request.
	pub sessions: SessionProvider,
}
impl<C> SecretResolver<C>
where
	C: ?Sized + ChallengeHttpClient,
{
	/// Creates a resolver whose sessions are minted through the same transport.
	pub fn with_http_client(
		descriptor: ChallengeDescriptor,
		http_client: impl Into<Arc<C>>,
	) -> Self {
		let http_client = http_client.into();
		let source: Arc<dyn SessionSource> =
			Arc::new(HttpSessionSource::<C>::new(descriptor.clone(), http_client.clone()));
		let sessions = SessionProvider::with_period(source, descriptor.refresh_period);

		Self { http_client, descriptor, sessions }
	}

	/// Creates a resolver around a caller-provided session provider.
	pub fn with_session_provider(
		descriptor: ChallengeDescriptor,
		http_client: impl Into<Arc<C>>,
		sessions: SessionProvider,
	) -> Self {
		Self { http_client: http_client.into(), descriptor, sessions }
	}

	/// Fetches `endpoint` with the next session token and parses its JSON body.
	pub async fn fetch(&self, endpoint: &str) -> Result<PuzzleResponse> {
		obs::observe(FetchKind::Puzzle, endpoint, async {
			let session = self.sessions.next_token().await?;
			let url = self.descriptor.endpoint_url(endpoint)?;
			let request = ChallengeRequest::new(url).with_session(session);
			let body = self.http_client.get(request).await?;

			Ok::<_, Error>(PuzzleResponse::parse(endpoint, &body)?)
		})
		.await
	}

	/// Resolves the secret reachable from `endpoint`.
	pub async fn resolve(&self, endpoint: &str) -> Result<String> {
		self.resolve_at(endpoint, 1).await
	}

	/// Resolves the secret reachable from the descriptor's start endpoint.
	pub async fn resolve_start(&self) -> Result<String> {
		self.resolve(&self.descriptor.start_endpoint).await
	}

	fn resolve_at<'a>(&'a self, endpoint: &'a str, depth: usize) -> ResolveFuture<'a> {
		Box::pin(async move {
			if let Some(max_depth) = self.descriptor.max_depth.filter(|max| depth > *max) {
				return Err(Error::DepthExceeded { endpoint: endpoint.to_owned(), max_depth });
			}

			match self.fetch(endpoint).await?.into_step(endpoint)? {
				PuzzleStep::Secret(secret) => Ok(secret),
				PuzzleStep::Next(endpoints) => {
					#[cfg(feature = "tracing")]
					tracing::debug!(endpoint, depth, branches = endpoints.len(), "Following next.");

					let mut secret = String::new();

					for next in &endpoints {
						secret.push_str(&self.resolve_at(next, depth + 1).await?);
					}

					Ok(secret)
				},
			}
		})
	}
}
#[cfg(feature = "reqwest")]
impl SecretResolver<ReqwestHttpClient> {
	/// Creates a resolver backed by a reqwest client configured from `descriptor`.
	pub fn new(descriptor: ChallengeDescriptor) -> Result<Self> {
		let http_client = ReqwestHttpClient::from_descriptor(&descriptor)?;

		Ok(Self::with_http_client(descriptor, http_client))
	}
}
impl<C> Debug for SecretResolver<C>
where
	C: ?Sized + ChallengeHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("SecretResolver")
			.field("descriptor", &self.descriptor)
			.field("sessions", &self.sessions)
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::{
		num::NonZeroUsize,
		sync::atomic::{AtomicUsize, Ordering},
	};
	// self
	use super::*;
	use crate::{
		_preludet::*,
		error::PuzzleShapeError,
		session::{SessionFuture, SessionToken},
	};

	#[tokio::test]
	async fn resolves_terminal_secret() {
		let client = ScriptedHttpClient::default()
			.respond("get-session", "s1")
			.respond("start", r#"{"secret": "X"}"#);
		let (resolver, _client) = build_scripted_resolver(client);
		let secret = resolver.resolve("start").await.expect("Terminal secret should resolve.");

		assert_eq!(secret, "X");
	}

	#[tokio::test]
	async fn follows_single_next_endpoint() {
		let client = ScriptedHttpClient::default()
			.respond("get-session", "s1")
			.respond("start", r#"{"next": "e2"}"#)
			.respond("e2", r#"{"Secret": "Y"}"#);
		let (resolver, _client) = build_scripted_resolver(client);

		assert_eq!(resolver.resolve_start().await.expect("Chain should resolve."), "Y");
	}

	#[tokio::test]
	async fn joins_branches_in_order_without_separator() {
		let client = ScriptedHttpClient::default()
			.respond("get-session", "s1")
			.respond("start", r#"{"NEXT": ["e2", "e3"]}"#)
			.respond("e2", r#"{"secret": "A"}"#)
			.respond("e3", r#"{"secret": "B"}"#);
		let (resolver, client) = build_scripted_resolver(client);
		let secret = resolver.resolve_start().await.expect("Branches should resolve.");
		let paths = client
			.requests()
			.await
			.into_iter()
			.map(|request| request.url.path().to_owned())
			.collect::<Vec<_>>();

		assert_eq!(secret, "AB");
		assert_eq!(paths, ["/get-session", "/start", "/e2", "/e3"]);
	}

	#[tokio::test]
	async fn empty_next_list_contributes_nothing() {
		let client = ScriptedHttpClient::default()
			.respond("get-session", "s1")
			.respond("start", r#"{"next": ["e2", "e3"]}"#)
			.respond("e2", r#"{"next": []}"#)
			.respond("e3", r#"{"secret": "tail"}"#);
		let (resolver, _client) = build_scripted_resolver(client);

		assert_eq!(resolver.resolve_start().await.expect("Empty branch should resolve."), "tail");
	}

	#[tokio::test]
	async fn every_puzzle_request_carries_the_rotating_session() {
		let branches = (1..=12).map(|i| format!("\"e{i}\"")).collect::<Vec<_>>().join(",");
		let mut client = ScriptedHttpClient::default()
			.respond_seq("get-session", ["A", "B"])
			.respond("start", format!("{{\"next\": [{branches}]}}"));

		for i in 1..=12 {
			client = client.respond(&format!("e{i}"), format!("{{\"secret\": \"{i}\"}}"));
		}

		let (resolver, client) = build_scripted_resolver(client);
		let secret = resolver.resolve_start().await.expect("Fan-out should resolve.");
		let requests = client.requests().await;
		let sessions = requests
			.iter()
			.map(|request| request.session.as_ref().map(|token| token.expose().to_owned()))
			.collect::<Vec<_>>();
		let mut expected = vec![None, Some("A".to_owned())];

		expected.extend((1..=9).map(|_| Some("A".to_owned())));
		expected.push(None);
		expected.extend((10..=12).map(|_| Some("B".to_owned())));

		assert_eq!(secret, "123456789101112");
		assert_eq!(sessions, expected);
		assert_eq!(resolver.sessions.productions().await, 13);
	}

	#[tokio::test]
	async fn injected_session_provider_supplies_every_token() {
		struct CountingSource(AtomicUsize);
		impl SessionSource for CountingSource {
			fn issue(&self) -> SessionFuture<'_> {
				Box::pin(async move {
					let n = self.0.fetch_add(1, Ordering::SeqCst);

					Ok(SessionToken::new(format!("injected-{n}")))
				})
			}
		}

		let source = Arc::new(CountingSource(AtomicUsize::new(0)));
		let sessions = SessionProvider::with_period(
			source.clone(),
			NonZeroUsize::new(2).expect("Two is non-zero."),
		);
		let client = Arc::new(
			ScriptedHttpClient::default()
				.respond("start", r#"{"next": ["e2", "e3"]}"#)
				.respond("e2", r#"{"secret": "A"}"#)
				.respond("e3", r#"{"secret": "B"}"#),
		);
		let resolver = SecretResolver::<ScriptedHttpClient>::with_session_provider(
			test_descriptor(),
			client.clone(),
			sessions,
		);
		let secret = resolver.resolve_start().await.expect("Injected sessions should resolve.");
		let sessions = client
			.requests()
			.await
			.into_iter()
			.map(|request| request.session.map(|token| token.expose().to_owned()))
			.collect::<Vec<_>>();

		assert_eq!(secret, "AB");
		assert_eq!(sessions, [
			Some("injected-0".to_owned()),
			Some("injected-0".to_owned()),
			Some("injected-1".to_owned()),
		]);
		assert_eq!(source.0.load(Ordering::SeqCst), 2);
	}

	#[tokio::test]
	async fn missing_keys_abort_resolution() {
		let client = ScriptedHttpClient::default()
			.respond("get-session", "s1")
			.respond("start", r#"{"next": ["e2", "e3"]}"#)
			.respond("e2", r#"{"error": "lost"}"#)
			.respond("e3", r#"{"secret": "unreached"}"#);
		let (resolver, client) = build_scripted_resolver(client);
		let err = resolver.resolve_start().await.expect_err("Missing keys should be fatal.");

		assert!(matches!(
			err,
			Error::MalformedPuzzleResponse(PuzzleShapeError::MissingKeys { ref endpoint })
				if endpoint == "e2"
		));
		assert_eq!(client.requests().await.len(), 3);
	}

	#[tokio::test]
	async fn depth_guard_stops_cycles() {
		let descriptor = ChallengeDescriptor::builder()
			.base_url(Url::parse("http://challenge.test/").expect("Test base URL should parse."))
			.max_depth(4)
			.build()
			.expect("Descriptor with depth guard should build.");
		let client = Arc::new(
			ScriptedHttpClient::default()
				.respond("get-session", "s1")
				.respond("start", r#"{"next": "loop"}"#)
				.respond("loop", r#"{"next": "loop"}"#),
		);
		let resolver = SecretResolver::<ScriptedHttpClient>::with_http_client(descriptor, client);
		let err = resolver.resolve_start().await.expect_err("Cycle should hit the depth guard.");

		assert!(matches!(
			err,
			Error::DepthExceeded { max_depth: 4, ref endpoint } if endpoint == "loop"
		));
		assert_eq!(resolver.sessions.productions().await, 4);
	}

	#[tokio::test]
	async fn transport_failures_surface_as_transport_errors() {
		let client = ScriptedHttpClient::default()
			.respond("get-session", "s1")
			.respond("start", r#"{"next": "gone"}"#);
		let (resolver, _client) = build_scripted_resolver(client);
		let err = resolver.resolve_start().await.expect_err("Unscripted endpoint should fail.");

		assert!(matches!(err, Error::Transport(TransportError::Io(_))));
	}
}
