//! Session-rotating client for the Curbside challenge API: follow `next` pointers from `start`,
//! refresh the session every ten requests, and stitch the secret fragments back together.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod descriptor;
pub mod error;
pub mod http;
pub mod obs;
pub mod resolver;
pub mod response;
pub mod session;
#[cfg(any(test, feature = "test"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		descriptor::ChallengeDescriptor,
		http::{ChallengeHttpClient, ChallengeRequest, HttpFuture},
		resolver::SecretResolver,
	};

	/// Canned transport that answers from an in-memory endpoint table and records every request.
	///
	/// Endpoints registered with [`ScriptedHttpClient::respond_seq`] answer with their bodies in
	/// order and repeat the last one once exhausted. Unknown endpoints fail with an I/O error.
	#[derive(Debug, Default)]
	pub struct ScriptedHttpClient {
		routes: AsyncMutex<HashMap<String, (usize, Vec<String>)>>,
		requests: AsyncMutex<Vec<ChallengeRequest>>,
	}
	impl ScriptedHttpClient {
		/// Registers a fixed body for `endpoint`.
		pub fn respond(self, endpoint: &str, body: impl Into<String>) -> Self {
			self.respond_seq(endpoint, [body])
		}

		/// Registers a sequence of bodies for `endpoint`.
		pub fn respond_seq<I, S>(mut self, endpoint: &str, bodies: I) -> Self
		where
			I: IntoIterator<Item = S>,
			S: Into<String>,
		{
			self.routes
				.get_mut()
				.insert(endpoint.to_owned(), (0, bodies.into_iter().map(Into::into).collect()));

			self
		}

		/// Returns every request observed so far, in dispatch order.
		pub async fn requests(&self) -> Vec<ChallengeRequest> {
			self.requests.lock().await.clone()
		}
	}
	impl ChallengeHttpClient for ScriptedHttpClient {
		fn get(&self, request: ChallengeRequest) -> HttpFuture<'_> {
			Box::pin(async move {
				let endpoint = request.url.path().trim_start_matches('/').to_owned();

				self.requests.lock().await.push(request);

				let mut routes = self.routes.lock().await;
				let Some((cursor, bodies)) = routes.get_mut(&endpoint) else {
					return Err(TransportError::Io(std::io::Error::new(
						std::io::ErrorKind::NotFound,
						format!("No scripted response for `{endpoint}`."),
					)));
				};
				let body =
					bodies.get(*cursor).or_else(|| bodies.last()).cloned().unwrap_or_default();

				*cursor += 1;

				Ok(body)
			})
		}
	}

	/// Descriptor pointing at a local placeholder host, suitable for scripted transports.
	pub fn test_descriptor() -> ChallengeDescriptor {
		ChallengeDescriptor::builder()
			.base_url(Url::parse("http://challenge.test/").expect("Test base URL should parse."))
			.build()
			.expect("Test descriptor should build successfully.")
	}

	/// Builds a resolver over a scripted transport and returns both so tests can inspect
	/// recorded requests.
	pub fn build_scripted_resolver(
		client: ScriptedHttpClient,
	) -> (SecretResolver<ScriptedHttpClient>, Arc<ScriptedHttpClient>) {
		let client = Arc::new(client);
		let resolver = <SecretResolver<ScriptedHttpClient>>::with_http_client(
			test_descriptor(),
			client.clone(),
		);

		(resolver, client)
	}
}

mod _prelude {
	pub use std::{
		collections::HashMap,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
	};

	pub use async_lock::Mutex as AsyncMutex;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::{Deserialize, Serialize};
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result, TransportError};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(feature = "cli")] use {color_eyre as _, tokio as _, tracing_subscriber as _};
#[cfg(test)] use {color_eyre as _, httpmock as _, parking_lot as _, tokio as _};
