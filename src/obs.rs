//! Optional observability helpers for challenge API fetches.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit structured spans named `curbside.fetch` with the `fetch` (kind) and
//!   `endpoint` fields.
//! - Enable `metrics` to increment the `curbside_fetch_total` counter for every
//!   attempt/success/failure, labeled by `fetch` + `outcome`.

mod metrics;
mod tracing;

pub use self::metrics::*;
pub use self::tracing::*;

// self
use crate::_prelude::*;

/// Kinds of requests the client sends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchKind {
	/// Session bootstrap (`get-session`).
	Session,
	/// Authenticated puzzle endpoint.
	Puzzle,
}
impl FetchKind {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FetchKind::Session => "session",
			FetchKind::Puzzle => "puzzle",
		}
	}
}
impl Display for FetchKind {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Outcome labels recorded for each fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchOutcome {
	/// Fetch started.
	Attempt,
	/// Fetch completed and its body was accepted.
	Success,
	/// Failure propagated back to the caller.
	Failure,
}
impl FetchOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FetchOutcome::Attempt => "attempt",
			FetchOutcome::Success => "success",
			FetchOutcome::Failure => "failure",
		}
	}
}
impl Display for FetchOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Runs `fetch` inside a [`FetchSpan`] and records its attempt plus the final outcome.
pub async fn observe<T, Fut>(kind: FetchKind, endpoint: &str, fetch: Fut) -> Result<T>
where
	Fut: Future<Output = Result<T>>,
{
	record_fetch_outcome(kind, FetchOutcome::Attempt);

	let result = FetchSpan::new(kind, endpoint).instrument(fetch).await;
	let outcome = if result.is_ok() { FetchOutcome::Success } else { FetchOutcome::Failure };

	record_fetch_outcome(kind, outcome);

	result
}
