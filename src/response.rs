//! Puzzle response parsing: case-insensitive keys and `next` normalization.
//!
//! The challenge API does not guarantee key casing, so every top-level key is lowercased
//! before lookup. When two keys collide after lowercasing the one that appears later in the
//! document wins.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	error::{PuzzleShapeError, ResponseError},
};

/// Key carrying a terminal secret fragment.
pub const SECRET_KEY: &str = "secret";
/// Key carrying one or more follow-up endpoint names.
pub const NEXT_KEY: &str = "next";

/// Lowercases every top-level key, keeping the last value for keys that collide.
pub fn normalize_keys(map: Map<String, Value>) -> Map<String, Value> {
	let mut normalized = Map::with_capacity(map.len());

	for (key, value) in map {
		normalized.insert(key.to_lowercase(), value);
	}

	normalized
}

/// Wraps a bare value in a single-element list; arrays pass through unchanged.
pub fn listify(value: Value) -> Vec<Value> {
	match value {
		Value::Array(items) => items,
		other => vec![other],
	}
}

/// What a puzzle endpoint asks the client to do next.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PuzzleStep {
	/// Terminal fragment.
	Secret(String),
	/// Endpoints to resolve in order; their fragments are concatenated.
	Next(Vec<String>),
}

/// JSON object returned by a puzzle endpoint with lowercased keys.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PuzzleResponse(Map<String, Value>);
impl PuzzleResponse {
	/// Parses `body` returned by `endpoint` into a normalized response.
	pub fn parse(endpoint: &str, body: &str) -> Result<Self, ResponseError> {
		let mut de = serde_json::Deserializer::from_str(body);
		let value: Value = serde_path_to_error::deserialize(&mut de).map_err(|source| {
			ResponseError::InvalidJson { endpoint: endpoint.to_owned(), source }
		})?;

		de.end().map_err(|source| ResponseError::TrailingData {
			endpoint: endpoint.to_owned(),
			source,
		})?;

		match value {
			Value::Object(map) => Ok(Self::from(map)),
			other => Err(ResponseError::NotAnObject {
				endpoint: endpoint.to_owned(),
				kind: json_kind(&other),
			}),
		}
	}

	/// Classifies the response, checking `secret` before `next`.
	pub fn into_step(mut self, endpoint: &str) -> Result<PuzzleStep, PuzzleShapeError> {
		if let Some(secret) = self.0.remove(SECRET_KEY) {
			return match secret {
				Value::String(secret) => Ok(PuzzleStep::Secret(secret)),
				_ => Err(PuzzleShapeError::NonStringSecret { endpoint: endpoint.to_owned() }),
			};
		}

		let next = self
			.0
			.remove(NEXT_KEY)
			.ok_or_else(|| PuzzleShapeError::MissingKeys { endpoint: endpoint.to_owned() })?;

		listify(next)
			.into_iter()
			.enumerate()
			.map(|(index, value)| match value {
				Value::String(name) => Ok(name),
				_ => Err(PuzzleShapeError::NonStringEndpoint {
					endpoint: endpoint.to_owned(),
					index,
				}),
			})
			.collect::<Result<Vec<_>, _>>()
			.map(PuzzleStep::Next)
	}
}
impl From<Map<String, Value>> for PuzzleResponse {
	fn from(map: Map<String, Value>) -> Self {
		Self(normalize_keys(map))
	}
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}
