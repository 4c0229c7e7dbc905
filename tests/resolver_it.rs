// crates.io
use httpmock::prelude::*;
// self
use curbside_challenge::{
	descriptor::ChallengeDescriptor,
	error::{Error, PuzzleShapeError, ResponseError},
	resolver::ReqwestResolver,
	url::Url,
};

const SESSION: &str = "0123456789abcdef";

fn build_resolver(server: &MockServer) -> ReqwestResolver {
	let descriptor = ChallengeDescriptor::builder()
		.base_url(Url::parse(&server.url("/")).expect("Mock base URL should parse successfully."))
		.build()
		.expect("Challenge descriptor should build successfully.");

	ReqwestResolver::new(descriptor).expect("Reqwest resolver should build successfully.")
}

#[tokio::test]
async fn resolves_branches_with_session_header() {
	let server = MockServer::start_async().await;
	let session = server
		.mock_async(|when, then| {
			when.method(GET).path("/get-session");
			then.status(200).body(SESSION);
		})
		.await;
	let start = server
		.mock_async(|when, then| {
			when.method(GET).path("/start").header("session", SESSION);
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"Next": ["e2", "e3"], "Message": "Keep going."}"#);
		})
		.await;
	let e2 = server
		.mock_async(|when, then| {
			when.method(GET).path("/e2").header("session", SESSION);
			then.status(200).body(r#"{"depth": 1, "SECRET": "A"}"#);
		})
		.await;
	let e3 = server
		.mock_async(|when, then| {
			when.method(GET).path("/e3").header("session", SESSION);
			then.status(200).body(r#"{"next": "e4"}"#);
		})
		.await;
	let e4 = server
		.mock_async(|when, then| {
			when.method(GET).path("/e4").header("session", SESSION);
			then.status(200).body(r#"{"secret": "B"}"#);
		})
		.await;
	let resolver = build_resolver(&server);
	let secret = resolver.resolve_start().await.expect("Mock challenge should resolve.");

	assert_eq!(secret, "AB");

	session.assert_calls_async(1).await;
	start.assert_async().await;
	e2.assert_async().await;
	e3.assert_async().await;
	e4.assert_async().await;
}

#[tokio::test]
async fn refreshes_session_after_ten_requests() {
	let server = MockServer::start_async().await;
	let branches = (1..=10).map(|i| format!("\"leaf{i}\"")).collect::<Vec<_>>().join(",");
	let session = server
		.mock_async(|when, then| {
			when.method(GET).path("/get-session");
			then.status(200).body(SESSION);
		})
		.await;
	let start = server
		.mock_async(|when, then| {
			when.method(GET).path("/start").header("session", SESSION);
			then.status(200).body(format!("{{\"next\": [{branches}]}}"));
		})
		.await;
	let mut leaves = Vec::new();

	for i in 1..=10 {
		let leaf = server
			.mock_async(|when, then| {
				when.method(GET).path(format!("/leaf{i}")).header("session", SESSION);
				then.status(200).body(format!("{{\"secret\": \"{}\"}}", i % 10));
			})
			.await;

		leaves.push(leaf);
	}

	let resolver = build_resolver(&server);
	let secret = resolver.resolve_start().await.expect("Eleven requests should resolve.");

	assert_eq!(secret, "1234567890");

	start.assert_async().await;
	session.assert_calls_async(2).await;

	for leaf in &leaves {
		leaf.assert_async().await;
	}
}

#[tokio::test]
async fn missing_keys_are_a_malformed_puzzle() {
	let server = MockServer::start_async().await;
	let _session = server
		.mock_async(|when, then| {
			when.method(GET).path("/get-session");
			then.status(200).body(SESSION);
		})
		.await;
	let _start = server
		.mock_async(|when, then| {
			when.method(GET).path("/start");
			then.status(200).body(r#"{"error": "Invalid session"}"#);
		})
		.await;
	let resolver = build_resolver(&server);
	let err = resolver.resolve_start().await.expect_err("Missing keys should be fatal.");

	assert!(matches!(
		err,
		Error::MalformedPuzzleResponse(PuzzleShapeError::MissingKeys { ref endpoint })
			if endpoint == "start"
	));
}

#[tokio::test]
async fn non_json_bodies_are_malformed_responses() {
	let server = MockServer::start_async().await;
	let _session = server
		.mock_async(|when, then| {
			when.method(GET).path("/get-session");
			then.status(200).body(SESSION);
		})
		.await;
	let _start = server
		.mock_async(|when, then| {
			when.method(GET).path("/start");
			then.status(502).body("<html>Bad Gateway</html>");
		})
		.await;
	let resolver = build_resolver(&server);
	let err = resolver.resolve_start().await.expect_err("HTML bodies should be fatal.");

	assert!(matches!(err, Error::MalformedResponse(ResponseError::InvalidJson { .. })));
}

#[tokio::test]
async fn unreachable_host_fails_session_bootstrap() {
	let descriptor = ChallengeDescriptor::builder()
		.base_url(Url::parse("http://127.0.0.1:9/").expect("Closed-port URL should parse."))
		.build()
		.expect("Challenge descriptor should build successfully.");
	let resolver = ReqwestResolver::new(descriptor).expect("Reqwest resolver should build.");
	let err = resolver.resolve_start().await.expect_err("Closed port should fail.");

	assert!(matches!(err, Error::SessionBootstrap { .. }));
	assert_eq!(resolver.sessions.productions().await, 0);
}
