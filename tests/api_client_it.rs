// crates.io
use httpmock::prelude::*;
// self
use user_agent_rotation::{
	api::{AgentQuery, AgentServiceClient, ServiceConfig},
	error::{DecodeError, Error, FetchApiError},
	http::ReqwestHttpClient,
};

fn client(server: &MockServer, api_key: &str) -> AgentServiceClient<ReqwestHttpClient> {
	AgentServiceClient::with_http_client(
		ServiceConfig::new(server.base_url(), api_key),
		ReqwestHttpClient::default(),
	)
}

#[tokio::test]
async fn get_agents_returns_the_data_list() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/user_agents").query_param("api_key", "key-1");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"data":[{"string":"UA1","os":"linux"},{"string":"UA2"}]}"#);
		})
		.await;
	let agents = client(&server, "key-1")
		.get_agents(&AgentQuery::new())
		.await
		.expect("A 200 with a well-formed envelope should yield the records.");

	assert_eq!(agents.len(), 2);
	assert_eq!(agents[0].string(), Some("UA1"));
	assert!(agents[0].field("os").is_some(), "Extra record metadata must be carried as-is.");
	assert_eq!(agents[1].string(), Some("UA2"));

	mock.assert_async().await;
}

#[tokio::test]
async fn filters_are_forwarded_as_query_parameters() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/user_agents")
				.query_param("api_key", "key-1")
				.query_param("browser", "firefox")
				.query_param("os", "linux");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"data":[{"string":"UA1"}]}"#);
		})
		.await;
	let query = AgentQuery::new().with_filter("browser", "firefox").with_filter("os", "linux");
	let strings = client(&server, "key-1")
		.get_agent_strings(&query)
		.await
		.expect("A filtered fetch should succeed when the service matches.");

	assert_eq!(strings, ["UA1"]);

	mock.assert_async().await;
}

#[tokio::test]
async fn get_agent_strings_preserves_service_order() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/user_agents");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"data":[{"string":"UA3"},{"string":"UA1"},{"string":"UA2"}]}"#);
		})
		.await;
	let strings = client(&server, "key-1")
		.get_agent_strings(&AgentQuery::new())
		.await
		.expect("Projection should succeed when every record carries a string.");

	assert_eq!(strings, ["UA3", "UA1", "UA2"]);
}

#[tokio::test]
async fn non_200_statuses_raise_fetch_api_errors() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/user_agents");
			then.status(503).body("upstream unavailable");
		})
		.await;
	let error = client(&server, "key-1")
		.get_agents(&AgentQuery::new())
		.await
		.expect_err("A 503 must not be treated as success.");

	assert!(matches!(error, Error::Api(FetchApiError { status: 503 })));
}

#[tokio::test]
async fn unmatched_routes_surface_their_status() {
	let server = MockServer::start_async().await;
	// No mock mounted: httpmock answers 404 for the unmatched path.
	let error = client(&server, "key-1")
		.get_agents(&AgentQuery::new())
		.await
		.expect_err("A 404 must not be treated as success.");

	assert!(matches!(error, Error::Api(FetchApiError { status: 404 })));
}

#[tokio::test]
async fn malformed_bodies_are_decode_errors() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/user_agents");
			then.status(200).body("not json at all");
		})
		.await;
	let error = client(&server, "key-1")
		.get_agents(&AgentQuery::new())
		.await
		.expect_err("A non-JSON body must fail decoding.");

	assert!(matches!(error, Error::Decode(DecodeError::Envelope { .. })));
}

#[tokio::test]
async fn envelopes_without_a_data_key_are_decode_errors() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/user_agents");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"items":[{"string":"UA1"}]}"#);
		})
		.await;
	let error = client(&server, "key-1")
		.get_agents(&AgentQuery::new())
		.await
		.expect_err("An envelope without `data` must fail decoding.");

	assert!(matches!(error, Error::Decode(DecodeError::Envelope { .. })));
}

#[tokio::test]
async fn records_without_a_string_fail_the_projection() {
	let server = MockServer::start_async().await;
	let _mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/user_agents");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"data":[{"string":"UA1"},{"os":"linux"}]}"#);
		})
		.await;
	let svc = client(&server, "key-1");
	let error = svc
		.get_agent_strings(&AgentQuery::new())
		.await
		.expect_err("A record without `string` must fail the projection.");

	assert!(matches!(error, Error::Decode(DecodeError::MissingAgentString { index: 1 })));

	// The unprojected fetch still succeeds; records are opaque.
	let agents = svc
		.get_agents(&AgentQuery::new())
		.await
		.expect("Raw records should remain fetchable regardless of their fields.");

	assert_eq!(agents.len(), 2);
	assert_eq!(agents[1].string(), None);
}

#[tokio::test]
async fn a_spoofed_api_key_filter_never_reaches_the_wire() {
	let server = MockServer::start_async().await;
	let mock = server
		.mock_async(|when, then| {
			when.method(GET).path("/user_agents").query_param("api_key", "real-key");
			then.status(200)
				.header("content-type", "application/json")
				.body(r#"{"data":[{"string":"UA1"}]}"#);
		})
		.await;
	let query = AgentQuery::new().with_filter("api_key", "spoofed");
	let strings = client(&server, "real-key")
		.get_agent_strings(&query)
		.await
		.expect("The configured key should win over the colliding filter.");

	assert_eq!(strings, ["UA1"]);

	mock.assert_async().await;
}
