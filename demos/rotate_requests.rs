//! Demonstrates the full per-job lifecycle with the default reqwest transport: load a
//! pool from a mock user-agent service, rotate a handful of requests, pin one request
//! to its session, and close the job.

// crates.io
use color_eyre::Result;
use httpmock::prelude::*;
use url::Url;
// self
use user_agent_rotation::{
	host::{
		API_KEY_SETTING, API_URL_SETTING, CrawlRequest, DefaultAgentMiddleware, JobConfig,
		MemorySettings, RequestMiddleware,
	},
	middleware::{DefaultSessionGate, RotationMiddleware},
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let server = MockServer::start_async().await;
	let agents_mock = server
		.mock_async(|when, then| {
			when.method(GET)
				.path("/user_agents")
				.query_param("api_key", "demo-key")
				.query_param("browser", "firefox");
			then.status(200).header("content-type", "application/json").body(
				"{\"data\":[{\"string\":\"Mozilla/5.0 (X11; Linux x86_64) Gecko\"},\
				{\"string\":\"Mozilla/5.0 (Windows NT 10.0; Win64) Gecko\"}]}",
			);
		})
		.await;
	let settings = MemorySettings::default()
		.set(API_URL_SETTING, server.base_url())
		.set(API_KEY_SETTING, "demo-key");
	let rotation = RotationMiddleware::from_settings(&settings);
	let gate = DefaultSessionGate::new(DefaultAgentMiddleware::new("HostBot/1.0"));
	let job = JobConfig::new("demo-job").enable_rotation().with_filter("browser", "firefox");

	rotation.job_started(&job).await?;

	for index in 0..4 {
		let mut request = CrawlRequest::new(Url::parse(&format!(
			"http://books.example.com/page/{index}"
		))?);

		gate.process_request(&mut request);
		rotation.process_request(&job, &mut request);
		println!(
			"Request {} rotated to: {}.",
			request.url(),
			request.user_agent().unwrap_or("<none>")
		);
	}

	let mut pinned =
		CrawlRequest::new(Url::parse("http://books.example.com/basket")?).keep_session();

	pinned.set_user_agent("HostBot/1.0");
	gate.process_request(&mut pinned);
	rotation.process_request(&job, &mut pinned);
	println!(
		"Session-pinned request kept: {}.",
		pinned.user_agent().unwrap_or("<none>")
	);

	rotation.job_ended(&job.name);
	println!("Pool present after job end: {}.", rotation.pool(&job.name).is_some());

	agents_mock.assert_async().await;

	Ok(())
}
