//! Demonstrates plugging a custom HTTP client into the middleware.
//!
//! 1. Implement [`AgentHttpClient`] for the transport; status validation stays in the
//!    fetch client, so the transport returns every response it receives.
//! 2. Map transport failures into [`TransportError`] so they keep their source chain.
//! 3. Pass the transport (plus a selector) to [`RotationMiddleware::with_client`].

// std
use std::{
	error::Error as StdError,
	fmt::{Display, Formatter, Result as FmtResult},
	sync::Arc,
	time::Duration,
};
// crates.io
use color_eyre::Result;
use url::Url;
// self
use user_agent_rotation::{
	api::ServiceConfig,
	error::TransportError,
	host::{CrawlRequest, JobConfig},
	http::{AgentHttpClient, FetchResponse, HttpFuture},
	middleware::RotationMiddleware,
	select::UniformSelector,
};

#[tokio::main]
async fn main() -> Result<()> {
	color_eyre::install()?;

	let transport = Arc::new(CannedHttpClient::success(
		"{\"data\":[{\"string\":\"CannedAgent/1.0\"},{\"string\":\"CannedAgent/2.0\"}]}",
	));
	let rotation: RotationMiddleware<CannedHttpClient> = RotationMiddleware::with_client(
		ServiceConfig::new("http://agents.internal.example.com/", "demo-key"),
		Arc::clone(&transport),
		Arc::new(UniformSelector),
	);
	let job = JobConfig::new("canned-job").enable_rotation();

	rotation.job_started(&job).await?;

	let mut request = CrawlRequest::new(Url::parse("http://crawl.example.com/item/1")?);

	rotation.process_request(&job, &mut request);
	println!("Canned transport rotated to: {}.", request.user_agent().unwrap_or("<none>"));

	let failing: RotationMiddleware<CannedHttpClient> = RotationMiddleware::with_client(
		ServiceConfig::new("http://agents.internal.example.com/", "demo-key"),
		Arc::new(CannedHttpClient::unreachable("agents.internal.example.com")),
		Arc::new(UniformSelector),
	);

	match failing.job_started(&job).await {
		Ok(()) => println!("The failing transport unexpectedly produced a pool."),
		Err(e) => println!("Transport failure surfaced at job start: {e}."),
	}

	Ok(())
}

#[derive(Clone, Debug)]
struct CannedDnsError {
	host: String,
}
impl Display for CannedDnsError {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		write!(f, "DNS lookup failed for {}", self.host)
	}
}
impl StdError for CannedDnsError {}

enum CannedBehavior {
	Success(String),
	Unreachable(String),
}

struct CannedHttpClient {
	behavior: CannedBehavior,
}
impl CannedHttpClient {
	fn success(body: &str) -> Self {
		Self { behavior: CannedBehavior::Success(body.to_owned()) }
	}

	fn unreachable(host: &str) -> Self {
		Self { behavior: CannedBehavior::Unreachable(host.to_owned()) }
	}
}
impl AgentHttpClient for CannedHttpClient {
	fn get<'a>(&'a self, _url: &'a Url, _timeout: Duration) -> HttpFuture<'a> {
		Box::pin(async move {
			match &self.behavior {
				CannedBehavior::Success(body) =>
					Ok(FetchResponse { status: 200, body: body.clone().into_bytes() }),
				CannedBehavior::Unreachable(host) =>
					Err(TransportError::network(CannedDnsError { host: host.clone() })),
			}
		})
	}
}
