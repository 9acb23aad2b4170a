//! Per-job rotation: loads agent pools at job start and rewrites the identification
//! header on every eligible request.

// self
use crate::{
	_prelude::*,
	api::{AgentQuery, AgentServiceClient, ServiceConfig},
	host::{CrawlRequest, JobConfig},
	http::AgentHttpClient,
	obs::{self, FetchOutcome, FetchSpan},
	select::AgentSelector,
};
#[cfg(feature = "reqwest")]
use crate::{host::SettingsSource, http::ReqwestHttpClient, select::UniformSelector};

#[cfg(feature = "reqwest")]
/// Middleware specialized for the crate's default reqwest transport.
pub type ReqwestRotationMiddleware = RotationMiddleware<ReqwestHttpClient>;

/// Rotates the `User-Agent` header of outgoing requests from per-job agent pools.
///
/// Each job's pool moves through three states, realized as presence in the
/// name-keyed pool map: absent before [`job_started`](Self::job_started) (unloaded),
/// present after a successful load, absent again after
/// [`job_ended`](Self::job_ended) (closed). A pool is filled exactly once per job
/// and never refreshed. Request processing is infallible: an absent pool, a
/// disabled job, or a session-pinned request all leave the request untouched.
///
/// The host guarantees that job start, job end, and request processing for one job
/// never run concurrently with each other, so the map lock is only ever briefly
/// contended across jobs.
pub struct RotationMiddleware<C>
where
	C: ?Sized + AgentHttpClient,
{
	/// Fetch client used to load pools at job start.
	pub client: AgentServiceClient<C>,
	/// Strategy deciding which pool entry each request receives.
	pub selector: Arc<dyn AgentSelector>,
	pools: Arc<RwLock<HashMap<String, Arc<[String]>>>>,
}
impl<C> RotationMiddleware<C>
where
	C: ?Sized + AgentHttpClient,
{
	/// Creates a middleware that reuses the caller-provided transport and selector.
	pub fn with_client(
		config: ServiceConfig,
		http_client: impl Into<Arc<C>>,
		selector: Arc<dyn AgentSelector>,
	) -> Self {
		Self {
			client: AgentServiceClient::with_http_client(config, http_client),
			selector,
			pools: Default::default(),
		}
	}

	/// Replaces the selection strategy.
	pub fn with_selector(mut self, selector: Arc<dyn AgentSelector>) -> Self {
		self.selector = selector;

		self
	}

	/// Loads the agent pool for `job` when rotation is enabled for it.
	///
	/// Disabled jobs load nothing and succeed. Fetch failures propagate to the
	/// caller unretried; the host decides how a failed job start is treated, and no
	/// pool entry is created for the job.
	pub async fn job_started(&self, job: &JobConfig) -> Result<()> {
		if !job.rotation_enabled {
			return Ok(());
		}

		self.load_agents(job).await
	}

	/// Rewrites the request's identification header with a random pool entry.
	///
	/// A no-op when rotation is disabled for the job, when the request keeps its
	/// session, or when no pool has been loaded yet; the last case is expected
	/// while a job is still starting up and is not an error.
	pub fn process_request(&self, job: &JobConfig, request: &mut CrawlRequest) {
		if !Self::is_enabled(job, request) {
			return;
		}

		let Some(pool) = self.pool(&job.name) else {
			return;
		};
		let Some(index) = self.selector.pick(pool.len()) else {
			return;
		};
		let agent = &pool[index];

		request.set_user_agent(agent);
		obs::record_rotation(request.url(), agent);
	}

	/// Drops the pool associated with `name`; a no-op when absent.
	pub fn job_ended(&self, name: &str) {
		self.pools.write().remove(name);
	}

	/// Returns the loaded pool for `name`, if any.
	pub fn pool(&self, name: &str) -> Option<Arc<[String]>> {
		self.pools.read().get(name).cloned()
	}

	fn is_enabled(job: &JobConfig, request: &CrawlRequest) -> bool {
		job.rotation_enabled && !request.keeps_session()
	}

	async fn load_agents(&self, job: &JobConfig) -> Result<()> {
		let span = FetchSpan::new(&job.name);

		obs::record_fetch_outcome(FetchOutcome::Attempt);

		let query = AgentQuery::new().with_filters(job.filters.clone());

		match span.instrument(self.client.get_agent_strings(&query)).await {
			Ok(agents) => {
				obs::record_fetch_outcome(FetchOutcome::Success);
				self.pools.write().insert(job.name.clone(), agents.into());

				Ok(())
			},
			Err(error) => {
				obs::record_fetch_outcome(FetchOutcome::Failure);

				Err(error)
			},
		}
	}
}
#[cfg(feature = "reqwest")]
impl RotationMiddleware<ReqwestHttpClient> {
	/// Creates a middleware with the default reqwest transport and uniform selection.
	pub fn new(config: ServiceConfig) -> Self {
		Self::with_client(config, ReqwestHttpClient::default(), Arc::new(UniformSelector))
	}

	/// Reads the service coordinates from host settings, defaulting absent keys to
	/// empty strings, and builds the default middleware from them.
	pub fn from_settings(settings: &dyn SettingsSource) -> Self {
		Self::new(ServiceConfig::from_settings(settings))
	}
}
impl<C> Clone for RotationMiddleware<C>
where
	C: ?Sized + AgentHttpClient,
{
	fn clone(&self) -> Self {
		Self {
			client: self.client.clone(),
			selector: Arc::clone(&self.selector),
			pools: Arc::clone(&self.pools),
		}
	}
}
impl<C> Debug for RotationMiddleware<C>
where
	C: ?Sized + AgentHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("RotationMiddleware")
			.field("client", &self.client)
			.field("jobs_loaded", &self.pools.read().len())
			.finish()
	}
}

#[cfg(test)]
mod tests {
	// std
	use std::sync::atomic::{AtomicUsize, Ordering};
	// self
	use super::*;
	use crate::{
		error::FetchApiError,
		http::{FetchResponse, HttpFuture},
	};

	struct ScriptedHttpClient {
		status: u16,
		body: String,
		calls: AtomicUsize,
	}
	impl ScriptedHttpClient {
		fn respond(status: u16, body: &str) -> Self {
			Self { status, body: body.to_owned(), calls: AtomicUsize::new(0) }
		}

		fn calls(&self) -> usize {
			self.calls.load(Ordering::SeqCst)
		}
	}
	impl AgentHttpClient for ScriptedHttpClient {
		fn get<'a>(&'a self, _url: &'a Url, _timeout: Duration) -> HttpFuture<'a> {
			self.calls.fetch_add(1, Ordering::SeqCst);

			let status = self.status;
			let body = self.body.clone().into_bytes();

			Box::pin(async move { Ok(FetchResponse { status, body }) })
		}
	}

	struct FirstSelector;
	impl AgentSelector for FirstSelector {
		fn pick(&self, pool_len: usize) -> Option<usize> {
			(pool_len > 0).then_some(0)
		}
	}

	fn middleware(
		transport: Arc<ScriptedHttpClient>,
	) -> RotationMiddleware<ScriptedHttpClient> {
		RotationMiddleware::with_client(
			ServiceConfig::new("http://svc.example.com/", "key"),
			transport,
			Arc::new(FirstSelector),
		)
	}

	fn request() -> CrawlRequest {
		CrawlRequest::new(Url::parse("http://crawl.example.com/item/1").expect("Fixture URL."))
	}

	const TWO_AGENTS: &str = r#"{"data":[{"string":"UA1"},{"string":"UA2"}]}"#;

	#[tokio::test]
	async fn enabled_job_loads_pool_and_rotates() {
		let transport = Arc::new(ScriptedHttpClient::respond(200, TWO_AGENTS));
		let rotation = middleware(Arc::clone(&transport));
		let job = JobConfig::new("books").enable_rotation();

		rotation.job_started(&job).await.expect("Job start should load the pool.");

		let pool = rotation.pool("books").expect("The pool should exist after job start.");

		assert_eq!(pool.as_ref(), ["UA1".to_owned(), "UA2".to_owned()]);
		assert_eq!(transport.calls(), 1);

		let mut req = request();

		rotation.process_request(&job, &mut req);

		assert_eq!(req.user_agent(), Some("UA1"), "FirstSelector should pick the head entry.");
	}

	#[tokio::test]
	async fn disabled_job_never_fetches() {
		let transport = Arc::new(ScriptedHttpClient::respond(200, TWO_AGENTS));
		let rotation = middleware(Arc::clone(&transport));
		let job = JobConfig::new("quiet");

		rotation.job_started(&job).await.expect("A disabled job start should succeed.");

		assert_eq!(transport.calls(), 0, "No fetch may happen for a disabled job.");
		assert!(rotation.pool("quiet").is_none());

		let mut req = request();

		rotation.process_request(&job, &mut req);

		assert_eq!(req.user_agent(), None);
	}

	#[tokio::test]
	async fn session_pinned_requests_pass_through() {
		let transport = Arc::new(ScriptedHttpClient::respond(200, TWO_AGENTS));
		let rotation = middleware(transport);
		let job = JobConfig::new("books").enable_rotation();

		rotation.job_started(&job).await.expect("Job start should load the pool.");

		let mut req = request().keep_session();

		req.set_user_agent("Pinned/1.0");
		rotation.process_request(&job, &mut req);

		assert_eq!(req.user_agent(), Some("Pinned/1.0"));
	}

	#[tokio::test]
	async fn job_end_drops_the_pool_idempotently() {
		let transport = Arc::new(ScriptedHttpClient::respond(200, TWO_AGENTS));
		let rotation = middleware(transport);
		let job = JobConfig::new("books").enable_rotation();

		rotation.job_started(&job).await.expect("Job start should load the pool.");
		rotation.job_ended("books");

		assert!(rotation.pool("books").is_none());

		// A second end, or ending a job that never loaded, must stay silent.
		rotation.job_ended("books");
		rotation.job_ended("never-started");

		let mut req = request();

		rotation.process_request(&job, &mut req);

		assert_eq!(req.user_agent(), None, "A closed job must no longer rotate.");
	}

	#[tokio::test]
	async fn fetch_failure_propagates_and_creates_no_pool() {
		let transport = Arc::new(ScriptedHttpClient::respond(503, "unavailable"));
		let rotation = middleware(transport);
		let job = JobConfig::new("books").enable_rotation();
		let error = rotation
			.job_started(&job)
			.await
			.expect_err("A 503 from the service should fail the job start.");

		assert!(matches!(error, Error::Api(FetchApiError { status: 503 })));
		assert!(rotation.pool("books").is_none());
	}

	#[tokio::test]
	async fn enabled_job_without_pool_passes_through() {
		let transport = Arc::new(ScriptedHttpClient::respond(200, TWO_AGENTS));
		let rotation = middleware(transport);
		let job = JobConfig::new("early").enable_rotation();
		let mut req = request();

		// No job_started yet; the pool is still unloaded.
		rotation.process_request(&job, &mut req);

		assert_eq!(req.user_agent(), None);
	}
}
