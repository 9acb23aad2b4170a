//! The narrow seam this crate shares with the host crawl framework.
//!
//! The host's settings store, job attributes, and request objects stay external
//! collaborators; the types here model only the slices the middlewares consume.
//! Hosts adapt their own structures to [`SettingsSource`], build one [`JobConfig`]
//! per job when it starts, and hand each outgoing request over as a
//! [`CrawlRequest`] view.

// self
use crate::_prelude::*;

/// Settings key holding the agent service base URL.
pub const API_URL_SETTING: &str = "USER_AGENT_SERVICE_API_URL";
/// Settings key holding the agent service API key.
pub const API_KEY_SETTING: &str = "USER_AGENT_SERVICE_API_KEY";
/// Name of the identification header the middlewares rewrite.
pub const USER_AGENT_HEADER: &str = "User-Agent";

/// Read-only view over the host framework's settings.
pub trait SettingsSource {
	/// Returns the raw value for `key`, when present.
	fn get(&self, key: &str) -> Option<String>;

	/// Returns the value for `key`, defaulting to an empty string.
	fn get_or_default(&self, key: &str) -> String {
		self.get(key).unwrap_or_default()
	}
}

/// In-memory [`SettingsSource`] for demos and tests.
#[derive(Clone, Debug, Default)]
pub struct MemorySettings(BTreeMap<String, String>);
impl MemorySettings {
	/// Adds or replaces a setting.
	pub fn set(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.0.insert(key.into(), value.into());

		self
	}
}
impl SettingsSource for MemorySettings {
	fn get(&self, key: &str) -> Option<String> {
		self.0.get(key).cloned()
	}
}

/// Per-job rotation configuration, resolved once at job start.
///
/// Replaces dynamic attribute lookups on the host's job object; defaults match the
/// host-side conventions (rotation off, no filters).
#[derive(Clone, Debug)]
pub struct JobConfig {
	/// Unique job name, used as the pool-map key.
	pub name: String,
	/// Whether rotation is active for this job. Defaults to `false`.
	pub rotation_enabled: bool,
	/// Filters forwarded verbatim to the agent service. Defaults to empty.
	pub filters: BTreeMap<String, String>,
}
impl JobConfig {
	/// Creates a config with rotation disabled and no filters.
	pub fn new(name: impl Into<String>) -> Self {
		Self { name: name.into(), rotation_enabled: false, filters: BTreeMap::new() }
	}

	/// Turns rotation on for this job.
	pub fn enable_rotation(mut self) -> Self {
		self.rotation_enabled = true;

		self
	}

	/// Overrides the rotation flag.
	pub fn with_rotation(mut self, enabled: bool) -> Self {
		self.rotation_enabled = enabled;

		self
	}

	/// Adds or replaces a service-side filter.
	pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.filters.insert(key.into(), value.into());

		self
	}
}

/// Mutable view over one outgoing request.
#[derive(Clone, Debug)]
pub struct CrawlRequest {
	url: Url,
	headers: BTreeMap<String, String>,
	keep_session: bool,
}
impl CrawlRequest {
	/// Creates a request for `url` with no headers and session keeping off.
	pub fn new(url: Url) -> Self {
		Self { url, headers: BTreeMap::new(), keep_session: false }
	}

	/// Marks the request as session-pinned: its current agent must survive.
	pub fn keep_session(mut self) -> Self {
		self.keep_session = true;

		self
	}

	/// Overrides the session-pinning flag.
	pub fn with_keep_session(mut self, keep: bool) -> Self {
		self.keep_session = keep;

		self
	}

	/// Whether the request asked to keep its session.
	pub fn keeps_session(&self) -> bool {
		self.keep_session
	}

	/// Target of the request.
	pub fn url(&self) -> &Url {
		&self.url
	}

	/// Returns a header value.
	pub fn header(&self, name: &str) -> Option<&str> {
		self.headers.get(name).map(String::as_str)
	}

	/// Sets a header, replacing any existing value.
	pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.headers.insert(name.into(), value.into());
	}

	/// Sets a header only when it is not present yet.
	pub fn set_header_default(&mut self, name: impl Into<String>, value: impl Into<String>) {
		self.headers.entry(name.into()).or_insert_with(|| value.into());
	}

	/// Current identification header, if any.
	pub fn user_agent(&self) -> Option<&str> {
		self.header(USER_AGENT_HEADER)
	}

	/// Overwrites the identification header in place.
	pub fn set_user_agent(&mut self, agent: impl Into<String>) {
		self.set_header(USER_AGENT_HEADER, agent);
	}
}

/// Per-request hook shared by the host's downloader middlewares.
pub trait RequestMiddleware {
	/// Inspects and possibly mutates an outgoing request.
	fn process_request(&self, request: &mut CrawlRequest);
}

/// Models the host framework's stock user-agent assignment.
///
/// The stock behavior assigns the configured default agent to any request that does
/// not already carry one; it never overwrites. Wrap it in a
/// [`SessionGate`](crate::middleware::SessionGate) to keep session-pinned requests
/// off even this default path.
#[derive(Clone, Debug, Default)]
pub struct DefaultAgentMiddleware {
	default_agent: Option<String>,
}
impl DefaultAgentMiddleware {
	/// Creates the middleware with a default agent to assign.
	pub fn new(agent: impl Into<String>) -> Self {
		Self { default_agent: Some(agent.into()) }
	}
}
impl RequestMiddleware for DefaultAgentMiddleware {
	fn process_request(&self, request: &mut CrawlRequest) {
		if let Some(agent) = &self.default_agent {
			request.set_header_default(USER_AGENT_HEADER, agent);
		}
	}
}
