//! Client for the remote user-agent service.
//!
//! The service exposes one list endpoint: `GET <api_url>/user_agents` authenticated
//! by an `api_key` query parameter, with any further query parameters treated as
//! server-side filters. A successful response is a JSON envelope
//! `{"data": [{"string": "<agent>", ...}, ...]}`.

// crates.io
use serde_json::{Map, Value};
// self
use crate::{
	_prelude::*,
	error::{ConfigError, DecodeError, FetchApiError},
	host::{API_KEY_SETTING, API_URL_SETTING, SettingsSource},
	http::AgentHttpClient,
};

/// Path of the list-serving endpoint, joined onto the configured base URL.
pub const API_ENDPOINT: &str = "user_agents";
/// Query parameter carrying the API key.
///
/// The client always applies this parameter itself, last, so a caller filter reusing
/// the name can never smuggle a different key into the request.
pub const API_KEY_PARAM: &str = "api_key";
/// Record field holding the agent string.
pub const AGENT_STRING_FIELD: &str = "string";

/// Immutable service coordinates, read once at middleware construction.
///
/// An empty base URL is accepted here so hosts without the settings keys still
/// construct cleanly; the first fetch then fails with [`ConfigError::InvalidEndpoint`].
#[derive(Clone, Debug)]
pub struct ServiceConfig {
	/// Base URL of the agent service.
	pub api_url: String,
	/// API key appended to every fetch.
	pub api_key: String,
}
impl ServiceConfig {
	/// Creates a config from explicit coordinates.
	pub fn new(api_url: impl Into<String>, api_key: impl Into<String>) -> Self {
		Self { api_url: api_url.into(), api_key: api_key.into() }
	}

	/// Reads the `USER_AGENT_SERVICE_API_URL` and `USER_AGENT_SERVICE_API_KEY` settings,
	/// defaulting each to an empty string when absent.
	pub fn from_settings(settings: &dyn SettingsSource) -> Self {
		Self {
			api_url: settings.get_or_default(API_URL_SETTING),
			api_key: settings.get_or_default(API_KEY_SETTING),
		}
	}
}

/// Fetch parameters: server-side filters plus the request timeout.
#[derive(Clone, Debug)]
pub struct AgentQuery {
	/// Filters forwarded verbatim as query parameters.
	pub filters: BTreeMap<String, String>,
	/// Timeout applied to the single GET request.
	pub timeout: Duration,
}
impl AgentQuery {
	/// Timeout used when none is overridden.
	pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

	/// Creates an unfiltered query with the default timeout.
	pub fn new() -> Self {
		Self { filters: BTreeMap::new(), timeout: Self::DEFAULT_TIMEOUT }
	}

	/// Adds or replaces a single filter.
	pub fn with_filter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.filters.insert(key.into(), value.into());

		self
	}

	/// Adds or replaces every filter of `filters`.
	pub fn with_filters(mut self, filters: impl IntoIterator<Item = (String, String)>) -> Self {
		self.filters.extend(filters);

		self
	}

	/// Overrides the request timeout (defaults to 30 seconds).
	pub fn with_timeout(mut self, timeout: Duration) -> Self {
		self.timeout = timeout;

		self
	}
}
impl Default for AgentQuery {
	fn default() -> Self {
		Self::new()
	}
}

/// Raw agent record: an opaque JSON object carried as-is.
///
/// The service may attach arbitrary metadata next to the agent string; records are
/// not modeled beyond the one field the rotation path needs.
#[derive(Clone, Debug, Deserialize)]
#[serde(transparent)]
pub struct AgentRecord(Map<String, Value>);
impl AgentRecord {
	/// Returns the record's agent string, when present and textual.
	pub fn string(&self) -> Option<&str> {
		self.0.get(AGENT_STRING_FIELD).and_then(Value::as_str)
	}

	/// Returns an arbitrary metadata field.
	pub fn field(&self, name: &str) -> Option<&Value> {
		self.0.get(name)
	}
}
impl From<Map<String, Value>> for AgentRecord {
	fn from(object: Map<String, Value>) -> Self {
		Self(object)
	}
}

#[derive(Debug, Deserialize)]
struct AgentEnvelope {
	data: Vec<AgentRecord>,
}

/// Client for the agent service list endpoint.
pub struct AgentServiceClient<C>
where
	C: ?Sized + AgentHttpClient,
{
	/// Service coordinates used for every fetch.
	pub config: ServiceConfig,
	/// Transport executing the GET requests.
	pub http_client: Arc<C>,
}
impl<C> AgentServiceClient<C>
where
	C: ?Sized + AgentHttpClient,
{
	/// Creates a client that reuses the caller-provided transport.
	pub fn with_http_client(config: ServiceConfig, http_client: impl Into<Arc<C>>) -> Self {
		Self { config, http_client: http_client.into() }
	}

	/// Builds the fetch URL for `query`.
	///
	/// Caller filters are merged first and the configured key is applied last, so the
	/// emitted URL carries exactly one `api_key` pair holding the configured key, even
	/// when a filter reuses that name. Filter order does not affect the parsed result.
	pub fn endpoint_url(&self, query: &AgentQuery) -> Result<Url, ConfigError> {
		let base = Url::parse(&self.config.api_url)
			.map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let mut url =
			base.join(API_ENDPOINT).map_err(|source| ConfigError::InvalidEndpoint { source })?;
		let mut params = query.filters.clone();

		params.insert(API_KEY_PARAM.to_owned(), self.config.api_key.clone());
		url.query_pairs_mut().clear().extend_pairs(params);

		Ok(url)
	}

	/// Fetches the raw agent records under the envelope's `data` key.
	///
	/// Fails with [`FetchApiError`] when the status is anything but 200, and with a
	/// [`DecodeError`](crate::error::DecodeError) when the body is not the expected
	/// envelope. No retries, no partial results.
	pub async fn get_agents(&self, query: &AgentQuery) -> Result<Vec<AgentRecord>> {
		let url = self.endpoint_url(query)?;
		let response = self.http_client.get(&url, query.timeout).await?;

		if response.status != 200 {
			return Err(FetchApiError { status: response.status }.into());
		}

		let mut deserializer = serde_json::Deserializer::from_slice(&response.body);
		let envelope: AgentEnvelope = serde_path_to_error::deserialize(&mut deserializer)
			.map_err(|source| DecodeError::Envelope { source })?;

		Ok(envelope.data)
	}

	/// Fetches the agents and projects each record to its `string` field, preserving
	/// the service's order.
	pub async fn get_agent_strings(&self, query: &AgentQuery) -> Result<Vec<String>> {
		let records = self.get_agents(query).await?;

		records
			.iter()
			.enumerate()
			.map(|(index, record)| {
				record
					.string()
					.map(str::to_owned)
					.ok_or_else(|| DecodeError::MissingAgentString { index }.into())
			})
			.collect()
	}
}
impl<C> Clone for AgentServiceClient<C>
where
	C: ?Sized + AgentHttpClient,
{
	fn clone(&self) -> Self {
		Self { config: self.config.clone(), http_client: Arc::clone(&self.http_client) }
	}
}
impl<C> Debug for AgentServiceClient<C>
where
	C: ?Sized + AgentHttpClient,
{
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.debug_struct("AgentServiceClient").field("config", &self.config).finish()
	}
}
