//! Transport primitives for agent-service fetches.
//!
//! The module exposes [`AgentHttpClient`] so hosts can integrate custom HTTP stacks:
//! the fetch client only ever issues timed GET requests through this trait and never
//! touches a concrete transport. A reqwest-backed implementation ships behind the
//! default `reqwest` feature.

// std
use std::ops::Deref;
// self
use crate::{_prelude::*, error::TransportError};

/// Boxed future returned by [`AgentHttpClient::get`].
pub type HttpFuture<'a> =
	Pin<Box<dyn Future<Output = Result<FetchResponse, TransportError>> + 'a + Send>>;

/// Abstraction over HTTP transports capable of fetching agent lists.
///
/// The trait acts as the crate's only dependency on an HTTP stack. Implementations
/// must be `Send + Sync + 'static` so a single middleware can be shared across the
/// host's workers, and the returned future must be `Send` so hosts may poll it from
/// any executor. Status validation happens in the fetch client; transports surface
/// every response they receive, whatever its code.
pub trait AgentHttpClient
where
	Self: 'static + Send + Sync,
{
	/// Issues a GET for `url`, failing with [`TransportError::Timeout`] once `timeout`
	/// elapses without a complete response.
	fn get<'a>(&'a self, url: &'a Url, timeout: Duration) -> HttpFuture<'a>;
}

/// Raw response surfaced by [`AgentHttpClient`] implementations.
#[derive(Clone, Debug)]
pub struct FetchResponse {
	/// HTTP status code returned by the service.
	pub status: u16,
	/// Response body bytes.
	pub body: Vec<u8>,
}

/// Thin wrapper around [`ReqwestClient`] so shared HTTP behavior lives in one place.
/// The per-fetch timeout is applied per request, so callers can keep one client for
/// the whole process regardless of job-level timeout overrides.
#[cfg(feature = "reqwest")]
#[derive(Clone, Default)]
pub struct ReqwestHttpClient(pub ReqwestClient);
#[cfg(feature = "reqwest")]
impl ReqwestHttpClient {
	/// Wraps an existing reqwest [`ReqwestClient`].
	pub fn with_client(client: ReqwestClient) -> Self {
		Self(client)
	}
}
#[cfg(feature = "reqwest")]
impl AsRef<ReqwestClient> for ReqwestHttpClient {
	fn as_ref(&self) -> &ReqwestClient {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl Deref for ReqwestHttpClient {
	type Target = ReqwestClient;

	fn deref(&self) -> &Self::Target {
		&self.0
	}
}
#[cfg(feature = "reqwest")]
impl AgentHttpClient for ReqwestHttpClient {
	fn get<'a>(&'a self, url: &'a Url, timeout: Duration) -> HttpFuture<'a> {
		let client = self.0.clone();
		let url = url.clone();

		Box::pin(async move {
			let response = client
				.get(url)
				.timeout(timeout)
				.send()
				.await
				.map_err(TransportError::from)?;
			let status = response.status().as_u16();
			let body = response.bytes().await.map_err(TransportError::from)?.to_vec();

			Ok(FetchResponse { status, body })
		})
	}
}
