//! Pass-through gate keeping session-pinned requests on their original agent.

// self
use crate::host::{CrawlRequest, DefaultAgentMiddleware, RequestMiddleware};

/// Suppresses the wrapped middleware for requests that ask to keep their session.
///
/// Hosts normally assign their stock default agent to every request. Wrapping that
/// assignment in a gate means a session-pinned request keeps whatever agent it was
/// given when the session began instead of receiving a fresh default; all other
/// requests are handed to the wrapped middleware unchanged.
#[derive(Clone, Debug)]
pub struct SessionGate<M>
where
	M: RequestMiddleware,
{
	inner: M,
}
impl<M> SessionGate<M>
where
	M: RequestMiddleware,
{
	/// Wraps a middleware.
	pub fn new(inner: M) -> Self {
		Self { inner }
	}

	/// Returns the wrapped middleware.
	pub fn into_inner(self) -> M {
		self.inner
	}
}
impl<M> RequestMiddleware for SessionGate<M>
where
	M: RequestMiddleware,
{
	fn process_request(&self, request: &mut CrawlRequest) {
		if request.keeps_session() {
			return;
		}

		self.inner.process_request(request);
	}
}

/// Gate specialized for the modeled host default assignment.
pub type DefaultSessionGate = SessionGate<DefaultAgentMiddleware>;
