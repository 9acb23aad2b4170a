//! Optional observability helpers for the fetch and rotation paths.
//!
//! # Feature Flags
//!
//! - Enable `tracing` to emit a `user_agent_rotation.fetch` span around each pool load and
//!   an informational event for every rewritten request, carrying the target URL and the
//!   chosen agent.
//! - Enable `metrics` to increment the `user_agent_rotation_fetch_total` counter per load
//!   attempt/success/failure and `user_agent_rotation_rotated_total` per rewritten request.

// self
use crate::_prelude::*;

/// Outcome labels recorded for each pool load.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FetchOutcome {
	/// Entry to the load path.
	Attempt,
	/// Successful completion.
	Success,
	/// Failure propagated back to the host.
	Failure,
}
impl FetchOutcome {
	/// Returns a stable label suitable for span or metric fields.
	pub const fn as_str(self) -> &'static str {
		match self {
			FetchOutcome::Attempt => "attempt",
			FetchOutcome::Success => "success",
			FetchOutcome::Failure => "failure",
		}
	}
}
impl Display for FetchOutcome {
	fn fmt(&self, f: &mut Formatter) -> FmtResult {
		f.write_str(self.as_str())
	}
}

/// Records a pool-load outcome via the global metrics recorder (when enabled).
pub fn record_fetch_outcome(outcome: FetchOutcome) {
	#[cfg(feature = "metrics")]
	{
		metrics::counter!("user_agent_rotation_fetch_total", "outcome" => outcome.as_str())
			.increment(1);
	}

	#[cfg(not(feature = "metrics"))]
	{
		let _ = outcome;
	}
}

/// Emits the informational rotation event for a rewritten request.
pub fn record_rotation(target: &Url, agent: &str) {
	#[cfg(feature = "tracing")]
	tracing::info!(url = %target, agent, "Rotated request user agent.");
	#[cfg(not(feature = "tracing"))]
	{
		let _ = (target, agent);
	}

	#[cfg(feature = "metrics")]
	metrics::counter!("user_agent_rotation_rotated_total").increment(1);
}

/// Type alias that resolves to an instrumented future when tracing is enabled.
#[cfg(feature = "tracing")]
pub type InstrumentedFetch<F> = tracing::instrument::Instrumented<F>;
/// Passthrough future type when tracing is disabled.
#[cfg(not(feature = "tracing"))]
pub type InstrumentedFetch<F> = F;

/// A span builder wrapping one pool load.
#[derive(Clone, Debug)]
pub struct FetchSpan {
	#[cfg(feature = "tracing")]
	span: tracing::Span,
}
impl FetchSpan {
	/// Creates a new span tagged with the loading job's name.
	pub fn new(job: &str) -> Self {
		#[cfg(feature = "tracing")]
		{
			let span = tracing::info_span!("user_agent_rotation.fetch", job);

			Self { span }
		}
		#[cfg(not(feature = "tracing"))]
		{
			let _ = job;

			Self {}
		}
	}

	/// Instruments the load future without holding a guard across `.await` points.
	pub fn instrument<Fut>(&self, fut: Fut) -> InstrumentedFetch<Fut>
	where
		Fut: Future,
	{
		#[cfg(feature = "tracing")]
		{
			use tracing::Instrument;

			fut.instrument(self.span.clone())
		}
		#[cfg(not(feature = "tracing"))]
		{
			fut
		}
	}
}
