//! Error types shared by the fetch client and the middlewares.

// self
use crate::_prelude::*;

/// Crate-wide result type alias returning [`Error`] by default.
pub type Result<T, E = Error> = std::result::Result<T, E>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Canonical error exposed by public APIs.
///
/// Every variant of the fetch path propagates uncaught out of job start; the host
/// framework decides how a failed job-start handler is treated. Request processing
/// never produces an error.
#[derive(Debug, ThisError)]
pub enum Error {
	/// Local configuration problem.
	#[error(transparent)]
	Config(#[from] ConfigError),
	/// The agent service answered with a status other than 200.
	#[error(transparent)]
	Api(#[from] FetchApiError),
	/// Transport failure (DNS, TCP, TLS, timeout).
	#[error(transparent)]
	Transport(#[from] TransportError),
	/// The agent service answered 200 with a body this crate cannot use.
	#[error(transparent)]
	Decode(#[from] DecodeError),
}

/// Configuration and validation failures.
#[derive(Debug, ThisError)]
pub enum ConfigError {
	/// The configured base URL cannot be parsed or extended with the list endpoint.
	#[error("Agent service URL is invalid.")]
	InvalidEndpoint {
		/// Underlying parsing failure.
		#[source]
		source: url::ParseError,
	},
}

/// The agent service returned an unexpected HTTP status code.
#[derive(Clone, Debug, PartialEq, Eq, ThisError)]
#[error("Agent service returned unexpected status code {status}.")]
pub struct FetchApiError {
	/// Status code carried by the response.
	pub status: u16,
}

/// Transport-level failures (network, IO, timeouts).
#[derive(Debug, ThisError)]
pub enum TransportError {
	/// The request exceeded its timeout without producing a response.
	#[error("Request to the agent service timed out.")]
	Timeout {
		/// Transport-specific elapsed-time error.
		#[source]
		source: BoxError,
	},
	/// Underlying HTTP client reported a network failure.
	#[error("Network error occurred while calling the agent service.")]
	Network {
		/// Transport-specific network error.
		#[source]
		source: BoxError,
	},
	/// Underlying IO failure surfaced during transport.
	#[error("I/O error occurred while calling the agent service.")]
	Io(#[from] std::io::Error),
}
impl TransportError {
	/// Wraps a transport-specific network error.
	pub fn network(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Network { source: Box::new(src) }
	}

	/// Wraps a transport-specific timeout error.
	pub fn timeout(src: impl 'static + Send + Sync + StdError) -> Self {
		Self::Timeout { source: Box::new(src) }
	}
}
#[cfg(feature = "reqwest")]
impl From<ReqwestError> for TransportError {
	fn from(e: ReqwestError) -> Self {
		if e.is_timeout() { Self::timeout(e) } else { Self::network(e) }
	}
}

/// Failures turning a 200 response body into agent data.
#[derive(Debug, ThisError)]
pub enum DecodeError {
	/// The response body is not the expected `{"data": [...]}` JSON envelope.
	#[error("Agent service returned a malformed JSON envelope.")]
	Envelope {
		/// Structured parsing failure, including the offending path.
		#[source]
		source: serde_path_to_error::Error<serde_json::Error>,
	},
	/// A record under `data` has no usable `string` field.
	#[error("Agent record at index {index} has no usable `string` field.")]
	MissingAgentString {
		/// Zero-based position of the offending record.
		index: usize,
	},
}
