//! Per-job user-agent rotation for crawl frameworks, backed by a remote user-agent service
//! with a pluggable transport.
//!
//! The crate hooks into a host crawler at three points. At job start it fetches a pool of
//! agent strings from the configured service, filtered by job-level criteria. On every
//! outgoing request of an enabled job it overwrites the `User-Agent` header with a random
//! pool entry, unless the request asks to keep its session. At job end it drops the pool.

#![deny(clippy::all, missing_docs, unused_crate_dependencies)]

pub mod api;
pub mod error;
pub mod host;
pub mod http;
pub mod middleware;
pub mod obs;
pub mod select;

#[cfg(all(any(test, feature = "test"), feature = "reqwest"))]
pub mod _preludet {
	//! Convenience re-exports and helpers for integration tests; enabled via `cfg(test)` or the
	//! `test` crate feature.

	pub use crate::_prelude::*;

	// self
	use crate::{
		api::ServiceConfig,
		middleware::{ReqwestRotationMiddleware, RotationMiddleware},
		select::AgentSelector,
	};

	/// Selector that always picks the first pool entry, for deterministic assertions.
	#[derive(Clone, Copy, Debug, Default)]
	pub struct FirstAgentSelector;
	impl AgentSelector for FirstAgentSelector {
		fn pick(&self, pool_len: usize) -> Option<usize> {
			(pool_len > 0).then_some(0)
		}
	}

	/// Builds a reqwest-backed middleware pointed at a mock service endpoint.
	pub fn build_mock_service_middleware(
		api_url: &str,
		api_key: &str,
	) -> ReqwestRotationMiddleware {
		RotationMiddleware::new(ServiceConfig::new(api_url, api_key))
	}

	/// Same as [`build_mock_service_middleware`] but selecting the first entry every time.
	pub fn build_deterministic_middleware(
		api_url: &str,
		api_key: &str,
	) -> ReqwestRotationMiddleware {
		RotationMiddleware::new(ServiceConfig::new(api_url, api_key))
			.with_selector(Arc::new(FirstAgentSelector))
	}
}

mod _prelude {
	pub use std::{
		collections::{BTreeMap, HashMap},
		error::Error as StdError,
		fmt::{Debug, Display, Formatter, Result as FmtResult},
		future::Future,
		pin::Pin,
		sync::Arc,
		time::Duration,
	};

	pub use parking_lot::RwLock;
	#[cfg(feature = "reqwest")]
	pub use reqwest::{Client as ReqwestClient, Error as ReqwestError};
	pub use serde::Deserialize;
	pub use thiserror::Error as ThisError;
	pub use url::Url;

	pub use crate::error::{Error, Result};
}

#[cfg(feature = "reqwest")] pub use reqwest;
pub use url;
#[cfg(all(test, feature = "reqwest"))] use {color_eyre as _, httpmock as _};
