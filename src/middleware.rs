//! Downloader middlewares: per-job rotation plus the session pass-through gate.

pub mod rotation;
pub mod session;

pub use rotation::*;
pub use session::*;
