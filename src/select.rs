//! Selection strategies deciding which pool entry the next request receives.

// crates.io
use rand::Rng;

/// Strategy consulted once per rewritten request.
///
/// Injectable so hosts can pin rotation in tests; production uses
/// [`UniformSelector`].
pub trait AgentSelector
where
	Self: Send + Sync,
{
	/// Returns the index of the chosen entry, or `None` for an empty pool.
	fn pick(&self, pool_len: usize) -> Option<usize>;
}

/// Uniformly random selection backed by the thread-local generator.
#[derive(Clone, Copy, Debug, Default)]
pub struct UniformSelector;
impl AgentSelector for UniformSelector {
	fn pick(&self, pool_len: usize) -> Option<usize> {
		if pool_len == 0 {
			return None;
		}

		Some(rand::rng().random_range(0..pool_len))
	}
}
