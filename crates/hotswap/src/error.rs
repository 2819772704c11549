//! Error taxonomy surfaced by cell operations.

use thiserror::Error;

/// Failure from a caller-supplied factory procedure.
///
/// Cancellation is not represented here: a dropped operation future releases
/// whatever it held and surfaces nothing.
#[derive(Debug, Error)]
pub enum HotswapError<E>
where
	E: std::error::Error + 'static,
{
	/// The factory's acquire procedure failed. The previously installed
	/// resource, if any, is untouched and remains live.
	#[error("resource acquisition failed")]
	Acquire(#[source] E),

	/// The factory's release procedure failed while tearing down a drained
	/// generation. The replacement, if any, is already installed and usable.
	#[error("resource release failed")]
	Release(#[source] E),
}
