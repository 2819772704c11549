//! One installation of a resource: the value, its gate, and its identity.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::factory::ResourceFactory;
use crate::gate::{Gate, SharedGuard};

static NEXT_TOKEN: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of one installed generation.
///
/// Minted from a single monotonic counter and never reused; equality decides
/// whether two observations refer to the same installation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Token(u64);

impl Token {
	pub(crate) fn mint() -> Self {
		Self(NEXT_TOKEN.fetch_add(1, Ordering::Relaxed))
	}
}

impl fmt::Display for Token {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0)
	}
}

/// One resource instance plus the gate and token scoping its lifetime.
///
/// Immutable once installed. Keeps its factory so retirement runs the release
/// procedure matching the acquire that produced the resource.
pub(crate) struct Generation<F: ResourceFactory> {
	resource: F::Resource,
	factory: F,
	gate: Gate,
	token: Token,
}

impl<F: ResourceFactory> Generation<F> {
	/// Builds a generation around a freshly acquired resource.
	///
	/// The gate and token exist before `acquire` runs; if it fails they are
	/// dropped without ever having been observable.
	pub async fn install(factory: F) -> Result<Self, F::Error> {
		let gate = Gate::new();
		let token = Token::mint();
		let resource = factory.acquire().await?;
		tracing::debug!(token = %token, "hotswap.generation.install");
		Ok(Self { resource, factory, gate, token })
	}

	pub fn token(&self) -> Token {
		self.token
	}

	pub fn resource(&self) -> &F::Resource {
		&self.resource
	}

	/// Admits one reader through this generation's gate.
	pub async fn shared(&self) -> SharedGuard {
		self.gate.shared().await
	}

	/// Non-suspending admission attempt.
	pub fn try_shared(&self) -> Option<SharedGuard> {
		self.gate.try_shared()
	}

	/// Drains the gate, then runs the factory's release procedure.
	///
	/// Suspends until every shared permit on this generation is back. The
	/// drain guard is dropped before a release failure propagates.
	pub async fn retire(&self) -> Result<(), F::Error> {
		tracing::debug!(token = %self.token, "hotswap.generation.drain");
		let drain = self.gate.exclusive().await;
		let outcome = self.factory.release(&self.resource).await;
		drop(drain);
		match &outcome {
			Ok(()) => tracing::debug!(token = %self.token, "hotswap.generation.retire"),
			Err(error) => {
				tracing::warn!(token = %self.token, %error, "hotswap.generation.release_failed");
			}
		}
		outcome
	}
}

#[cfg(test)]
mod tests {
	use std::collections::HashSet;

	use super::*;

	#[test]
	fn tokens_are_pairwise_distinct_across_threads() {
		let handles: Vec<_> = (0..8)
			.map(|_| std::thread::spawn(|| (0..1000).map(|_| Token::mint()).collect::<Vec<_>>()))
			.collect();

		let mut seen = HashSet::new();
		for handle in handles {
			for token in handle.join().unwrap() {
				assert!(seen.insert(token), "token {token} minted twice");
			}
		}
	}
}
