//! Hot-swappable resource cell.
//!
//! Holds a single resource behind generation-scoped admission control. One
//! task can install a replacement while readers keep using whichever
//! installation they observed; the superseded instance is torn down only
//! once its last reader is gone.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::Mutex;

use crate::error::HotswapError;
use crate::factory::ResourceFactory;
use crate::gate::SharedGuard;
use crate::generation::{Generation, Token};

/// Single swappable resource shared by concurrent tasks.
///
/// [`access`](Self::access) hands out guards for the currently installed
/// resource. [`swap`](Self::swap) installs a replacement and tears the old
/// instance down after its readers finish; readers racing the swap are
/// redirected to the replacement without observing a torn-down value.
///
/// Tear the cell down with [`close`](Self::close). Plain `drop` skips the
/// final release procedure, since destruction cannot suspend.
pub struct Hotswap<F: ResourceFactory> {
	/// Current installation; written only by the serialized swap path.
	current: ArcSwap<Generation<F>>,
	/// Orders swap requests. Tokio mutexes queue FIFO, so swaps apply in
	/// request order end to end.
	swap_order: Mutex<()>,
}

impl<F: ResourceFactory> Hotswap<F> {
	/// Builds the cell around the first resource produced by `initial`.
	pub async fn new(initial: F) -> Result<Self, HotswapError<F::Error>> {
		let first = Generation::install(initial).await.map_err(HotswapError::Acquire)?;
		Ok(Self {
			current: ArcSwap::from_pointee(first),
			swap_order: Mutex::new(()),
		})
	}

	/// Returns a guard for the currently installed resource.
	///
	/// Never held up by an in-flight swap's construction or teardown work. A
	/// swap may land between observing the current installation and being
	/// admitted through its gate; the mismatch is detected by comparing
	/// tokens and the attempt restarts from the fresh observation. There is
	/// no suspension point between admission and the token check, so
	/// cancelling the enclosing task either stops a still-waiting
	/// acquisition (nothing held) or leaves a fully formed guard whose
	/// permit returns on drop.
	pub async fn access(&self) -> ResourceGuard<F> {
		let mut observed = self.current.load_full();
		loop {
			let permit = observed.shared().await;
			let fresh = self.current.load_full();
			if fresh.token() == observed.token() {
				return ResourceGuard { generation: observed, _permit: permit };
			}
			tracing::trace!(stale = %observed.token(), current = %fresh.token(), "hotswap.access.retry");
			drop(permit);
			observed = fresh;
		}
	}

	/// Non-suspending variant of [`access`](Self::access).
	///
	/// Returns `None` when admission to the current installation would have
	/// to wait.
	pub fn try_access(&self) -> Option<ResourceGuard<F>> {
		let mut observed = self.current.load_full();
		loop {
			match observed.try_shared() {
				Some(permit) => {
					let fresh = self.current.load_full();
					if fresh.token() == observed.token() {
						return Some(ResourceGuard { generation: observed, _permit: permit });
					}
					drop(permit);
					observed = fresh;
				}
				None => {
					// The observed gate is draining; only retry if a newer
					// installation has been published in the meantime.
					let fresh = self.current.load_full();
					if fresh.token() == observed.token() {
						return None;
					}
					observed = fresh;
				}
			}
		}
	}

	/// Installs the resource produced by `next` and tears down the one it
	/// replaces.
	///
	/// Concurrent swaps apply strictly in request order. The replacement is
	/// published as soon as it is built, before the old installation drains,
	/// so readers are never held up by teardown.
	///
	/// On [`HotswapError::Acquire`] the cell is untouched and the previous
	/// resource stays live. On [`HotswapError::Release`] the replacement is
	/// already installed and usable. Dropping the returned future after the
	/// replacement is published but before teardown completes abandons the
	/// old installation's release procedure.
	pub async fn swap(&self, next: F) -> Result<(), HotswapError<F::Error>> {
		let _order = self.swap_order.lock().await;
		let replacement = Generation::install(next).await.map_err(HotswapError::Acquire)?;
		let incoming = replacement.token();
		let outgoing = self.current.swap(Arc::new(replacement));
		tracing::debug!(outgoing = %outgoing.token(), incoming = %incoming, "hotswap.swap.install");
		outgoing.retire().await.map_err(HotswapError::Release)
	}

	/// Tears down the currently installed resource and consumes the cell.
	///
	/// Suspends until every outstanding guard is dropped, then runs the
	/// factory's release procedure.
	pub async fn close(self) -> Result<(), HotswapError<F::Error>> {
		let last = self.current.load_full();
		tracing::debug!(token = %last.token(), "hotswap.close");
		last.retire().await.map_err(HotswapError::Release)
	}

	/// Identity of the currently installed generation.
	///
	/// Changes exactly when a swap publishes its replacement.
	pub fn token(&self) -> Token {
		self.current.load().token()
	}
}

impl<F: ResourceFactory> fmt::Debug for Hotswap<F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Hotswap").field("token", &self.token()).finish_non_exhaustive()
	}
}

/// Guard keeping one installation of the resource alive for shared use.
///
/// Dereferences to the resource. The admission permit returns when the guard
/// drops; teardown of the guarded installation cannot begin while any of its
/// guards exist.
pub struct ResourceGuard<F: ResourceFactory> {
	generation: Arc<Generation<F>>,
	_permit: SharedGuard,
}

impl<F: ResourceFactory> ResourceGuard<F> {
	/// Identity of the installation this guard pins.
	pub fn token(&self) -> Token {
		self.generation.token()
	}
}

impl<F: ResourceFactory> Deref for ResourceGuard<F> {
	type Target = F::Resource;

	fn deref(&self) -> &F::Resource {
		self.generation.resource()
	}
}

impl<F: ResourceFactory> fmt::Debug for ResourceGuard<F> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ResourceGuard").field("token", &self.token()).finish_non_exhaustive()
	}
}
