//! Shared/exclusive gate scoping the lifetime of one resource generation.
//!
//! Readers hold cheap shared permits; retirement drains the gate by taking
//! every permit in one request, which cannot complete until all readers are
//! gone and keeps new readers out until the drain guard drops.

use std::sync::Arc;

use tokio::sync::{OwnedSemaphorePermit, Semaphore};

/// Total permit capacity of a gate.
///
/// Fits Tokio's permit ceiling (`usize::MAX >> 3`) on 32-bit targets as
/// well. A drain acquisition takes all of it atomically.
const CAPACITY: u32 = u32::MAX >> 3;

/// Counting-semaphore lock distinguishing "in use" from "being torn down".
///
/// Shared holders take one permit each; a drain takes the entire capacity and
/// therefore waits for every shared permit to come back. The underlying
/// semaphore queue is FIFO, so a pending drain also stalls shared requests
/// that arrive after it; such callers must re-validate whatever observation
/// led them here once admitted.
#[derive(Debug)]
pub(crate) struct Gate {
	permits: Arc<Semaphore>,
}

impl Gate {
	pub fn new() -> Self {
		Self {
			permits: Arc::new(Semaphore::new(CAPACITY as usize)),
		}
	}

	/// Acquires one shared permit, suspending while a drain is pending or
	/// held.
	///
	/// Cancel-safe: dropping the future before it resolves consumes nothing.
	pub async fn shared(&self) -> SharedGuard {
		let permit = Arc::clone(&self.permits)
			.acquire_owned()
			.await
			.expect("gate semaphore is never closed");
		SharedGuard { _permit: permit }
	}

	/// Non-suspending variant of [`Gate::shared`].
	pub fn try_shared(&self) -> Option<SharedGuard> {
		Arc::clone(&self.permits)
			.try_acquire_owned()
			.ok()
			.map(|permit| SharedGuard { _permit: permit })
	}

	/// Acquires the entire capacity, suspending until all shared permits are
	/// released, and keeps further shared admissions out until the guard
	/// drops.
	pub async fn exclusive(&self) -> DrainGuard {
		let permit = Arc::clone(&self.permits)
			.acquire_many_owned(CAPACITY)
			.await
			.expect("gate semaphore is never closed");
		DrainGuard { _permit: permit }
	}
}

/// Permit held by one in-use reader of a generation.
#[derive(Debug)]
pub(crate) struct SharedGuard {
	_permit: OwnedSemaphorePermit,
}

/// Whole-capacity permit held while a generation is torn down.
#[derive(Debug)]
pub(crate) struct DrainGuard {
	_permit: OwnedSemaphorePermit,
}
