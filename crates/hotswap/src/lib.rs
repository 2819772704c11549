//! Hot-swappable shared resource cell.
//!
//! A [`Hotswap`] holds one resource produced by a caller-supplied
//! [`ResourceFactory`]. Any number of tasks read it through RAII guards;
//! [`Hotswap::swap`] installs a replacement without stopping readers and
//! tears the superseded instance down once its last guard is gone.
//!
//! Replacement is generation-based: every installation carries its own
//! admission gate and a process-unique [`Token`]. Readers optimistically
//! observe the current installation, get admitted through its gate, then
//! re-check that no swap landed in between. Swaps publish the replacement
//! first and drain the old installation afterwards, so neither construction
//! nor teardown on one side blocks the other.

mod cell;
mod error;
mod factory;
mod gate;
mod generation;

pub use cell::{Hotswap, ResourceGuard};
pub use error::HotswapError;
pub use factory::ResourceFactory;
pub use generation::Token;
