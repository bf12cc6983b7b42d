//! Simulation core for the pelagic FAD engine.
//!
//! Assembles the biology and device crates into a runnable day-stepped
//! simulation: a monotone clock, a concrete ocean grid, and the runner
//! that moves quantity between cells and devices in a fixed,
//! reproducible order.
//!
//! # Modules
//!
//! - [`clock`] -- [`DayClock`], the source of truth for simulated time.
//! - [`ocean`] -- [`Ocean`], a row-major grid implementing `OceanView`.
//! - [`runner`] -- [`Simulation`] and its `step_day` loop.
//! - [`error`] -- [`CoreError`].

pub mod clock;
pub mod error;
pub mod ocean;
pub mod runner;

// Re-export primary types at crate root.
pub use clock::DayClock;
pub use error::CoreError;
pub use ocean::Ocean;
pub use runner::Simulation;

/// Initialize a global tracing subscriber filtered by `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
