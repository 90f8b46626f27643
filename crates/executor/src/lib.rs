//! Maneuver burn executor: warps toward queued nodes, aligns, ignites, and retires them.

pub mod burn;
pub mod executor;

pub use burn::{BurnEstimate, estimate_burn, throttle_for};
pub use executor::{BurnExecutor, BurnPhase, ExecutionMode};
