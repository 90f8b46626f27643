//! Guidance and control core of a spacecraft autopilot.
//!
//! Two tick-driven controllers do the work: the maneuver burn executor in
//! [`executor`] and launch window guidance in [`ascent`]. [`autopilot::Autopilot`] owns both and
//! is what a host calls every fixed step and every control step. Everything the controllers steer
//! is reached through the traits in [`vehicle`]; [`sim`] provides stand-ins for all of them.

pub mod autopilot;
pub mod harness;
pub mod scenario;

pub use autopilot_ascent as ascent;
pub use autopilot_config as config;
pub use autopilot_core as primitives;
pub use autopilot_executor as executor;
pub use autopilot_export as export;
pub use autopilot_sim as sim;
pub use autopilot_vehicle as vehicle;

