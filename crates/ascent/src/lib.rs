//! Launch window guidance: ascent direction targeting plus plane/rendezvous launch countdowns.

pub mod geometry;
pub mod guidance;
pub mod path;

pub use geometry::{ascent_direction, heading_for_inclination, plane_matching_inclination};
pub use guidance::{GUIDANCE_TARGET_NAME, GuidanceError, LaunchGuidanceState, LaunchWindowGuidance};
pub use path::ClassicAscentPath;
