//! Flight and weapons controller for the starfighter demo.
//!
//! Pure per-frame simulation: no window, GPU, or model data is needed to run it.

pub mod camera_rig;
pub mod config;
pub mod controller;
pub mod craft;
pub mod weapons;

pub use camera_rig::*;
pub use config::*;
pub use controller::*;
pub use craft::*;
pub use weapons::*;
