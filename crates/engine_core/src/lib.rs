//! Core engine types shared by the flight demo crates.
//!
//! - Transforms and Euler attitude
//! - Flight control snapshot
//! - Exponential easing and reference-frame scaling
//! - Frame clock

pub mod controls;
pub mod easing;
pub mod time;
pub mod transform;

pub use controls::*;
pub use easing::*;
pub use time::*;
pub use transform::*;

// Re-export commonly used types
pub use glam::{EulerRot, Mat4, Quat, Vec2, Vec3, Vec4};
