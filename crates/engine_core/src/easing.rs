//! Exponential easing and reference-frame scaling.
//!
//! Flight tunables are expressed "per reference frame" (1/60 s). These helpers turn a
//! per-frame constant into the equivalent for an arbitrary number of reference frames so
//! that a frame of exactly 1/60 s behaves identically to the per-frame formula.

use glam::Vec3;

/// Length of one reference frame in seconds.
pub const REFERENCE_FRAME_SECONDS: f32 = 1.0 / 60.0;

/// Number of reference frames covered by `dt` seconds.
pub fn reference_frames(dt: f32) -> f32 {
    dt / REFERENCE_FRAME_SECONDS
}

/// One step of exponential easing: `current + (target - current) * factor`.
///
/// With `factor` in `[0, 1]` the result lies between `current` and `target`, so repeated
/// application converges without overshoot.
pub fn ease(current: f32, target: f32, factor: f32) -> f32 {
    current + (target - current) * factor
}

/// Vector form of [`ease`].
pub fn ease_vec3(current: Vec3, target: Vec3, factor: f32) -> Vec3 {
    current + (target - current) * factor
}

/// Easing factor equivalent to applying a per-frame `factor` for `frames` reference frames.
pub fn scaled_ease_factor(factor: f32, frames: f32) -> f32 {
    let factor = factor.clamp(0.0, 1.0);
    (1.0 - (1.0 - factor).powf(frames.max(0.0))).clamp(0.0, 1.0)
}

/// Multiplier equivalent to applying a per-frame `decay` for `frames` reference frames.
pub fn scaled_decay(decay: f32, frames: f32) -> f32 {
    decay.clamp(0.0, 1.0).powf(frames.max(0.0))
}
