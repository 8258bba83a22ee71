//! Trailing chase camera.

use engine_core::{ease_vec3, scaled_ease_factor};
use glam::Vec3;

use crate::config::CameraConfig;
use crate::craft::CraftState;

/// Camera pose lagging behind the craft.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CameraRig {
    pub eye: Vec3,
    pub look_at: Vec3,
    /// Eased toward the craft's up vector so the horizon banks with rolls.
    pub up: Vec3,
}

impl CameraRig {
    /// Rig already sitting at its desired pose behind `craft`.
    pub fn behind(craft: &CraftState, config: &CameraConfig) -> Self {
        let (eye, look_at) = Self::desired(craft, config);
        Self {
            eye,
            look_at,
            up: craft.rotation() * Vec3::Y,
        }
    }

    /// Where the eye and look-at point want to be this frame (world space).
    pub fn desired(craft: &CraftState, config: &CameraConfig) -> (Vec3, Vec3) {
        let transform = craft.transform();
        (
            transform.local_to_world(config.offset),
            transform.local_to_world(config.look_ahead),
        )
    }

    /// Ease toward the desired pose.
    pub fn follow(&mut self, craft: &CraftState, config: &CameraConfig, frames: f32) {
        let (eye, look_at) = Self::desired(craft, config);
        self.eye = ease_vec3(self.eye, eye, scaled_ease_factor(config.position_smoothing, frames));

        let look = scaled_ease_factor(config.look_smoothing, frames);
        self.look_at = ease_vec3(self.look_at, look_at, look);
        self.up = ease_vec3(self.up, craft.rotation() * Vec3::Y, look).normalize_or(Vec3::Y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_behind_and_above_the_craft() {
        let craft = CraftState::at(Vec3::ZERO);
        let rig = CameraRig::behind(&craft, &CameraConfig::default());
        assert!(rig.eye.z > 0.0 && rig.eye.y > 0.0);
        assert!(rig.look_at.z < 0.0);
    }

    #[test]
    fn follow_lags_then_catches_up() {
        let config = CameraConfig::default();
        let mut craft = CraftState::at(Vec3::ZERO);
        let mut rig = CameraRig::behind(&craft, &config);

        craft.position = Vec3::new(0.0, 0.0, -50.0);
        let (goal, _) = CameraRig::desired(&craft, &config);

        rig.follow(&craft, &config, 1.0);
        let first = rig.eye.distance(goal);
        assert!(first > 1.0, "camera should not snap");

        let mut last = first;
        for _ in 0..200 {
            rig.follow(&craft, &config, 1.0);
            let d = rig.eye.distance(goal);
            assert!(d <= last + 1e-5);
            last = d;
        }
        assert!(last < 0.01);
    }
}
