//! Craft kinematics: throttle, attitude smoothing, and position integration.

use engine_core::{scaled_decay, scaled_ease_factor, EulerAngles, FlightControls, Transform};
use glam::{Quat, Vec3};

use crate::config::{FlightModel, HandlingConfig};

/// Transform state of the player craft.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CraftState {
    pub position: Vec3,
    /// Units per reference frame.
    pub velocity: Vec3,
    /// Attitude actually flown (eased toward `target_attitude`).
    pub attitude: EulerAngles,
    /// Attitude commanded by the stick.
    pub target_attitude: EulerAngles,
}

impl CraftState {
    /// A craft at rest, level, facing -Z.
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            attitude: EulerAngles::ZERO,
            target_attitude: EulerAngles::ZERO,
        }
    }

    pub fn rotation(&self) -> Quat {
        self.attitude.to_quat()
    }

    pub fn transform(&self) -> Transform {
        Transform::from_position_rotation(self.position, self.rotation())
    }

    pub fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::NEG_Z
    }

    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }

    /// Thrust along the nose (capped at max speed), otherwise brake or coast with drag.
    pub fn apply_throttle(&mut self, controls: &FlightControls, handling: &HandlingConfig, frames: f32) {
        if controls.thrust {
            self.velocity += self.forward() * handling.acceleration * frames;
            self.velocity = self.velocity.clamp_length_max(handling.max_speed);
        }
        if controls.brake {
            self.velocity *= scaled_decay(handling.brake_decay, frames);
        } else if !controls.thrust {
            self.velocity *= scaled_decay(handling.drag, frames);
        }
    }

    /// Move the commanded attitude with the stick, then ease the flown attitude toward it.
    pub fn steer(&mut self, controls: &FlightControls, handling: &HandlingConfig, frames: f32) {
        let target = &mut self.target_attitude;
        target.pitch = (target.pitch + controls.pitch_axis() * handling.pitch_rate * frames)
            .clamp(-handling.max_pitch, handling.max_pitch);
        target.yaw += controls.yaw_axis() * handling.yaw_rate * frames;
        target.roll += controls.roll_axis() * handling.roll_rate * frames;

        let factor = scaled_ease_factor(handling.rotation_smoothing, frames);
        self.attitude.ease_toward(self.target_attitude, factor);
    }

    /// Explicit Euler step: `position += velocity`.
    pub fn integrate(&mut self, model: FlightModel, frames: f32) {
        if model == FlightModel::Arcade {
            let speed = self.speed();
            if speed > 0.0 {
                self.velocity = self.forward() * speed;
            }
        }
        self.position += self.velocity * frames;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn thrusting() -> FlightControls {
        FlightControls {
            thrust: true,
            ..FlightControls::NONE
        }
    }

    #[test]
    fn thrust_accelerates_along_nose() {
        let handling = HandlingConfig::default();
        let mut craft = CraftState::at(Vec3::ZERO);
        craft.apply_throttle(&thrusting(), &handling, 1.0);
        assert!((craft.velocity - Vec3::NEG_Z * handling.acceleration).length() < 1e-6);
    }

    #[test]
    fn thrust_never_exceeds_max_speed() {
        let handling = HandlingConfig::default();
        let mut craft = CraftState::at(Vec3::ZERO);
        for i in 0..1000 {
            craft.apply_throttle(&thrusting(), &handling, 1.0 + (i % 7) as f32);
            assert!(craft.speed() <= handling.max_speed + 1e-5);
        }
        assert!((craft.speed() - handling.max_speed).abs() < 1e-4);
    }

    #[test]
    fn brake_decays_faster_than_drag() {
        let handling = HandlingConfig::default();
        let mut coasting = CraftState::at(Vec3::ZERO);
        coasting.velocity = Vec3::NEG_Z * 0.4;
        let mut braking = coasting;

        coasting.apply_throttle(&FlightControls::NONE, &handling, 1.0);
        braking.apply_throttle(
            &FlightControls {
                brake: true,
                ..FlightControls::NONE
            },
            &handling,
            1.0,
        );
        assert!(braking.speed() < coasting.speed());
        assert!((coasting.speed() - 0.4 * handling.drag).abs() < 1e-6);
    }

    #[test]
    fn stick_moves_target_and_attitude_lags() {
        let handling = HandlingConfig::default();
        let mut craft = CraftState::at(Vec3::ZERO);
        let stick = FlightControls {
            yaw_left: true,
            ..FlightControls::NONE
        };
        craft.steer(&stick, &handling, 1.0);
        assert!((craft.target_attitude.yaw - handling.yaw_rate).abs() < 1e-6);
        assert!(craft.attitude.yaw > 0.0 && craft.attitude.yaw < craft.target_attitude.yaw);
    }

    #[test]
    fn pitch_target_is_clamped() {
        let handling = HandlingConfig::default();
        let mut craft = CraftState::at(Vec3::ZERO);
        let stick = FlightControls {
            pitch_up: true,
            ..FlightControls::NONE
        };
        for _ in 0..1000 {
            craft.steer(&stick, &handling, 1.0);
        }
        assert!((craft.target_attitude.pitch - handling.max_pitch).abs() < 1e-6);
    }

    #[test]
    fn arcade_velocity_follows_the_nose() {
        let mut craft = CraftState::at(Vec3::ZERO);
        craft.velocity = Vec3::NEG_Z * 0.3;
        craft.attitude = EulerAngles::new(0.0, std::f32::consts::FRAC_PI_2, 0.0);
        craft.integrate(FlightModel::Arcade, 1.0);
        assert!((craft.velocity - Vec3::NEG_X * 0.3).length() < 1e-5);
        assert!((craft.position - Vec3::NEG_X * 0.3).length() < 1e-5);
    }

    #[test]
    fn inertial_velocity_keeps_direction() {
        let mut craft = CraftState::at(Vec3::ZERO);
        craft.velocity = Vec3::NEG_Z * 0.3;
        craft.attitude = EulerAngles::new(0.0, std::f32::consts::FRAC_PI_2, 0.0);
        craft.integrate(FlightModel::Inertial, 2.0);
        assert!((craft.position - Vec3::NEG_Z * 0.6).length() < 1e-6);
    }
}
