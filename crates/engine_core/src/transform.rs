//! Transform component and Euler attitude for craft orientation.

use glam::{EulerRot, Quat, Vec3};

use crate::easing::ease;

/// A 3D transform representing position, rotation, and scale.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
        }
    }
}

impl Transform {
    /// Create a new transform at the given position.
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a new transform with position and rotation.
    pub fn from_position_rotation(position: Vec3, rotation: Quat) -> Self {
        Self {
            position,
            rotation,
            ..Default::default()
        }
    }

    /// Get the forward direction (negative Z in right-handed coordinates).
    pub fn forward(&self) -> Vec3 {
        self.rotation * -Vec3::Z
    }

    /// Map a point from local space into world space (rotation + translation, scale ignored).
    pub fn local_to_world(&self, local: Vec3) -> Vec3 {
        self.position + self.rotation * local
    }
}

/// Craft attitude as Euler angles in radians.
///
/// Applied yaw first (world Y), then pitch (local X), then roll (local Z), so pitching never
/// tilts the yaw axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EulerAngles {
    pub pitch: f32,
    pub yaw: f32,
    pub roll: f32,
}

impl EulerAngles {
    pub const ZERO: Self = Self {
        pitch: 0.0,
        yaw: 0.0,
        roll: 0.0,
    };

    pub fn new(pitch: f32, yaw: f32, roll: f32) -> Self {
        Self { pitch, yaw, roll }
    }

    pub fn to_quat(self) -> Quat {
        Quat::from_euler(EulerRot::YXZ, self.yaw, self.pitch, self.roll)
    }

    /// Ease every angle toward `target` by `factor` (0 = hold, 1 = snap).
    pub fn ease_toward(&mut self, target: EulerAngles, factor: f32) {
        self.pitch = ease(self.pitch, target.pitch, factor);
        self.yaw = ease(self.yaw, target.yaw, factor);
        self.roll = ease(self.roll, target.roll, factor);
    }

    /// Largest per-axis distance to `other`.
    pub fn max_abs_diff(self, other: EulerAngles) -> f32 {
        (self.pitch - other.pitch)
            .abs()
            .max((self.yaw - other.yaw).abs())
            .max((self.roll - other.roll).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_is_negative_z_at_identity() {
        let t = Transform::default();
        assert!((t.forward() - Vec3::NEG_Z).length() < 1e-6);
    }

    #[test]
    fn positive_yaw_turns_nose_left() {
        let rot = EulerAngles::new(0.0, std::f32::consts::FRAC_PI_2, 0.0).to_quat();
        let t = Transform::from_position_rotation(Vec3::ZERO, rot);
        assert!((t.forward() - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn positive_pitch_raises_nose() {
        let rot = EulerAngles::new(0.3, 0.0, 0.0).to_quat();
        let t = Transform::from_position_rotation(Vec3::ZERO, rot);
        assert!(t.forward().y > 0.0);
    }

    #[test]
    fn local_to_world_applies_rotation_then_translation() {
        let rot = EulerAngles::new(0.0, std::f32::consts::PI, 0.0).to_quat();
        let t = Transform::from_position_rotation(Vec3::new(10.0, 0.0, 0.0), rot);
        let p = t.local_to_world(Vec3::new(0.0, 0.0, -2.0));
        assert!((p - Vec3::new(10.0, 0.0, 2.0)).length() < 1e-5);
    }
}
