//! Tunable flight, weapon, and camera tables.
//!
//! Rates, decays and smoothing factors are "per reference frame" (1/60 s); see
//! [`IntegrationMode`] for how they are applied at other frame rates.

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// How per-frame constants are applied when the real frame time differs from 1/60 s.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum IntegrationMode {
    /// Scale every increment and decay by the number of reference frames in `dt`.
    #[default]
    DeltaScaled,
    /// Apply constants once per rendered frame regardless of `dt` (frame-rate dependent).
    PerFrame,
}

/// What happens to the velocity vector when the craft turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FlightModel {
    /// Velocity follows the nose; speed is kept through turns.
    #[default]
    Arcade,
    /// Velocity keeps its direction until thrust changes it.
    Inertial,
}

/// Thrust, drag and attitude rates.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HandlingConfig {
    /// Speed added per reference frame while thrust is held.
    pub acceleration: f32,
    /// Hard cap on velocity magnitude (units per reference frame).
    pub max_speed: f32,
    /// Velocity multiplier per reference frame with no thrust or brake.
    pub drag: f32,
    /// Velocity multiplier per reference frame while braking (stronger than `drag`).
    pub brake_decay: f32,
    /// Target pitch change per reference frame (radians).
    pub pitch_rate: f32,
    /// Target yaw change per reference frame (radians).
    pub yaw_rate: f32,
    /// Target roll change per reference frame (radians).
    pub roll_rate: f32,
    /// Pitch target is clamped to +/- this angle (radians).
    pub max_pitch: f32,
    /// Fraction of the remaining attitude error closed per reference frame.
    pub rotation_smoothing: f32,
}

impl Default for HandlingConfig {
    fn default() -> Self {
        Self {
            acceleration: 0.01,
            max_speed: 0.5,
            drag: 0.99,
            brake_decay: 0.95,
            pitch_rate: 0.02,
            yaw_rate: 0.02,
            roll_rate: 0.03,
            max_pitch: 1.4,
            rotation_smoothing: 0.1,
        }
    }
}

/// Blaster settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaponConfig {
    /// Minimum seconds between spawn batches.
    pub cooldown: f32,
    /// Bolt speed along the craft's nose (units per reference frame).
    pub projectile_speed: f32,
    /// Live projectile cap; the oldest bolt is evicted first.
    pub max_projectiles: usize,
    /// Bolts farther than this from the camera are retired.
    pub projectile_cutoff: f32,
    /// Craft-local spawn points, one bolt each per batch.
    pub muzzle_offsets: Vec<Vec3>,
}

impl Default for WeaponConfig {
    fn default() -> Self {
        Self {
            cooldown: 0.2,
            projectile_speed: 2.0,
            max_projectiles: 100,
            projectile_cutoff: 500.0,
            // Wingtip cannons, symmetric around the nose
            muzzle_offsets: vec![
                Vec3::new(-1.2, 0.35, -0.8),
                Vec3::new(1.2, 0.35, -0.8),
                Vec3::new(-1.2, -0.35, -0.8),
                Vec3::new(1.2, -0.35, -0.8),
            ],
        }
    }
}

/// Chase camera placement and lag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Eye position in craft-local space (behind and above).
    pub offset: Vec3,
    /// Look-at point in craft-local space (ahead of the nose).
    pub look_ahead: Vec3,
    /// Fraction of the eye error closed per reference frame.
    pub position_smoothing: f32,
    /// Fraction of the look-at error closed per reference frame.
    pub look_smoothing: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            offset: Vec3::new(0.0, 2.0, 8.0),
            look_ahead: Vec3::new(0.0, 0.0, -10.0),
            position_smoothing: 0.1,
            look_smoothing: 0.2,
        }
    }
}

/// Every tunable of the flight controller.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FlightConfig {
    pub handling: HandlingConfig,
    pub weapons: WeaponConfig,
    pub camera: CameraConfig,
    pub integration: IntegrationMode,
    pub flight_model: FlightModel,
    /// Where the craft spawns and returns to on reset.
    pub spawn_position: Vec3,
}

impl FlightConfig {
    /// Clamp values that would break the controller's invariants, logging each fix.
    pub fn sanitized(mut self) -> Self {
        fn unit(name: &str, v: &mut f32) {
            if !(0.0..=1.0).contains(&*v) {
                let fixed = (*v).clamp(0.0, 1.0);
                log::warn!("{} = {} is outside [0, 1], using {}", name, v, fixed);
                *v = fixed;
            }
        }
        let h = &mut self.handling;
        unit("handling.drag", &mut h.drag);
        unit("handling.brake_decay", &mut h.brake_decay);
        unit("handling.rotation_smoothing", &mut h.rotation_smoothing);
        if h.max_speed < 0.0 {
            log::warn!("handling.max_speed is negative, using 0");
            h.max_speed = 0.0;
        }
        let c = &mut self.camera;
        unit("camera.position_smoothing", &mut c.position_smoothing);
        unit("camera.look_smoothing", &mut c.look_smoothing);
        let w = &mut self.weapons;
        // A volley must fit in the buffer or it evicts its own bolts
        let floor = w.muzzle_offsets.len().max(1);
        if w.max_projectiles < floor {
            log::warn!(
                "weapons.max_projectiles = {} is below the {} bolts of one volley, using {}",
                w.max_projectiles,
                w.muzzle_offsets.len(),
                floor
            );
            w.max_projectiles = floor;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ron_round_trip_keeps_tables() {
        let mut config = FlightConfig::default();
        config.weapons.cooldown = 0.35;
        config.flight_model = FlightModel::Inertial;
        let text = ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::default()).unwrap();
        let back: FlightConfig = ron::from_str(&text).unwrap();
        assert_eq!(back.weapons.cooldown, 0.35);
        assert_eq!(back.flight_model, FlightModel::Inertial);
        assert_eq!(back.weapons.muzzle_offsets.len(), 4);
    }

    #[test]
    fn missing_fields_take_defaults() {
        let back: FlightConfig = ron::from_str("(handling: (max_speed: 2.0))").unwrap();
        assert_eq!(back.handling.max_speed, 2.0);
        assert_eq!(back.handling.drag, HandlingConfig::default().drag);
        assert_eq!(back.integration, IntegrationMode::DeltaScaled);
    }

    #[test]
    fn sanitize_clamps_out_of_range_factors() {
        let mut config = FlightConfig::default();
        config.handling.drag = 1.5;
        config.weapons.max_projectiles = 0;
        let config = config.sanitized();
        assert_eq!(config.handling.drag, 1.0);
        assert_eq!(config.weapons.max_projectiles, WeaponConfig::default().muzzle_offsets.len());
    }

    #[test]
    fn sanitize_fits_a_whole_volley() {
        let mut config = FlightConfig::default();
        config.weapons.max_projectiles = 2;
        let config = config.sanitized();
        assert_eq!(config.weapons.max_projectiles, 4);

        let mut single = FlightConfig::default();
        single.weapons.muzzle_offsets = vec![Vec3::ZERO];
        single.weapons.max_projectiles = 0;
        assert_eq!(single.sanitized().weapons.max_projectiles, 1);

        let mut roomy = FlightConfig::default();
        roomy.weapons.max_projectiles = 7;
        assert_eq!(roomy.sanitized().weapons.max_projectiles, 7);
    }

    #[test]
    fn default_muzzles_are_symmetric() {
        let offsets = WeaponConfig::default().muzzle_offsets;
        let sum: Vec3 = offsets.iter().copied().sum();
        assert!(sum.x.abs() < 1e-6 && sum.y.abs() < 1e-6);
    }
}
