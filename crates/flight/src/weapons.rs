//! Blaster bolts: rate-limited spawning, ring-buffer cap, and distance culling.

use std::collections::VecDeque;

use engine_core::Transform;
use glam::Vec3;

use crate::config::WeaponConfig;

/// Cooldown remainders below this many seconds count as elapsed (frame-time rounding).
const COOLDOWN_EPSILON: f32 = 1e-4;

/// A single blaster bolt in flight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    /// Where the bolt left the muzzle.
    pub origin: Vec3,
    pub position: Vec3,
    /// Constant velocity, units per reference frame.
    pub velocity: Vec3,
    /// Controller clock (seconds) at spawn.
    pub spawned_at: f32,
}

impl Projectile {
    /// Direction of travel (zero for a stationary bolt).
    pub fn direction(&self) -> Vec3 {
        self.velocity.normalize_or_zero()
    }
}

/// Result of one fire attempt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct VolleyReport {
    pub spawned: usize,
    /// Oldest bolts dropped to stay under the cap.
    pub evicted: usize,
}

/// The craft's blasters and every bolt they have in flight.
#[derive(Debug, Clone)]
pub struct Blasters {
    bolts: VecDeque<Projectile>,
    capacity: usize,
    cooldown_remaining: f32,
    volleys_fired: u64,
}

impl Blasters {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            bolts: VecDeque::with_capacity(capacity),
            capacity,
            cooldown_remaining: 0.0,
            volleys_fired: 0,
        }
    }

    /// Count the cooldown down by `dt` seconds.
    pub fn tick_cooldown(&mut self, dt: f32) {
        if self.cooldown_remaining > 0.0 {
            self.cooldown_remaining = (self.cooldown_remaining - dt).max(0.0);
        }
    }

    pub fn is_ready(&self) -> bool {
        self.cooldown_remaining <= COOLDOWN_EPSILON
    }

    /// Fire one bolt per muzzle if the cooldown has elapsed.
    pub fn try_fire(&mut self, craft: &Transform, config: &WeaponConfig, now: f32) -> VolleyReport {
        if !self.is_ready() {
            return VolleyReport::default();
        }
        self.cooldown_remaining = config.cooldown;
        self.volleys_fired += 1;

        let velocity = craft.rotation * Vec3::new(0.0, 0.0, -config.projectile_speed);
        let mut report = VolleyReport::default();
        for offset in &config.muzzle_offsets {
            let origin = craft.local_to_world(*offset);
            if self.bolts.len() == self.capacity {
                self.bolts.pop_front();
                report.evicted += 1;
            }
            self.bolts.push_back(Projectile {
                origin,
                position: origin,
                velocity,
                spawned_at: now,
            });
            report.spawned += 1;
        }
        log::debug!(
            "Volley {} at t={:.2}s: {} bolts, {} evicted, {} live",
            self.volleys_fired,
            now,
            report.spawned,
            report.evicted,
            self.bolts.len()
        );
        report
    }

    /// Move every bolt by its velocity.
    pub fn advance(&mut self, frames: f32) {
        for bolt in &mut self.bolts {
            bolt.position += bolt.velocity * frames;
        }
    }

    /// Drop bolts farther than `cutoff` from `eye`; returns how many were removed.
    pub fn retire_beyond(&mut self, eye: Vec3, cutoff: f32) -> usize {
        let before = self.bolts.len();
        let cutoff_sq = cutoff * cutoff;
        self.bolts.retain(|b| b.position.distance_squared(eye) <= cutoff_sq);
        before - self.bolts.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.bolts.iter()
    }

    pub fn len(&self) -> usize {
        self.bolts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bolts.is_empty()
    }

    pub fn volleys_fired(&self) -> u64 {
        self.volleys_fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_muzzle() -> WeaponConfig {
        WeaponConfig {
            muzzle_offsets: vec![Vec3::ZERO],
            ..WeaponConfig::default()
        }
    }

    #[test]
    fn volley_spawns_one_bolt_per_muzzle_at_world_offsets() {
        let config = WeaponConfig::default();
        let mut blasters = Blasters::new(config.max_projectiles);
        let craft = Transform::from_position(Vec3::new(5.0, 0.0, 0.0));

        let report = blasters.try_fire(&craft, &config, 0.0);
        assert_eq!(report.spawned, config.muzzle_offsets.len());
        for (bolt, offset) in blasters.iter().zip(&config.muzzle_offsets) {
            assert!((bolt.origin - (craft.position + *offset)).length() < 1e-6);
            assert!((bolt.direction() - Vec3::NEG_Z).length() < 1e-6);
        }
    }

    #[test]
    fn fire_is_rate_limited() {
        let config = single_muzzle();
        let mut blasters = Blasters::new(10);
        let craft = Transform::default();

        assert_eq!(blasters.try_fire(&craft, &config, 0.0).spawned, 1);
        blasters.tick_cooldown(config.cooldown * 0.5);
        assert_eq!(blasters.try_fire(&craft, &config, 0.1).spawned, 0);
        blasters.tick_cooldown(config.cooldown * 0.5);
        assert_eq!(blasters.try_fire(&craft, &config, 0.2).spawned, 1);
        assert_eq!(blasters.volleys_fired(), 2);
    }

    #[test]
    fn full_buffer_evicts_oldest_first() {
        let config = single_muzzle();
        let mut blasters = Blasters::new(3);
        let craft = Transform::default();
        for i in 0..3 {
            blasters.try_fire(&craft, &config, i as f32);
            blasters.tick_cooldown(1.0);
        }
        let report = blasters.try_fire(&craft, &config, 3.0);
        assert_eq!(report, VolleyReport { spawned: 1, evicted: 1 });
        assert_eq!(blasters.len(), 3);
        let stamps: Vec<f32> = blasters.iter().map(|b| b.spawned_at).collect();
        assert_eq!(stamps, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn bolts_past_cutoff_are_retired() {
        let config = single_muzzle();
        let mut blasters = Blasters::new(10);
        blasters.try_fire(&Transform::default(), &config, 0.0);

        let frames_to_cutoff = config.projectile_cutoff / config.projectile_speed;
        blasters.advance(frames_to_cutoff - 1.0);
        assert_eq!(blasters.retire_beyond(Vec3::ZERO, config.projectile_cutoff), 0);
        blasters.advance(2.0);
        assert_eq!(blasters.retire_beyond(Vec3::ZERO, config.projectile_cutoff), 1);
        assert!(blasters.is_empty());
    }
}
