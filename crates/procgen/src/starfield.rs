//! Seeded starfield that wraps around the camera for endless parallax.

use glam::{Quat, Vec3};
use rand::prelude::*;

/// Starfield generation parameters.
#[derive(Debug, Clone)]
pub struct StarfieldConfig {
    pub seed: u64,
    /// Number of stars.
    pub count: usize,
    /// Side length of the cube the stars fill (and wrap within).
    pub extent: f32,
    /// Star size range in world units.
    pub min_size: f32,
    pub max_size: f32,
    /// Spin about the world Y axis, radians per second.
    pub spin_rate: f32,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            seed: 1977,
            count: 2000,
            extent: 2000.0,
            min_size: 0.6,
            max_size: 2.2,
            spin_rate: 0.05,
        }
    }
}

/// A single star.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    /// Position in starfield space (before spin and wrap).
    pub position: Vec3,
    pub size: f32,
    /// 0..1, drives the emissive tint.
    pub brightness: f32,
}

/// The background starfield.
#[derive(Debug, Clone)]
pub struct Starfield {
    pub stars: Vec<Star>,
    extent: f32,
    spin_rate: f32,
    spin: f32,
}

impl Starfield {
    /// Generate `count` stars uniformly distributed in the cube.
    pub fn generate(config: &StarfieldConfig) -> Self {
        let mut rng = StdRng::seed_from_u64(config.seed);
        let half = config.extent * 0.5;
        let stars = (0..config.count)
            .map(|_| {
                let position = Vec3::new(
                    rng.gen_range(-half..half),
                    rng.gen_range(-half..half),
                    rng.gen_range(-half..half),
                );
                // Skew toward dim stars so a few bright ones stand out
                let brightness = 0.35 + 0.65 * rng.gen::<f32>().powi(3);
                let size = config.min_size + (config.max_size - config.min_size) * rng.gen::<f32>();
                Star {
                    position,
                    size,
                    brightness,
                }
            })
            .collect();

        log::info!("Starfield: {} stars in a {}u cube", config.count, config.extent);
        Self {
            stars,
            extent: config.extent,
            spin_rate: config.spin_rate,
            spin: 0.0,
        }
    }

    /// Advance the slow spin.
    pub fn update(&mut self, dt: f32) {
        self.spin = (self.spin + self.spin_rate * dt) % std::f32::consts::TAU;
    }

    pub fn spin(&self) -> f32 {
        self.spin
    }

    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.spin)
    }

    /// World positions of every star, spun and wrapped into the cube centred on `eye`.
    pub fn wrapped_positions<'a>(&'a self, eye: Vec3) -> impl Iterator<Item = (Vec3, &'a Star)> + 'a {
        let rotation = self.rotation();
        let extent = self.extent;
        self.stars
            .iter()
            .map(move |star| (wrap_into_cube(rotation * star.position, eye, extent), star))
    }
}

/// Move `point` by whole multiples of `extent` per axis so it lies within the cube of side
/// `extent` centred on `center`.
pub fn wrap_into_cube(point: Vec3, center: Vec3, extent: f32) -> Vec3 {
    let half = extent * 0.5;
    let wrap = |p: f32, c: f32| c + (p - c + half).rem_euclid(extent) - half;
    Vec3::new(
        wrap(point.x, center.x),
        wrap(point.y, center.y),
        wrap(point.z, center.z),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_stars() {
        let config = StarfieldConfig {
            count: 64,
            ..Default::default()
        };
        let a = Starfield::generate(&config);
        let b = Starfield::generate(&config);
        assert_eq!(a.stars, b.stars);
    }

    #[test]
    fn stars_fill_the_cube() {
        let config = StarfieldConfig::default();
        let field = Starfield::generate(&config);
        assert_eq!(field.stars.len(), 2000);
        let half = config.extent * 0.5;
        assert!(field.stars.iter().all(|s| s.position.abs().max_element() <= half));
    }

    #[test]
    fn wrapped_stars_surround_any_eye() {
        let config = StarfieldConfig {
            count: 256,
            ..Default::default()
        };
        let mut field = Starfield::generate(&config);
        field.update(3.0);
        let half = config.extent * 0.5;
        for eye in [Vec3::ZERO, Vec3::new(5000.0, -12000.0, 777.0)] {
            for (p, _) in field.wrapped_positions(eye) {
                assert!((p - eye).abs().max_element() <= half + 1e-2);
            }
        }
    }

    #[test]
    fn wrap_shifts_by_whole_extents() {
        let p = wrap_into_cube(Vec3::new(1100.0, 0.0, -1100.0), Vec3::ZERO, 2000.0);
        assert!((p - Vec3::new(-900.0, 0.0, 900.0)).length() < 1e-3);
    }

    #[test]
    fn spin_advances_with_time() {
        let mut field = Starfield::generate(&StarfieldConfig {
            count: 1,
            ..Default::default()
        });
        field.update(2.0);
        assert!((field.spin() - 0.1).abs() < 1e-6);
    }
}
