//! Battle station scenery: a panelled sphere with an equatorial trench, a concave superlaser
//! dish, and surface towers.
//!
//! Generation is fully deterministic in `DeathStarConfig::seed`.

use glam::{Quat, Vec3};
use noise::{NoiseFn, Perlin};
use rand::prelude::*;
use std::f32::consts::{FRAC_PI_2, PI, TAU};

/// Derive a noise seed from a base seed and an offset.
fn deterministic_noise_seed(seed: u64, offset: u64) -> u32 {
    ((seed.wrapping_add(offset))
        .wrapping_mul(0x9e3779b97f4a7c15_u64)
        .wrapping_add(offset.wrapping_mul(0x6c078965_u64))
        >> 32) as u32
}

/// Vertex for the station hull (per-vertex panel colour).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 4],
}

/// Configuration for station generation.
#[derive(Debug, Clone)]
pub struct DeathStarConfig {
    pub seed: u64,
    /// Hull radius in world units.
    pub radius: f32,
    /// Longitude segments.
    pub segments: u32,
    /// Latitude rings.
    pub rings: u32,
    /// Panel grid resolution (longitude, latitude).
    pub panels: (u32, u32),
    /// Half-width of the equatorial trench, radians of latitude.
    pub trench_half_width: f32,
    /// Trench depth as a fraction of the radius.
    pub trench_depth: f32,
    /// Dish centre as (latitude, longitude) in radians.
    pub dish_center: (f32, f32),
    /// Dish angular radius.
    pub dish_radius: f32,
    /// Dish depth at its centre, fraction of the radius.
    pub dish_depth: f32,
    pub tower_count: u32,
    /// Spin about the station's Y axis, radians per second.
    pub spin_rate: f32,
    /// Station centre in world space.
    pub center: Vec3,
}

impl Default for DeathStarConfig {
    fn default() -> Self {
        Self {
            seed: 1977,
            radius: 120.0,
            segments: 128,
            rings: 96,
            panels: (64, 32),
            trench_half_width: 0.02,
            trench_depth: 0.025,
            dish_center: (0.55, 0.9),
            dish_radius: 0.28,
            dish_depth: 0.08,
            tower_count: 48,
            spin_rate: 0.01,
            center: Vec3::new(-150.0, 60.0, -600.0),
        }
    }
}

/// A surface tower, in station-local space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tower {
    /// Base position on the hull.
    pub base: Vec3,
    /// Outward unit direction.
    pub up: Vec3,
    pub height: f32,
    pub width: f32,
}

/// Generated hull mesh.
#[derive(Debug, Clone)]
pub struct DeathStarMesh {
    pub vertices: Vec<SurfaceVertex>,
    pub indices: Vec<u32>,
}

/// The generated station plus its slow spin.
#[derive(Debug, Clone)]
pub struct DeathStar {
    pub config: DeathStarConfig,
    pub mesh: DeathStarMesh,
    pub towers: Vec<Tower>,
    spin: f32,
}

/// Which surface feature a direction falls on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceFeature {
    Hull,
    Trench,
    Dish,
}

impl DeathStar {
    pub fn generate(config: DeathStarConfig) -> Self {
        let mesh = generate_hull(&config);
        let towers = generate_towers(&config);
        log::info!(
            "Death Star: radius {}, {} vertices, {} towers (seed {})",
            config.radius,
            mesh.vertices.len(),
            towers.len(),
            config.seed
        );
        Self {
            config,
            mesh,
            towers,
            spin: 0.0,
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.spin = (self.spin + self.config.spin_rate * dt) % TAU;
    }

    pub fn spin(&self) -> f32 {
        self.spin
    }

    /// Station orientation in world space.
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.spin)
    }

    /// Classify a unit direction (station-local).
    pub fn feature_at(&self, dir: Vec3) -> SurfaceFeature {
        classify(&self.config, dir)
    }
}

fn dish_axis(config: &DeathStarConfig) -> Vec3 {
    let (lat, lon) = config.dish_center;
    direction(FRAC_PI_2 - lat, lon)
}

/// Unit direction from polar angle `phi` (0 at +Y) and longitude `theta`.
fn direction(phi: f32, theta: f32) -> Vec3 {
    Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin())
}

fn classify(config: &DeathStarConfig, dir: Vec3) -> SurfaceFeature {
    let angle_to_dish = dir.dot(dish_axis(config)).clamp(-1.0, 1.0).acos();
    if angle_to_dish < config.dish_radius {
        return SurfaceFeature::Dish;
    }
    let latitude = dir.y.clamp(-1.0, 1.0).asin();
    if latitude.abs() < config.trench_half_width {
        SurfaceFeature::Trench
    } else {
        SurfaceFeature::Hull
    }
}

/// Hull radius along `dir`, with the trench and dish cut in.
fn surface_radius(config: &DeathStarConfig, dir: Vec3) -> f32 {
    match classify(config, dir) {
        SurfaceFeature::Hull => config.radius,
        SurfaceFeature::Trench => config.radius * (1.0 - config.trench_depth),
        SurfaceFeature::Dish => {
            let angle = dir.dot(dish_axis(config)).clamp(-1.0, 1.0).acos();
            let t = angle / config.dish_radius;
            config.radius * (1.0 - config.dish_depth * (1.0 - t * t))
        }
    }
}

fn generate_hull(config: &DeathStarConfig) -> DeathStarMesh {
    let perlin = Perlin::new(deterministic_noise_seed(config.seed, 0));
    let segments = config.segments.max(3);
    let rings = config.rings.max(2);
    let (panels_lon, panels_lat) = (config.panels.0.max(1), config.panels.1.max(1));

    let mut vertices = Vec::with_capacity(((rings + 1) * (segments + 1)) as usize);
    for ring in 0..=rings {
        let v = ring as f32 / rings as f32;
        let phi = v * PI;
        for seg in 0..=segments {
            let u = seg as f32 / segments as f32;
            let theta = u * TAU;
            let dir = direction(phi, theta);
            let position = dir * surface_radius(config, dir);

            // One grey per panel, sampled at the panel's grid cell
            let pu = (u * panels_lon as f32).floor().min(panels_lon as f32 - 1.0);
            let pv = (v * panels_lat as f32).floor().min(panels_lat as f32 - 1.0);
            let n = perlin.get([pu as f64 * 0.37, pv as f64 * 0.37, 0.5]) as f32;
            let grey = match classify(config, dir) {
                SurfaceFeature::Hull => 0.55 + 0.12 * n,
                SurfaceFeature::Trench => 0.22 + 0.05 * n,
                SurfaceFeature::Dish => 0.38 + 0.04 * n,
            };
            vertices.push(SurfaceVertex {
                position: position.to_array(),
                normal: [0.0; 3],
                color: [grey, grey, grey * 1.03, 1.0],
            });
        }
    }

    let stride = segments + 1;
    let mut indices = Vec::with_capacity((rings * segments * 6) as usize);
    for ring in 0..rings {
        for seg in 0..segments {
            let current = ring * stride + seg;
            let next = current + stride;
            indices.extend_from_slice(&[current, next, current + 1, current + 1, next, next + 1]);
        }
    }

    compute_normals(&mut vertices, &indices);
    DeathStarMesh { vertices, indices }
}

/// Area-weighted face normals accumulated per vertex, flipped to face outward.
fn compute_normals(vertices: &mut [SurfaceVertex], indices: &[u32]) {
    let mut accum = vec![Vec3::ZERO; vertices.len()];
    for tri in indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let pa = Vec3::from(vertices[a].position);
        let pb = Vec3::from(vertices[b].position);
        let pc = Vec3::from(vertices[c].position);
        let face = (pb - pa).cross(pc - pa);
        accum[a] += face;
        accum[b] += face;
        accum[c] += face;
    }
    for (vertex, n) in vertices.iter_mut().zip(accum) {
        let radial = Vec3::from(vertex.position).normalize_or(Vec3::Y);
        let mut normal = n.normalize_or(radial);
        if normal.dot(radial) < 0.0 {
            normal = -normal;
        }
        vertex.normal = normal.to_array();
    }
}

fn generate_towers(config: &DeathStarConfig) -> Vec<Tower> {
    let mut rng = StdRng::seed_from_u64(config.seed ^ 0x70_7E_25);
    let mut towers = Vec::with_capacity(config.tower_count as usize);
    // Rejection-sample hull positions; bounded so a hull that is all trench cannot spin forever
    let mut attempts = 0;
    while towers.len() < config.tower_count as usize && attempts < config.tower_count * 50 {
        attempts += 1;
        let z: f32 = rng.gen_range(-1.0..1.0);
        let theta: f32 = rng.gen_range(0.0..TAU);
        let r = (1.0 - z * z).sqrt();
        let up = Vec3::new(r * theta.cos(), z, r * theta.sin());
        if classify(config, up) != SurfaceFeature::Hull {
            continue;
        }
        towers.push(Tower {
            base: up * config.radius,
            up,
            height: config.radius * rng.gen_range(0.006..0.022),
            width: config.radius * rng.gen_range(0.004..0.01),
        });
    }
    towers
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> DeathStarConfig {
        DeathStarConfig {
            segments: 48,
            rings: 32,
            tower_count: 12,
            ..Default::default()
        }
    }

    #[test]
    fn same_seed_same_station() {
        let a = DeathStar::generate(small());
        let b = DeathStar::generate(small());
        assert_eq!(a.mesh.vertices, b.mesh.vertices);
        assert_eq!(a.towers, b.towers);
    }

    #[test]
    fn different_seeds_change_the_panels() {
        let a = DeathStar::generate(small());
        let b = DeathStar::generate(DeathStarConfig { seed: 42, ..small() });
        assert_ne!(a.mesh.vertices, b.mesh.vertices);
    }

    #[test]
    fn mesh_is_well_formed() {
        let config = small();
        let station = DeathStar::generate(config.clone());
        let expected = ((config.rings + 1) * (config.segments + 1)) as usize;
        assert_eq!(station.mesh.vertices.len(), expected);
        assert_eq!(station.mesh.indices.len() % 3, 0);
        assert!(station.mesh.indices.iter().all(|&i| (i as usize) < expected));
        for v in &station.mesh.vertices {
            let n = Vec3::from(v.normal);
            assert!((n.length() - 1.0).abs() < 1e-3);
            assert!(n.dot(Vec3::from(v.position)) > 0.0 || Vec3::from(v.position).length() < 1e-3);
        }
    }

    #[test]
    fn trench_and_dish_are_recessed() {
        let config = small();
        let equator = Vec3::new(0.0, 0.0, -1.0);
        assert_eq!(classify(&config, equator), SurfaceFeature::Trench);
        assert!(surface_radius(&config, equator) < config.radius);

        let dish = dish_axis(&config);
        assert_eq!(classify(&config, dish), SurfaceFeature::Dish);
        let depth = config.radius - surface_radius(&config, dish);
        assert!((depth - config.radius * config.dish_depth).abs() < 1e-3);
    }

    #[test]
    fn towers_stand_on_plain_hull() {
        let station = DeathStar::generate(small());
        assert_eq!(station.towers.len(), 12);
        for tower in &station.towers {
            assert_eq!(station.feature_at(tower.up), SurfaceFeature::Hull);
            assert!((tower.base.length() - station.config.radius).abs() < 1e-2);
            assert!(tower.height > 0.0);
        }
    }

    #[test]
    fn spin_wraps_at_full_turn() {
        let mut station = DeathStar::generate(small());
        station.update(1000.0);
        assert!(station.spin() >= 0.0 && station.spin() < TAU);
    }
}
