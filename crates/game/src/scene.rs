//! Scenery animation and the pure transforms the draw pass needs.

use engine_core::Transform;
use glam::{Mat4, Quat, Vec3, Vec4};
use procgen::{DeathStar, DeathStarConfig, Starfield, StarfieldConfig};
use renderer::{InstanceData, MeshData, Vertex};

/// Below this speed (units per reference frame) the craft counts as idle and bobs.
const HOVER_SPEED: f32 = 0.02;
const HOVER_AMPLITUDE: f32 = 0.1;
const HOVER_FREQUENCY: f32 = 0.5;

/// Background scenery: starfield and battle station, both slowly spinning.
pub struct Scenery {
    pub starfield: Starfield,
    pub station: DeathStar,
}

impl Scenery {
    pub fn generate(seed: u64) -> Self {
        Self {
            starfield: Starfield::generate(&StarfieldConfig {
                seed,
                ..Default::default()
            }),
            station: DeathStar::generate(DeathStarConfig {
                seed,
                ..Default::default()
            }),
        }
    }

    pub fn update(&mut self, dt: f32) {
        self.starfield.update(dt);
        self.station.update(dt);
    }

    /// Station hull as a renderer mesh.
    pub fn station_mesh(&self) -> MeshData {
        let mesh = &self.station.mesh;
        MeshData {
            vertices: mesh
                .vertices
                .iter()
                .map(|v| Vertex::with_color(v.position, v.normal, v.color))
                .collect(),
            indices: mesh.indices.clone(),
        }
    }

    /// Station placement in world space.
    pub fn station_matrix(&self) -> Mat4 {
        Mat4::from_rotation_translation(self.station.rotation(), self.station.config.center)
    }
}

/// Idle hover offset along world Y. Fades out as the craft picks up speed; never fed back into
/// the flight state.
pub fn hover_offset(elapsed: f32, speed: f32) -> f32 {
    let idle = 1.0 - (speed / HOVER_SPEED).clamp(0.0, 1.0);
    (elapsed * HOVER_FREQUENCY).sin() * HOVER_AMPLITUDE * idle
}

/// Model matrix for the drawn craft: flight pose, hover, then the model's own yaw and scale.
pub fn craft_matrix(craft: &Transform, hover: f32, model_yaw: f32, model_scale: f32) -> Mat4 {
    Mat4::from_scale_rotation_translation(
        Vec3::splat(model_scale),
        craft.rotation * Quat::from_rotation_y(model_yaw),
        craft.position + Vec3::Y * hover,
    )
}

/// Instance for the drawn craft. The placeholder cone is unlit and keeps its own size and
/// heading; a loaded model gets the configured yaw and scale and is lit.
pub fn craft_instance(craft: &Transform, hover: f32, placeholder: bool, model_yaw: f32, model_scale: f32) -> InstanceData {
    if placeholder {
        InstanceData::emissive(craft_matrix(craft, hover, 0.0, 1.0), Vec4::ONE)
    } else {
        InstanceData::new(craft_matrix(craft, hover, model_yaw, model_scale), Vec4::ONE)
    }
}

/// Model matrix for a bolt mesh (unit length along -Z) travelling along `direction`.
pub fn bolt_matrix(position: Vec3, direction: Vec3, length: f32) -> Mat4 {
    let rotation = if direction.length_squared() > 0.0 {
        Quat::from_rotation_arc(Vec3::NEG_Z, direction.normalize())
    } else {
        Quat::IDENTITY
    };
    Mat4::from_scale_rotation_translation(Vec3::new(1.0, 1.0, length), rotation, position)
}

/// Model matrix for a tower standing on the station hull (station-local).
pub fn tower_matrix(base: Vec3, up: Vec3, width: f32, height: f32) -> Mat4 {
    Mat4::from_scale_rotation_translation(
        Vec3::new(width, height, width),
        Quat::from_rotation_arc(Vec3::Y, up),
        base + up * (height * 0.5),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hover_only_when_idle() {
        let t = std::f32::consts::PI; // sin(t * 0.5) == 1
        assert!((hover_offset(t, 0.0) - 0.1).abs() < 1e-6);
        assert_eq!(hover_offset(t, HOVER_SPEED * 2.0), 0.0);
        assert!(hover_offset(t, HOVER_SPEED * 0.5) < 0.1);
    }

    #[test]
    fn craft_matrix_applies_scale_and_hover() {
        let craft = Transform::from_position(Vec3::new(1.0, 2.0, 3.0));
        let m = craft_matrix(&craft, 0.1, 0.0, 0.5);
        let nose = m.transform_point3(Vec3::new(0.0, 0.0, -1.0));
        assert!((nose - Vec3::new(1.0, 2.1, 2.5)).length() < 1e-5);
    }

    #[test]
    fn placeholder_is_unlit_at_unit_scale() {
        let craft = Transform::default();
        let cone = craft_instance(&craft, 0.0, true, 1.0, 0.5);
        assert!(cone.is_emissive());
        assert_eq!(Mat4::from_cols_array_2d(&cone.model), Mat4::IDENTITY);

        let model = craft_instance(&craft, 0.0, false, 0.0, 0.5);
        assert!(!model.is_emissive());
        let scale = Mat4::from_cols_array_2d(&model.model).to_scale_rotation_translation().0;
        assert!((scale - Vec3::splat(0.5)).length() < 1e-6);
    }

    #[test]
    fn bolt_points_along_travel() {
        let m = bolt_matrix(Vec3::ZERO, Vec3::X * 2.0, 3.0);
        let tip = m.transform_point3(Vec3::new(0.0, 0.0, -0.5));
        assert!((tip - Vec3::new(1.5, 0.0, 0.0)).length() < 1e-5);
        assert!(bolt_matrix(Vec3::ZERO, Vec3::ZERO, 1.0).is_finite());
    }

    #[test]
    fn towers_rise_from_the_hull() {
        let up = Vec3::new(1.0, 1.0, 0.0).normalize();
        let m = tower_matrix(up * 100.0, up, 1.0, 4.0);
        let top = m.transform_point3(Vec3::new(0.0, 0.5, 0.0));
        let bottom = m.transform_point3(Vec3::new(0.0, -0.5, 0.0));
        assert!((bottom - up * 100.0).length() < 1e-4);
        assert!((top - up * 104.0).length() < 1e-4);
    }

    #[test]
    fn station_mesh_keeps_all_geometry() {
        let scenery = Scenery {
            starfield: Starfield::generate(&StarfieldConfig {
                count: 4,
                ..Default::default()
            }),
            station: DeathStar::generate(DeathStarConfig {
                segments: 16,
                rings: 8,
                tower_count: 2,
                ..Default::default()
            }),
        };
        let mesh = scenery.station_mesh();
        assert_eq!(mesh.vertices.len(), scenery.station.mesh.vertices.len());
        assert_eq!(mesh.indices, scenery.station.mesh.indices);
    }
}
