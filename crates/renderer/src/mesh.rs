//! Mesh data structures and primitive generation.

use crate::vertex::Vertex;
use glam::{Mat3, Mat4, Vec3};
use std::f32::consts::{PI, TAU};
use wgpu::util::DeviceExt;

/// A GPU mesh with vertex and index buffers.
pub struct Mesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub num_indices: u32,
}

impl Mesh {
    /// Create a mesh from vertex and index data.
    pub fn new(device: &wgpu::Device, vertices: &[Vertex], indices: &[u32]) -> Self {
        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Vertex Buffer"),
            contents: bytemuck::cast_slice(vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });

        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Index Buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            vertex_buffer,
            index_buffer,
            num_indices: indices.len() as u32,
        }
    }
}

/// Mesh data before GPU upload (primitives, loaded models, procedural scenery).
#[derive(Debug, Clone, Default)]
pub struct MeshData {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload(&self, device: &wgpu::Device) -> Mesh {
        Mesh::new(device, &self.vertices, &self.indices)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Append another mesh, rebasing its indices.
    pub fn append(&mut self, other: &MeshData) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| base + i));
    }

    /// Bake `matrix` into positions and normals.
    pub fn transform(&mut self, matrix: Mat4) {
        let normal_matrix = Mat3::from_mat4(matrix).inverse().transpose();
        for v in &mut self.vertices {
            v.position = matrix.transform_point3(Vec3::from(v.position)).to_array();
            v.normal = (normal_matrix * Vec3::from(v.normal))
                .normalize_or_zero()
                .to_array();
        }
    }

    /// Axis-aligned bounds as (min, max); zero for an empty mesh.
    pub fn bounds(&self) -> (Vec3, Vec3) {
        let mut iter = self.vertices.iter().map(|v| Vec3::from(v.position));
        let Some(first) = iter.next() else {
            return (Vec3::ZERO, Vec3::ZERO);
        };
        iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)))
    }

    /// Unit cube centered at origin.
    pub fn cube() -> Self {
        let faces: [(Vec3, Vec3, Vec3); 6] = [
            (Vec3::Z, Vec3::X, Vec3::Y),
            (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
            (Vec3::Y, Vec3::X, Vec3::NEG_Z),
            (Vec3::NEG_Y, Vec3::X, Vec3::Z),
            (Vec3::X, Vec3::NEG_Z, Vec3::Y),
            (Vec3::NEG_X, Vec3::Z, Vec3::Y),
        ];
        let mut mesh = Self::new();
        for (normal, right, up) in faces {
            let base = mesh.vertices.len() as u32;
            let center = normal * 0.5;
            for (sx, sy) in [(-0.5, -0.5), (0.5, -0.5), (0.5, 0.5), (-0.5, 0.5)] {
                let p = center + right * sx + up * sy;
                mesh.vertices.push(Vertex::new(p.to_array(), normal.to_array()));
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
        }
        mesh
    }

    /// UV sphere.
    pub fn sphere(radius: f32, segments: u32, rings: u32) -> Self {
        let segments = segments.max(3);
        let rings = rings.max(2);
        let mut mesh = Self::new();

        for ring in 0..=rings {
            let phi = PI * ring as f32 / rings as f32;
            for segment in 0..=segments {
                let theta = TAU * segment as f32 / segments as f32;
                let normal = Vec3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
                mesh.vertices
                    .push(Vertex::new((normal * radius).to_array(), normal.to_array()));
            }
        }

        for ring in 0..rings {
            for segment in 0..segments {
                let current = ring * (segments + 1) + segment;
                let next = current + segments + 1;
                mesh.indices
                    .extend_from_slice(&[current, next, current + 1, current + 1, next, next + 1]);
            }
        }
        mesh
    }

    /// Cone along +Y, base centred at y = -height/2, flat-shaded.
    pub fn cone(radius: f32, height: f32, sides: u32, color: [f32; 4]) -> Self {
        let sides = sides.max(3);
        let apex = Vec3::new(0.0, height * 0.5, 0.0);
        let base_y = -height * 0.5;
        let rim = |i: u32| {
            let a = TAU * i as f32 / sides as f32;
            Vec3::new(radius * a.cos(), base_y, radius * a.sin())
        };

        let mut mesh = Self::new();
        for i in 0..sides {
            let (a, b) = (rim(i), rim(i + 1));
            // Side: apex, b, a winds outward
            let normal = (b - apex).cross(a - apex).normalize_or(Vec3::Y);
            let base = mesh.vertices.len() as u32;
            for p in [apex, b, a] {
                mesh.vertices
                    .push(Vertex::with_color(p.to_array(), normal.to_array(), color));
            }
            mesh.indices.extend_from_slice(&[base, base + 1, base + 2]);

            // Base cap
            let center = Vec3::new(0.0, base_y, 0.0);
            let base = mesh.vertices.len() as u32;
            for p in [center, a, b] {
                mesh.vertices
                    .push(Vertex::with_color(p.to_array(), [0.0, -1.0, 0.0], color));
            }
            mesh.indices.extend_from_slice(&[base, base + 1, base + 2]);
        }
        mesh
    }

    /// Blaster bolt: an elongated diamond along -Z (the direction of travel), unit length.
    pub fn bolt() -> Self {
        let front = Vec3::new(0.0, 0.0, -0.5);
        let back = Vec3::new(0.0, 0.0, 0.5);
        let ring = [
            Vec3::new(0.0, 0.08, 0.0),
            Vec3::new(0.08, 0.0, 0.0),
            Vec3::new(0.0, -0.08, 0.0),
            Vec3::new(-0.08, 0.0, 0.0),
        ];

        let mut mesh = Self::new();
        for i in 0..ring.len() {
            let (a, b) = (ring[i], ring[(i + 1) % ring.len()]);
            for tip in [front, back] {
                let mut normal = (a - tip).cross(b - tip).normalize_or_zero();
                let mid = (a + b + tip) / 3.0;
                if normal.dot(mid) < 0.0 {
                    normal = -normal;
                }
                let base = mesh.vertices.len() as u32;
                for p in [tip, a, b] {
                    mesh.vertices.push(Vertex::new(p.to_array(), normal.to_array()));
                }
                mesh.indices.extend_from_slice(&[base, base + 1, base + 2]);
            }
        }
        mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_valid(mesh: &MeshData) {
        assert!(!mesh.indices.is_empty());
        assert_eq!(mesh.indices.len() % 3, 0);
        let n = mesh.vertices.len() as u32;
        assert!(mesh.indices.iter().all(|&i| i < n));
    }

    #[test]
    fn primitives_are_well_formed() {
        assert_valid(&MeshData::cube());
        assert_valid(&MeshData::sphere(1.0, 16, 8));
        assert_valid(&MeshData::cone(0.5, 1.0, 4, [1.0, 0.0, 0.0, 1.0]));
        assert_valid(&MeshData::bolt());
    }

    #[test]
    fn cube_spans_unit_bounds() {
        let (min, max) = MeshData::cube().bounds();
        assert_eq!(min, Vec3::splat(-0.5));
        assert_eq!(max, Vec3::splat(0.5));
        assert_eq!(MeshData::cube().triangle_count(), 12);
    }

    #[test]
    fn placeholder_cone_matches_dimensions() {
        let cone = MeshData::cone(0.5, 1.0, 4, [1.0, 0.0, 0.0, 1.0]);
        let (min, max) = cone.bounds();
        assert!((max.y - min.y - 1.0).abs() < 1e-6);
        assert!((max.x - 0.5).abs() < 1e-6);
        assert!(cone.vertices.iter().all(|v| v.color == [1.0, 0.0, 0.0, 1.0]));
        // Side normals face away from the axis
        for v in cone.vertices.iter().filter(|v| v.normal[1] > -0.99) {
            let p = Vec3::from(v.position);
            let n = Vec3::from(v.normal);
            assert!(Vec3::new(n.x, 0.0, n.z).dot(Vec3::new(p.x, 0.0, p.z)) >= -1e-6);
        }
    }

    #[test]
    fn append_rebases_indices() {
        let mut mesh = MeshData::cube();
        let count = mesh.vertices.len() as u32;
        mesh.append(&MeshData::cube());
        assert_valid(&mesh);
        assert_eq!(mesh.indices[36], count);
    }

    #[test]
    fn transform_moves_bounds() {
        let mut mesh = MeshData::cube();
        mesh.transform(Mat4::from_translation(Vec3::new(10.0, 0.0, 0.0)) * Mat4::from_scale(Vec3::splat(2.0)));
        let (min, max) = mesh.bounds();
        assert!((min - Vec3::new(9.0, -1.0, -1.0)).length() < 1e-5);
        assert!((max - Vec3::new(11.0, 1.0, 1.0)).length() < 1e-5);
        assert!(mesh.vertices.iter().all(|v| (Vec3::from(v.normal).length() - 1.0).abs() < 1e-5));
    }
}
