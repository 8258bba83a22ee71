//! Craft model loading: glTF/GLB flattened into one coloured mesh, off the frame thread.
//!
//! [`ModelLoader::spawn`] reads the file on a background thread, publishing
//! [`LoadEvent::Progress`] while bytes arrive and then exactly one terminal event.
//! The frame loop polls the returned [`PendingModel`] without blocking.

use crate::mesh::MeshData;
use crate::vertex::Vertex;
use glam::{Mat4, Vec3, Vec4};
use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use thiserror::Error;

const READ_CHUNK: usize = 64 * 1024;

/// Why a model could not be produced.
#[derive(Debug, Error)]
pub enum AssetLoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse glTF {path}: {source}")]
    Gltf {
        path: PathBuf,
        #[source]
        source: gltf::Error,
    },
    #[error("{path} contains no triangle geometry")]
    NoGeometry { path: PathBuf },
    #[error("loader for {path} stopped before finishing")]
    LoaderStopped { path: PathBuf },
}

/// A loaded model in model space.
#[derive(Debug, Clone)]
pub struct ModelData {
    pub mesh: MeshData,
    pub source: PathBuf,
}

impl ModelData {
    /// Distance from the origin to the farthest vertex.
    pub fn radius(&self) -> f32 {
        self.mesh
            .vertices
            .iter()
            .map(|v| Vec3::from(v.position).length())
            .fold(0.0, f32::max)
    }
}

/// Messages from the loader thread.
#[derive(Debug)]
pub enum LoadEvent {
    /// Fraction of the file read, 0..=1.
    Progress(f32),
    Ready(ModelData),
    Failed(AssetLoadError),
}

/// Result of polling a [`PendingModel`].
#[derive(Debug)]
pub enum LoadStatus {
    Loading(f32),
    Ready(ModelData),
    Failed(AssetLoadError),
}

/// Starts background model loads.
pub struct ModelLoader;

impl ModelLoader {
    pub fn spawn(path: impl Into<PathBuf>) -> PendingModel {
        let path = path.into();
        let (sender, receiver) = mpsc::channel();
        let thread_path = path.clone();
        let spawned = std::thread::Builder::new()
            .name("model-loader".into())
            .spawn(move || {
                // Send failures mean the PendingModel was dropped; nothing to report to
                let result = load_model(&thread_path, |p| {
                    let _ = sender.send(LoadEvent::Progress(p));
                });
                let _ = sender.send(match result {
                    Ok(model) => LoadEvent::Ready(model),
                    Err(e) => LoadEvent::Failed(e),
                });
            });
        if let Err(e) = spawned {
            log::error!("Could not start model loader thread: {}", e);
        }
        log::info!("Loading model {}", path.display());
        PendingModel {
            receiver,
            path,
            progress: 0.0,
        }
    }
}

/// Handle to an in-flight load.
pub struct PendingModel {
    receiver: Receiver<LoadEvent>,
    path: PathBuf,
    progress: f32,
}

impl PendingModel {
    /// Drain pending events without blocking. Returns the terminal status once; drop the handle
    /// after that.
    pub fn poll(&mut self) -> LoadStatus {
        loop {
            match self.receiver.try_recv() {
                Ok(LoadEvent::Progress(p)) => self.progress = p.clamp(0.0, 1.0),
                Ok(LoadEvent::Ready(model)) => return LoadStatus::Ready(model),
                Ok(LoadEvent::Failed(e)) => return LoadStatus::Failed(e),
                Err(TryRecvError::Empty) => return LoadStatus::Loading(self.progress),
                Err(TryRecvError::Disconnected) => {
                    return LoadStatus::Failed(AssetLoadError::LoaderStopped {
                        path: self.path.clone(),
                    })
                }
            }
        }
    }

    /// Block until the load finishes.
    pub fn wait(self) -> Result<ModelData, AssetLoadError> {
        for event in self.receiver.iter() {
            match event {
                LoadEvent::Progress(_) => {}
                LoadEvent::Ready(model) => return Ok(model),
                LoadEvent::Failed(e) => return Err(e),
            }
        }
        Err(AssetLoadError::LoaderStopped { path: self.path })
    }
}

/// Load and flatten a glTF/GLB file, reporting read progress.
pub fn load_model(path: &Path, mut progress: impl FnMut(f32)) -> Result<ModelData, AssetLoadError> {
    let bytes = read_with_progress(path, &mut progress)?;
    let mesh = parse_model(&bytes, path)?;
    log::info!(
        "Loaded {} ({} vertices, {} triangles)",
        path.display(),
        mesh.vertices.len(),
        mesh.triangle_count()
    );
    Ok(ModelData {
        mesh,
        source: path.to_path_buf(),
    })
}

fn read_with_progress(path: &Path, progress: &mut impl FnMut(f32)) -> Result<Vec<u8>, AssetLoadError> {
    let io_err = |source| AssetLoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    let mut file = File::open(path).map_err(io_err)?;
    let total = file.metadata().map(|m| m.len()).unwrap_or(0);
    let mut bytes = Vec::with_capacity(total as usize);
    let mut chunk = vec![0u8; READ_CHUNK];
    loop {
        let n = match file.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(io_err(e)),
        };
        bytes.extend_from_slice(&chunk[..n]);
        if total > 0 {
            progress((bytes.len() as f32 / total as f32).min(1.0));
        }
    }
    progress(1.0);
    Ok(bytes)
}

fn parse_model(bytes: &[u8], path: &Path) -> Result<MeshData, AssetLoadError> {
    let gltf_err = |source| AssetLoadError::Gltf {
        path: path.to_path_buf(),
        source,
    };
    let gltf = gltf::Gltf::from_slice(bytes).map_err(gltf_err)?;
    let buffers =
        gltf::import_buffers(&gltf.document, path.parent(), gltf.blob.clone()).map_err(gltf_err)?;

    let mut mesh = MeshData::new();
    let document = &gltf.document;
    match document.default_scene().or_else(|| document.scenes().next()) {
        Some(scene) => {
            for node in scene.nodes() {
                append_node(&node, Mat4::IDENTITY, &buffers, &mut mesh);
            }
        }
        None => {
            for m in document.meshes() {
                append_mesh(&m, Mat4::IDENTITY, &buffers, &mut mesh);
            }
        }
    }

    if mesh.indices.is_empty() {
        return Err(AssetLoadError::NoGeometry {
            path: path.to_path_buf(),
        });
    }
    Ok(mesh)
}

fn append_node(node: &gltf::Node, parent: Mat4, buffers: &[gltf::buffer::Data], out: &mut MeshData) {
    let world = parent * Mat4::from_cols_array_2d(&node.transform().matrix());
    if let Some(m) = node.mesh() {
        append_mesh(&m, world, buffers, out);
    }
    for child in node.children() {
        append_node(&child, world, buffers, out);
    }
}

fn append_mesh(mesh: &gltf::Mesh, world: Mat4, buffers: &[gltf::buffer::Data], out: &mut MeshData) {
    for prim in mesh.primitives() {
        if prim.mode() != gltf::mesh::Mode::Triangles {
            log::debug!("Skipping non-triangle primitive {:?}", prim.mode());
            continue;
        }
        let reader = prim.reader(|b| buffers.get(b.index()).map(|data| data.0.as_slice()));
        let positions: Vec<[f32; 3]> = match reader.read_positions() {
            Some(it) => it.collect(),
            None => continue,
        };
        let count = positions.len();
        let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|it| it.collect());
        let colors: Option<Vec<[f32; 4]>> = reader.read_colors(0).map(|c| c.into_rgba_f32().collect());
        let base_color = Vec4::from(prim.material().pbr_metallic_roughness().base_color_factor());

        let indices: Vec<u32> = match reader.read_indices() {
            Some(it) => it.into_u32().collect(),
            None => (0..count as u32).collect(),
        };
        // Drop triangles that reference vertices the primitive does not have
        let indices: Vec<u32> = indices
            .chunks_exact(3)
            .filter(|tri| tri.iter().all(|&i| (i as usize) < count))
            .flatten()
            .copied()
            .collect();

        let mut part = MeshData::new();
        part.vertices = positions
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let normal = normals.as_ref().and_then(|n| n.get(i)).copied().unwrap_or([0.0; 3]);
                let color = colors
                    .as_ref()
                    .and_then(|c| c.get(i))
                    .map_or(base_color, |c| Vec4::from(*c) * base_color);
                Vertex::with_color(*p, normal, color.to_array())
            })
            .collect();
        part.indices = indices;
        if normals.is_none() {
            accumulate_normals(&mut part);
        }
        part.transform(world);
        out.append(&part);
    }
}

/// Area-weighted vertex normals for primitives that ship without them.
fn accumulate_normals(mesh: &mut MeshData) {
    let mut accum = vec![Vec3::ZERO; mesh.vertices.len()];
    for tri in mesh.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
        let pa = Vec3::from(mesh.vertices[a].position);
        let face = (Vec3::from(mesh.vertices[b].position) - pa).cross(Vec3::from(mesh.vertices[c].position) - pa);
        accum[a] += face;
        accum[b] += face;
        accum[c] += face;
    }
    for (v, n) in mesh.vertices.iter_mut().zip(accum) {
        v.normal = n.normalize_or_zero().to_array();
    }
}

/// Stand-in craft when the model cannot be loaded: a red four-sided cone pointing along -Z.
pub fn placeholder() -> MeshData {
    let mut cone = MeshData::cone(0.5, 1.0, 4, [1.0, 0.0, 0.0, 1.0]);
    cone.transform(Mat4::from_rotation_x(-std::f32::consts::FRAC_PI_2));
    cone
}

#[cfg(test)]
mod tests {
    use super::*;

    // One triangle, translated +5 on Z by its node, red material, no normals.
    const TRIANGLE_GLTF: &str = r#"{
        "asset": {"version": "2.0"},
        "scene": 0,
        "scenes": [{"nodes": [0]}],
        "nodes": [{"mesh": 0, "translation": [0.0, 0.0, 5.0]}],
        "meshes": [{"primitives": [{"attributes": {"POSITION": 0}, "material": 0}]}],
        "materials": [{"pbrMetallicRoughness": {"baseColorFactor": [1.0, 0.0, 0.0, 1.0]}}],
        "buffers": [{"byteLength": 36, "uri": "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAACAPwAAAAAAAAAAAAAAAAAAgD8AAAAA"}],
        "bufferViews": [{"buffer": 0, "byteLength": 36}],
        "accessors": [{"bufferView": 0, "componentType": 5126, "count": 3, "type": "VEC3",
                       "min": [0.0, 0.0, 0.0], "max": [1.0, 1.0, 0.0]}]
    }"#;

    fn temp_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("starfighter-{}-{}", std::process::id(), name));
        std::fs::write(&path, contents).expect("write temp file");
        path
    }

    #[test]
    fn missing_file_fails_with_io() {
        let pending = ModelLoader::spawn("/definitely/not/here/X-wing.glb");
        assert!(matches!(pending.wait(), Err(AssetLoadError::Io { .. })));
    }

    #[test]
    fn non_gltf_file_fails_to_parse() {
        let path = temp_file("garbage.glb", b"this is not a model");
        let result = ModelLoader::spawn(&path).wait();
        assert!(matches!(result, Err(AssetLoadError::Gltf { .. })));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn empty_document_has_no_geometry() {
        let path = temp_file("empty.gltf", br#"{"asset": {"version": "2.0"}}"#);
        let result = load_model(&path, |_| {});
        assert!(matches!(result, Err(AssetLoadError::NoGeometry { .. })));
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn triangle_is_flattened_with_node_transform_and_colour() {
        let path = temp_file("triangle.gltf", TRIANGLE_GLTF.as_bytes());
        let mut reported = Vec::new();
        let model = load_model(&path, |p| reported.push(p)).expect("load triangle");
        let _ = std::fs::remove_file(path);

        assert_eq!(model.mesh.vertices.len(), 3);
        assert_eq!(model.mesh.indices, vec![0, 1, 2]);
        for v in &model.mesh.vertices {
            assert!((v.position[2] - 5.0).abs() < 1e-6);
            assert_eq!(v.color, [1.0, 0.0, 0.0, 1.0]);
            assert!((Vec3::from(v.normal) - Vec3::Z).length() < 1e-5);
        }
        assert!(reported.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(reported.last().copied(), Some(1.0));
    }

    #[test]
    fn pending_model_reports_ready_once_loaded() {
        let path = temp_file("pending.gltf", TRIANGLE_GLTF.as_bytes());
        let mut pending = ModelLoader::spawn(&path);
        let status = loop {
            match pending.poll() {
                LoadStatus::Loading(p) => {
                    assert!((0.0..=1.0).contains(&p));
                    std::thread::yield_now();
                }
                other => break other,
            }
        };
        let _ = std::fs::remove_file(path);
        assert!(matches!(status, LoadStatus::Ready(ref m) if m.mesh.triangle_count() == 1));
    }

    #[test]
    fn placeholder_points_forward() {
        let mesh = placeholder();
        let (min, max) = mesh.bounds();
        assert!((min.z + 0.5).abs() < 1e-5 && (max.z - 0.5).abs() < 1e-5);
        // Apex is the only vertex at the front
        let front = mesh.vertices.iter().filter(|v| v.position[2] < -0.49).count();
        assert!(front > 0);
        assert!(mesh.vertices.iter().filter(|v| v.position[2] < -0.49).all(|v| v.position[0].abs() < 1e-5));
    }
}
