//! Rendering: gathers instances for stars, station, towers, craft, and bolts into one pass.

use glam::{Mat4, Vec3, Vec4};
use renderer::{DrawBatch, InstanceData};

use crate::scene::{bolt_matrix, craft_instance, hover_offset, tower_matrix};
use crate::state::{CraftModel, GameState};

const STATION_TINT: Vec4 = Vec4::new(1.0, 1.0, 1.0, 1.0);
const TOWER_TINT: Vec4 = Vec4::new(0.45, 0.46, 0.5, 1.0);
const BOLT_COLOR: Vec4 = Vec4::new(1.0, 0.15, 0.1, 1.0);
const BOLT_LENGTH: f32 = 3.0;

/// Run the frame's render pass. Called from `GameState::render()`.
pub fn run(state: &mut GameState) -> Result<(), wgpu::SurfaceError> {
    state.renderer.update_camera(&state.camera);

    let eye = state.camera.eye;
    let stars: Vec<InstanceData> = state
        .scenery
        .starfield
        .wrapped_positions(eye)
        .map(|(position, star)| {
            let b = star.brightness;
            InstanceData::emissive(
                Mat4::from_scale_rotation_translation(Vec3::splat(star.size), glam::Quat::IDENTITY, position),
                Vec4::new(b, b, b * 1.05, 1.0),
            )
        })
        .collect();

    let station_matrix = state.scenery.station_matrix();
    let station = [InstanceData::new(station_matrix, STATION_TINT)];
    let towers: Vec<InstanceData> = state
        .scenery
        .station
        .towers
        .iter()
        .map(|t| InstanceData::new(station_matrix * tower_matrix(t.base, t.up, t.width, t.height), TOWER_TINT))
        .collect();

    let bolts: Vec<InstanceData> = state
        .controller
        .projectiles()
        .map(|p| InstanceData::emissive(bolt_matrix(p.position, p.direction(), BOLT_LENGTH), BOLT_COLOR))
        .collect();

    let mut craft = Vec::new();
    let craft_mesh = match &state.craft_model {
        CraftModel::Ready { mesh, placeholder } => {
            let transform = state.controller.craft().transform();
            let hover = hover_offset(state.time.elapsed_seconds(), state.controller.craft().speed());
            craft.push(craft_instance(
                &transform,
                hover,
                *placeholder,
                state.config.model_yaw_degrees.to_radians(),
                state.config.model_scale,
            ));
            Some(mesh)
        }
        CraftModel::Loading { .. } => None,
    };

    let meshes = &state.meshes;
    let mut batches = vec![
        DrawBatch {
            mesh: &meshes.star,
            instances: &stars,
        },
        DrawBatch {
            mesh: &meshes.station,
            instances: &station,
        },
        DrawBatch {
            mesh: &meshes.tower,
            instances: &towers,
        },
        DrawBatch {
            mesh: &meshes.bolt,
            instances: &bolts,
        },
    ];
    if let Some(mesh) = craft_mesh {
        batches.push(DrawBatch {
            mesh,
            instances: &craft,
        });
    }

    state.renderer.render(&batches)
}
