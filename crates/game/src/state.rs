//! Game state: flight controller, scenery, craft model, and GPU resources.

use anyhow::Result;
use engine_core::Time;
use flight::FlightController;
use input::{FlightAction, InputState, KeyBindings};
use renderer::{Camera, LoadStatus, Mesh, MeshData, ModelLoader, PendingModel, Renderer};
use std::sync::Arc;
use winit::window::Window;

use crate::config::GameConfig;
use crate::scene::Scenery;

/// Seconds between window title refreshes while flying.
const TITLE_REFRESH: f32 = 0.25;

/// The craft's drawable, once it exists.
pub enum CraftModel {
    Loading {
        pending: PendingModel,
        last_percent: u32,
    },
    Ready {
        mesh: Mesh,
        /// True when the load failed and the stand-in cone is drawn.
        placeholder: bool,
    },
}

/// Meshes uploaded once at startup.
pub struct SceneMeshes {
    pub star: Mesh,
    pub station: Mesh,
    pub tower: Mesh,
    pub bolt: Mesh,
}

pub struct GameState {
    pub(crate) config: GameConfig,
    pub(crate) time: Time,
    pub(crate) input: InputState,
    pub(crate) bindings: KeyBindings,
    pub(crate) controller: FlightController,

    pub(crate) renderer: Renderer,
    pub(crate) camera: Camera,
    pub(crate) meshes: SceneMeshes,
    pub(crate) craft_model: CraftModel,
    pub(crate) scenery: Scenery,

    pub(crate) running: bool,
    title_timer: f32,
}

impl GameState {
    pub async fn new(window: Arc<Window>, config: GameConfig) -> Result<Self> {
        let renderer = Renderer::new(window, config.vsync).await?;
        let (width, height) = renderer.dimensions();
        let mut camera = Camera::default();
        camera.set_aspect(width, height);

        let scenery = Scenery::generate(config.scenery_seed);
        let meshes = SceneMeshes {
            star: renderer.create_mesh(&MeshData::sphere(0.5, 6, 4)),
            station: renderer.create_mesh(&scenery.station_mesh()),
            tower: renderer.create_mesh(&MeshData::cube()),
            bolt: renderer.create_mesh(&MeshData::bolt()),
        };

        let pending = ModelLoader::spawn(config.model_path.clone());
        renderer.window.set_title(&loading_title(&config, 0));

        let controller = FlightController::new(config.flight.clone());
        let rig = controller.camera();
        camera.set_pose(rig.eye, rig.look_at, rig.up);

        Ok(Self {
            time: Time::new(),
            input: InputState::new(),
            bindings: KeyBindings::default(),
            controller,
            renderer,
            camera,
            meshes,
            craft_model: CraftModel::Loading {
                pending,
                last_percent: 0,
            },
            scenery,
            running: true,
            title_timer: 0.0,
            config,
        })
    }

    /// One simulation frame.
    pub(crate) fn update(&mut self) {
        self.time.update();
        let dt = self.time.delta_seconds();

        self.poll_craft_model();

        if self.input.is_action_pressed(&self.bindings, FlightAction::Reset) && self.controller.is_flying() {
            self.controller.reset();
        }
        let controls = self.input.flight_controls(&self.bindings);
        self.controller.update(&controls, dt);

        self.scenery.update(dt);
        let rig = self.controller.camera();
        self.camera.set_pose(rig.eye, rig.look_at, rig.up);

        self.refresh_title(dt);
        self.input.begin_frame();
    }

    fn poll_craft_model(&mut self) {
        let CraftModel::Loading { pending, last_percent } = &mut self.craft_model else {
            return;
        };
        match settle_craft(pending.poll(), &mut self.controller) {
            CraftSettlement::Loading(percent) => {
                if percent != *last_percent {
                    *last_percent = percent;
                    self.renderer.window.set_title(&loading_title(&self.config, percent));
                }
            }
            CraftSettlement::Ready { mesh, placeholder } => {
                self.craft_model = CraftModel::Ready {
                    mesh: self.renderer.create_mesh(&mesh),
                    placeholder,
                };
            }
        }
    }

    fn refresh_title(&mut self, dt: f32) {
        if !self.controller.is_flying() {
            return;
        }
        self.title_timer -= dt;
        if self.title_timer > 0.0 {
            return;
        }
        self.title_timer = TITLE_REFRESH;
        let title = format!(
            "Starfighter | {:.1} u/s | {} bolts | {:.0} fps",
            self.controller.speed_per_second(),
            self.controller.projectile_count(),
            self.time.fps()
        );
        self.renderer.window.set_title(&title);
    }

    pub(crate) fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        crate::render::run(self)
    }
}

/// Where the craft load stands after one poll.
#[derive(Debug)]
pub(crate) enum CraftSettlement {
    /// Still reading; whole percent done.
    Loading(u32),
    /// Mesh data to upload. The controller has been told the craft is ready.
    Ready { mesh: MeshData, placeholder: bool },
}

/// Act on a loader status: a loaded model or, on any failure, the placeholder cone. Either way
/// the controller starts flying; a failed load is never retried.
pub(crate) fn settle_craft(status: LoadStatus, controller: &mut FlightController) -> CraftSettlement {
    let (mesh, placeholder) = match status {
        LoadStatus::Loading(progress) => return CraftSettlement::Loading((progress * 100.0).round() as u32),
        LoadStatus::Ready(model) => {
            log::info!("Craft model ready (radius {:.2})", model.radius());
            (model.mesh, false)
        }
        LoadStatus::Failed(e) => {
            log::error!("Error loading craft model: {}", e);
            log::warn!("Substituting placeholder craft");
            (renderer::placeholder(), true)
        }
    };
    controller.craft_ready();
    CraftSettlement::Ready { mesh, placeholder }
}

fn loading_title(config: &GameConfig, percent: u32) -> String {
    let name = config
        .model_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "craft".to_string());
    format!("Loading {} model... {}%", name, percent)
}
