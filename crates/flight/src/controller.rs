//! Per-frame flight and weapons update.
//!
//! [`step`] is a pure function over [`FlightState`]: given held controls and the frame delta it
//! advances thrust, attitude, position, the chase camera, and the blaster bolts in that order.
//! [`FlightController`] wraps it with the configuration and the load gate: nothing moves until
//! the craft model has resolved.

use engine_core::{reference_frames, FlightControls};

use crate::camera_rig::CameraRig;
use crate::config::{FlightConfig, IntegrationMode};
use crate::craft::CraftState;
use crate::weapons::{Blasters, Projectile};

/// Whether the craft exists yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerMode {
    /// Model still loading; updates are no-ops.
    AwaitingCraft,
    Flying,
}

/// What happened during one update.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameOutcome {
    /// Bolts created this frame (one per muzzle when a volley fires).
    pub spawned: usize,
    /// Bolts dropped because the buffer was full.
    pub evicted: usize,
    /// Bolts culled for being too far from the camera.
    pub retired: usize,
}

impl FrameOutcome {
    pub fn fired(&self) -> bool {
        self.spawned > 0
    }
}

/// Everything the per-frame update mutates.
#[derive(Debug, Clone)]
pub struct FlightState {
    pub craft: CraftState,
    pub camera: CameraRig,
    pub blasters: Blasters,
    /// Seconds of flight since spawn.
    pub clock: f32,
}

impl FlightState {
    /// Fresh state at the configured spawn point with the camera already in place.
    pub fn spawn(config: &FlightConfig) -> Self {
        let craft = CraftState::at(config.spawn_position);
        Self {
            camera: CameraRig::behind(&craft, &config.camera),
            craft,
            blasters: Blasters::new(config.weapons.max_projectiles),
            clock: 0.0,
        }
    }
}

/// Advance `state` by one frame of `dt` seconds.
pub fn step(state: &mut FlightState, config: &FlightConfig, controls: &FlightControls, dt: f32) -> FrameOutcome {
    let dt = dt.max(0.0);
    let frames = match config.integration {
        IntegrationMode::DeltaScaled => reference_frames(dt),
        IntegrationMode::PerFrame => 1.0,
    };
    state.clock += dt;
    state.blasters.tick_cooldown(dt);

    state.craft.apply_throttle(controls, &config.handling, frames);
    state.craft.steer(controls, &config.handling, frames);
    state.craft.integrate(config.flight_model, frames);

    state.camera.follow(&state.craft, &config.camera, frames);

    let mut outcome = FrameOutcome::default();
    if controls.fire {
        let volley = state
            .blasters
            .try_fire(&state.craft.transform(), &config.weapons, state.clock);
        outcome.spawned = volley.spawned;
        outcome.evicted = volley.evicted;
    }

    state.blasters.advance(frames);
    outcome.retired = state
        .blasters
        .retire_beyond(state.camera.eye, config.weapons.projectile_cutoff);
    outcome
}

/// Owns the flight state and gates it on the craft being loaded.
pub struct FlightController {
    config: FlightConfig,
    mode: ControllerMode,
    state: FlightState,
}

impl FlightController {
    pub fn new(config: FlightConfig) -> Self {
        let config = config.sanitized();
        let state = FlightState::spawn(&config);
        Self {
            config,
            mode: ControllerMode::AwaitingCraft,
            state,
        }
    }

    /// The craft model resolved (loaded or substituted); start flying.
    pub fn craft_ready(&mut self) {
        if self.mode == ControllerMode::AwaitingCraft {
            log::info!("Craft ready at {:?}", self.state.craft.position);
            self.mode = ControllerMode::Flying;
        }
    }

    pub fn mode(&self) -> ControllerMode {
        self.mode
    }

    pub fn is_flying(&self) -> bool {
        self.mode == ControllerMode::Flying
    }

    /// Run one frame. Does nothing while awaiting the craft.
    pub fn update(&mut self, controls: &FlightControls, dt: f32) -> FrameOutcome {
        match self.mode {
            ControllerMode::AwaitingCraft => FrameOutcome::default(),
            ControllerMode::Flying => step(&mut self.state, &self.config, controls, dt),
        }
    }

    /// Back to the spawn pose: at rest, level, no bolts in flight.
    pub fn reset(&mut self) {
        log::info!("Craft reset to spawn");
        self.state = FlightState::spawn(&self.config);
    }

    pub fn config(&self) -> &FlightConfig {
        &self.config
    }

    pub fn state(&self) -> &FlightState {
        &self.state
    }

    pub fn craft(&self) -> &CraftState {
        &self.state.craft
    }

    pub fn camera(&self) -> &CameraRig {
        &self.state.camera
    }

    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> {
        self.state.blasters.iter()
    }

    pub fn projectile_count(&self) -> usize {
        self.state.blasters.len()
    }

    /// Speed in units per second (velocity is stored per reference frame).
    pub fn speed_per_second(&self) -> f32 {
        self.state.craft.speed() * 60.0
    }
}
