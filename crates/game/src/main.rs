//! Starfighter: fly a starfighter through a starfield past a battle station.

mod config;
mod events;
mod render;
mod scene;
mod state;

pub use state::GameState;

use anyhow::Result;
use input::KeyBindings;
use std::sync::Arc;
use winit::{
    application::ApplicationHandler,
    event::WindowEvent,
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Fullscreen, Window, WindowId},
};

struct App {
    state: Option<GameState>,
}

impl App {
    fn new() -> Self {
        Self { state: None }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_none() {
            let config = config::GameConfig::load();
            let window_attrs = Window::default_attributes()
                .with_title("Starfighter")
                .with_inner_size(winit::dpi::LogicalSize::new(config.window_width, config.window_height))
                .with_fullscreen(config.fullscreen.then_some(Fullscreen::Borderless(None)));

            let window = match event_loop.create_window(window_attrs) {
                Ok(w) => Arc::new(w),
                Err(e) => {
                    log::error!("Failed to create window: {}", e);
                    event_loop.exit();
                    return;
                }
            };

            let state = pollster::block_on(GameState::new(window.clone(), config));
            match state {
                Ok(s) => {
                    self.state = Some(s);
                    window.request_redraw();
                }
                Err(e) => {
                    log::error!("Failed to initialize game: {}", e);
                    event_loop.exit();
                }
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _id: WindowId, event: WindowEvent) {
        if let Some(state) = &mut self.state {
            if state.handle_window_event(event) || !state.running {
                event_loop.exit();
            }
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    println!("╔══════════════════════════════════════════╗");
    println!("║               STARFIGHTER                ║");
    println!("╠══════════════════════════════════════════╣");
    println!("║  CONTROLS:                               ║");
    for line in KeyBindings::default().describe() {
        println!("║    {:<38}║", line);
    }
    println!("║    {:<38}║", "Quit       Escape");
    println!("╚══════════════════════════════════════════╝");

    log::info!("Starting Starfighter");

    let event_loop = EventLoop::new()?;
    // Poll so redraws run back to back; the controller scales by frame time
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new();
    event_loop.run_app(&mut app)?;

    Ok(())
}
