//! Keyboard input handling and flight key bindings.

use std::collections::{HashMap, HashSet};

/// Manages keyboard state for the current frame.
#[derive(Debug, Default)]
pub struct InputState {
    /// Keys currently held down.
    keys_held: HashSet<KeyCode>,
    /// Keys pressed this frame.
    keys_pressed: HashSet<KeyCode>,
    /// Keys released this frame.
    keys_released: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear per-frame state. Call at the end of each frame.
    pub fn begin_frame(&mut self) {
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    /// Drop every held key (window lost focus, so release events will never arrive).
    pub fn clear(&mut self) {
        if !self.keys_held.is_empty() {
            log::debug!("Releasing {} held keys", self.keys_held.len());
        }
        self.keys_held.clear();
        self.keys_pressed.clear();
        self.keys_released.clear();
    }

    /// Process a keyboard event.
    pub fn process_keyboard(&mut self, key: KeyCode, state: ElementState) {
        match state {
            ElementState::Pressed => {
                if !self.keys_held.contains(&key) {
                    self.keys_pressed.insert(key);
                }
                self.keys_held.insert(key);
            }
            ElementState::Released => {
                self.keys_held.remove(&key);
                self.keys_released.insert(key);
            }
        }
    }

    /// Check if a key is currently held.
    pub fn is_key_held(&self, key: KeyCode) -> bool {
        self.keys_held.contains(&key)
    }

    /// Check if a key was pressed this frame.
    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Check if a key was released this frame.
    pub fn is_key_released(&self, key: KeyCode) -> bool {
        self.keys_released.contains(&key)
    }

    /// True while any key bound to `action` is held.
    pub fn is_action_held(&self, bindings: &KeyBindings, action: FlightAction) -> bool {
        bindings.keys(action).iter().any(|k| self.is_key_held(*k))
    }

    /// True if any key bound to `action` went down this frame.
    pub fn is_action_pressed(&self, bindings: &KeyBindings, action: FlightAction) -> bool {
        bindings.keys(action).iter().any(|k| self.is_key_pressed(*k))
    }

    /// Snapshot of the flight controls for this frame.
    pub fn flight_controls(&self, bindings: &KeyBindings) -> FlightControls {
        let held = |action| self.is_action_held(bindings, action);
        FlightControls {
            thrust: held(FlightAction::Thrust),
            brake: held(FlightAction::Brake),
            pitch_up: held(FlightAction::PitchUp),
            pitch_down: held(FlightAction::PitchDown),
            yaw_left: held(FlightAction::YawLeft),
            yaw_right: held(FlightAction::YawRight),
            roll_left: held(FlightAction::RollLeft),
            roll_right: held(FlightAction::RollRight),
            fire: held(FlightAction::Fire),
        }
    }
}

/// Actions the pilot can bind keys to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlightAction {
    Thrust,
    Brake,
    PitchUp,
    PitchDown,
    YawLeft,
    YawRight,
    RollLeft,
    RollRight,
    Fire,
    /// Return the craft to its spawn pose.
    Reset,
}

impl FlightAction {
    pub const ALL: [FlightAction; 10] = [
        FlightAction::Thrust,
        FlightAction::Brake,
        FlightAction::PitchUp,
        FlightAction::PitchDown,
        FlightAction::YawLeft,
        FlightAction::YawRight,
        FlightAction::RollLeft,
        FlightAction::RollRight,
        FlightAction::Fire,
        FlightAction::Reset,
    ];

    /// Short label for the controls banner.
    pub fn label(self) -> &'static str {
        match self {
            FlightAction::Thrust => "Thrust",
            FlightAction::Brake => "Brake",
            FlightAction::PitchUp => "Pitch up",
            FlightAction::PitchDown => "Pitch down",
            FlightAction::YawLeft => "Yaw left",
            FlightAction::YawRight => "Yaw right",
            FlightAction::RollLeft => "Roll left",
            FlightAction::RollRight => "Roll right",
            FlightAction::Fire => "Fire",
            FlightAction::Reset => "Reset",
        }
    }
}

/// Table mapping each flight action to the keys that trigger it.
#[derive(Debug, Clone)]
pub struct KeyBindings {
    map: HashMap<FlightAction, Vec<KeyCode>>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut map = HashMap::new();
        map.insert(FlightAction::Thrust, vec![KeyCode::KeyW]);
        map.insert(FlightAction::Brake, vec![KeyCode::KeyS]);
        map.insert(FlightAction::PitchUp, vec![KeyCode::ArrowDown]);
        map.insert(FlightAction::PitchDown, vec![KeyCode::ArrowUp]);
        map.insert(FlightAction::YawLeft, vec![KeyCode::ArrowLeft]);
        map.insert(FlightAction::YawRight, vec![KeyCode::ArrowRight]);
        map.insert(FlightAction::RollLeft, vec![KeyCode::KeyA]);
        map.insert(FlightAction::RollRight, vec![KeyCode::KeyD]);
        map.insert(FlightAction::Fire, vec![KeyCode::Space]);
        map.insert(FlightAction::Reset, vec![KeyCode::KeyR]);
        Self { map }
    }
}

impl KeyBindings {
    /// Keys bound to `action` (possibly none).
    pub fn keys(&self, action: FlightAction) -> &[KeyCode] {
        self.map.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Add one more key for `action`.
    pub fn add_key(&mut self, action: FlightAction, key: KeyCode) {
        let keys = self.map.entry(action).or_default();
        if !keys.contains(&key) {
            keys.push(key);
        }
    }

    /// Human-readable "Action: keys" lines, in a stable order.
    pub fn describe(&self) -> Vec<String> {
        FlightAction::ALL
            .iter()
            .map(|&action| {
                let keys: Vec<String> = self.keys(action).iter().map(|k| format!("{:?}", k)).collect();
                format!("{:<10} {}", action.label(), keys.join(" / "))
            })
            .collect()
    }
}

// Re-export for convenience
pub use engine_core::FlightControls;
pub use winit::event::ElementState;
pub use winit::keyboard::KeyCode;
