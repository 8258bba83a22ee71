//! Per-frame control snapshot consumed by the flight simulation.

/// Held state of every flight control for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlightControls {
    pub thrust: bool,
    pub brake: bool,
    pub pitch_up: bool,
    pub pitch_down: bool,
    pub yaw_left: bool,
    pub yaw_right: bool,
    pub roll_left: bool,
    pub roll_right: bool,
    pub fire: bool,
}

impl FlightControls {
    /// No control held.
    pub const NONE: Self = Self {
        thrust: false,
        brake: false,
        pitch_up: false,
        pitch_down: false,
        yaw_left: false,
        yaw_right: false,
        roll_left: false,
        roll_right: false,
        fire: false,
    };

    /// Pitch input in {-1, 0, 1}, positive raises the nose.
    pub fn pitch_axis(&self) -> f32 {
        axis(self.pitch_up, self.pitch_down)
    }

    /// Yaw input in {-1, 0, 1}, positive turns left.
    pub fn yaw_axis(&self) -> f32 {
        axis(self.yaw_left, self.yaw_right)
    }

    /// Roll input in {-1, 0, 1}, positive rolls left (counter-clockwise seen from behind).
    pub fn roll_axis(&self) -> f32 {
        axis(self.roll_left, self.roll_right)
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opposing_controls_cancel() {
        let controls = FlightControls {
            roll_left: true,
            roll_right: true,
            ..FlightControls::NONE
        };
        assert_eq!(controls.roll_axis(), 0.0);
    }

    #[test]
    fn axes_follow_held_side() {
        let controls = FlightControls {
            pitch_up: true,
            yaw_right: true,
            ..FlightControls::NONE
        };
        assert_eq!(controls.pitch_axis(), 1.0);
        assert_eq!(controls.yaw_axis(), -1.0);
        assert_eq!(FlightControls::default(), FlightControls::NONE);
    }
}
