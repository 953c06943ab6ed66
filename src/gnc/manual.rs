use nalgebra::Vector2;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::guidance::change_mode;
use crate::config::FlightConfig;
use crate::dynamics::kinematics::ease;
use crate::dynamics::state::{FlightMode, PhysicsState};
use crate::physics::geodesy;
use crate::sim::event::EventKind;

/// Cosmetic attitude while a translation axis is held, deg.
const MANUAL_TILT: f64 = 15.0;

// ---------------------------------------------------------------------------
// Control axes
// ---------------------------------------------------------------------------

/// Logical input actions supplied by the control source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Action {
    Up,
    Down,
    TurnLeft,
    TurnRight,
    Forward,
    Backward,
    Left,
    Right,
}

/// Current pressed/released state of every axis.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ControlAxes {
    pub up: bool,
    pub down: bool,
    pub turn_left: bool,
    pub turn_right: bool,
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

fn axis(positive: bool, negative: bool) -> f64 {
    match (positive, negative) {
        (true, false) => 1.0,
        (false, true) => -1.0,
        _ => 0.0,
    }
}

impl ControlAxes {
    pub fn set(&mut self, action: Action, pressed: bool) {
        let slot = match action {
            Action::Up => &mut self.up,
            Action::Down => &mut self.down,
            Action::TurnLeft => &mut self.turn_left,
            Action::TurnRight => &mut self.turn_right,
            Action::Forward => &mut self.forward,
            Action::Backward => &mut self.backward,
            Action::Left => &mut self.left,
            Action::Right => &mut self.right,
        };
        *slot = pressed;
    }

    pub fn with(mut self, action: Action) -> Self {
        self.set(action, true);
        self
    }

    pub fn any(&self) -> bool {
        self.up
            || self.down
            || self.turn_left
            || self.turn_right
            || self.forward
            || self.backward
            || self.left
            || self.right
    }

    /// +1 climb, -1 descend.
    pub fn throttle(&self) -> f64 {
        axis(self.up, self.down)
    }

    /// +1 clockwise.
    pub fn yaw(&self) -> f64 {
        axis(self.turn_right, self.turn_left)
    }

    /// Body-frame translation command: x forward, y right.
    pub fn translation(&self) -> Vector2<f64> {
        Vector2::new(axis(self.forward, self.backward), axis(self.right, self.left))
    }
}

// ---------------------------------------------------------------------------
// Manual control
// ---------------------------------------------------------------------------

/// Manual input always wins: any active axis drops an automated mode into
/// GUIDED and cancels a pending or in-progress return. Returns true when an
/// override happened.
pub fn preempt(state: &mut PhysicsState, axes: &ControlAxes, events: &mut Vec<EventKind>) -> bool {
    if !state.armed || !axes.any() || state.mode == FlightMode::Guided {
        return false;
    }
    let from = state.mode;
    info!(from = %from, "manual override");
    state.is_returning_home = false;
    state.delivery_wait_elapsed = 0.0;
    events.push(EventKind::ManualOverride { from });
    change_mode(state, FlightMode::Guided, events);
    true
}

/// Apply one tick of manual input in GUIDED. `dt` is simulated seconds.
pub fn apply(state: &mut PhysicsState, axes: &ControlAxes, dt: f64, config: &FlightConfig) {
    if dt <= 0.0 {
        return;
    }

    state.target_altitude =
        (state.target_altitude + axes.throttle() * config.manual_climb_rate * dt).max(0.0);
    state.heading = geodesy::wrap_360(state.heading + axes.yaw() * config.manual_yaw_rate * dt);

    let cmd = axes.translation();
    if cmd.norm() > 0.0 {
        let step = cmd.normalize() * config.manual_speed * dt;
        // Body frame -> bearing relative to the nose
        let relative = step.y.atan2(step.x).to_degrees();
        state.position = geodesy::destination(&state.position, state.heading + relative, step.norm());
        state.ground_speed = config.manual_speed;
    } else {
        state.ground_speed = 0.0;
    }

    state.pitch = ease(state.pitch, -MANUAL_TILT * cmd.x, config.attitude_response, dt);
    state.roll = ease(state.roll, MANUAL_TILT * cmd.y, config.attitude_response, dt);
}
