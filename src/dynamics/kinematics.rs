use crate::config::FlightConfig;
use crate::dynamics::state::PhysicsState;
use crate::physics::geodesy::{self, LatLng};

/// Below this distance the vehicle is on top of its target and stops turning.
pub const HOLD_RADIUS: f64 = 0.5;

/// Cosmetic nose-down pitch at cruise speed, deg.
const CRUISE_PITCH: f64 = 10.0;

// ---------------------------------------------------------------------------
// Commanded target
// ---------------------------------------------------------------------------

/// Horizontal part of a command.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Horizontal {
    /// Fly toward a position at cruise speed.
    Navigate(LatLng),
    /// Stay put; ground speed decays to zero.
    Hold,
    /// Position and heading are driven by manual input this tick.
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub horizontal: Horizontal,
    pub altitude: f64,
}

impl Target {
    pub fn navigate(position: LatLng, altitude: f64) -> Self {
        Self { horizontal: Horizontal::Navigate(position), altitude }
    }

    pub fn hold(altitude: f64) -> Self {
        Self { horizontal: Horizontal::Hold, altitude }
    }

    pub fn manual(altitude: f64) -> Self {
        Self { horizontal: Horizontal::Manual, altitude }
    }
}

// ---------------------------------------------------------------------------
// Integration
// ---------------------------------------------------------------------------

/// First-order approach of `current` toward `target` at `rate` (1/s).
pub fn ease(current: f64, target: f64, rate: f64, dt: f64) -> f64 {
    current + (target - current) * (rate * dt).clamp(0.0, 1.0)
}

/// Advance an armed vehicle toward `target` over `dt` simulated seconds.
pub fn integrate(state: &mut PhysicsState, target: &Target, dt: f64, config: &FlightConfig) {
    if dt <= 0.0 {
        return;
    }
    step_vertical(state, target.altitude, dt, config);
    match target.horizontal {
        Horizontal::Navigate(position) => step_horizontal(state, &position, dt, config),
        Horizontal::Hold => hold_horizontal(state, dt, config),
        Horizontal::Manual => {}
    }
}

/// Disarmed: rates decay, nothing moves.
pub fn settle(state: &mut PhysicsState, dt: f64, config: &FlightConfig) {
    if dt <= 0.0 {
        return;
    }
    state.vertical_speed = ease(state.vertical_speed, 0.0, config.vertical_response, dt);
    if state.vertical_speed.abs() < 1e-3 {
        state.vertical_speed = 0.0;
    }
    state.ground_speed = 0.0;
    state.roll = ease(state.roll, 0.0, config.attitude_response, dt);
    state.pitch = ease(state.pitch, 0.0, config.attitude_response, dt);
}

/// Climb-rate command with a lagged response, then integrate altitude.
pub fn step_vertical(state: &mut PhysicsState, target_altitude: f64, dt: f64, config: &FlightConfig) {
    let error = target_altitude - state.altitude;
    let desired = (error * config.altitude_gain).clamp(-config.max_descent_rate, config.max_climb_rate);
    state.vertical_speed = ease(state.vertical_speed, desired, config.vertical_response, dt);

    state.altitude += state.vertical_speed * dt;
    if state.altitude <= 0.0 {
        // Ground contact
        state.altitude = 0.0;
        state.vertical_speed = state.vertical_speed.max(0.0);
    }
}

/// Bounded-rate turn toward the target bearing, then a geodesic step along
/// the new heading.
pub fn step_horizontal(state: &mut PhysicsState, target: &LatLng, dt: f64, config: &FlightConfig) {
    let remaining = geodesy::distance(&state.position, target);
    if remaining < HOLD_RADIUS {
        hold_horizontal(state, dt, config);
        return;
    }

    let desired = geodesy::bearing(&state.position, target);
    let error = geodesy::heading_error(state.heading, desired);
    let max_turn = config.turn_rate * dt;
    let turn = error.clamp(-max_turn, max_turn);
    state.heading = geodesy::wrap_360(state.heading + turn);

    // Roll follows the commanded turn, zero once aligned
    let turn_fraction = if max_turn > 0.0 { turn / max_turn } else { 0.0 };
    state.roll = ease(state.roll, config.max_bank * turn_fraction, config.attitude_response, dt);

    // Multirotor-style: no forward progress while facing away from the target,
    // and never step past it.
    let alignment = geodesy::heading_error(state.heading, desired).to_radians().cos().max(0.0);
    let speed = config.cruise_speed.min(remaining / dt) * alignment;
    state.ground_speed = speed;
    state.pitch = ease(
        state.pitch,
        -CRUISE_PITCH * speed / config.cruise_speed,
        config.attitude_response,
        dt,
    );

    if speed > 0.0 {
        state.position = geodesy::destination(&state.position, state.heading, speed * dt);
    }
}

fn hold_horizontal(state: &mut PhysicsState, dt: f64, config: &FlightConfig) {
    state.ground_speed = 0.0;
    state.roll = ease(state.roll, 0.0, config.attitude_response, dt);
    state.pitch = ease(state.pitch, 0.0, config.attitude_response, dt);
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
