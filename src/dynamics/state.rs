use std::fmt;

use serde::{Deserialize, Serialize};

use crate::physics::battery;
use crate::physics::geodesy::LatLng;

// ---------------------------------------------------------------------------
// Physical constants
// ---------------------------------------------------------------------------

pub const EARTH_RADIUS: f64 = 6_371_000.0;

// ---------------------------------------------------------------------------
// Flight modes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlightMode {
    /// Disarmed / idle ground state.
    #[default]
    Stabilize,
    /// Hold position and altitude.
    Loiter,
    /// Follow the assigned route.
    Auto,
    /// Manually steered.
    Guided,
    /// Fly back to home.
    Rtl,
    /// Controlled descent at the current position.
    Land,
}

impl FlightMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightMode::Stabilize => "STABILIZE",
            FlightMode::Loiter => "LOITER",
            FlightMode::Auto => "AUTO",
            FlightMode::Guided => "GUIDED",
            FlightMode::Rtl => "RTL",
            FlightMode::Land => "LAND",
        }
    }
}

impl fmt::Display for FlightMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Per-vehicle physics state
// ---------------------------------------------------------------------------

/// Mutable flight state owned by exactly one vehicle.
///
/// `roll` and `pitch` are cosmetic: they are kept here only so the ease/decay
/// filters have a previous value, and no invariant depends on them.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicsState {
    pub position: LatLng,
    pub altitude: f64,              // m, above ground at home
    pub heading: f64,               // deg, [0, 360)
    pub roll: f64,                  // deg, cosmetic
    pub pitch: f64,                 // deg, cosmetic
    pub ground_speed: f64,          // m/s
    pub vertical_speed: f64,        // m/s, positive up
    pub battery_percent: f64,       // [0, 100]
    pub armed: bool,
    pub mode: FlightMode,
    /// Index into the assigned route; `None` until the mission starts.
    pub active_waypoint: Option<usize>,
    pub delivery_wait_elapsed: f64, // s on the ground after delivery
    /// Set only during the post-delivery return; separates the delivery
    /// landing from the return landing.
    pub is_returning_home: bool,
    /// Delivery landing already reported for the current mission.
    pub delivered: bool,
    /// Altitude held in GUIDED, moved by the manual altitude axis.
    pub target_altitude: f64,
    /// Timestamp of the last integration step, `None` before the first tick.
    pub last_tick: Option<f64>,
}

impl PhysicsState {
    /// Disarmed on the ground at `position`, full battery.
    pub fn on_ground(position: LatLng) -> Self {
        Self {
            position,
            altitude: 0.0,
            heading: 0.0,
            roll: 0.0,
            pitch: 0.0,
            ground_speed: 0.0,
            vertical_speed: 0.0,
            battery_percent: 100.0,
            armed: false,
            mode: FlightMode::Stabilize,
            active_waypoint: None,
            delivery_wait_elapsed: 0.0,
            is_returning_home: false,
            delivered: false,
            target_altitude: 0.0,
            last_tick: None,
        }
    }

    pub fn voltage(&self) -> f64 {
        battery::voltage(self.battery_percent)
    }

    /// Active waypoint as the signed index used in telemetry (-1 = not started).
    pub fn waypoint_index(&self) -> i64 {
        self.active_waypoint.map_or(-1, |i| i as i64)
    }

    pub fn is_on_ground(&self, landed_altitude: f64) -> bool {
        self.altitude < landed_altitude
    }

    /// Clear all per-mission bookkeeping.
    pub fn reset_mission(&mut self) {
        self.active_waypoint = None;
        self.delivery_wait_elapsed = 0.0;
        self.is_returning_home = false;
        self.delivered = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_is_disarmed_and_idle() {
        let s = PhysicsState::on_ground(LatLng::new(1.0, 2.0));
        assert!(!s.armed);
        assert_eq!(s.mode, FlightMode::Stabilize);
        assert_eq!(s.waypoint_index(), -1);
        assert!((s.voltage() - battery::VOLTAGE_FULL).abs() < 1e-12);
    }

    #[test]
    fn reset_mission_clears_flags() {
        let mut s = PhysicsState::on_ground(LatLng::default());
        s.active_waypoint = Some(3);
        s.delivery_wait_elapsed = 2.5;
        s.is_returning_home = true;
        s.delivered = true;
        s.reset_mission();
        assert_eq!(s.waypoint_index(), -1);
        assert_eq!(s.delivery_wait_elapsed, 0.0);
        assert!(!s.is_returning_home);
        assert!(!s.delivered);
    }

    #[test]
    fn mode_names() {
        assert_eq!(FlightMode::Rtl.to_string(), "RTL");
        assert_eq!(FlightMode::Stabilize.to_string(), "STABILIZE");
    }
}
