//! Operator mode-change requests and their preconditions.
//!
//! A rejected request returns the reason and leaves the vehicle untouched.

use super::guidance::change_mode;
use crate::config::FlightConfig;
use crate::dynamics::state::FlightMode;
use crate::error::CommandRejected;
use crate::sim::event::EventKind;
use crate::vehicle::drone::{Vehicle, VehicleStatus};

pub fn arm(vehicle: &mut Vehicle, events: &mut Vec<EventKind>) -> Result<(), CommandRejected> {
    if !vehicle.gps_fix {
        return Err(CommandRejected::NoGpsFix);
    }
    if vehicle.physics.armed {
        return Ok(());
    }
    let state = &mut vehicle.physics;
    state.armed = true;
    state.target_altitude = state.altitude;
    events.push(EventKind::Armed);
    Ok(())
}

pub fn disarm(
    vehicle: &mut Vehicle,
    config: &FlightConfig,
    events: &mut Vec<EventKind>,
) -> Result<(), CommandRejected> {
    let state = &mut vehicle.physics;
    if state.altitude > config.airborne_altitude {
        return Err(CommandRejected::Airborne { altitude: state.altitude });
    }
    if !state.armed {
        return Ok(());
    }
    state.armed = false;
    state.vertical_speed = 0.0;
    state.ground_speed = 0.0;
    events.push(EventKind::Disarmed);
    change_mode(state, FlightMode::Stabilize, events);
    Ok(())
}

/// Explicit mode request from the operator.
pub fn request_mode(
    vehicle: &mut Vehicle,
    mode: FlightMode,
    events: &mut Vec<EventKind>,
) -> Result<(), CommandRejected> {
    match mode {
        FlightMode::Auto => {
            if vehicle.route.as_ref().map_or(true, |r| r.is_empty()) {
                return Err(CommandRejected::NoMission);
            }
            if !vehicle.physics.armed {
                return Err(CommandRejected::NotArmed);
            }
            // Back to the delivery pad: the ground wait runs again before RTL
            if vehicle.physics.delivered && vehicle.physics.is_returning_home {
                vehicle.physics.is_returning_home = false;
                vehicle.physics.delivery_wait_elapsed = 0.0;
                vehicle.status = VehicleStatus::Completed;
            }
        }
        FlightMode::Rtl => {
            // Operator-requested return after delivery closes the mission on landing
            if vehicle.physics.delivered {
                vehicle.physics.is_returning_home = true;
                vehicle.status = VehicleStatus::Returning;
            }
        }
        FlightMode::Guided | FlightMode::Loiter | FlightMode::Stabilize => {
            vehicle.physics.is_returning_home = false;
            vehicle.physics.delivery_wait_elapsed = 0.0;
        }
        FlightMode::Land => {}
    }
    change_mode(&mut vehicle.physics, mode, events);
    Ok(())
}
