use tracing::{debug, info, warn};

use crate::config::FlightConfig;
use crate::dynamics::kinematics::Target;
use crate::dynamics::state::{FlightMode, PhysicsState};
use crate::physics::geodesy;
use crate::sim::event::EventKind;
use crate::sim::integrator::TickOutcome;
use crate::vehicle::drone::{Vehicle, VehicleStatus};

// ---------------------------------------------------------------------------
// Flight-mode state machine
// ---------------------------------------------------------------------------

/// Switch modes, recording the transition. Hold modes latch the current
/// altitude as their target.
pub fn change_mode(state: &mut PhysicsState, to: FlightMode, events: &mut Vec<EventKind>) {
    if state.mode == to {
        return;
    }
    let from = state.mode;
    state.mode = to;
    if matches!(to, FlightMode::Stabilize | FlightMode::Loiter | FlightMode::Guided) {
        state.target_altitude = state.altitude;
    }
    events.push(EventKind::ModeChanged { from, to });
}

/// Evaluate one tick of mode logic for an armed vehicle and return the
/// commanded target. `dt` is simulated seconds.
pub fn update(vehicle: &mut Vehicle, dt: f64, config: &FlightConfig, out: &mut TickOutcome) -> Target {
    match vehicle.physics.mode {
        FlightMode::Stabilize | FlightMode::Loiter => Target::hold(vehicle.physics.target_altitude),
        FlightMode::Guided => Target::manual(vehicle.physics.target_altitude),
        FlightMode::Auto => auto(vehicle, dt, config, out),
        FlightMode::Rtl => rtl(vehicle, config, out),
        FlightMode::Land => land(vehicle, config, out),
    }
}

fn auto(vehicle: &mut Vehicle, dt: f64, config: &FlightConfig, out: &mut TickOutcome) -> Target {
    let len = vehicle.route.as_ref().map_or(0, |r| r.len());
    if len == 0 {
        warn!(vehicle = %vehicle.id, "AUTO without a route, switching to LOITER");
        out.events.push(EventKind::MissionMissing);
        change_mode(&mut vehicle.physics, FlightMode::Loiter, &mut out.events);
        return Target::hold(vehicle.physics.target_altitude);
    }

    let idx = match vehicle.physics.active_waypoint {
        None => {
            info!(vehicle = %vehicle.id, waypoints = len, "mission started");
            vehicle.physics.active_waypoint = Some(0);
            vehicle.status = VehicleStatus::Running;
            out.events.push(EventKind::MissionStarted { waypoints: len });
            0
        }
        Some(i) if i >= len => {
            // Route was replaced with a shorter one mid-flight
            warn!(vehicle = %vehicle.id, index = i, len, "waypoint index out of range, clamping");
            out.events.push(EventKind::WaypointClamped { index: i, len });
            vehicle.physics.active_waypoint = Some(len - 1);
            len - 1
        }
        Some(i) => i,
    };

    let Some(wp) = vehicle.route.as_ref().and_then(|r| r.get(idx)).cloned() else {
        return Target::hold(vehicle.physics.altitude);
    };

    let state = &mut vehicle.physics;
    let horizontal = geodesy::distance(&state.position, &wp.position);

    if wp.is_land() {
        // Approach at current altitude, descend only once overhead
        if horizontal >= config.waypoint_radius {
            return Target::navigate(wp.position, wp.altitude.max(state.altitude));
        }
        if !state.is_on_ground(config.landed_altitude) {
            return Target::navigate(wp.position, 0.0);
        }

        if !state.delivered {
            info!(vehicle = %vehicle.id, task = ?vehicle.task, "delivery landing");
            state.delivered = true;
            state.delivery_wait_elapsed = 0.0;
            vehicle.status = VehicleStatus::Completed;
            out.completed_task = vehicle.task.clone();
            out.events.push(EventKind::DeliveryLanded { task: vehicle.task.clone() });
        } else if state.is_returning_home {
            // Already committed to the return, e.g. AUTO re-entered mid-return
            change_mode(state, FlightMode::Rtl, &mut out.events);
        } else {
            state.delivery_wait_elapsed += dt;
            if state.delivery_wait_elapsed >= config.delivery_wait {
                info!(vehicle = %vehicle.id, "delivery wait over, returning to launch");
                state.is_returning_home = true;
                state.armed = true;
                vehicle.status = VehicleStatus::Returning;
                out.events.push(EventKind::RtlInitiated);
                change_mode(state, FlightMode::Rtl, &mut out.events);
            }
        }
        return Target::hold(0.0);
    }

    // Every other command, RETURN_TO_LAUNCH included, is a point to reach
    let vertical = (state.altitude - wp.altitude).abs();
    let reached = horizontal < config.waypoint_radius && vertical < config.waypoint_alt_tolerance;
    if reached && idx + 1 < len {
        let next_idx = idx + 1;
        state.active_waypoint = Some(next_idx);
        let next = vehicle.route.as_ref().and_then(|r| r.get(next_idx)).cloned();
        if let Some(next) = next {
            debug!(vehicle = %vehicle.id, index = next_idx, command = %next.command, "waypoint advanced");
            out.events.push(EventKind::WaypointAdvanced {
                index: next_idx,
                command: next.command,
            });
            return Target::navigate(next.position, next.altitude);
        }
    }
    Target::navigate(wp.position, wp.altitude)
}

fn rtl(vehicle: &mut Vehicle, config: &FlightConfig, out: &mut TickOutcome) -> Target {
    let state = &mut vehicle.physics;
    let to_home = geodesy::distance(&state.position, &vehicle.home);
    if to_home < config.home_radius {
        debug!(vehicle = %vehicle.id, "over home, landing");
        change_mode(state, FlightMode::Land, &mut out.events);
        return Target::hold(0.0);
    }
    Target::navigate(vehicle.home, state.altitude.max(config.rtl_altitude))
}

fn land(vehicle: &mut Vehicle, config: &FlightConfig, out: &mut TickOutcome) -> Target {
    if !vehicle.physics.is_on_ground(config.landed_altitude) {
        return Target::hold(0.0);
    }

    let state = &mut vehicle.physics;
    state.armed = false;
    state.vertical_speed = 0.0;
    out.events.push(EventKind::Landed);
    change_mode(state, FlightMode::Stabilize, &mut out.events);

    if state.is_returning_home {
        info!(vehicle = %vehicle.id, "returned home, mission complete");
        vehicle.release();
        out.events.push(EventKind::MissionComplete);
    }
    Target::hold(0.0)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::geodesy::LatLng;
    use crate::vehicle::drone::{TaskId, VehicleId};
    use crate::vehicle::route::{presets, RouteBuilder};
    use crate::vehicle::waypoint::{Command, WaypointBuilder};

    const HOME: LatLng = LatLng::new(18.5204, 73.8567);
    const DEST: LatLng = LatLng::new(18.5304, 73.8767);

    fn flying_vehicle() -> Vehicle {
        let mut v = Vehicle::new(VehicleId(1), "#4363d8", HOME);
        v.status = VehicleStatus::Dispatched;
        v.task = Some(TaskId::from("T-100"));
        v.route = Some(presets::delivery(HOME, DEST, 100.0, 5.0));
        v.physics.armed = true;
        v.physics.mode = FlightMode::Auto;
        v
    }

    #[test]
    fn auto_starts_mission_once() {
        let cfg = FlightConfig::default();
        let mut v = flying_vehicle();
        let mut out = TickOutcome::default();
        let target = update(&mut v, 0.1, &cfg, &mut out);
        assert_eq!(v.physics.active_waypoint, Some(0));
        assert_eq!(v.status, VehicleStatus::Running);
        assert!(out.events.contains(&EventKind::MissionStarted { waypoints: 5 }));
        assert_eq!(target.altitude, 100.0);

        let mut out = TickOutcome::default();
        update(&mut v, 0.1, &cfg, &mut out);
        assert!(out.events.is_empty());
    }

    #[test]
    fn takeoff_advances_at_altitude() {
        let cfg = FlightConfig::default();
        let mut v = flying_vehicle();
        v.physics.active_waypoint = Some(0);
        v.physics.altitude = 99.0;
        let mut out = TickOutcome::default();
        update(&mut v, 0.1, &cfg, &mut out);
        assert_eq!(v.physics.active_waypoint, Some(1));
        assert!(matches!(
            out.events[0],
            EventKind::WaypointAdvanced { index: 1, command: Command::Waypoint }
        ));
    }

    #[test]
    fn takeoff_waits_for_altitude() {
        let cfg = FlightConfig::default();
        let mut v = flying_vehicle();
        v.physics.active_waypoint = Some(0);
        v.physics.altitude = 50.0;
        let mut out = TickOutcome::default();
        update(&mut v, 0.1, &cfg, &mut out);
        assert_eq!(v.physics.active_waypoint, Some(0));
    }

    #[test]
    fn delivery_landing_reports_once_then_waits() {
        let cfg = FlightConfig::default();
        let mut v = flying_vehicle();
        v.physics.active_waypoint = Some(4);
        v.physics.position = DEST;
        v.physics.altitude = 0.2;

        let mut out = TickOutcome::default();
        update(&mut v, 0.5, &cfg, &mut out);
        assert_eq!(out.completed_task, Some(TaskId::from("T-100")));
        assert_eq!(v.status, VehicleStatus::Completed);
        assert!(v.physics.armed, "must stay armed during the wait");

        // 2.5 s of waiting: still on the ground in AUTO
        for _ in 0..5 {
            let mut out = TickOutcome::default();
            update(&mut v, 0.5, &cfg, &mut out);
            assert!(out.completed_task.is_none());
        }
        assert_eq!(v.physics.mode, FlightMode::Auto);

        let mut out = TickOutcome::default();
        update(&mut v, 0.5, &cfg, &mut out);
        assert_eq!(v.physics.mode, FlightMode::Rtl);
        assert!(v.physics.is_returning_home);
        assert_eq!(v.status, VehicleStatus::Returning);
        assert!(out.events.contains(&EventKind::RtlInitiated));
    }

    #[test]
    fn rtl_climbs_to_minimum_altitude() {
        let cfg = FlightConfig::default();
        let mut v = flying_vehicle();
        v.physics.mode = FlightMode::Rtl;
        v.physics.position = DEST;
        v.physics.altitude = 10.0;
        let mut out = TickOutcome::default();
        let target = update(&mut v, 0.1, &cfg, &mut out);
        assert_eq!(target, Target::navigate(HOME, cfg.rtl_altitude));

        v.physics.altitude = 80.0;
        let target = update(&mut v, 0.1, &cfg, &mut out);
        assert_eq!(target.altitude, 80.0);
    }

    #[test]
    fn rtl_switches_to_land_over_home() {
        let cfg = FlightConfig::default();
        let mut v = flying_vehicle();
        v.physics.mode = FlightMode::Rtl;
        v.physics.position = geodesy::destination(&HOME, 45.0, 3.0);
        v.physics.altitude = 50.0;
        let mut out = TickOutcome::default();
        update(&mut v, 0.1, &cfg, &mut out);
        assert_eq!(v.physics.mode, FlightMode::Land);
    }

    #[test]
    fn return_landing_releases_vehicle() {
        let cfg = FlightConfig::default();
        let mut v = flying_vehicle();
        v.physics.mode = FlightMode::Land;
        v.physics.is_returning_home = true;
        v.physics.delivered = true;
        v.physics.active_waypoint = Some(4);
        v.physics.altitude = 0.3;
        let mut out = TickOutcome::default();
        update(&mut v, 0.1, &cfg, &mut out);
        assert!(!v.physics.armed);
        assert_eq!(v.physics.mode, FlightMode::Stabilize);
        assert_eq!(v.status, VehicleStatus::Idle);
        assert!(v.route.is_none() && v.task.is_none());
        assert_eq!(v.physics.waypoint_index(), -1);
        assert!(!v.physics.is_returning_home);
        assert!(out.events.contains(&EventKind::MissionComplete));
        assert!(out.completed_task.is_none());
    }

    #[test]
    fn plain_landing_keeps_assignment() {
        let cfg = FlightConfig::default();
        let mut v = flying_vehicle();
        v.physics.mode = FlightMode::Land;
        v.physics.altitude = 0.1;
        let mut out = TickOutcome::default();
        update(&mut v, 0.1, &cfg, &mut out);
        assert!(!v.physics.armed);
        assert_eq!(v.status, VehicleStatus::Dispatched);
        assert!(v.route.is_some());
    }

    #[test]
    fn out_of_range_index_is_clamped() {
        let cfg = FlightConfig::default();
        let mut v = flying_vehicle();
        v.physics.active_waypoint = Some(7);
        let mut out = TickOutcome::default();
        update(&mut v, 0.1, &cfg, &mut out);
        assert_eq!(v.physics.active_waypoint, Some(4));
        assert!(out.events.contains(&EventKind::WaypointClamped { index: 7, len: 5 }));
    }

    #[test]
    fn auto_without_route_falls_back_to_loiter() {
        let cfg = FlightConfig::default();
        let mut v = flying_vehicle();
        v.route = None;
        v.physics.altitude = 30.0;
        let mut out = TickOutcome::default();
        let target = update(&mut v, 0.1, &cfg, &mut out);
        assert_eq!(v.physics.mode, FlightMode::Loiter);
        assert_eq!(target, Target::hold(30.0));
        assert!(out.events.contains(&EventKind::MissionMissing));
    }

    #[test]
    fn change_mode_is_idempotent() {
        let mut s = PhysicsState::on_ground(HOME);
        let mut events = Vec::new();
        change_mode(&mut s, FlightMode::Loiter, &mut events);
        change_mode(&mut s, FlightMode::Loiter, &mut events);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn return_to_launch_command_is_a_waypoint() {
        let cfg = FlightConfig::default();
        let mut v = flying_vehicle();
        v.route = Some(
            RouteBuilder::new()
                .step(WaypointBuilder::new(Command::Takeoff, HOME).altitude(100.0))
                .step(WaypointBuilder::new(Command::ReturnToLaunch, HOME).altitude(100.0))
                .step(WaypointBuilder::new(Command::Waypoint, DEST).altitude(100.0))
                .step(WaypointBuilder::new(Command::Land, DEST))
                .build(),
        );
        v.physics.active_waypoint = Some(1);
        v.physics.altitude = 100.0;
        let mut out = TickOutcome::default();
        let target = update(&mut v, 0.1, &cfg, &mut out);
        assert_eq!(v.physics.mode, FlightMode::Auto);
        assert_eq!(v.physics.active_waypoint, Some(2));
        assert_eq!(target, Target::navigate(DEST, 100.0));
        assert!(out
            .events
            .contains(&EventKind::WaypointAdvanced { index: 2, command: Command::Waypoint }));
    }

    #[test]
    fn auto_on_delivery_pad_while_returning_resumes_return() {
        let cfg = FlightConfig::default();
        let mut v = flying_vehicle();
        v.physics.active_waypoint = Some(4);
        v.physics.position = DEST;
        v.physics.delivered = true;
        v.physics.is_returning_home = true;
        v.status = VehicleStatus::Returning;
        let mut out = TickOutcome::default();
        update(&mut v, 0.1, &cfg, &mut out);
        assert_eq!(v.physics.mode, FlightMode::Rtl);
        assert!(v.physics.armed);
        assert!(out.completed_task.is_none());
    }
}
