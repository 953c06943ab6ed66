use crate::config::FlightConfig;
use crate::dynamics::kinematics;
use crate::dynamics::state::FlightMode;
use crate::gnc::guidance;
use crate::gnc::manual::{self, ControlAxes};
use crate::physics::battery;
use crate::sim::event::{EventDetector, EventKind};
use crate::vehicle::drone::{TaskId, Vehicle};

// ---------------------------------------------------------------------------
// One tick for one vehicle
// ---------------------------------------------------------------------------

/// What a vehicle's tick produced, published by the fleet after the update
/// has fully committed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TickOutcome {
    pub events: Vec<EventKind>,
    /// Task whose delivery completed this tick.
    pub completed_task: Option<TaskId>,
}

/// Wall-clock step since the vehicle's previous tick, clamped to
/// `[0, max_step]`, then scaled by the simulation speed.
pub fn sim_dt(last_tick: Option<f64>, now: f64, config: &FlightConfig) -> f64 {
    let raw = match last_tick {
        Some(prev) => (now - prev).clamp(0.0, config.max_step),
        None => 0.0,
    };
    raw * config.sim_speed
}

/// Advance one vehicle to `now`. Reads and writes nothing but `vehicle`.
pub fn step(
    vehicle: &mut Vehicle,
    now: f64,
    axes: Option<&ControlAxes>,
    config: &FlightConfig,
    detectors: &[Box<dyn EventDetector>],
) -> TickOutcome {
    let dt = sim_dt(vehicle.physics.last_tick, now, config);
    vehicle.physics.last_tick = Some(now);

    let prev = vehicle.physics.clone();
    let mut out = TickOutcome::default();

    if vehicle.physics.armed {
        let axes = axes.copied().unwrap_or_default();
        manual::preempt(&mut vehicle.physics, &axes, &mut out.events);
        if vehicle.physics.mode == FlightMode::Guided {
            manual::apply(&mut vehicle.physics, &axes, dt, config);
        }

        let target = guidance::update(vehicle, dt, config, &mut out);
        if vehicle.physics.armed {
            kinematics::integrate(&mut vehicle.physics, &target, dt, config);
        } else {
            kinematics::settle(&mut vehicle.physics, dt, config);
        }
        vehicle.physics.battery_percent =
            battery::drain(vehicle.physics.battery_percent, prev.mode, dt, config);
    } else {
        kinematics::settle(&mut vehicle.physics, dt, config);
    }

    for detector in detectors {
        if let Some(kind) = detector.check(&prev, &vehicle.physics) {
            out.events.push(kind);
        }
    }
    out
}
