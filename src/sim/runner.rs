use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;
use tracing::debug;

use super::fleet::{FleetCoordinator, FleetObserver};
use crate::vehicle::drone::{Telemetry, VehicleId};

// ---------------------------------------------------------------------------
// Recorded samples
// ---------------------------------------------------------------------------

/// Telemetry of one vehicle after one tick.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickRecord {
    pub time: f64,
    pub vehicle: VehicleId,
    pub telemetry: Telemetry,
    /// Active waypoint index, -1 when none.
    pub waypoint: i64,
}

// ---------------------------------------------------------------------------
// Fixed-cadence driver
// ---------------------------------------------------------------------------

/// Drives `FleetCoordinator::tick` on a synthetic clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Runner {
    pub start: f64,    // s, timestamp of the first tick
    pub cadence: f64,  // s between ticks
    pub max_time: f64, // s after `start` before giving up
}

impl Default for Runner {
    fn default() -> Self {
        Self { start: 0.0, cadence: 0.05, max_time: 3_600.0 }
    }
}

impl Runner {
    pub fn new(cadence: f64, max_time: f64) -> Self {
        Self { cadence, max_time, ..Self::default() }
    }

    /// Tick until `stop` returns true or `max_time` runs out. `stop` is checked
    /// after every tick, so a cancellation never splits a vehicle update.
    pub fn run_until<O, F>(&self, fleet: &mut FleetCoordinator<O>, mut stop: F) -> Vec<TickRecord>
    where
        O: FleetObserver,
        F: FnMut(&FleetCoordinator<O>) -> bool,
    {
        let mut records = Vec::new();
        if self.cadence <= 0.0 {
            return records;
        }

        let steps = (self.max_time / self.cadence).ceil() as u64;
        for i in 0..=steps {
            let now = self.start + i as f64 * self.cadence;
            let ticked: Vec<VehicleId> =
                fleet.vehicles().filter(|v| v.is_active()).map(|v| v.id).collect();

            fleet.tick(now);

            for id in ticked {
                if let Some(v) = fleet.vehicle(id) {
                    records.push(TickRecord {
                        time: now,
                        vehicle: id,
                        telemetry: v.telemetry.clone(),
                        waypoint: v.physics.waypoint_index(),
                    });
                }
            }
            if stop(fleet) {
                debug!(t = now, ticks = i + 1, "runner stopped");
                break;
            }
        }
        records
    }

    /// Tick until no vehicle has a mission or running motors.
    pub fn run_until_idle<O: FleetObserver>(&self, fleet: &mut FleetCoordinator<O>) -> Vec<TickRecord> {
        self.run_until(fleet, |f| f.vehicles().all(|v| !v.is_active()))
    }
}

/// Tick against the wall clock until `cancel` is raised or `max_ticks` have
/// run. Timestamps continue from `fleet.clock()`. Returns the number of ticks
/// performed.
pub fn run_realtime<O: FleetObserver>(
    fleet: &mut FleetCoordinator<O>,
    cadence: Duration,
    cancel: &AtomicBool,
    max_ticks: usize,
) -> usize {
    let offset = fleet.clock();
    let origin = Instant::now();
    let mut ticks = 0;
    while ticks < max_ticks && !cancel.load(Ordering::Relaxed) {
        fleet.tick(offset + origin.elapsed().as_secs_f64());
        ticks += 1;
        thread::sleep(cadence);
    }
    ticks
}
