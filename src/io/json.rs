use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::physics::geodesy;
use crate::sim::runner::TickRecord;
use crate::vehicle::drone::{VehicleId, VehicleStatus};

/// Summary statistics of one vehicle's recorded flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissionSummary {
    pub vehicle: VehicleId,
    pub samples: usize,
    pub max_altitude_m: f64,
    pub max_speed_ms: f64,
    pub distance_flown_m: f64,
    pub flight_time_s: f64,
    pub battery_used_percent: f64,
    pub final_status: VehicleStatus,
}

impl MissionSummary {
    /// Compute the summary of `vehicle` from mixed-fleet records. Returns
    /// `None` when the vehicle has no samples.
    pub fn from_records(vehicle: VehicleId, records: &[TickRecord]) -> Option<Self> {
        let own: Vec<&TickRecord> = records.iter().filter(|r| r.vehicle == vehicle).collect();
        let (first, last) = (own.first()?, own.last()?);

        let max_altitude_m = own
            .iter()
            .map(|r| r.telemetry.altitude)
            .fold(0.0_f64, f64::max);

        let max_speed_ms = own
            .iter()
            .map(|r| r.telemetry.speed)
            .fold(0.0_f64, f64::max);

        let distance_flown_m = own
            .windows(2)
            .map(|w| geodesy::distance(&w[0].telemetry.position(), &w[1].telemetry.position()))
            .sum();

        // Time with motors armed
        let flight_time_s = own
            .windows(2)
            .filter(|w| w[0].telemetry.armed)
            .map(|w| w[1].time - w[0].time)
            .sum();

        Some(MissionSummary {
            vehicle,
            samples: own.len(),
            max_altitude_m,
            max_speed_ms,
            distance_flown_m,
            flight_time_s,
            battery_used_percent: first.telemetry.battery_percent - last.telemetry.battery_percent,
            final_status: last.telemetry.status,
        })
    }
}

/// Write summaries as a pretty-printed JSON array.
pub fn write_summary<W: Write>(writer: &mut W, summaries: &[MissionSummary]) -> io::Result<()> {
    serde_json::to_writer_pretty(&mut *writer, summaries)?;
    writeln!(writer)
}

pub fn write_summary_file(path: impl AsRef<Path>, summaries: &[MissionSummary]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, summaries)
}
