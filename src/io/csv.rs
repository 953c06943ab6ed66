use std::io::{self, Write};
use std::path::Path;

use crate::sim::runner::TickRecord;

/// Write per-vehicle telemetry samples in CSV format.
///
/// Columns: time, vehicle, lat, lng, altitude, speed, vertical_speed,
///          heading, battery_percent, mode, status, armed, waypoint
pub fn write_trajectory<W: Write>(writer: &mut W, records: &[TickRecord]) -> io::Result<()> {
    writeln!(
        writer,
        "time,vehicle,lat,lng,altitude,speed,vertical_speed,\
         heading,battery_percent,mode,status,armed,waypoint"
    )?;

    for r in records {
        let t = &r.telemetry;
        writeln!(
            writer,
            "{:.3},{},{:.7},{:.7},{:.2},{:.2},{:.2},\
             {:.1},{:.3},{},{},{},{}",
            r.time,
            r.vehicle,
            t.lat, t.lng,
            t.altitude, t.speed, t.vertical_speed,
            t.heading,
            t.battery_percent,
            t.mode,
            t.status,
            t.armed,
            r.waypoint,
        )?;
    }

    Ok(())
}

pub fn write_trajectory_file(path: impl AsRef<Path>, records: &[TickRecord]) -> io::Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_trajectory(&mut file, records)
}
