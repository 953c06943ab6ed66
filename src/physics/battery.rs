use crate::config::FlightConfig;
use crate::dynamics::state::FlightMode;

// ---------------------------------------------------------------------------
// Battery model: linear drain, affine voltage
// ---------------------------------------------------------------------------

/// Pack voltage at 0% remaining (6S LiPo, 3.3 V/cell).
pub const VOLTAGE_EMPTY: f64 = 19.8;
/// Pack voltage at 100% remaining (6S LiPo, 4.2 V/cell).
pub const VOLTAGE_FULL: f64 = 25.2;

/// Voltage for a given remaining percentage.
pub fn voltage(percent: f64) -> f64 {
    let p = percent.clamp(0.0, 100.0);
    VOLTAGE_EMPTY + (VOLTAGE_FULL - VOLTAGE_EMPTY) * p / 100.0
}

/// Drain rate (%/s) for a mode. STABILIZE is the passive ground state.
pub fn drain_rate(mode: FlightMode, config: &FlightConfig) -> f64 {
    match mode {
        FlightMode::Stabilize => config.battery_drain_passive,
        _ => config.battery_drain_active,
    }
}

/// Remaining percentage after `dt` seconds in `mode`. Never increases.
pub fn drain(percent: f64, mode: FlightMode, dt: f64, config: &FlightConfig) -> f64 {
    let used = (drain_rate(mode, config) * dt).max(0.0);
    (percent - used).clamp(0.0, 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn voltage_endpoints() {
        assert!((voltage(100.0) - VOLTAGE_FULL).abs() < 1e-12);
        assert!((voltage(0.0) - VOLTAGE_EMPTY).abs() < 1e-12);
        // Out-of-range inputs are clamped
        assert!((voltage(150.0) - VOLTAGE_FULL).abs() < 1e-12);
        assert!((voltage(-5.0) - VOLTAGE_EMPTY).abs() < 1e-12);
    }

    #[test]
    fn active_drains_faster_than_passive() {
        let cfg = FlightConfig::default();
        let passive = drain(100.0, FlightMode::Stabilize, 10.0, &cfg);
        let active = drain(100.0, FlightMode::Auto, 10.0, &cfg);
        assert!(active < passive);
        assert!(passive < 100.0);
    }

    #[test]
    fn drain_never_goes_negative() {
        let cfg = FlightConfig::default();
        assert_eq!(drain(0.01, FlightMode::Auto, 1_000.0, &cfg), 0.0);
    }

    #[test]
    fn negative_dt_does_not_recharge() {
        let cfg = FlightConfig::default();
        assert_eq!(drain(50.0, FlightMode::Auto, -3.0, &cfg), 50.0);
    }
}
