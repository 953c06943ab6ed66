use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Prefix for environment overrides, e.g. `FLEETSIM_SIM_SPEED=4`.
pub const ENV_PREFIX: &str = "FLEETSIM";

// ---------------------------------------------------------------------------
// Simulation tunables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightConfig {
    pub cruise_speed: f64,           // m/s
    pub waypoint_radius: f64,        // m, horizontal arrival radius
    pub waypoint_alt_tolerance: f64, // m, vertical arrival tolerance
    pub home_radius: f64,            // m, RTL -> LAND switch
    pub rtl_altitude: f64,           // m, minimum return altitude
    pub landed_altitude: f64,        // m, below this we are on the ground
    pub airborne_altitude: f64,      // m, disarm refused above this
    pub max_climb_rate: f64,         // m/s
    pub max_descent_rate: f64,       // m/s, magnitude
    pub altitude_gain: f64,          // 1/s, altitude error -> desired climb rate
    pub vertical_response: f64,      // 1/s, first-order lag on vertical speed
    pub turn_rate: f64,              // deg/s
    pub max_bank: f64,               // deg, cosmetic roll at full turn rate
    pub attitude_response: f64,      // 1/s, cosmetic roll/pitch easing
    pub delivery_wait: f64,          // s on the ground before returning
    pub sim_speed: f64,              // simulation speed multiplier
    pub max_step: f64,               // s, clamp on wall-clock dt
    pub default_altitude: f64,       // m, route cruise altitude
    pub loiter_time: f64,            // s, LOITER_TIME parameter in generated routes
    pub manual_climb_rate: f64,      // m/s
    pub manual_yaw_rate: f64,        // deg/s
    pub manual_speed: f64,           // m/s
    pub battery_drain_active: f64,   // %/s
    pub battery_drain_passive: f64,  // %/s
    pub battery_warn_percent: f64,   // %
}

impl Default for FlightConfig {
    fn default() -> Self {
        Self {
            cruise_speed: 15.0,
            waypoint_radius: 15.0,
            waypoint_alt_tolerance: 2.0,
            home_radius: 5.0,
            rtl_altitude: 50.0,
            landed_altitude: 0.5,
            airborne_altitude: 2.0,
            max_climb_rate: 5.0,
            max_descent_rate: 3.0,
            altitude_gain: 1.0,
            vertical_response: 2.0,
            turn_rate: 90.0,
            max_bank: 25.0,
            attitude_response: 3.0,
            delivery_wait: 3.0,
            sim_speed: 1.0,
            max_step: 0.1,
            default_altitude: 100.0,
            loiter_time: 5.0,
            manual_climb_rate: 3.0,
            manual_yaw_rate: 45.0,
            manual_speed: 5.0,
            battery_drain_active: 0.05,
            battery_drain_passive: 0.005,
            battery_warn_percent: 20.0,
        }
    }
}

impl FlightConfig {
    /// Load defaults, then an optional TOML file, then `FLEETSIM_*` environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_over(&Self::default(), path)
    }

    /// Like [`FlightConfig::load`], with `base` in place of the built-in
    /// defaults. The file and the environment still override it.
    pub fn load_over(base: &FlightConfig, path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = config::Config::builder();
        if let serde_json::Value::Object(fields) = serde_json::to_value(base)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?
        {
            for (key, value) in fields {
                if let Some(v) = value.as_f64() {
                    builder = builder.set_default(key, v)?;
                }
            }
        }
        if let Some(path) = path {
            if !path.exists() {
                return Err(ConfigError::Missing(path.display().to_string()));
            }
            builder = builder.add_source(config::File::from(path));
        }
        let settings = builder
            .add_source(config::Environment::with_prefix(ENV_PREFIX).try_parsing(true))
            .build()?;
        let cfg: FlightConfig = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a TOML document directly (defaults fill missing keys).
    pub fn from_toml_str(toml: &str) -> Result<Self, ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        let cfg: FlightConfig = settings.try_deserialize()?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn with_sim_speed(mut self, sim_speed: f64) -> Self {
        self.sim_speed = sim_speed;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("cruise_speed", self.cruise_speed),
            ("waypoint_radius", self.waypoint_radius),
            ("waypoint_alt_tolerance", self.waypoint_alt_tolerance),
            ("home_radius", self.home_radius),
            ("landed_altitude", self.landed_altitude),
            ("airborne_altitude", self.airborne_altitude),
            ("max_climb_rate", self.max_climb_rate),
            ("max_descent_rate", self.max_descent_rate),
            ("altitude_gain", self.altitude_gain),
            ("vertical_response", self.vertical_response),
            ("turn_rate", self.turn_rate),
            ("attitude_response", self.attitude_response),
            ("sim_speed", self.sim_speed),
            ("max_step", self.max_step),
            ("manual_climb_rate", self.manual_climb_rate),
            ("manual_yaw_rate", self.manual_yaw_rate),
            ("manual_speed", self.manual_speed),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }

        let non_negative = [
            ("rtl_altitude", self.rtl_altitude),
            ("max_bank", self.max_bank),
            ("delivery_wait", self.delivery_wait),
            ("default_altitude", self.default_altitude),
            ("loiter_time", self.loiter_time),
            ("battery_drain_active", self.battery_drain_active),
            ("battery_drain_passive", self.battery_drain_passive),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "{} must not be negative, got {}",
                    name, value
                )));
            }
        }

        if !(0.0..=100.0).contains(&self.battery_warn_percent) {
            return Err(ConfigError::Invalid(format!(
                "battery_warn_percent must be within 0..=100, got {}",
                self.battery_warn_percent
            )));
        }
        Ok(())
    }
}
