use serde::{Deserialize, Serialize};

use crate::dynamics::state::EARTH_RADIUS;

// ---------------------------------------------------------------------------
// Geographic position (spherical Earth)
// ---------------------------------------------------------------------------

/// Latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle midpoint between two positions.
    pub fn midpoint(&self, other: &LatLng) -> LatLng {
        let d = distance(self, other);
        if d < 1e-9 {
            return *self;
        }
        destination(self, bearing(self, other), d * 0.5)
    }
}

// ---------------------------------------------------------------------------
// Great-circle primitives
// ---------------------------------------------------------------------------

/// Great-circle distance in meters (Haversine).
pub fn distance(a: &LatLng, b: &LatLng) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dphi = (b.lat - a.lat).to_radians();
    let dlambda = (b.lng - a.lng).to_radians();

    let h = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().min(1.0).asin();
    EARTH_RADIUS * c
}

/// Initial bearing from `a` to `b`, degrees in [0, 360).
///
/// Meaningless for coincident or antipodal points; callers check the
/// distance first.
pub fn bearing(a: &LatLng, b: &LatLng) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let dlambda = (b.lng - a.lng).to_radians();

    let y = dlambda.sin() * phi2.cos();
    let x = phi1.cos() * phi2.sin() - phi1.sin() * phi2.cos() * dlambda.cos();
    wrap_360(y.atan2(x).to_degrees())
}

/// Forward geodesic: point reached from `origin` after `distance_m` along `bearing_deg`.
pub fn destination(origin: &LatLng, bearing_deg: f64, distance_m: f64) -> LatLng {
    let delta = distance_m / EARTH_RADIUS;
    let theta = bearing_deg.to_radians();
    let phi1 = origin.lat.to_radians();
    let lambda1 = origin.lng.to_radians();

    let sin_phi2 = phi1.sin() * delta.cos() + phi1.cos() * delta.sin() * theta.cos();
    let phi2 = sin_phi2.clamp(-1.0, 1.0).asin();
    let lambda2 = lambda1
        + (theta.sin() * delta.sin() * phi1.cos()).atan2(delta.cos() - phi1.sin() * sin_phi2);

    LatLng {
        lat: phi2.to_degrees(),
        lng: wrap_180(lambda2.to_degrees()),
    }
}

// ---------------------------------------------------------------------------
// Angle helpers
// ---------------------------------------------------------------------------

/// Wrap an angle to [0, 360).
pub fn wrap_360(deg: f64) -> f64 {
    let w = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if w >= 360.0 {
        0.0
    } else {
        w
    }
}

/// Wrap an angle to [-180, 180).
pub fn wrap_180(deg: f64) -> f64 {
    let w = wrap_360(deg + 180.0) - 180.0;
    if w >= 180.0 {
        w - 360.0
    } else {
        w
    }
}

/// Signed shortest rotation from `from` to `to`, degrees in [-180, 180).
pub fn heading_error(from: f64, to: f64) -> f64 {
    wrap_180(to - from)
}
