//! Small geometry helpers shared by [`crate::Location`].

use std::f64::consts::PI;

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Converts degrees to radians.
pub fn to_radians(degrees: f64) -> f64 {
    degrees * PI / 180.0
}

/// Equirectangular distance estimate in kilometers between two coordinates.
///
/// The longitude difference is scaled by the cosine of the mean latitude. Good
/// enough for short distances, increasingly wrong for far apart or polar points.
pub fn equirectangular_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = to_radians(lat1 - lat2);
    let d_lon = to_radians(lon1 - lon2);
    let mean_lat = to_radians((lat1 + lat2) / 2.0);

    EARTH_RADIUS_KM * (d_lat.powi(2) + (mean_lat.cos() * d_lon).powi(2)).sqrt()
}
