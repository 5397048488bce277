//! Scalar scoring primitives
//!
//! All functions are total: degenerate ranges resolve to fixed sentinel values
//! instead of producing NaN or infinities.

/// Mean Earth radius used for great-circle distances (km)
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Linearly map `value` from `[min, max]` onto `[0, 1]`
///
/// Not clamped: values outside the range map outside `[0, 1]`.
/// A degenerate range (`max == min`) yields `0`.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    if span == 0.0 {
        return 0.0;
    }
    (value - min) / span
}

/// Absolute distance of `value` from `average`
pub fn deviation(value: f64, average: f64) -> f64 {
    (value - average).abs()
}

/// How well `value` agrees with a numeric aggregate, in `[0, 1]`
///
/// `1 - normalize(|value - average|, min, max)`, bounded to `[0, 1]`.
/// When the observed range is empty (`max == min`) the answer is binary:
/// `1` for an exact hit on the average, `0` otherwise.
pub fn confirmation(value: f64, average: f64, min: f64, max: f64) -> f64 {
    if max == min {
        return if value == average { 1.0 } else { 0.0 };
    }
    (1.0 - normalize(deviation(value, average), min, max)).clamp(0.0, 1.0)
}

/// Great-circle distance between two points given in degrees (haversine, km)
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().atan2((1.0 - a).sqrt())
}
