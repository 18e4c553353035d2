//! Conversions between volume fractions and device units

use gateway_api::operations::MAX_VOLUME;

/// Convert a fraction to device units: `clamp(round(level * 100), 0, 100)`.
///
/// Exact halves round to even (0.125 -> 12, 0.625 -> 62). NaN maps to 0.
pub fn level_to_units(level: f64) -> u8 {
    let units = (level * f64::from(MAX_VOLUME)).round_ties_even();
    if units.is_nan() {
        return 0;
    }
    units.clamp(0.0, f64::from(MAX_VOLUME)) as u8
}

/// Convert device units to a fraction in [0.0, 1.0]
pub fn units_to_level(units: i64) -> f64 {
    units.clamp(0, i64::from(MAX_VOLUME)) as f64 / f64::from(MAX_VOLUME)
}

/// Move `current` by `delta` units, staying within [0, 100]
pub fn step_units(current: u8, delta: i16) -> u8 {
    (i16::from(current) + delta).clamp(0, i16::from(MAX_VOLUME)) as u8
}
