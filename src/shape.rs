//! Shape functions shared by the factors and the meter.

/// Score an asymmetric curve assigns to a value sitting exactly on its target.
pub const DEFAULT_SWITCH: f64 = 0.75;

/// Offset used by [`curve_average`] when a factor combines its own sub-scores.
pub const INTERNAL_OFFSET: f64 = 0.1;

/// Asymmetric response curve.
///
/// Below `target` the result ramps linearly from `0` to `switch`; at or above
/// `target` it grows from `switch` towards `1` without ever reaching it.
/// `target` must be positive.
pub fn asym(value: f64, target: f64, switch: f64) -> f64 {
    if value >= target {
        1.0 - (1.0 - switch) * target / value
    } else {
        switch * value / target
    }
}

/// Confidence weight of a judgment: high for low values, low for high ones.
pub fn curve(value: f64, offset: f64) -> f64 {
    1.0 / (offset + value.max(0.0))
}

/// Self-weighted mean of `values`, pulled towards the worst of them.
///
/// Returns `0.0` for an empty slice.
pub fn curve_average(values: &[f64]) -> f64 {
    let (score, weight) = values.iter().fold((0.0, 0.0), |(score, weight), &v| {
        let w = curve(v, INTERNAL_OFFSET);
        (score + v * w, weight + w)
    });
    if weight > 0.0 { score / weight } else { 0.0 }
}
