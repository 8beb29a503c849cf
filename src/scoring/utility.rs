/// Computes the arithmetic mean of a slice of values. Returns 0.0 for empty input.
///
/// Falls back to an incremental mean when the plain sum overflows, so finite
/// inputs always give a finite result.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let sum = values.iter().sum::<f64>();
    if sum.is_finite() {
        return sum / values.len() as f64;
    }
    values
        .iter()
        .enumerate()
        .fold(0.0, |acc, (i, v)| acc + (v - acc) / (i + 1) as f64)
}

/// Rounds to two decimal places, half away from zero.
///
/// Values too large to scale are already integral and come back unchanged.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    scaled.round() / 100.0
}
