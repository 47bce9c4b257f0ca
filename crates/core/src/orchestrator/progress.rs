//! Progress math.

/// Converts an elapsed-time sample into the progress ratio shown to the user.
///
/// Computes `round((elapsed / duration / 10 + EPSILON) * 100) / 100`,
/// clamped to `[0, 1]`. The epsilon keeps exact halves from rounding down.
///
/// The extra division by ten means a finished run reports `0.1`, not `1.0`.
// TODO: drop the `/ 10` once the progress bar is confirmed to expect a plain ratio.
pub fn progress_ratio(elapsed_secs: f64, duration_secs: f64) -> f64 {
    if !(elapsed_secs > 0.0 && duration_secs > 0.0)
        || !elapsed_secs.is_finite()
        || !duration_secs.is_finite()
    {
        return 0.0;
    }

    let ratio = ((elapsed_secs / duration_secs / 10.0 + f64::EPSILON) * 100.0).round() / 100.0;
    ratio.clamp(0.0, 1.0)
}
