//! Contour level planning.

/// Round an elevation up to the next multiple of `step`. Values already on
/// a step boundary are returned unchanged. Uses the mathematical modulus so
/// negative elevations also round toward the next multiple above.
pub fn round_up_to_step(elevation: i32, step: i32) -> i32 {
    let rem = elevation.rem_euclid(step);
    if rem == 0 {
        elevation
    } else {
        elevation + step - rem
    }
}

/// Compute the ordered set of levels to trace.
///
/// The bounds are explicit overrides when given, otherwise the smallest
/// multiples of `step` at or above the min and max elevation. Levels are
/// every `step` from the lower bound over the half-open interval
/// `[lower, upper)`, ascending. `lower >= upper` yields an empty plan
/// (flat tile), not an error.
pub fn plan_levels(
    min_elevation: i32,
    max_elevation: i32,
    step: i32,
    exclude_zero: bool,
    min_level: Option<i32>,
    max_level: Option<i32>,
) -> Vec<i32> {
    debug_assert!(step > 0);

    let lower = min_level.unwrap_or_else(|| round_up_to_step(min_elevation, step));
    let upper = max_level.unwrap_or_else(|| round_up_to_step(max_elevation, step));

    if lower >= upper {
        return vec![];
    }

    (lower..upper)
        .step_by(step as usize)
        .filter(|&level| !(exclude_zero && level == 0))
        .collect()
}
