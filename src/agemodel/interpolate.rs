//! agemodel::interpolate — linear evaluation of age profiles at query depths.
//!
//! Purpose
//! -------
//! Evaluate a reconstructed age profile at arbitrary query depths by linear
//! interpolation between the two bracketing modelled boundary depths.
//! Queries outside the modelled range yield the NaN missing-value marker
//! rather than an error: out-of-range interpolation is a non-fatal,
//! per-depth condition that must not fail the whole request.
//!
//! Key behaviors
//! -------------
//! - A query exactly equal to a modelled boundary returns that boundary's
//!   age verbatim — no interpolation error is introduced at grid points.
//! - Queries strictly between two boundaries return the straight-line
//!   value `age₀ + t · (age₁ − age₀)` with `t = (d − d₀) / (d₁ − d₀)`.
//! - Queries below the shallowest or above the deepest modelled depth, and
//!   non-finite queries, return `f64::NAN`.
//!
//! Invariants & assumptions
//! ------------------------
//! - `depths` is strictly increasing and `ages.len() == depths.len()`;
//!   both come from the hierarchy grid and the reconstructor, the only
//!   producers in this crate.
//! - Interpolation preserves monotonicity: between monotone boundary ages
//!   the interpolated value lies within the bracketing interval.
//!
//! Conventions
//! -----------
//! - The missing-value marker is `f64::NAN`, consistent with the crate's
//!   numeric-array surface; callers detect it with `is_nan()`.
//!
//! Downstream usage
//! ----------------
//! - `agemodel::model` maps each realization over caller-supplied query
//!   depths; `agemodel::summary` counts only finite values per depth, so
//!   markers propagate through the statistics without special casing.
//!
//! Testing notes
//! -------------
//! - Unit tests pin the reference mid-point scenario (depth 2.5 → age 130
//!   on the [100, 110, 120, 140, 160] profile), boundary exactness, and
//!   marker behavior outside the range.
use crate::agemodel::errors::AgeModelResult;
use crate::agemodel::reconstruct::{Anchor, reconstruct_ages};

/// Evaluate one age profile at a single query depth.
///
/// Parameters
/// ----------
/// - `depths`: `&[f64]`
///   Modelled boundary depths, strictly increasing.
/// - `ages`: `&[f64]`
///   Boundary ages of one realization; same length as `depths`.
/// - `query`: `f64`
///   Depth at which to evaluate the profile.
///
/// Returns
/// -------
/// `f64`
///   The boundary age when `query` hits a modelled depth exactly; the
///   linearly interpolated age between the bracketing boundaries
///   otherwise; `f64::NAN` when `query` is non-finite or falls outside
///   `[depths[0], depths[last]]`.
///
/// Panics
/// ------
/// - Panics if `depths` is empty or `ages` is shorter than `depths`;
///   both are produced by the hierarchy/reconstructor and cannot be empty
///   for a valid model.
///
/// Notes
/// -----
/// - Exactness at grid points is checked before the bracketing division,
///   so boundary queries carry no floating-point interpolation error.
///
/// Examples
/// --------
/// ```rust
/// use rust_agedepth::agemodel::interpolate::interpolate_age;
///
/// let depths = [0.0, 1.0, 2.0, 3.0, 4.0];
/// let ages = [100.0, 110.0, 120.0, 140.0, 160.0];
///
/// assert_eq!(interpolate_age(&depths, &ages, 2.5), 130.0);
/// assert_eq!(interpolate_age(&depths, &ages, 3.0), 140.0);
/// assert!(interpolate_age(&depths, &ages, -1.0).is_nan());
/// ```
pub fn interpolate_age(depths: &[f64], ages: &[f64], query: f64) -> f64 {
    let last = depths.len() - 1;
    if !query.is_finite() || query < depths[0] || query > depths[last] {
        return f64::NAN;
    }

    // First modelled depth ≥ query.
    let idx = depths.partition_point(|&d| d < query);
    if depths[idx] == query {
        return ages[idx];
    }

    let (d0, d1) = (depths[idx - 1], depths[idx]);
    let t = (query - d0) / (d1 - d0);
    ages[idx - 1] + t * (ages[idx] - ages[idx - 1])
}

/// Reconstruct a realization and evaluate it at several query depths.
///
/// Parameters
/// ----------
/// - `boundaries`: `&[f64]`
///   Finest-section boundary depths (`rates.len() + 1` entries).
/// - `rates`: `&[f64]`
///   Per-section accumulation rates, time-per-depth.
/// - `anchor`: `&Anchor`
///   Depth/age pair fixing the calendar scale.
/// - `queries`: `&[f64]`
///   Depths at which to evaluate the realization.
///
/// Returns
/// -------
/// `AgeModelResult<Vec<f64>>`
///   One age per query depth, with `f64::NAN` markers outside the
///   modelled range.
///
/// Errors
/// ------
/// - Propagates the reconstruction errors of
///   [`reconstruct_ages`](crate::agemodel::reconstruct::reconstruct_ages).
///
/// Notes
/// -----
/// - Convenience composition used by single-realization callers; the
///   model's bulk `predict` reconstructs once per draw and calls
///   [`interpolate_age`] directly.
pub fn interpolate_realization(
    boundaries: &[f64], rates: &[f64], anchor: &Anchor, queries: &[f64],
) -> AgeModelResult<Vec<f64>> {
    let ages = reconstruct_ages(boundaries, rates, anchor)?;
    Ok(queries.iter().map(|&q| interpolate_age(boundaries, &ages, q)).collect())
}
