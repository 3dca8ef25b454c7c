//! agemodel::reconstruct — cumulative age profiles from per-section rates.
//!
//! Purpose
//! -------
//! Convert one posterior draw's finest-level accumulation rates (time per
//! depth) into a cumulative age profile at every finest-section boundary,
//! anchored at a depth with a known or estimated age. Accumulation runs
//! forward (increasing depth) from the anchor and, when the anchor is
//! interior, backward toward the shallow end as well.
//!
//! Key behaviors
//! -------------
//! - [`Anchor`] is a small validated value: a finite `(depth, age)` pair.
//! - [`reconstruct_ages`] validates the rate vector (length, finiteness,
//!   strict positivity) and the anchor position, then accumulates
//!   `rate × thickness` across sections in both directions.
//! - An anchor inside a section splits that section at the anchor depth,
//!   charging the section's rate to both parts; an anchor exactly on a
//!   boundary degenerates to plain forward/backward accumulation.
//!
//! Invariants & assumptions
//! ------------------------
//! - `boundaries` is strictly increasing with `rates.len() + 1` entries —
//!   guaranteed by the hierarchy, which is the only producer of the grid.
//! - Rates are strictly positive, so the reconstructed age sequence is
//!   non-decreasing with depth within a realization. This is a property to
//!   verify in tests, not something enforced beyond correct accumulation.
//! - Observation-age uncertainty inflation, when used, is applied by the
//!   modelling layer upstream; this module consumes plain anchor ages.
//!
//! Conventions
//! -----------
//! - Ages grow with depth (older sediment is deeper); rates are
//!   time-per-depth, e.g. yr/cm.
//!
//! Downstream usage
//! ----------------
//! - `agemodel::model` calls [`reconstruct_ages`] once per ensemble draw to
//!   build the prediction matrix; `agemodel::interpolate` evaluates the
//!   resulting profiles at arbitrary query depths.
//!
//! Testing notes
//! -------------
//! - Unit tests pin the reference scenario (rates [10, 10, 20, 20], anchor
//!   age 100 at depth 0 → ages [100, 110, 120, 140, 160]), interior and
//!   deep-end anchors, monotonicity, and every validation branch.
use crate::agemodel::errors::{AgeModelError, AgeModelResult};

/// Anchor — a depth with a fixed known or estimated age.
///
/// Purpose
/// -------
/// Tie a reconstructed age profile to the calendar scale: the age at the
/// anchor depth is held fixed and all other boundary ages accumulate away
/// from it.
///
/// Fields
/// ------
/// - `depth`: `f64` — anchor depth; finite, and inside the modelled span
///   when used for reconstruction.
/// - `age`: `f64` — age at the anchor depth; finite.
///
/// Invariants
/// ----------
/// - Both fields are finite, enforced by [`Anchor::new`].
///
/// Notes
/// -----
/// - Typically derived from the shallowest dated observation (see
///   `agemodel::observations`), but any interior depth works: the
///   reconstructor accumulates in both directions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    /// Anchor depth.
    pub depth: f64,
    /// Age at the anchor depth.
    pub age: f64,
}

impl Anchor {
    /// Construct a validated anchor.
    ///
    /// Parameters
    /// ----------
    /// - `depth`: `f64` — anchor depth; must be finite.
    /// - `age`: `f64` — age at that depth; must be finite.
    ///
    /// Returns
    /// -------
    /// `AgeModelResult<Anchor>`
    ///   - `Ok(anchor)` when both values are finite.
    ///   - `Err(AgeModelError::NonFiniteAnchor { value })` otherwise, with
    ///     `value` the first offending field.
    ///
    /// Panics
    /// ------
    /// - Never panics.
    pub fn new(depth: f64, age: f64) -> AgeModelResult<Self> {
        for value in [depth, age] {
            if !value.is_finite() {
                return Err(AgeModelError::NonFiniteAnchor { value });
            }
        }
        Ok(Anchor { depth, age })
    }
}

/// Reconstruct cumulative boundary ages for one realization.
///
/// Parameters
/// ----------
/// - `boundaries`: `&[f64]`
///   Strictly increasing finest-section boundary depths
///   (`rates.len() + 1` entries); produced by the hierarchy.
/// - `rates`: `&[f64]`
///   Accumulation rates per finest section, time-per-depth; strictly
///   positive and finite.
/// - `anchor`: `&Anchor`
///   Depth/age pair fixing the calendar scale; the depth must lie inside
///   `[boundaries[0], boundaries[n]]`.
///
/// Returns
/// -------
/// `AgeModelResult<Vec<f64>>`
///   - `Ok(ages)` with one age per boundary, non-decreasing in depth:
///     forward of the anchor each boundary adds `rate × thickness`,
///     backward of it each boundary subtracts the same.
///   - `Err(AgeModelError)` on any contract violation.
///
/// Errors
/// ------
/// - `AgeModelError::RateLengthMismatch { .. }`
///   `rates.len() != boundaries.len() - 1`.
/// - `AgeModelError::NonFiniteRate { .. }` /
///   `AgeModelError::NonPositiveRate { .. }`
///   An invalid rate value (first offender reported).
/// - `AgeModelError::AnchorOutOfRange { .. }`
///   Anchor depth outside the boundary grid.
///
/// Panics
/// ------
/// - Never panics for inputs produced by the hierarchy and a validated
///   ensemble.
///
/// Notes
/// -----
/// - The section containing an interior anchor contributes
///   `rate × (distance to each of its two boundaries)` in the respective
///   directions, so an anchor exactly on a boundary contributes zero on
///   one side and the full section on the other.
/// - A single-boundary grid with no sections (empty `rates`) yields the
///   anchor age alone.
///
/// Examples
/// --------
/// ```rust
/// use rust_agedepth::agemodel::reconstruct::{Anchor, reconstruct_ages};
///
/// let boundaries = [0.0, 1.0, 2.0, 3.0, 4.0];
/// let rates = [10.0, 10.0, 20.0, 20.0];
/// let anchor = Anchor::new(0.0, 100.0).unwrap();
///
/// let ages = reconstruct_ages(&boundaries, &rates, &anchor).unwrap();
/// assert_eq!(ages, vec![100.0, 110.0, 120.0, 140.0, 160.0]);
/// ```
pub fn reconstruct_ages(
    boundaries: &[f64], rates: &[f64], anchor: &Anchor,
) -> AgeModelResult<Vec<f64>> {
    let n_sections = boundaries.len().saturating_sub(1);
    if rates.len() != n_sections {
        return Err(AgeModelError::RateLengthMismatch {
            expected: n_sections,
            actual: rates.len(),
        });
    }
    for (index, &value) in rates.iter().enumerate() {
        if !value.is_finite() {
            return Err(AgeModelError::NonFiniteRate { index, value });
        }
        if value <= 0.0 {
            return Err(AgeModelError::NonPositiveRate { index, value });
        }
    }
    let (depth_min, depth_max) = (boundaries[0], boundaries[n_sections]);
    if anchor.depth < depth_min || anchor.depth > depth_max {
        return Err(AgeModelError::AnchorOutOfRange { depth: anchor.depth, depth_min, depth_max });
    }

    // Single-boundary grid: nothing to accumulate, the profile is the anchor.
    if n_sections == 0 {
        return Ok(vec![anchor.age]);
    }

    // Section containing the anchor; the deep end maps into the last section.
    let section = boundaries
        .partition_point(|&b| b <= anchor.depth)
        .saturating_sub(1)
        .min(n_sections - 1);

    let mut ages = vec![0.0; boundaries.len()];

    // Split the anchor's section at the anchor depth.
    ages[section] = anchor.age - rates[section] * (anchor.depth - boundaries[section]);
    ages[section + 1] = anchor.age + rates[section] * (boundaries[section + 1] - anchor.depth);

    // Forward accumulation toward the deep end.
    for k in section + 2..=n_sections {
        ages[k] = ages[k - 1] + rates[k - 1] * (boundaries[k] - boundaries[k - 1]);
    }

    // Backward accumulation toward the shallow end.
    for k in (0..section).rev() {
        ages[k] = ages[k + 1] - rates[k] * (boundaries[k + 1] - boundaries[k]);
    }

    Ok(ages)
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - The reference reconstruction scenario from the design documentation.
    // - Interior and deep-end anchors, including anchors off the boundary
    //   grid.
    // - Monotonicity of ages under strictly positive rates.
    // - Every validation branch (length, rate values, anchor range, anchor
    //   finiteness).
    //
    // They intentionally DO NOT cover:
    // - Interpolation of reconstructed profiles (interpolate tests) or
    //   ensemble-wide prediction (model tests).
    // -------------------------------------------------------------------------

    const BOUNDARIES: [f64; 5] = [0.0, 1.0, 2.0, 3.0, 4.0];
    const RATES: [f64; 4] = [10.0, 10.0, 20.0, 20.0];

    #[test]
    // Purpose
    // -------
    // Pin the reference scenario: rates [10, 10, 20, 20] anchored at age
    // 100 / depth 0 reconstruct to [100, 110, 120, 140, 160].
    //
    // Given
    // -----
    // - Boundaries [0..4], the reference rates, anchor (0, 100).
    //
    // Expect
    // ------
    // - Exactly the documented age sequence.
    fn reconstruct_ages_matches_reference_scenario() {
        // Arrange
        let anchor = Anchor::new(0.0, 100.0).expect("finite anchor");

        // Act
        let ages = reconstruct_ages(&BOUNDARIES, &RATES, &anchor).expect("valid inputs");

        // Assert
        assert_eq!(ages, vec![100.0, 110.0, 120.0, 140.0, 160.0]);
    }

    #[test]
    // Purpose
    // -------
    // Verify backward accumulation from an interior boundary anchor: fixing
    // the same profile at (2, 120) must reproduce the reference ages.
    //
    // Given
    // -----
    // - The reference grid and rates, anchor (2.0, 120.0).
    //
    // Expect
    // ------
    // - The identical age sequence [100, 110, 120, 140, 160].
    fn reconstruct_ages_interior_boundary_anchor_reproduces_profile() {
        // Arrange
        let anchor = Anchor::new(2.0, 120.0).expect("finite anchor");

        // Act
        let ages = reconstruct_ages(&BOUNDARIES, &RATES, &anchor).expect("valid inputs");

        // Assert
        assert_eq!(ages, vec![100.0, 110.0, 120.0, 140.0, 160.0]);
    }

    #[test]
    // Purpose
    // -------
    // Verify the split-section rule for an anchor strictly inside a
    // section, and the deep-end anchor edge case.
    //
    // Given
    // -----
    // - Anchor (2.5, 130.0): inside section 2 (rate 20), so the bracketing
    //   boundaries get 130 ∓ 20·0.5.
    // - Anchor (4.0, 160.0): the deep end, accumulating backward only.
    //
    // Expect
    // ------
    // - Both anchors reproduce the reference age sequence.
    fn reconstruct_ages_mid_section_and_deep_end_anchors() {
        // Arrange
        let mid = Anchor::new(2.5, 130.0).expect("finite anchor");
        let deep = Anchor::new(4.0, 160.0).expect("finite anchor");

        // Act
        let from_mid = reconstruct_ages(&BOUNDARIES, &RATES, &mid).expect("valid inputs");
        let from_deep = reconstruct_ages(&BOUNDARIES, &RATES, &deep).expect("valid inputs");

        // Assert
        for (got, want) in from_mid.iter().zip([100.0, 110.0, 120.0, 140.0, 160.0]) {
            assert!((got - want).abs() < 1e-12, "mid-section anchor: got {got}, want {want}");
        }
        for (got, want) in from_deep.iter().zip([100.0, 110.0, 120.0, 140.0, 160.0]) {
            assert!((got - want).abs() < 1e-12, "deep-end anchor: got {got}, want {want}");
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify the degenerate single-boundary grid: with no sections the
    // profile is the anchor age alone, and the range check still applies.
    //
    // Given
    // -----
    // - Boundaries [2.0] with an empty rate vector; anchors at depth 2.0
    //   and 3.0.
    //
    // Expect
    // ------
    // - The on-grid anchor yields [50.0]; the off-grid anchor raises
    //   AnchorOutOfRange.
    fn reconstruct_ages_single_boundary_grid_returns_anchor_age() {
        // Arrange
        let on_grid = Anchor::new(2.0, 50.0).expect("finite anchor");
        let off_grid = Anchor::new(3.0, 50.0).expect("finite anchor");

        // Act & Assert
        assert_eq!(reconstruct_ages(&[2.0], &[], &on_grid), Ok(vec![50.0]));
        assert!(matches!(
            reconstruct_ages(&[2.0], &[], &off_grid),
            Err(AgeModelError::AnchorOutOfRange { depth, .. }) if depth == 3.0
        ));
    }

    #[test]
    // Purpose
    // -------
    // Check the monotonicity property: strictly positive rates yield ages
    // non-decreasing with depth, whatever the anchor position.
    //
    // Given
    // -----
    // - An uneven rate profile and an interior anchor at depth 1.7.
    //
    // Expect
    // ------
    // - Each boundary age is ≥ its shallower neighbor.
    fn reconstruct_ages_is_monotone_for_positive_rates() {
        // Arrange
        let rates = [3.5, 0.25, 80.0, 1.0];
        let anchor = Anchor::new(1.7, 5000.0).expect("finite anchor");

        // Act
        let ages = reconstruct_ages(&BOUNDARIES, &rates, &anchor).expect("valid inputs");

        // Assert
        for pair in ages.windows(2) {
            assert!(pair[1] >= pair[0], "ages must be non-decreasing: {ages:?}");
        }
    }

    #[test]
    // Purpose
    // -------
    // Ensure every validation branch surfaces the matching error variant.
    //
    // Given
    // -----
    // - A short rate vector, a NaN rate, a zero rate, an anchor beyond the
    //   deep end, and a NaN anchor component.
    //
    // Expect
    // ------
    // - RateLengthMismatch, NonFiniteRate, NonPositiveRate,
    //   AnchorOutOfRange, and NonFiniteAnchor respectively.
    fn reconstruct_ages_invalid_inputs_return_errors() {
        // Arrange
        let anchor = Anchor::new(0.0, 100.0).expect("finite anchor");

        // Act & Assert: short rate vector
        match reconstruct_ages(&BOUNDARIES, &[10.0, 10.0], &anchor) {
            Err(AgeModelError::RateLengthMismatch { expected, actual }) => {
                assert_eq!((expected, actual), (4, 2));
            }
            other => panic!("expected RateLengthMismatch, got {other:?}"),
        }

        // Act & Assert: NaN rate
        match reconstruct_ages(&BOUNDARIES, &[10.0, f64::NAN, 20.0, 20.0], &anchor) {
            Err(AgeModelError::NonFiniteRate { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected NonFiniteRate, got {other:?}"),
        }

        // Act & Assert: zero rate
        match reconstruct_ages(&BOUNDARIES, &[10.0, 0.0, 20.0, 20.0], &anchor) {
            Err(AgeModelError::NonPositiveRate { index, .. }) => assert_eq!(index, 1),
            other => panic!("expected NonPositiveRate, got {other:?}"),
        }

        // Act & Assert: anchor out of range
        let outside = Anchor::new(9.0, 100.0).expect("finite anchor");
        match reconstruct_ages(&BOUNDARIES, &RATES, &outside) {
            Err(AgeModelError::AnchorOutOfRange { depth, .. }) => assert_eq!(depth, 9.0),
            other => panic!("expected AnchorOutOfRange, got {other:?}"),
        }

        // Act & Assert: non-finite anchor
        match Anchor::new(0.0, f64::INFINITY) {
            Err(AgeModelError::NonFiniteAnchor { .. }) => (),
            other => panic!("expected NonFiniteAnchor, got {other:?}"),
        }
    }
}
