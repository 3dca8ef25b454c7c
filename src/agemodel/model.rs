//! agemodel::model — fitted age-depth models and prediction tables.
//!
//! Purpose
//! -------
//! Combine a section hierarchy, a validated posterior ensemble, and a
//! calendar anchor into one immutable fit result, and expose the crate's
//! main outputs: per-draw age realizations, prediction tables on the
//! modelled grid or at arbitrary query depths, and summary rows.
//!
//! Key behaviors
//! -------------
//! - [`AgeDepthModel::new`] checks once that the anchor depth lies inside
//!   the modelled span; everything else was validated by the hierarchy and
//!   ensemble constructors.
//! - [`AgeDepthModel::predict`] reconstructs one age profile per ensemble
//!   draw. Without query depths the table lives on the finest boundary
//!   grid; with them each profile is evaluated by linear interpolation and
//!   out-of-range depths carry NaN markers.
//! - [`AgePredictions`] keeps draws row-aligned with the ensemble's chain
//!   metadata so summaries can attach convergence diagnostics.
//!
//! Invariants & assumptions
//! ------------------------
//! - The model is immutable after construction; repeated calls with equal
//!   arguments return equal outputs.
//! - Prediction rows are in ensemble draw order; columns follow the depth
//!   argument order (or the boundary grid).
//!
//! Conventions
//! -----------
//! - `interpolated == false` marks a table on the modelled boundary grid;
//!   only such tables carry convergence diagnostics in their summaries.
//!
//! Downstream usage
//! ----------------
//! - The Python bindings wrap [`AgeDepthModel`] as the package's central
//!   object; pure-Rust callers use it directly via the prelude.
//!
//! Testing notes
//! -------------
//! - Unit tests run the reference scenario end to end, cover the NaN
//!   marker path, the draw-index bound, and the anchor-range check; the
//!   crate-level integration test exercises the full pipeline.

use ndarray::{Array1, Array2};

use crate::agemodel::errors::{AgeModelError, AgeModelResult};
use crate::agemodel::interpolate::interpolate_age;
use crate::agemodel::reconstruct::{Anchor, reconstruct_ages};
use crate::agemodel::summary::{DepthAgeSummary, ScalarSummary, SummaryOptions, summarize,
    summarize_scalar};
use crate::hierarchy::SectionHierarchy;
use crate::posterior::PosteriorEnsemble;

/// AgePredictions — ages for every ensemble draw at a set of depths.
///
/// Purpose
/// -------
/// The bulk output of a fitted model: a `[n_draws × n_depths]` age matrix
/// with the depth axis and the chain metadata needed to summarize it.
///
/// Fields
/// ------
/// - `depths`: `Array1<f64>` — the depth per column, in request order.
/// - `ages`: `Array2<f64>` — one realization per row, aligned with the
///   ensemble's draws; NaN marks out-of-range interpolation.
/// - `chain_id`: `Vec<usize>` — chain label per row.
/// - `interpolated`: `bool` — whether the table was evaluated off the
///   modelled boundary grid.
#[derive(Debug, Clone, PartialEq)]
pub struct AgePredictions {
    depths: Array1<f64>,
    ages: Array2<f64>,
    chain_id: Vec<usize>,
    interpolated: bool,
}

/// PredictionRow — one (draw, depth, age) cell of a prediction table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionRow {
    /// Row index into the ensemble's draws.
    pub draw_id: usize,
    /// Query depth of the cell's column.
    pub depth: f64,
    /// Age of this draw at this depth; NaN when out of range.
    pub age: f64,
}

impl AgePredictions {
    /// Assemble a prediction table from its parts.
    ///
    /// The shapes must already agree: `ages` is `[chain_id.len() ×
    /// depths.len()]`. The model's `predict` is the normal producer; this
    /// constructor exists for tests and bindings that re-hydrate tables.
    pub fn new(
        depths: Array1<f64>, ages: Array2<f64>, chain_id: Vec<usize>, interpolated: bool,
    ) -> Self {
        debug_assert_eq!(ages.nrows(), chain_id.len());
        debug_assert_eq!(ages.ncols(), depths.len());
        AgePredictions { depths, ages, chain_id, interpolated }
    }

    /// Depth per column, in request order.
    #[inline]
    pub fn depths(&self) -> &Array1<f64> {
        &self.depths
    }

    /// The `[n_draws × n_depths]` age matrix.
    #[inline]
    pub fn ages(&self) -> &Array2<f64> {
        &self.ages
    }

    /// Chain label per draw row.
    #[inline]
    pub fn chain_id(&self) -> &[usize] {
        &self.chain_id
    }

    /// Whether the table was evaluated off the modelled boundary grid.
    #[inline]
    pub fn interpolated(&self) -> bool {
        self.interpolated
    }

    /// Number of draws (rows).
    #[inline]
    pub fn n_draws(&self) -> usize {
        self.ages.nrows()
    }

    /// Number of depths (columns).
    #[inline]
    pub fn n_depths(&self) -> usize {
        self.ages.ncols()
    }

    /// Iterate over all cells in row-major order.
    pub fn rows(&self) -> impl Iterator<Item = PredictionRow> + '_ {
        self.ages.indexed_iter().map(|((draw_id, col), &age)| PredictionRow {
            draw_id,
            depth: self.depths[col],
            age,
        })
    }

    /// Summarize the table depth by depth.
    ///
    /// Convenience forwarding to [`summarize`](crate::agemodel::summary::summarize).
    pub fn summarize(&self, options: &SummaryOptions) -> Vec<DepthAgeSummary> {
        summarize(self, options)
    }
}

/// AgeDepthModel — an immutable fitted age-depth model.
///
/// Purpose
/// -------
/// The central object of the crate: a section hierarchy, the posterior
/// ensemble sampled against it, and the calendar anchor, bound together
/// after a final cross-component check.
///
/// Fields
/// ------
/// - `hierarchy`: `SectionHierarchy` — the depth discretization.
/// - `ensemble`: `PosteriorEnsemble` — validated draws with derived
///   finest-level rates.
/// - `anchor`: `Anchor` — depth/age pair fixing the calendar scale.
///
/// Invariants
/// ----------
/// - `anchor.depth` lies inside `[hierarchy.depth_min(), hierarchy.depth_max()]`.
/// - The ensemble's multiplier width matches the hierarchy (checked at
///   ensemble construction against the same hierarchy value).
///
/// Notes
/// -----
/// - Prediction work is O(n_draws × N) per call and embarrassingly
///   row-parallel; the current implementation is sequential.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeDepthModel {
    hierarchy: SectionHierarchy,
    ensemble: PosteriorEnsemble,
    anchor: Anchor,
}

impl AgeDepthModel {
    /// Bind a hierarchy, ensemble, and anchor into a fitted model.
    ///
    /// Parameters
    /// ----------
    /// - `hierarchy`: `SectionHierarchy`
    ///   The depth discretization the ensemble was sampled against.
    /// - `ensemble`: `PosteriorEnsemble`
    ///   Validated posterior draws for that hierarchy.
    /// - `anchor`: `Anchor`
    ///   Calendar anchor; its depth must lie inside the modelled span.
    ///
    /// Returns
    /// -------
    /// `AgeModelResult<AgeDepthModel>`
    ///   The immutable fit result.
    ///
    /// Errors
    /// ------
    /// - `AgeModelError::AnchorOutOfRange` when the anchor depth falls
    ///   outside `[depth_min, depth_max]`.
    pub fn new(
        hierarchy: SectionHierarchy, ensemble: PosteriorEnsemble, anchor: Anchor,
    ) -> AgeModelResult<Self> {
        let (depth_min, depth_max) = (hierarchy.depth_min(), hierarchy.depth_max());
        if anchor.depth < depth_min || anchor.depth > depth_max {
            return Err(AgeModelError::AnchorOutOfRange {
                depth: anchor.depth,
                depth_min,
                depth_max,
            });
        }
        Ok(AgeDepthModel { hierarchy, ensemble, anchor })
    }

    /// The model's depth discretization.
    #[inline]
    pub fn hierarchy(&self) -> &SectionHierarchy {
        &self.hierarchy
    }

    /// The model's posterior ensemble.
    #[inline]
    pub fn ensemble(&self) -> &PosteriorEnsemble {
        &self.ensemble
    }

    /// The calendar anchor.
    #[inline]
    pub fn anchor(&self) -> Anchor {
        self.anchor
    }

    /// The finest-section boundary depths the model predicts on by default.
    #[inline]
    pub fn modelled_depths(&self) -> &[f64] {
        self.hierarchy.finest_boundaries()
    }

    /// Section boundary depths per hierarchy level, coarse to fine.
    pub fn hierarchy_depths(&self) -> Vec<Vec<f64>> {
        self.hierarchy.hierarchy_depths()
    }

    /// Reconstruct the age profile of a single draw on the boundary grid.
    ///
    /// Parameters
    /// ----------
    /// - `draw`: `usize`
    ///   Row index into the ensemble.
    ///
    /// Returns
    /// -------
    /// `AgeModelResult<Vec<f64>>`
    ///   One age per finest boundary.
    ///
    /// Errors
    /// ------
    /// - `AgeModelError::DrawOutOfRange` when `draw ≥ n_draws`.
    pub fn realization(&self, draw: usize) -> AgeModelResult<Vec<f64>> {
        let n_draws = self.ensemble.n_draws();
        if draw >= n_draws {
            return Err(AgeModelError::DrawOutOfRange { draw, n_draws });
        }
        let rates = self.ensemble.finest_rates().row(draw).to_vec();
        reconstruct_ages(self.modelled_depths(), &rates, &self.anchor)
    }

    /// Build the prediction table for every ensemble draw.
    ///
    /// Parameters
    /// ----------
    /// - `query_depths`: `Option<&[f64]>`
    ///   Depths to evaluate at. `None` predicts on the finest boundary
    ///   grid; `Some` interpolates each realization, with NaN markers for
    ///   depths outside the modelled range.
    ///
    /// Returns
    /// -------
    /// `AgeModelResult<AgePredictions>`
    ///   The `[n_draws × n_depths]` table with chain metadata attached.
    ///
    /// Errors
    /// ------
    /// - Propagates reconstruction errors; none occur for a validated
    ///   ensemble.
    ///
    /// Notes
    /// -----
    /// - Query order is preserved: the output column order is exactly the
    ///   order of `query_depths`, sorted or not.
    pub fn predict(&self, query_depths: Option<&[f64]>) -> AgeModelResult<AgePredictions> {
        let boundaries = self.modelled_depths();
        let n_draws = self.ensemble.n_draws();

        let (depths, interpolated): (Vec<f64>, bool) = match query_depths {
            Some(q) => (q.to_vec(), true),
            None => (boundaries.to_vec(), false),
        };

        let mut ages = Array2::zeros((n_draws, depths.len()));
        for draw in 0..n_draws {
            let rates = self.ensemble.finest_rates().row(draw).to_vec();
            let profile = reconstruct_ages(boundaries, &rates, &self.anchor)?;
            if interpolated {
                for (col, &q) in depths.iter().enumerate() {
                    ages[[draw, col]] = interpolate_age(boundaries, &profile, q);
                }
            } else {
                for (col, &age) in profile.iter().enumerate() {
                    ages[[draw, col]] = age;
                }
            }
        }

        Ok(AgePredictions::new(
            Array1::from(depths),
            ages,
            self.ensemble.chain_id().to_vec(),
            interpolated,
        ))
    }

    /// Predict and summarize in one call.
    ///
    /// Parameters and the depth/interpolation behavior are as for
    /// [`Self::predict`]; the rows are as for
    /// [`summarize`](crate::agemodel::summary::summarize).
    pub fn summarize(
        &self, query_depths: Option<&[f64]>, options: &SummaryOptions,
    ) -> AgeModelResult<Vec<DepthAgeSummary>> {
        Ok(self.predict(query_depths)?.summarize(options))
    }

    /// Summaries of the ensemble's scalar parameters.
    ///
    /// Returns
    /// -------
    /// `AgeModelResult<Vec<ScalarSummary>>`
    ///   Rows for `"overall_rate"` and `"memory"`, with unconditional
    ///   convergence diagnostics.
    pub fn parameter_summaries(
        &self, options: &SummaryOptions,
    ) -> AgeModelResult<Vec<ScalarSummary>> {
        let chain_id = self.ensemble.chain_id();
        Ok(vec![
            summarize_scalar(
                "overall_rate",
                self.ensemble.overall_rate().to_vec().as_slice(),
                chain_id,
                options,
            )?,
            summarize_scalar(
                "memory",
                self.ensemble.memory().to_vec().as_slice(),
                chain_id,
                options,
            )?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - End-to-end prediction of the reference scenario on the boundary
    //   grid and at interpolated query depths (including NaN markers).
    // - Single-realization access and its draw bound.
    // - The anchor-range check at model construction.
    // - Scalar parameter summaries.
    //
    // They intentionally DO NOT cover:
    // - Summary statistics themselves (summary tests) or ensemble
    //   validation (posterior tests).
    // -------------------------------------------------------------------------

    /// K = [2, 2] over [0, 4] with two draws reproducing the reference
    /// rates [10, 10, 20, 20], anchored at (0, 100).
    fn reference_model() -> AgeDepthModel {
        let hierarchy =
            SectionHierarchy::with_branching(0.0, 4.0, &[2, 2]).expect("valid configuration");
        let draws = array![
            [1.0, 10.0, 10.0, 20.0, 20.0],
            [1.0, 10.0, 10.0, 20.0, 20.0],
        ];
        let ensemble =
            PosteriorEnsemble::from_flat(&hierarchy, draws, array![0.4, 0.6], vec![0, 1])
                .expect("valid ensemble");
        let anchor = Anchor::new(0.0, 100.0).expect("finite anchor");
        AgeDepthModel::new(hierarchy, ensemble, anchor).expect("anchor inside span")
    }

    #[test]
    // Purpose
    // -------
    // Run the reference scenario on the boundary grid: every draw's row
    // must equal [100, 110, 120, 140, 160] and the table must be marked
    // non-interpolated.
    //
    // Given
    // -----
    // - The reference model, predicted with `None` query depths.
    //
    // Expect
    // ------
    // - Depths equal to the boundary grid, reference ages per row, chain
    //   metadata passed through.
    fn predict_on_boundary_grid_matches_reference_scenario() {
        // Arrange
        let model = reference_model();

        // Act
        let table = model.predict(None).expect("valid model");

        // Assert
        assert!(!table.interpolated());
        assert_eq!(table.depths().to_vec(), vec![0.0, 1.0, 2.0, 3.0, 4.0]);
        for draw in 0..table.n_draws() {
            assert_eq!(table.ages().row(draw).to_vec(), vec![100.0, 110.0, 120.0, 140.0, 160.0]);
        }
        assert_eq!(table.chain_id(), &[0, 1]);
    }

    #[test]
    // Purpose
    // -------
    // Verify interpolated prediction: in-range queries interpolate
    // linearly, out-of-range queries carry NaN, and query order is
    // preserved.
    //
    // Given
    // -----
    // - Query depths [2.5, -1.0, 4.0] against the reference model.
    //
    // Expect
    // ------
    // - Ages [130, NaN, 160] in every row, `interpolated` set.
    fn predict_at_query_depths_interpolates_and_marks() {
        // Arrange
        let model = reference_model();

        // Act
        let table = model.predict(Some(&[2.5, -1.0, 4.0])).expect("valid model");

        // Assert
        assert!(table.interpolated());
        assert_eq!(table.depths().to_vec(), vec![2.5, -1.0, 4.0]);
        for draw in 0..table.n_draws() {
            let row = table.ages().row(draw);
            assert_eq!(row[0], 130.0);
            assert!(row[1].is_nan());
            assert_eq!(row[2], 160.0);
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify single-realization access and its bound check.
    //
    // Given
    // -----
    // - The 2-draw reference model.
    //
    // Expect
    // ------
    // - Draw 0 reconstructs the reference ages; draw 7 raises
    //   DrawOutOfRange.
    fn realization_reconstructs_one_draw_and_checks_bounds() {
        // Arrange
        let model = reference_model();

        // Act & Assert
        let ages = model.realization(0).expect("draw exists");
        assert_eq!(ages, vec![100.0, 110.0, 120.0, 140.0, 160.0]);
        assert_eq!(
            model.realization(7),
            Err(AgeModelError::DrawOutOfRange { draw: 7, n_draws: 2 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Verify the anchor-range check at construction.
    //
    // Given
    // -----
    // - The reference hierarchy/ensemble with an anchor at depth 9.
    //
    // Expect
    // ------
    // - AnchorOutOfRange embedding the span [0, 4].
    fn new_rejects_anchor_outside_span() {
        // Arrange
        let hierarchy =
            SectionHierarchy::with_branching(0.0, 4.0, &[2, 2]).expect("valid configuration");
        let draws = array![[1.0, 10.0, 10.0, 20.0, 20.0]];
        let ensemble = PosteriorEnsemble::from_flat(&hierarchy, draws, array![0.5], vec![0])
            .expect("valid ensemble");
        let anchor = Anchor::new(9.0, 100.0).expect("finite anchor");

        // Act & Assert
        assert_eq!(
            AgeDepthModel::new(hierarchy, ensemble, anchor),
            Err(AgeModelError::AnchorOutOfRange { depth: 9.0, depth_min: 0.0, depth_max: 4.0 })
        );
    }

    #[test]
    // Purpose
    // -------
    // Verify the scalar parameter summaries: names, draw counts, and mean
    // pass-through.
    //
    // Given
    // -----
    // - The reference model (overall rate 1.0 in both draws).
    //
    // Expect
    // ------
    // - Rows named "overall_rate" and "memory"; the rate mean is 1.0.
    fn parameter_summaries_report_rate_and_memory() {
        // Arrange
        let model = reference_model();

        // Act
        let rows = model
            .parameter_summaries(&SummaryOptions::default())
            .expect("valid parameter draws");

        // Assert
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "overall_rate");
        assert_eq!(rows[1].name, "memory");
        assert!((rows[0].mean - 1.0).abs() < 1e-12);
        assert_eq!(rows[0].n, 2);
    }
}
