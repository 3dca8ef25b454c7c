//! posterior::ensemble — validated posterior draw collections.
//!
//! Purpose
//! -------
//! Carry the sampler's posterior output as an immutable, validated value:
//! per-draw overall mean accumulation rates, non-root node multipliers, the
//! memory (autocorrelation) parameter, chain-id metadata, and the derived
//! finest-level absolute rate matrix. The ensemble is the single input the
//! age model consumes; everything downstream relies on the invariants
//! enforced here and never re-validates.
//!
//! Key behaviors
//! -------------
//! - [`PosteriorEnsemble::new`] validates shapes, finiteness, positivity of
//!   rate parameters, the `[0, 1]` range of the memory parameter, and the
//!   equal-length chain partition required by split-chain diagnostics.
//! - [`PosteriorEnsemble::from_flat`] ingests the sampler's raw
//!   `[num_draws × (1 + non_root)]` matrix directly, splitting it into the
//!   overall mean column and the multiplier block after a single layout
//!   length check.
//! - The finest-level rate matrix is derived once at construction through
//!   [`ParamLayout`] and cached; draws are never reordered, keeping them
//!   aligned with per-parameter diagnostic metadata.
//!
//! Invariants & assumptions
//! ------------------------
//! - All per-draw arrays have the same leading length `n_draws ≥ 1`.
//! - Overall rates and multipliers are finite and strictly positive; memory
//!   lies in `[0, 1]`; chain ids partition the draws into equal-sized
//!   groups.
//! - The multiplier matrix has exactly `non_root_count` columns, ordered
//!   level-major to match [`ParamLayout`] positions (column = position − 1).
//!
//! Conventions
//! -----------
//! - Rates are time-per-depth throughout (e.g. yr/cm); larger rate means
//!   slower accumulation.
//! - Chain ids are opaque labels; draws belonging to one chain keep their
//!   within-chain order.
//!
//! Downstream usage
//! ----------------
//! - `agemodel::model` reconstructs one age realization per ensemble row
//!   and threads `chain_id` through to the summary diagnostics.
//!
//! Testing notes
//! -------------
//! - Unit tests cover both constructors' happy paths, each validation
//!   branch, the derived rate matrix, and preservation of draw order.
use ndarray::{Array1, Array2, ArrayView1, s};

use crate::hierarchy::SectionHierarchy;
use crate::posterior::errors::{PosteriorError, PosteriorResult};
use crate::posterior::mapper::ParamLayout;

/// PosteriorEnsemble — immutable, validated collection of posterior draws.
///
/// Purpose
/// -------
/// Hold the full posterior sample for one fitted age-depth model: the
/// parameter draws the sampler produced (opaque to this crate's concerns),
/// the chain metadata diagnostics need, and the finest-level rate matrix
/// the reconstructor consumes.
///
/// Fields
/// ------
/// - `overall_rate`: `Array1<f64>` — overall mean rate per draw (> 0).
/// - `multipliers`: `Array2<f64>` — `[n_draws × non_root]` multiplier block,
///   level-major columns (> 0).
/// - `memory`: `Array1<f64>` — memory/autocorrelation parameter per draw,
///   in `[0, 1]`.
/// - `chain_id`: `Vec<usize>` — chain label per draw; equal-sized groups.
/// - `finest_rates`: `Array2<f64>` — derived `[n_draws × N]` absolute rates.
/// - `n_chains`, `draws_per_chain`: cached chain partition facts.
///
/// Invariants
/// ----------
/// - Shapes and value ranges as documented in the module header; enforced
///   once at construction.
/// - Draw order is construction order and is never permuted.
///
/// Performance
/// -----------
/// - Construction is O(n_draws × (non_root + N·L)) for validation and rate
///   derivation; all accessors are O(1) views.
///
/// Notes
/// -----
/// - Treats concatenated multi-chain sampler output as one flat ensemble;
///   chain identity is carried only as metadata for the convergence
///   diagnostics, exactly as the upstream contract requires.
#[derive(Debug, Clone, PartialEq)]
pub struct PosteriorEnsemble {
    overall_rate: Array1<f64>,
    multipliers: Array2<f64>,
    memory: Array1<f64>,
    chain_id: Vec<usize>,
    finest_rates: Array2<f64>,
    n_chains: usize,
    draws_per_chain: usize,
}

impl PosteriorEnsemble {
    /// Construct a validated ensemble from its parameter components.
    ///
    /// Parameters
    /// ----------
    /// - `hierarchy`: `&SectionHierarchy`
    ///   The hierarchy the draws were sampled against; fixes the expected
    ///   multiplier count and the finest-rate geometry.
    /// - `overall_rate`: `Array1<f64>`
    ///   Overall mean accumulation rate per draw; finite and > 0.
    /// - `multipliers`: `Array2<f64>`
    ///   `[n_draws × non_root]` multiplier matrix, level-major columns;
    ///   finite and > 0.
    /// - `memory`: `Array1<f64>`
    ///   Memory parameter per draw; finite and within `[0, 1]`.
    /// - `chain_id`: `Vec<usize>`
    ///   Chain label per draw; labels must partition the draws into
    ///   equal-sized groups.
    ///
    /// Returns
    /// -------
    /// `PosteriorResult<PosteriorEnsemble>`
    ///   - `Ok(ensemble)` with the finest-rate matrix derived and cached.
    ///   - `Err(PosteriorError)` on any contract violation.
    ///
    /// Errors
    /// ------
    /// - `PosteriorError::EmptyEnsemble` — no draws.
    /// - `PosteriorError::ParamLengthMismatch { .. }` — multiplier column
    ///   count disagrees with the hierarchy's non-root node count.
    /// - `PosteriorError::DrawCountMismatch { .. }` — `memory`, `chain_id`,
    ///   or the multiplier row count disagrees with `overall_rate`.
    /// - `PosteriorError::NonFiniteParam { .. }` /
    ///   `PosteriorError::NonPositiveRate { .. }` — invalid rate values.
    /// - `PosteriorError::InvalidMemory { .. }` — memory outside `[0, 1]`.
    /// - `PosteriorError::UnevenChains { .. }` — ragged chain partition.
    ///
    /// Panics
    /// ------
    /// - Never panics; all invalid inputs are reported as errors.
    pub fn new(
        hierarchy: &SectionHierarchy, overall_rate: Array1<f64>, multipliers: Array2<f64>,
        memory: Array1<f64>, chain_id: Vec<usize>,
    ) -> PosteriorResult<Self> {
        let n_draws = overall_rate.len();
        if n_draws == 0 {
            return Err(PosteriorError::EmptyEnsemble);
        }

        let layout = ParamLayout::new(hierarchy);
        let non_root = hierarchy.non_root_count();
        if multipliers.ncols() != non_root {
            return Err(PosteriorError::ParamLengthMismatch {
                expected: layout.expected_len(),
                actual: multipliers.ncols() + 1,
            });
        }
        if multipliers.nrows() != n_draws {
            return Err(PosteriorError::DrawCountMismatch {
                field: "multipliers",
                expected: n_draws,
                actual: multipliers.nrows(),
            });
        }
        if memory.len() != n_draws {
            return Err(PosteriorError::DrawCountMismatch {
                field: "memory",
                expected: n_draws,
                actual: memory.len(),
            });
        }
        if chain_id.len() != n_draws {
            return Err(PosteriorError::DrawCountMismatch {
                field: "chain_id",
                expected: n_draws,
                actual: chain_id.len(),
            });
        }

        validate_rates(&overall_rate, &multipliers)?;
        validate_memory(&memory)?;
        let (n_chains, draws_per_chain) = validate_chains(&chain_id)?;

        // Derive the finest-level absolute rate matrix once.
        let n_sections = hierarchy.n_sections();
        let mut finest_rates = Array2::zeros((n_draws, n_sections));
        let mut flat: Vec<f64> = Vec::with_capacity(layout.expected_len());
        for draw in 0..n_draws {
            flat.clear();
            flat.push(overall_rate[draw]);
            flat.extend(multipliers.row(draw).iter().copied());
            let rates = layout.finest_rates(&flat)?;
            for (section, rate) in rates.into_iter().enumerate() {
                finest_rates[[draw, section]] = rate;
            }
        }

        Ok(PosteriorEnsemble {
            overall_rate,
            multipliers,
            memory,
            chain_id,
            finest_rates,
            n_chains,
            draws_per_chain,
        })
    }

    /// Construct an ensemble from the sampler's flat draw matrix.
    ///
    /// Parameters
    /// ----------
    /// - `hierarchy`: `&SectionHierarchy`
    ///   As for [`Self::new`].
    /// - `draws`: `Array2<f64>`
    ///   `[n_draws × (1 + non_root)]` matrix: column 0 is the overall mean,
    ///   the remaining columns the level-major multipliers.
    /// - `memory`, `chain_id`
    ///   As for [`Self::new`].
    ///
    /// Returns
    /// -------
    /// `PosteriorResult<PosteriorEnsemble>`
    ///   The validated ensemble.
    ///
    /// Errors
    /// ------
    /// - `PosteriorError::ParamLengthMismatch { .. }` when the column count
    ///   differs from the hierarchy's expected flat length; otherwise as for
    ///   [`Self::new`].
    pub fn from_flat(
        hierarchy: &SectionHierarchy, draws: Array2<f64>, memory: Array1<f64>,
        chain_id: Vec<usize>,
    ) -> PosteriorResult<Self> {
        if draws.nrows() == 0 {
            return Err(PosteriorError::EmptyEnsemble);
        }
        let expected = hierarchy.expected_param_len();
        if draws.ncols() != expected {
            return Err(PosteriorError::ParamLengthMismatch {
                expected,
                actual: draws.ncols(),
            });
        }
        let overall_rate = draws.column(0).to_owned();
        let multipliers = draws.slice(s![.., 1..]).to_owned();
        Self::new(hierarchy, overall_rate, multipliers, memory, chain_id)
    }

    /// Number of posterior draws.
    #[inline]
    pub fn n_draws(&self) -> usize {
        self.overall_rate.len()
    }

    /// Number of distinct chains in the metadata.
    #[inline]
    pub fn n_chains(&self) -> usize {
        self.n_chains
    }

    /// Draws per chain (equal across chains by construction).
    #[inline]
    pub fn draws_per_chain(&self) -> usize {
        self.draws_per_chain
    }

    /// Overall mean accumulation rate per draw.
    #[inline]
    pub fn overall_rate(&self) -> ArrayView1<'_, f64> {
        self.overall_rate.view()
    }

    /// Non-root multiplier block, level-major columns.
    #[inline]
    pub fn multipliers(&self) -> &Array2<f64> {
        &self.multipliers
    }

    /// Memory (autocorrelation) parameter per draw.
    #[inline]
    pub fn memory(&self) -> ArrayView1<'_, f64> {
        self.memory.view()
    }

    /// Chain label per draw, in draw order.
    #[inline]
    pub fn chain_id(&self) -> &[usize] {
        &self.chain_id
    }

    /// Derived `[n_draws × N]` finest-level absolute rate matrix
    /// (time per depth).
    #[inline]
    pub fn finest_rates(&self) -> &Array2<f64> {
        &self.finest_rates
    }
}

/// Check finiteness and strict positivity of all rate parameters.
fn validate_rates(
    overall_rate: &Array1<f64>, multipliers: &Array2<f64>,
) -> PosteriorResult<()> {
    for (draw, &value) in overall_rate.iter().enumerate() {
        if !value.is_finite() {
            return Err(PosteriorError::NonFiniteParam { draw, name: "overall_rate", value });
        }
        if value <= 0.0 {
            return Err(PosteriorError::NonPositiveRate { draw, name: "overall_rate", value });
        }
    }
    for ((draw, _), &value) in multipliers.indexed_iter() {
        if !value.is_finite() {
            return Err(PosteriorError::NonFiniteParam { draw, name: "multipliers", value });
        }
        if value <= 0.0 {
            return Err(PosteriorError::NonPositiveRate { draw, name: "multipliers", value });
        }
    }
    Ok(())
}

/// Check that the memory parameter is finite and inside [0, 1].
fn validate_memory(memory: &Array1<f64>) -> PosteriorResult<()> {
    for (draw, &value) in memory.iter().enumerate() {
        if !value.is_finite() {
            return Err(PosteriorError::NonFiniteParam { draw, name: "memory", value });
        }
        if !(0.0..=1.0).contains(&value) {
            return Err(PosteriorError::InvalidMemory { draw, value });
        }
    }
    Ok(())
}

/// Check the equal-length chain partition; returns (n_chains, per-chain len).
fn validate_chains(chain_id: &[usize]) -> PosteriorResult<(usize, usize)> {
    let mut labels: Vec<usize> = chain_id.to_vec();
    labels.sort_unstable();
    labels.dedup();

    let mut counts: Vec<(usize, usize)> = Vec::with_capacity(labels.len());
    for &label in &labels {
        let count = chain_id.iter().filter(|&&id| id == label).count();
        counts.push((label, count));
    }
    let expected = counts[0].1;
    for &(label, count) in &counts[1..] {
        if count != expected {
            return Err(PosteriorError::UnevenChains { chain: label, len: count, expected });
        }
    }
    Ok((labels.len(), expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn reference_hierarchy() -> SectionHierarchy {
        SectionHierarchy::with_branching(0.0, 4.0, &[2, 2]).expect("valid configuration")
    }

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Happy-path construction via `new` and `from_flat`, including the
    //   derived finest-rate matrix.
    // - Each validation branch: empty ensemble, wrong multiplier width,
    //   ragged per-draw arrays, non-positive rates, out-of-range memory,
    //   and uneven chains.
    //
    // They intentionally DO NOT cover:
    // - Age reconstruction from the derived rates (agemodel tests) or the
    //   ParamLayout position rules (mapper tests).
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that `from_flat` splits the draw matrix into mean + multiplier
    // parts and derives the expected finest rates.
    //
    // Given
    // -----
    // - The K = [2, 2] hierarchy and two flat draws with unit level-1
    //   multipliers and leaf multipliers [10, 10, 20, 20] / mean 1, so the
    //   finest rates reproduce the reference scenario rates.
    //
    // Expect
    // ------
    // - n_draws = 2, two chains of one draw each.
    // - finest_rates row 0 equals [10, 10, 20, 20].
    fn from_flat_derives_reference_finest_rates() {
        // Arrange
        let h = reference_hierarchy();
        let draws = array![
            [1.0, 10.0, 10.0, 20.0, 20.0],
            [2.0, 5.0, 5.0, 10.0, 10.0],
        ];
        let memory = array![0.5, 0.7];
        let chain_id = vec![0, 1];

        // Act
        let ensemble = PosteriorEnsemble::from_flat(&h, draws, memory, chain_id)
            .expect("valid ensemble should build");

        // Assert
        assert_eq!(ensemble.n_draws(), 2);
        assert_eq!(ensemble.n_chains(), 2);
        assert_eq!(ensemble.draws_per_chain(), 1);
        let rates = ensemble.finest_rates();
        assert_eq!(rates.row(0).to_vec(), vec![10.0, 10.0, 20.0, 20.0]);
        assert_eq!(rates.row(1).to_vec(), vec![10.0, 10.0, 20.0, 20.0]);
    }

    #[test]
    // Purpose
    // -------
    // Ensure the multiplier width check fires as ParamLengthMismatch with
    // the hierarchy's expected flat length.
    //
    // Given
    // -----
    // - The K = [2, 2] hierarchy (expected flat length 5) and a flat matrix
    //   with 4 columns.
    //
    // Expect
    // ------
    // - ParamLengthMismatch { expected: 5, actual: 4 }.
    fn from_flat_rejects_wrong_column_count() {
        // Arrange
        let h = reference_hierarchy();
        let draws = Array2::from_elem((2, 4), 1.0);

        // Act & Assert
        match PosteriorEnsemble::from_flat(&h, draws, array![0.5, 0.5], vec![0, 0]) {
            Err(PosteriorError::ParamLengthMismatch { expected, actual }) => {
                assert_eq!((expected, actual), (5, 4));
            }
            other => panic!("expected ParamLengthMismatch, got {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // Exercise the remaining validation branches one by one.
    //
    // Given
    // -----
    // - Variants of an otherwise valid 2-draw ensemble over K = [2, 2].
    //
    // Expect
    // ------
    // - EmptyEnsemble, DrawCountMismatch (memory), NonPositiveRate,
    //   InvalidMemory, and UnevenChains respectively.
    fn new_surfaces_each_validation_error() {
        // Arrange
        let h = reference_hierarchy();
        let ok_mult = Array2::from_elem((2, 4), 1.0);

        // Act & Assert: empty ensemble
        match PosteriorEnsemble::new(
            &h,
            Array1::zeros(0),
            Array2::zeros((0, 4)),
            Array1::zeros(0),
            vec![],
        ) {
            Err(PosteriorError::EmptyEnsemble) => (),
            other => panic!("expected EmptyEnsemble, got {other:?}"),
        }

        // Act & Assert: ragged memory
        match PosteriorEnsemble::new(
            &h,
            array![1.0, 1.0],
            ok_mult.clone(),
            array![0.5],
            vec![0, 0],
        ) {
            Err(PosteriorError::DrawCountMismatch { field, .. }) => assert_eq!(field, "memory"),
            other => panic!("expected DrawCountMismatch, got {other:?}"),
        }

        // Act & Assert: non-positive rate
        match PosteriorEnsemble::new(
            &h,
            array![1.0, -2.0],
            ok_mult.clone(),
            array![0.5, 0.5],
            vec![0, 0],
        ) {
            Err(PosteriorError::NonPositiveRate { draw, name, .. }) => {
                assert_eq!((draw, name), (1, "overall_rate"));
            }
            other => panic!("expected NonPositiveRate, got {other:?}"),
        }

        // Act & Assert: memory outside [0, 1]
        match PosteriorEnsemble::new(
            &h,
            array![1.0, 1.0],
            ok_mult.clone(),
            array![0.5, 1.5],
            vec![0, 0],
        ) {
            Err(PosteriorError::InvalidMemory { draw, .. }) => assert_eq!(draw, 1),
            other => panic!("expected InvalidMemory, got {other:?}"),
        }

        // Act & Assert: uneven chains
        match PosteriorEnsemble::new(
            &h,
            array![1.0, 1.0, 1.0],
            Array2::from_elem((3, 4), 1.0),
            array![0.5, 0.5, 0.5],
            vec![0, 0, 1],
        ) {
            Err(PosteriorError::UnevenChains { chain, len, expected }) => {
                assert_eq!((chain, len, expected), (1, 1, 2));
            }
            other => panic!("expected UnevenChains, got {other:?}"),
        }
    }

    #[test]
    // Purpose
    // -------
    // Verify draw order and chain metadata are preserved verbatim, since
    // diagnostics depend on within-chain ordering.
    //
    // Given
    // -----
    // - A 4-draw ensemble with chains [0, 0, 1, 1] and distinct means.
    //
    // Expect
    // ------
    // - `overall_rate` and `chain_id` read back in construction order.
    fn new_preserves_draw_order_and_chain_metadata() {
        // Arrange
        let h = reference_hierarchy();
        let means = array![1.0, 2.0, 3.0, 4.0];
        let ensemble = PosteriorEnsemble::new(
            &h,
            means.clone(),
            Array2::from_elem((4, 4), 1.0),
            array![0.1, 0.2, 0.3, 0.4],
            vec![0, 0, 1, 1],
        )
        .expect("valid ensemble should build");

        // Act & Assert
        assert_eq!(ensemble.overall_rate().to_vec(), means.to_vec());
        assert_eq!(ensemble.chain_id(), &[0, 0, 1, 1]);
        assert_eq!(ensemble.memory().to_vec(), vec![0.1, 0.2, 0.3, 0.4]);
    }
}
