//! agemodel::summary — per-depth and scalar posterior summaries.
//!
//! Purpose
//! -------
//! Reduce prediction tables and scalar parameter draws to the reporting
//! statistics callers consume: mean, sample standard deviation, a
//! configurable quantile set, the finite-draw count, and (for draws still
//! aligned with their chains) split-R̂ and effective sample size with a
//! low-ESS quality flag.
//!
//! Key behaviors
//! -------------
//! - [`SummaryOptions`] validates the requested quantile probabilities once
//!   at construction; the default set is the conventional
//!   2.5/25/50/75/97.5% spread.
//! - [`summarize`] works column-by-column over a prediction table, using
//!   only the finite ages at each depth. An all-NaN column (a query depth
//!   outside the modelled range) produces an all-NaN summary row rather
//!   than an error.
//! - Convergence diagnostics are attached only for non-interpolated
//!   predictions: interpolation reorders nothing, but out-of-range markers
//!   can break the draw/chain alignment the estimators rely on, so
//!   interpolated tables report `None`.
//! - [`summarize_scalar`] applies the same reductions to one named scalar
//!   parameter and is strict about its inputs: scalar draws come straight
//!   from the sampler and must be finite.
//!
//! Invariants & assumptions
//! ------------------------
//! - Standard deviations use the sample (n−1) denominator.
//! - Quantiles are computed per depth over finite values only.
//!
//! Conventions
//! -----------
//! - Statistics over `f64` slices use `statrs::statistics::Statistics`;
//!   quantiles use `statrs::statistics::{Data, OrderStatistics}`.
//! - NaN encodes "not computable" throughout (empty column, single draw);
//!   a summary row is never dropped.
//!
//! Downstream usage
//! ----------------
//! - `agemodel::model` exposes [`summarize`] on its prediction tables and
//!   [`summarize_scalar`] for the ensemble's scalar parameters.
//!
//! Testing notes
//! -------------
//! - Unit tests pin the default quantile set, NaN rows for out-of-range
//!   depths, the diagnostics on/off switch between raw and interpolated
//!   tables, and every scalar-summary validation branch.

use statrs::statistics::{Data, OrderStatistics, Statistics};

use crate::agemodel::diagnostics::{chain_diagnostics, is_degenerate};
use crate::agemodel::errors::{AgeModelError, AgeModelResult};
use crate::agemodel::model::AgePredictions;

/// Default quantile probabilities: median, interquartile range, and the
/// central 95% interval.
pub const DEFAULT_QUANTILES: [f64; 5] = [0.025, 0.25, 0.5, 0.75, 0.975];

/// SummaryOptions — validated configuration for summary computations.
///
/// Purpose
/// -------
/// Hold the quantile probabilities a summary reports, checked once so the
/// summary loops never see an invalid probability.
///
/// Fields
/// ------
/// - `quantiles`: `Vec<f64>` — probabilities in the open interval (0, 1),
///   in the caller's order.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOptions {
    quantiles: Vec<f64>,
}

impl SummaryOptions {
    /// Build options from an explicit quantile set.
    ///
    /// Parameters
    /// ----------
    /// - `quantiles`: `&[f64]`
    ///   Probabilities to report, each strictly inside (0, 1).
    ///
    /// Returns
    /// -------
    /// `AgeModelResult<SummaryOptions>`
    ///   The validated options.
    ///
    /// Errors
    /// ------
    /// - `AgeModelError::EmptyQuantiles` when the set is empty.
    /// - `AgeModelError::InvalidQuantile` when a probability is non-finite
    ///   or outside (0, 1).
    pub fn new(quantiles: &[f64]) -> AgeModelResult<Self> {
        if quantiles.is_empty() {
            return Err(AgeModelError::EmptyQuantiles);
        }
        for &p in quantiles {
            if !p.is_finite() || p <= 0.0 || p >= 1.0 {
                return Err(AgeModelError::InvalidQuantile { value: p });
            }
        }
        Ok(SummaryOptions { quantiles: quantiles.to_vec() })
    }

    /// The quantile probabilities these options report.
    pub fn quantiles(&self) -> &[f64] {
        &self.quantiles
    }
}

impl Default for SummaryOptions {
    fn default() -> Self {
        SummaryOptions { quantiles: DEFAULT_QUANTILES.to_vec() }
    }
}

/// DepthAgeSummary — summary statistics of the age distribution at one depth.
///
/// Purpose
/// -------
/// One reporting row per query depth: location, spread, quantiles, and the
/// convergence diagnostics when available.
///
/// Fields
/// ------
/// - `depth`: `f64` — the query depth this row describes.
/// - `mean` / `sd`: `f64` — mean and sample standard deviation over the
///   finite ages; NaN when fewer than 1 (mean) or 2 (sd) finite draws.
/// - `quantiles`: `Vec<(f64, f64)>` — `(probability, age)` pairs in the
///   options' order; ages are NaN when no finite draws exist.
/// - `n`: `usize` — number of finite ages at this depth.
/// - `ess` / `rhat`: `Option<f64>` — diagnostics, `None` for interpolated
///   tables; NaN inside `Some` when not computable.
/// - `low_ess`: `bool` — quality flag, set when diagnostics were computed
///   and the effective sample size fell below the reliability floor.
#[derive(Debug, Clone, PartialEq)]
pub struct DepthAgeSummary {
    pub depth: f64,
    pub mean: f64,
    pub sd: f64,
    pub quantiles: Vec<(f64, f64)>,
    pub n: usize,
    pub ess: Option<f64>,
    pub rhat: Option<f64>,
    pub low_ess: bool,
}

/// ScalarSummary — summary statistics of one named scalar parameter.
///
/// Fields mirror [`DepthAgeSummary`] minus the depth; scalar draws always
/// carry their chain metadata, so the diagnostics are unconditional.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarSummary {
    pub name: String,
    pub mean: f64,
    pub sd: f64,
    pub quantiles: Vec<(f64, f64)>,
    pub n: usize,
    pub ess: f64,
    pub rhat: f64,
    pub low_ess: bool,
}

/// Summarize a prediction table depth by depth.
///
/// Parameters
/// ----------
/// - `predictions`: `&AgePredictions`
///   The table to reduce, one column per query depth.
/// - `options`: `&SummaryOptions`
///   Quantile probabilities to report.
///
/// Returns
/// -------
/// `Vec<DepthAgeSummary>`
///   One row per query depth, in the table's depth order. Columns with no
///   finite ages yield all-NaN statistics with `n == 0`.
///
/// Notes
/// -----
/// - Diagnostics (`ess`, `rhat`, `low_ess`) are populated only when the
///   table was built on the modelled boundary grid
///   (`!predictions.interpolated()`); interpolated tables report `None`
///   and `low_ess == false`.
pub fn summarize(predictions: &AgePredictions, options: &SummaryOptions) -> Vec<DepthAgeSummary> {
    let with_diagnostics = !predictions.interpolated();
    predictions
        .depths()
        .iter()
        .enumerate()
        .map(|(col, &depth)| {
            let column: Vec<f64> = predictions.ages().column(col).to_vec();
            let finite: Vec<f64> = column.iter().copied().filter(|v| v.is_finite()).collect();
            let (mean, sd, quantiles) = reduce(&finite, options);

            let (ess, rhat, low_ess) = if with_diagnostics && finite.len() == column.len() {
                let diag = chain_diagnostics(&column, predictions.chain_id());
                (Some(diag.ess), Some(diag.rhat), is_degenerate(diag.ess))
            } else {
                (None, None, false)
            };

            DepthAgeSummary { depth, mean, sd, quantiles, n: finite.len(), ess, rhat, low_ess }
        })
        .collect()
}

/// Summarize one named scalar parameter across draws.
///
/// Parameters
/// ----------
/// - `name`: `&str`
///   Reporting label for the parameter (e.g. `"overall_rate"`).
/// - `values`: `&[f64]`
///   One value per draw, in draw order.
/// - `chain_id`: `&[usize]`
///   Chain label per draw; same length as `values`.
/// - `options`: `&SummaryOptions`
///   Quantile probabilities to report.
///
/// Returns
/// -------
/// `AgeModelResult<ScalarSummary>`
///   The summary row with unconditional diagnostics.
///
/// Errors
/// ------
/// - `AgeModelError::EmptySample` when `values` is empty.
/// - `AgeModelError::NonFiniteSample` when a value is NaN/±∞.
/// - `AgeModelError::ChainLengthMismatch` when `chain_id` and `values`
///   disagree in length.
pub fn summarize_scalar(
    name: &str, values: &[f64], chain_id: &[usize], options: &SummaryOptions,
) -> AgeModelResult<ScalarSummary> {
    if values.is_empty() {
        return Err(AgeModelError::EmptySample);
    }
    if chain_id.len() != values.len() {
        return Err(AgeModelError::ChainLengthMismatch {
            values: values.len(),
            chains: chain_id.len(),
        });
    }
    for (index, &value) in values.iter().enumerate() {
        if !value.is_finite() {
            return Err(AgeModelError::NonFiniteSample { index, value });
        }
    }

    let (mean, sd, quantiles) = reduce(values, options);
    let diag = chain_diagnostics(values, chain_id);

    Ok(ScalarSummary {
        name: name.to_string(),
        mean,
        sd,
        quantiles,
        n: values.len(),
        ess: diag.ess,
        rhat: diag.rhat,
        low_ess: is_degenerate(diag.ess),
    })
}

/// Mean, sample sd, and quantiles over a finite sample; NaN where the
/// sample is too small.
fn reduce(finite: &[f64], options: &SummaryOptions) -> (f64, f64, Vec<(f64, f64)>) {
    let mean = if finite.is_empty() { f64::NAN } else { finite.mean() };
    let sd = if finite.len() < 2 { f64::NAN } else { finite.std_dev() };
    let quantiles = if finite.is_empty() {
        options.quantiles().iter().map(|&p| (p, f64::NAN)).collect()
    } else {
        let mut data = Data::new(finite.to_vec());
        options.quantiles().iter().map(|&p| (p, data.quantile(p))).collect()
    };
    (mean, sd, quantiles)
}
