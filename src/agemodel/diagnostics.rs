//! agemodel::diagnostics — split-chain convergence diagnostics.
//!
//! Purpose
//! -------
//! Compute the two per-parameter diagnostics the summaries report: the
//! split-chain potential scale reduction factor (split-R̂) and the effective
//! sample size (ESS). Both treat the scalar of interest (the age at one
//! depth across draws, or a scalar model parameter) as a set of chains
//! identified by the ensemble's pass-through chain metadata.
//!
//! Key behaviors
//! -------------
//! - Chains are split in half (dropping the middle draw of odd-length
//!   chains) before any variance computation, so within-chain drift shows
//!   up as apparent between-chain disagreement.
//! - R̂ is `sqrt(var⁺ / W)` with `var⁺ = (n−1)/n · W + B/n`, the classic
//!   between/within variance blend over the split chains.
//! - ESS uses chain-averaged autocovariances and Geyer's initial positive,
//!   monotone sequence to truncate the autocorrelation sum.
//! - Degenerate inputs (too few draws per chain, zero within-chain
//!   variance) yield NaN diagnostics rather than errors: diagnostics are a
//!   quality signal, never a failure mode.
//!
//! Invariants & assumptions
//! ------------------------
//! - `values` and `chain_id` have equal length and chains partition the
//!   draws into equal-sized groups, enforced upstream by the ensemble.
//! - Values are finite (enforced upstream); the functions here do not
//!   re-validate.
//!
//! Conventions
//! -----------
//! - Autocovariances use the biased `1/n` denominator over each split
//!   chain, matching the variogram-style estimator the ESS blend expects.
//! - `ESS` is capped at the total draw count; an ESS below
//!   [`MIN_RELIABLE_ESS`] marks the quantity as degenerate for reporting.
//!
//! Downstream usage
//! ----------------
//! - `agemodel::summary` calls [`chain_diagnostics`] per modelled depth and
//!   per scalar parameter, and turns [`is_degenerate`] into the `low_ess`
//!   quality flag. Interpolated summaries never call in here: diagnostics
//!   are properties of the original draw ensemble and are not recoverable
//!   after interpolation.
//!
//! Testing notes
//! -------------
//! - Unit tests check that independent-looking chains with matching
//!   distributions give R̂ near 1 and a healthy ESS, that disjoint chains
//!   inflate R̂, that constant values degrade to NaN, and that the
//!   degeneracy threshold behaves on NaN.
/// Reliability floor for effective sample sizes; quantities below it are
/// flagged as degenerate in summaries.
pub const MIN_RELIABLE_ESS: f64 = 100.0;

/// ChainDiagnostics — ESS and split-R̂ for one scalar quantity.
///
/// Purpose
/// -------
/// Carry the pair of diagnostics computed from one scalar's draws, with NaN
/// encoding "not computable" (too few draws, zero variance).
///
/// Fields
/// ------
/// - `ess`: `f64` — effective sample size, in `(0, n_draws]` or NaN.
/// - `rhat`: `f64` — split-chain potential scale reduction, ≥ ~1 or NaN.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChainDiagnostics {
    /// Effective sample size.
    pub ess: f64,
    /// Split-chain potential scale reduction factor.
    pub rhat: f64,
}

/// Whether an effective sample size is too small to be usable.
///
/// NaN counts as degenerate: an uncomputable ESS is no better than a tiny
/// one for reporting purposes.
#[inline]
pub fn is_degenerate(ess: f64) -> bool {
    !(ess >= MIN_RELIABLE_ESS)
}

/// Compute split-R̂ and ESS for one scalar quantity across draws.
///
/// Parameters
/// ----------
/// - `values`: `&[f64]`
///   The scalar of interest per draw, in draw order.
/// - `chain_id`: `&[usize]`
///   Chain label per draw; equal-length chains, same length as `values`.
///
/// Returns
/// -------
/// `ChainDiagnostics`
///   The diagnostic pair. Both fields are NaN when any split chain has
///   fewer than 2 draws (i.e. chains shorter than 4) or when the
///   within-chain variance vanishes.
///
/// Panics
/// ------
/// - Never panics for the equal-length, equal-chain inputs the ensemble
///   guarantees.
///
/// Notes
/// -----
/// - Splitting: each chain contributes its first and second halves as two
///   separate chains; odd-length chains drop their middle draw.
/// - ESS: with `m` split chains of length `n`, the lag-`t` correlation is
///   `ρ̂ₜ = 1 − (W − c̄ₜ) / var⁺` where `c̄ₜ` averages the per-chain biased
///   autocovariances; Geyer's initial positive monotone sequence truncates
///   `τ = −1 + 2·Σ Pₖ` over the pair sums `Pₖ = ρ̂₂ₖ + ρ̂₂ₖ₊₁`, and
///   `ESS = m·n / τ`, capped at `m·n`.
pub fn chain_diagnostics(values: &[f64], chain_id: &[usize]) -> ChainDiagnostics {
    let halves = split_chains(values, chain_id);
    let nan = ChainDiagnostics { ess: f64::NAN, rhat: f64::NAN };

    let Some(n) = halves.first().map(Vec::len) else {
        return nan;
    };
    if n < 2 {
        return nan;
    }
    let m = halves.len();

    let means: Vec<f64> = halves.iter().map(|c| c.iter().sum::<f64>() / n as f64).collect();
    let vars: Vec<f64> = halves
        .iter()
        .zip(&means)
        .map(|(chain, &mean)| {
            chain.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64
        })
        .collect();

    let within = vars.iter().sum::<f64>() / m as f64;
    let grand = means.iter().sum::<f64>() / m as f64;
    let between =
        n as f64 * means.iter().map(|&mu| (mu - grand).powi(2)).sum::<f64>() / (m - 1) as f64;
    let var_plus = (n - 1) as f64 / n as f64 * within + between / n as f64;

    if !(within > 0.0) || !var_plus.is_finite() {
        return nan;
    }
    let rhat = (var_plus / within).sqrt();

    // Chain-averaged biased autocovariances for lags 0..n.
    let mut rho: Vec<f64> = Vec::with_capacity(n);
    rho.push(1.0);
    for lag in 1..n {
        let mean_acov = halves
            .iter()
            .zip(&means)
            .map(|(chain, &mean)| autocovariance(chain, lag, mean))
            .sum::<f64>()
            / m as f64;
        rho.push(1.0 - (within - mean_acov) / var_plus);
    }

    // Geyer initial positive, monotone sequence over pair sums.
    let mut tau = -1.0;
    let mut prev_pair = f64::INFINITY;
    let mut k = 0;
    while 2 * k + 1 < rho.len() {
        let mut pair = rho[2 * k] + rho[2 * k + 1];
        if pair <= 0.0 {
            break;
        }
        pair = pair.min(prev_pair);
        tau += 2.0 * pair;
        prev_pair = pair;
        k += 1;
    }

    let total = (m * n) as f64;
    let ess = (total / tau.max(1.0 / total)).min(total);

    ChainDiagnostics { ess, rhat }
}

/// Split each chain into halves, preserving within-chain draw order.
///
/// Odd-length chains drop their middle draw so every returned half has the
/// same length.
fn split_chains(values: &[f64], chain_id: &[usize]) -> Vec<Vec<f64>> {
    let mut labels: Vec<usize> = chain_id.to_vec();
    labels.sort_unstable();
    labels.dedup();

    let mut halves: Vec<Vec<f64>> = Vec::with_capacity(2 * labels.len());
    for label in labels {
        let chain: Vec<f64> = values
            .iter()
            .zip(chain_id)
            .filter(|(_, &id)| id == label)
            .map(|(&v, _)| v)
            .collect();
        let half = chain.len() / 2;
        halves.push(chain[..half].to_vec());
        halves.push(chain[chain.len() - half..].to_vec());
    }
    halves
}

/// Biased (1/n) autocovariance of one split chain at a given lag.
#[inline]
fn autocovariance(chain: &[f64], lag: usize, mean: f64) -> f64 {
    let n = chain.len();
    chain[lag..]
        .iter()
        .zip(chain)
        .map(|(x_t, x_t_min_lag)| (x_t - mean) * (x_t_min_lag - mean))
        .sum::<f64>()
        / n as f64
}
