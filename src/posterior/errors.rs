//! posterior::errors — contract errors between sampler output and hierarchy.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias for posterior-ensemble ingestion
//! and parameter mapping, together with a conversion layer to Python
//! exceptions for PyO3-based bindings. Errors at this layer signal upstream
//! contract violations (a parameter vector that does not match the hierarchy,
//! malformed draw matrices, inconsistent chain metadata) and are always
//! fatal: the triggering operation aborts with no partial output.
//!
//! Key behaviors
//! -------------
//! - Define [`PosteriorResult`] and [`PosteriorError`] as the canonical
//!   result and error types for `posterior::mapper` and
//!   `posterior::ensemble`.
//! - Attach human-readable `Display` messages with enough payload (draw
//!   index, field name, offending value) to pinpoint the violation.
//! - Implement `From<PosteriorError> for PyErr` mapping all variants to
//!   `ValueError` at the Python boundary.
//!
//! Invariants & assumptions
//! ------------------------
//! - Ensemble constructors validate their inputs once; downstream consumers
//!   (reconstruction, summarization) rely on those invariants and do not
//!   re-validate.
//! - `PosteriorError` values are small and cheap to clone.
//!
//! Conventions
//! -----------
//! - `ParamLengthMismatch` is the mapping-time length check of the flat
//!   parameter vector against the hierarchy's expected non-root node count
//!   plus one; it corresponds to the index-error kind in the system design.
//! - Field names in payloads are the public accessor names
//!   (`overall_rate`, `memory`, `chain_id`, ...).
//!
//! Downstream usage
//! ----------------
//! - `ParamLayout::finest_rates` and the `PosteriorEnsemble` constructors
//!   return [`PosteriorResult`]; callers propagate with `?` or match on
//!   variants for custom reporting.
//!
//! Testing notes
//! -------------
//! - Unit tests verify that `Display` messages embed their payloads; the
//!   variants themselves are exercised by mapper and ensemble tests.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type PosteriorResult<T> = Result<T, PosteriorError>;

/// PosteriorError — violations of the sampler ↔ hierarchy contract.
///
/// Purpose
/// -------
/// Represent every way posterior input can fail validation: a flat parameter
/// vector whose length disagrees with the hierarchy, empty or ragged draw
/// matrices, non-finite or non-positive rate parameters, an out-of-range
/// memory parameter, or chain metadata that does not partition the draws
/// evenly.
///
/// Variants
/// --------
/// - `ParamLengthMismatch { expected: usize, actual: usize }`
///   Flat parameter vector length differs from the hierarchy's expected
///   non-root node count plus one. Fatal; raised at mapping time.
/// - `EmptyEnsemble`
///   The ensemble contains no draws.
/// - `DrawCountMismatch { field: &'static str, expected: usize, actual: usize }`
///   A per-draw array (`memory`, `chain_id`, ...) disagrees with the draw
///   count implied by the rate parameters.
/// - `NonFiniteParam { draw: usize, name: &'static str, value: f64 }`
///   A parameter value is NaN or ±∞.
/// - `NonPositiveRate { draw: usize, name: &'static str, value: f64 }`
///   An accumulation-rate parameter (overall mean or multiplier) is ≤ 0,
///   violating the positivity constraint the model relies on for
///   monotone age profiles.
/// - `InvalidMemory { draw: usize, value: f64 }`
///   The memory (autocorrelation) parameter falls outside `[0, 1]`.
/// - `UnevenChains { chain: usize, len: usize, expected: usize }`
///   Chain ids do not split the draws into equal-length groups, which the
///   split-chain diagnostics require.
///
/// Notes
/// -----
/// - Implements [`std::error::Error`] and [`std::fmt::Display`]; a
///   feature-gated conversion maps all variants to `ValueError` in Python.
#[derive(Debug, Clone, PartialEq)]
pub enum PosteriorError {
    //------ Mapping-time contract violations ------
    ParamLengthMismatch { expected: usize, actual: usize },
    //------ Ensemble validation errors ------
    EmptyEnsemble,
    DrawCountMismatch { field: &'static str, expected: usize, actual: usize },
    NonFiniteParam { draw: usize, name: &'static str, value: f64 },
    NonPositiveRate { draw: usize, name: &'static str, value: f64 },
    InvalidMemory { draw: usize, value: f64 },
    UnevenChains { chain: usize, len: usize, expected: usize },
}

impl std::error::Error for PosteriorError {}

impl std::fmt::Display for PosteriorError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PosteriorError::ParamLengthMismatch { expected, actual } => {
                write!(
                    f,
                    "Parameter vector length {actual} does not match the hierarchy's \
                     expected length {expected} (overall mean plus one multiplier per \
                     non-root node)."
                )
            }
            PosteriorError::EmptyEnsemble => {
                write!(f, "Posterior ensemble must contain at least one draw.")
            }
            PosteriorError::DrawCountMismatch { field, expected, actual } => {
                write!(f, "Field `{field}` has {actual} entries; expected {expected} draws.")
            }
            PosteriorError::NonFiniteParam { draw, name, value } => {
                write!(f, "Non-finite `{name}` value {value} at draw {draw}.")
            }
            PosteriorError::NonPositiveRate { draw, name, value } => {
                write!(f, "Non-positive `{name}` value {value} at draw {draw}. Accumulation-rate parameters must be > 0.")
            }
            PosteriorError::InvalidMemory { draw, value } => {
                write!(f, "Memory parameter {value} at draw {draw} lies outside [0, 1].")
            }
            PosteriorError::UnevenChains { chain, len, expected } => {
                write!(
                    f,
                    "Chain {chain} has {len} draws; all chains must have {expected} draws \
                     for split-chain diagnostics."
                )
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<PosteriorError> for PyErr {
    fn from(err: PosteriorError) -> PyErr {
        PyValueError::new_err(format!("PosteriorError: {err}"))
    }
}
