//! agemodel::errors — error types for reconstruction and summarization.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias for the age-model layer:
//! realization reconstruction, observation containers, summary options, and
//! scalar summaries. Fatal conditions (shape mismatches, invalid anchors,
//! malformed observations or quantile sets) abort the triggering operation;
//! the layer's non-fatal conditions (out-of-range interpolation, degenerate
//! effective sample sizes) are deliberately NOT errors — they surface as
//! NaN missing-value markers and quality flags in the output tables.
//!
//! Key behaviors
//! -------------
//! - Define [`AgeModelResult`] and [`AgeModelError`] as the canonical result
//!   and error types for the `agemodel` subtree.
//! - Attach human-readable `Display` messages embedding the offending
//!   index, field, or value.
//! - Implement `From<AgeModelError> for PyErr` mapping all variants to
//!   `ValueError` at the Python boundary.
//!
//! Invariants & assumptions
//! ------------------------
//! - Constructors and entry points validate inputs and return
//!   [`AgeModelResult<T>`] instead of panicking.
//! - Error values are small and cheap to clone.
//!
//! Conventions
//! -----------
//! - Field names in payloads are the public accessor names (`depth`, `age`,
//!   `error`).
//! - Hierarchy- and ensemble-level failures keep their own error types
//!   (`HierarchyError`, `PosteriorError`); this enum covers only the age
//!   model proper.
//!
//! Downstream usage
//! ----------------
//! - `agemodel` entry points return [`AgeModelResult`]; callers propagate
//!   with `?` or match on variants.
//!
//! Testing notes
//! -------------
//! - Unit tests verify payload embedding in `Display` messages; the raising
//!   code paths are exercised by the sibling modules' tests.

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type AgeModelResult<T> = Result<T, AgeModelError>;

/// AgeModelError — fatal failures in the age-model layer.
///
/// Purpose
/// -------
/// Represent every validation and contract failure raised by realization
/// reconstruction, observation ingestion, summary configuration, and scalar
/// summaries.
///
/// Variants
/// --------
/// - `RateLengthMismatch { expected: usize, actual: usize }`
///   A rate vector's length disagrees with the boundary grid
///   (`boundaries.len() - 1` sections expected).
/// - `NonFiniteRate { index: usize, value: f64 }` /
///   `NonPositiveRate { index: usize, value: f64 }`
///   An accumulation rate is NaN/±∞ or ≤ 0; positive rates are what make
///   reconstructed ages monotone in depth.
/// - `NonFiniteAnchor { value: f64 }`
///   Anchor depth or age is not finite.
/// - `AnchorOutOfRange { depth: f64, depth_min: f64, depth_max: f64 }`
///   Anchor depth falls outside the modelled span.
/// - `DrawOutOfRange { draw: usize, n_draws: usize }`
///   A single-realization request names a draw the ensemble does not have.
/// - `EmptyObservations`
///   The observation container was given no data points.
/// - `ObservationLengthMismatch { field: &'static str, expected: usize, actual: usize }`
///   Observation arrays have unequal lengths.
/// - `NonFiniteObservation { field: &'static str, index: usize, value: f64 }`
///   An observation depth, age, or error is not finite.
/// - `NonPositiveObservationError { index: usize, value: f64 }`
///   A stated age uncertainty is ≤ 0.
/// - `EmptyQuantiles` / `InvalidQuantile { value: f64 }`
///   The requested quantile set is empty, or a probability lies outside
///   the open interval (0, 1).
/// - `EmptySample`
///   A scalar summary was requested over zero values.
/// - `NonFiniteSample { index: usize, value: f64 }`
///   A scalar-summary input value is not finite.
/// - `ChainLengthMismatch { values: usize, chains: usize }`
///   Scalar-summary chain metadata does not match the value count.
///
/// Notes
/// -----
/// - Implements [`std::error::Error`] and [`std::fmt::Display`]; the
///   feature-gated `PyErr` conversion maps everything to `ValueError`.
#[derive(Debug, Clone, PartialEq)]
pub enum AgeModelError {
    //------ Reconstruction errors ------
    RateLengthMismatch { expected: usize, actual: usize },
    NonFiniteRate { index: usize, value: f64 },
    NonPositiveRate { index: usize, value: f64 },
    NonFiniteAnchor { value: f64 },
    AnchorOutOfRange { depth: f64, depth_min: f64, depth_max: f64 },
    DrawOutOfRange { draw: usize, n_draws: usize },
    //------ Observation errors ------
    EmptyObservations,
    ObservationLengthMismatch { field: &'static str, expected: usize, actual: usize },
    NonFiniteObservation { field: &'static str, index: usize, value: f64 },
    NonPositiveObservationError { index: usize, value: f64 },
    //------ Summary configuration errors ------
    EmptyQuantiles,
    InvalidQuantile { value: f64 },
    EmptySample,
    NonFiniteSample { index: usize, value: f64 },
    ChainLengthMismatch { values: usize, chains: usize },
}

impl std::error::Error for AgeModelError {}

impl std::fmt::Display for AgeModelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgeModelError::RateLengthMismatch { expected, actual } => {
                write!(f, "Rate vector has {actual} entries; expected {expected} (one per finest section).")
            }
            AgeModelError::NonFiniteRate { index, value } => {
                write!(f, "Non-finite accumulation rate {value} at section {index}.")
            }
            AgeModelError::NonPositiveRate { index, value } => {
                write!(f, "Non-positive accumulation rate {value} at section {index}. Rates must be > 0.")
            }
            AgeModelError::NonFiniteAnchor { value } => {
                write!(f, "Anchor depth/age {value} must be a finite number.")
            }
            AgeModelError::AnchorOutOfRange { depth, depth_min, depth_max } => {
                write!(
                    f,
                    "Anchor depth {depth} lies outside the modelled span [{depth_min}, {depth_max}]."
                )
            }
            AgeModelError::DrawOutOfRange { draw, n_draws } => {
                write!(f, "Draw {draw} requested from an ensemble of {n_draws} draws.")
            }
            AgeModelError::EmptyObservations => {
                write!(f, "Observation container must hold at least one data point.")
            }
            AgeModelError::ObservationLengthMismatch { field, expected, actual } => {
                write!(f, "Observation field `{field}` has {actual} entries; expected {expected}.")
            }
            AgeModelError::NonFiniteObservation { field, index, value } => {
                write!(f, "Non-finite observation `{field}` value {value} at index {index}.")
            }
            AgeModelError::NonPositiveObservationError { index, value } => {
                write!(f, "Age uncertainty {value} at index {index} must be > 0.")
            }
            AgeModelError::EmptyQuantiles => {
                write!(f, "Quantile set must contain at least one probability.")
            }
            AgeModelError::InvalidQuantile { value } => {
                write!(f, "Quantile probability {value} must lie strictly inside (0, 1).")
            }
            AgeModelError::EmptySample => {
                write!(f, "Scalar summary requested over an empty sample.")
            }
            AgeModelError::NonFiniteSample { index, value } => {
                write!(f, "Non-finite sample value {value} at index {index}.")
            }
            AgeModelError::ChainLengthMismatch { values, chains } => {
                write!(f, "Chain metadata has {chains} entries for {values} values.")
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<AgeModelError> for PyErr {
    fn from(err: AgeModelError) -> PyErr {
        PyValueError::new_err(format!("AgeModelError: {err}"))
    }
}
