//! hierarchy::errors — configuration errors for section-hierarchy construction.
//!
//! Purpose
//! -------
//! Provide the error enum and result alias for the section-hierarchy builder,
//! together with a conversion layer to Python exceptions for PyO3-based
//! bindings. All failures at this layer are configuration errors: an invalid
//! branching vector or an unusable depth span, detected at construction time
//! and never recovered automatically.
//!
//! Key behaviors
//! -------------
//! - Define [`HierarchyResult`] and [`HierarchyError`] as the canonical result
//!   and error types for hierarchy construction and its validation helpers.
//! - Attach human-readable `Display` messages to each variant so diagnostics
//!   are meaningful without additional context.
//! - Implement `From<HierarchyError> for PyErr` to surface construction
//!   failures as `ValueError` to Python callers.
//!
//! Invariants & assumptions
//! ------------------------
//! - Hierarchy construction validates its inputs (branching factors, depth
//!   span) and returns [`HierarchyResult<T>`] instead of panicking.
//! - `HierarchyError` values are small, cheap to clone, and carry just enough
//!   payload (offending level, value, or bound) for logging and debugging.
//!
//! Conventions
//! -----------
//! - This module covers hierarchy construction only; ensemble- and age-model
//!   errors live in their own `errors` modules under the relevant subtrees.
//! - Error messages are phrased in terms of domain constraints (e.g.
//!   "branching factors must be ≥ 1", "depth_max must exceed depth_min").
//!
//! Downstream usage
//! ----------------
//! - The builder returns [`HierarchyResult<SectionHierarchy>`]; callers either
//!   match on [`HierarchyError`] variants or propagate with `?`.
//! - Python bindings rely on the feature-gated `PyErr` conversion and never
//!   pattern-match on the Rust enum directly.
//!
//! Testing notes
//! -------------
//! - Unit tests verify that each variant's `Display` message embeds its
//!   payload (level index, offending value, or depth bounds).

#[cfg(feature = "python-bindings")]
use pyo3::{PyErr, exceptions::PyValueError};

pub type HierarchyResult<T> = Result<T, HierarchyError>;

/// HierarchyError — configuration failures in section-hierarchy construction.
///
/// Purpose
/// -------
/// Represent every way the hierarchy builder can reject its inputs: an empty
/// or degenerate branching vector, a non-finite or non-positive depth span,
/// or out-of-range node lookups requested by internal helpers.
///
/// Variants
/// --------
/// - `EmptyBranching`
///   The branching vector `K` contains no levels.
/// - `ZeroBranching { level: usize }`
///   `K[level] == 0`, violating the `K[i] ≥ 1` contract.
/// - `NonFiniteDepth { value: f64 }`
///   `depth_min` or `depth_max` is NaN or ±∞.
/// - `InvalidDepthSpan { depth_min: f64, depth_max: f64 }`
///   `depth_max ≤ depth_min`, so the span cannot contain a single section.
///
/// Invariants
/// ----------
/// - Each variant carries only scalar payload; no large structures leak into
///   error values.
///
/// Notes
/// -----
/// - Implements [`std::error::Error`] and [`std::fmt::Display`] for idiomatic
///   `?`-based propagation; a feature-gated `From<HierarchyError> for PyErr`
///   maps all variants to `ValueError` at the Python boundary.
#[derive(Debug, Clone, PartialEq)]
pub enum HierarchyError {
    //------ Configuration errors ------
    EmptyBranching,
    ZeroBranching { level: usize },
    NonFiniteDepth { value: f64 },
    InvalidDepthSpan { depth_min: f64, depth_max: f64 },
}

impl std::error::Error for HierarchyError {}

impl std::fmt::Display for HierarchyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HierarchyError::EmptyBranching => {
                write!(f, "Branching vector K must contain at least one level.")
            }
            HierarchyError::ZeroBranching { level } => {
                write!(f, "Branching factor at level {level} is 0. All K[i] must be ≥ 1.")
            }
            HierarchyError::NonFiniteDepth { value } => {
                write!(f, "Invalid depth bound: {value}. Must be a finite number.")
            }
            HierarchyError::InvalidDepthSpan { depth_min, depth_max } => {
                write!(
                    f,
                    "Invalid depth span [{depth_min}, {depth_max}]. depth_max must exceed depth_min."
                )
            }
        }
    }
}

#[cfg(feature = "python-bindings")]
impl From<HierarchyError> for PyErr {
    fn from(err: HierarchyError) -> PyErr {
        PyValueError::new_err(format!("HierarchyError: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Scope
    // -----
    // These tests cover:
    // - Basic `Display` formatting for HierarchyError variants.
    // - Embedding of payload values (level, depth bounds) into messages.
    //
    // They intentionally DO NOT cover:
    // - The `From<HierarchyError> for PyErr` conversion, since exercising it
    //   requires linking against the Python C API and is better handled by
    //   Python-level tests.
    // -------------------------------------------------------------------------

    #[test]
    // Purpose
    // -------
    // Verify that `HierarchyError::ZeroBranching` includes the offending
    // level index in its `Display` representation.
    //
    // Given
    // -----
    // - A `ZeroBranching` error at level 2.
    //
    // Expect
    // ------
    // - `format!("{err}")` contains "2".
    fn hierarchy_error_zero_branching_includes_level_in_display() {
        // Arrange
        let err = HierarchyError::ZeroBranching { level: 2 };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains('2'), "Display message should include offending level.\nGot: {msg}");
    }

    #[test]
    // Purpose
    // -------
    // Verify that `HierarchyError::InvalidDepthSpan` embeds both depth
    // bounds in its `Display` representation.
    //
    // Given
    // -----
    // - An `InvalidDepthSpan` error with depth_min = 5.0, depth_max = 5.0.
    //
    // Expect
    // ------
    // - `format!("{err}")` contains "5".
    fn hierarchy_error_invalid_span_includes_bounds_in_display() {
        // Arrange
        let err = HierarchyError::InvalidDepthSpan { depth_min: 5.0, depth_max: 5.0 };

        // Act
        let msg = err.to_string();

        // Assert
        assert!(msg.contains('5'), "Display message should include the depth bounds.\nGot: {msg}");
    }

    #[test]
    // Purpose
    // -------
    // Ensure that `HierarchyError::EmptyBranching` formats to a non-empty,
    // human-readable message.
    //
    // Given
    // -----
    // - An `EmptyBranching` error value.
    //
    // Expect
    // ------
    // - `format!("{err}")` is non-empty.
    fn hierarchy_error_empty_branching_has_nonempty_display_message() {
        // Arrange
        let err = HierarchyError::EmptyBranching;

        // Act
        let msg = err.to_string();

        // Assert
        assert!(!msg.trim().is_empty(), "Display message for EmptyBranching should not be empty.");
    }
}
