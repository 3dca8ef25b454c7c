//! agemodel::observations — dated-horizon containers and anchor selection.
//!
//! Purpose
//! -------
//! Hold the dated horizons a core was calibrated against: parallel arrays
//! of depth, age, and stated age uncertainty, validated once at ingestion.
//! The container also selects the default calendar anchor — the shallowest
//! dated horizon — used when a model is built without an explicit anchor.
//!
//! Key behaviors
//! -------------
//! - Arrays must be equal-length, non-empty, and finite; age uncertainties
//!   must be strictly positive.
//! - Depths need not arrive sorted; [`shallowest_anchor`](AgeObservations::shallowest_anchor)
//!   scans for the minimum depth rather than assuming order.
//!
//! Invariants & assumptions
//! ------------------------
//! - The container is immutable after construction; accessors hand out
//!   read-only views.
//! - Duplicate depths are allowed (replicate dates on one horizon); the
//!   anchor picks the first minimum encountered.
//!
//! Conventions
//! -----------
//! - Field names in error payloads are the accessor names (`depth`, `age`,
//!   `error`).
//!
//! Downstream usage
//! ----------------
//! - `agemodel::model` anchors realization reconstruction at
//!   [`shallowest_anchor`](AgeObservations::shallowest_anchor) unless the
//!   caller overrides it.
//!
//! Testing notes
//! -------------
//! - Unit tests cover ingestion of unsorted data, anchor selection, and
//!   every validation branch.

use ndarray::Array1;

use crate::agemodel::errors::{AgeModelError, AgeModelResult};
use crate::agemodel::reconstruct::Anchor;

/// AgeObservations — validated dated horizons for one core.
///
/// Purpose
/// -------
/// Immutable parallel arrays of observation depth, age, and age
/// uncertainty, the empirical side of an age-depth fit.
///
/// Fields
/// ------
/// - `depth`: `Array1<f64>` — observation depths, finite, any order.
/// - `age`: `Array1<f64>` — observed ages, finite.
/// - `error`: `Array1<f64>` — stated age uncertainties, finite and > 0.
#[derive(Debug, Clone, PartialEq)]
pub struct AgeObservations {
    depth: Array1<f64>,
    age: Array1<f64>,
    error: Array1<f64>,
}

impl AgeObservations {
    /// Ingest and validate one core's dated horizons.
    ///
    /// Parameters
    /// ----------
    /// - `depth`: `Array1<f64>`
    ///   Observation depths; finite, not necessarily sorted.
    /// - `age`: `Array1<f64>`
    ///   Observed ages; finite, same length as `depth`.
    /// - `error`: `Array1<f64>`
    ///   Stated age uncertainties; finite, > 0, same length as `depth`.
    ///
    /// Returns
    /// -------
    /// `AgeModelResult<AgeObservations>`
    ///   The validated container.
    ///
    /// Errors
    /// ------
    /// - `AgeModelError::EmptyObservations` when `depth` is empty.
    /// - `AgeModelError::ObservationLengthMismatch` when the arrays have
    ///   unequal lengths.
    /// - `AgeModelError::NonFiniteObservation` when any entry is NaN/±∞.
    /// - `AgeModelError::NonPositiveObservationError` when an uncertainty
    ///   is ≤ 0.
    pub fn new(
        depth: Array1<f64>, age: Array1<f64>, error: Array1<f64>,
    ) -> AgeModelResult<Self> {
        if depth.is_empty() {
            return Err(AgeModelError::EmptyObservations);
        }
        for (field, arr) in [("age", &age), ("error", &error)] {
            if arr.len() != depth.len() {
                return Err(AgeModelError::ObservationLengthMismatch {
                    field,
                    expected: depth.len(),
                    actual: arr.len(),
                });
            }
        }
        for (field, arr) in [("depth", &depth), ("age", &age), ("error", &error)] {
            if let Some((index, &value)) =
                arr.iter().enumerate().find(|(_, v)| !v.is_finite())
            {
                return Err(AgeModelError::NonFiniteObservation { field, index, value });
            }
        }
        if let Some((index, &value)) = error.iter().enumerate().find(|(_, v)| **v <= 0.0) {
            return Err(AgeModelError::NonPositiveObservationError { index, value });
        }
        Ok(AgeObservations { depth, age, error })
    }

    /// Number of dated horizons.
    pub fn len(&self) -> usize {
        self.depth.len()
    }

    /// Whether the container is empty. Always `false` for a constructed
    /// container; provided for the conventional `len`/`is_empty` pair.
    pub fn is_empty(&self) -> bool {
        self.depth.is_empty()
    }

    /// Observation depths.
    pub fn depth(&self) -> &Array1<f64> {
        &self.depth
    }

    /// Observed ages.
    pub fn age(&self) -> &Array1<f64> {
        &self.age
    }

    /// Stated age uncertainties.
    pub fn error(&self) -> &Array1<f64> {
        &self.error
    }

    /// The shallowest dated horizon as a calendar anchor.
    ///
    /// Returns
    /// -------
    /// `Anchor`
    ///   The depth/age pair of the minimum-depth observation; the first
    ///   one encountered on ties.
    pub fn shallowest_anchor(&self) -> Anchor {
        let mut best = 0;
        for i in 1..self.depth.len() {
            if self.depth[i] < self.depth[best] {
                best = i;
            }
        }
        // Entries are validated finite at construction.
        Anchor { depth: self.depth[best], age: self.age[best] }
    }
}
