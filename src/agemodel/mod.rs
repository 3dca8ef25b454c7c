//! agemodel — age reconstruction, interpolation, and summarization.
//!
//! Purpose
//! -------
//! Turn validated posterior draws into the outputs users actually read:
//! per-draw age realizations anchored to the calendar scale, prediction
//! tables on the modelled grid or at arbitrary query depths, and summary
//! rows with convergence diagnostics.
//!
//! Key behaviors
//! -------------
//! - [`AgeDepthModel`] binds a hierarchy, an ensemble, and an [`Anchor`]
//!   into an immutable fit result; [`AgePredictions`] is its bulk output.
//! - `reconstruct` accumulates rate × thickness away from the anchor in
//!   both directions; `interpolate` evaluates profiles between boundaries
//!   with NaN markers outside the modelled range.
//! - `summary` reduces tables and scalar draws to mean/sd/quantiles plus
//!   split-R̂ and ESS from `diagnostics`; `observations` ingests dated
//!   horizons and selects the default anchor.
//!
//! Invariants & assumptions
//! ------------------------
//! - Fatal contract violations surface as [`AgeModelError`]; out-of-range
//!   interpolation and degenerate sample sizes are data (NaN markers and
//!   the `low_ess` flag), never errors.
//! - Within a realization, ages are non-decreasing with depth.
//!
//! Conventions
//! -----------
//! - Rates are time-per-depth; ages grow with depth.
//!
//! Downstream usage
//! ----------------
//! - The crate root re-exports this module's main types in the prelude and
//!   wraps [`AgeDepthModel`] for the Python bindings.
//!
//! Testing notes
//! -------------
//! - Each submodule carries focused unit tests; the end-to-end pipeline is
//!   exercised by the crate's integration test.

pub mod diagnostics;
pub mod errors;
pub mod interpolate;
pub mod model;
pub mod observations;
pub mod reconstruct;
pub mod summary;

pub use self::diagnostics::{ChainDiagnostics, MIN_RELIABLE_ESS};
pub use self::errors::{AgeModelError, AgeModelResult};
pub use self::model::{AgeDepthModel, AgePredictions, PredictionRow};
pub use self::observations::AgeObservations;
pub use self::reconstruct::Anchor;
pub use self::summary::{
    DEFAULT_QUANTILES, DepthAgeSummary, ScalarSummary, SummaryOptions,
};
