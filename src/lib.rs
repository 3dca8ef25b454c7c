//! rust_agedepth — hierarchical age-depth modeling core with Python bindings.
//!
//! Purpose
//! -------
//! Serve as the crate root for Rust callers and as the PyO3 bridge that
//! exposes the age-depth modeling core to Python via the `_rust_agedepth`
//! extension module. The crate turns posterior draws of hierarchical
//! accumulation-rate parameters into age-depth realizations, prediction
//! tables, and summary statistics over a nested multi-resolution partition
//! of a depth span.
//!
//! Key behaviors
//! -------------
//! - Re-export the core Rust modules (`hierarchy`, `posterior`, `agemodel`)
//!   as the public crate surface, with a `prelude` for the common types.
//! - Define `#[pyclass]` wrappers and the `#[pymodule]` initializer for the
//!   `_rust_agedepth` Python extension.
//! - Create and register Python submodules (`hierarchy`, `age_models`)
//!   under `rust_agedepth` so that dot-notation imports work as expected.
//!
//! Invariants & assumptions
//! ------------------------
//! - All heavy numerical work is implemented in the inner Rust modules;
//!   this file performs only FFI glue, input validation, and error mapping.
//! - The sampling engine that produces posterior draws lives outside this
//!   crate; draws arrive as opaque numeric arrays and are validated once at
//!   ingestion.
//! - When `python-bindings` is enabled, the Python-visible types mirror the
//!   invariants and signatures of their Rust counterparts.
//!
//! Conventions
//! -----------
//! - Depth increases downward and ages grow with depth; accumulation rates
//!   are time-per-depth (e.g. yr/cm).
//! - The stack performs no I/O and no logging; non-fatal conditions
//!   (out-of-range interpolation, degenerate sample sizes) are encoded in
//!   the data as NaN markers and quality flags.
//! - Errors from core Rust code are propagated as rich error types
//!   internally and converted to `PyErr` values at the PyO3 boundary.
//!
//! Downstream usage
//! ----------------
//! - Native Rust code should usually depend directly on the inner modules
//!   and can ignore the PyO3 items guarded by the `python-bindings`
//!   feature.
//! - The Python packaging layer imports the `_rust_agedepth` module defined
//!   here and wraps its classes in user-facing Python APIs.
//!
//! Testing notes
//! -------------
//! - Core numerical behavior is covered by unit tests in the inner modules
//!   and by the crate-level integration test; binding smoke tests live on
//!   the Python side.

pub mod agemodel;
pub mod hierarchy;
pub mod posterior;
pub mod utils;

/// Common types for building and querying age-depth models.
pub mod prelude {
    pub use crate::agemodel::{
        AgeDepthModel, AgeModelError, AgeModelResult, AgeObservations, AgePredictions, Anchor,
        DepthAgeSummary, ScalarSummary, SummaryOptions,
    };
    pub use crate::hierarchy::{HierarchyError, HierarchyResult, SectionHierarchy};
    pub use crate::posterior::{PosteriorEnsemble, PosteriorError, PosteriorResult};
}

#[cfg(feature = "python-bindings")]
use pyo3::prelude::*;

#[cfg(feature = "python-bindings")]
use crate::{
    agemodel::{AgeDepthModel, DepthAgeSummary, ScalarSummary},
    hierarchy::SectionHierarchy,
    utils::{build_age_model, extract_summary_options},
};

/// Hierarchy — Python-facing wrapper for the multi-resolution section index.
///
/// Purpose
/// -------
/// Expose [`SectionHierarchy`] construction and geometry queries to Python
/// callers without running the full model pipeline.
///
/// Key behaviors
/// -------------
/// - Build from an explicit branching vector or the auto-selection policy.
/// - Expose section counts, the finest boundary grid, per-level boundary
///   sequences, and the expected flat parameter length.
///
/// Parameters
/// ----------
/// Constructed from Python via `Hierarchy(depth_min, depth_max,
/// branching=None)`:
/// - `depth_min`, `depth_max`: `f64`
///   The modelled depth span; `depth_max > depth_min`.
/// - `branching`: `Option<Vec<usize>>`
///   Sections-per-parent counts, coarse to fine; `None` selects the
///   branching automatically.
///
/// Fields
/// ------
/// - `inner`: [`SectionHierarchy`]
///   The immutable Rust-side hierarchy all accessors read from.
///
/// Notes
/// -----
/// - Native Rust code should use [`SectionHierarchy`] directly.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_agedepth.hierarchy")]
pub struct Hierarchy {
    /// The underlying section hierarchy.
    inner: SectionHierarchy,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl Hierarchy {
    #[new]
    #[pyo3(
        text_signature = "(depth_min, depth_max, /, branching=None)",
        signature = (depth_min, depth_max, branching = None)
    )]
    pub fn new(
        depth_min: f64, depth_max: f64, branching: Option<Vec<usize>>,
    ) -> PyResult<Hierarchy> {
        let inner = match branching {
            Some(k) => SectionHierarchy::with_branching(depth_min, depth_max, &k)?,
            None => SectionHierarchy::auto(depth_min, depth_max)?,
        };
        Ok(Hierarchy { inner })
    }

    /// Sections-per-parent counts, coarse to fine.
    #[getter]
    pub fn branching(&self) -> Vec<usize> {
        self.inner.branching().to_vec()
    }

    /// Number of hierarchy levels.
    #[getter]
    pub fn n_levels(&self) -> usize {
        self.inner.n_levels()
    }

    /// Number of finest-level sections.
    #[getter]
    pub fn n_sections(&self) -> usize {
        self.inner.n_sections()
    }

    /// Finest-section boundary depths, shallow to deep.
    #[getter]
    pub fn finest_boundaries(&self) -> Vec<f64> {
        self.inner.finest_boundaries().to_vec()
    }

    /// Expected flat parameter-vector length (overall mean + multipliers).
    #[getter]
    pub fn expected_param_len(&self) -> usize {
        self.inner.expected_param_len()
    }

    /// Section boundary depths per level, coarse to fine.
    pub fn hierarchy_depths(&self) -> Vec<Vec<f64>> {
        self.inner.hierarchy_depths()
    }

    /// Thickness of each finest section.
    pub fn section_thicknesses(&self) -> Vec<f64> {
        self.inner.section_thicknesses()
    }
}

/// AgeModel — Python-facing wrapper for a fitted age-depth model.
///
/// Purpose
/// -------
/// Bind a hierarchy, a flat posterior draw matrix, and a calendar anchor
/// into an [`AgeDepthModel`] and expose prediction and summarization to
/// Python.
///
/// Key behaviors
/// -------------
/// - Validate and convert Python arrays into the Rust ensemble types.
/// - Provide `predict`, `realization`, `summarize`, and
///   `parameter_summaries` methods that delegate to the core
///   implementation.
///
/// Parameters
/// ----------
/// Constructed from Python via `AgeModel(depth_min, depth_max, draws,
/// memory, chain_id, anchor_depth, anchor_age, branching=None)`:
/// - `depth_min`, `depth_max`: `f64`
///   The modelled depth span.
/// - `draws`: array-like
///   `[n_draws × (1 + non_root)]` flat parameter matrix: column 0 is the
///   overall mean rate, the rest the level-major multipliers.
/// - `memory`: array-like
///   Memory (autocorrelation) parameter per draw, in `[0, 1]`.
/// - `chain_id`: sequence of `int`
///   Chain label per draw; equal-sized chains.
/// - `anchor_depth`, `anchor_age`: `f64`
///   The calendar anchor; the depth must lie inside the modelled span.
/// - `branching`: `Option<Vec<usize>>`
///   As for [`Hierarchy`].
///
/// Fields
/// ------
/// - `inner`: [`AgeDepthModel`]
///   The immutable Rust-side fit result.
///
/// Invariants
/// ----------
/// - `inner` satisfies all invariants documented on [`AgeDepthModel`];
///   construction fails with `ValueError` otherwise.
///
/// Notes
/// -----
/// - This type is primarily intended to be used from Python; native Rust
///   code should prefer [`AgeDepthModel`] directly.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_agedepth.age_models")]
pub struct AgeModel {
    /// Underlying Rust model.
    inner: AgeDepthModel,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl AgeModel {
    #[new]
    #[pyo3(
        text_signature = "(depth_min, depth_max, draws, memory, chain_id, anchor_depth, \
                          anchor_age, /, branching=None)",
        signature = (depth_min, depth_max, draws, memory, chain_id, anchor_depth, anchor_age,
            branching = None)
    )]
    pub fn new<'py>(
        py: Python<'py>, depth_min: f64, depth_max: f64, draws: &Bound<'py, PyAny>,
        memory: &Bound<'py, PyAny>, chain_id: Vec<usize>, anchor_depth: f64, anchor_age: f64,
        branching: Option<Vec<usize>>,
    ) -> PyResult<AgeModel> {
        let inner = build_age_model(
            py,
            depth_min,
            depth_max,
            draws,
            memory,
            chain_id,
            anchor_depth,
            anchor_age,
            branching,
        )?;
        Ok(AgeModel { inner })
    }

    /// Number of posterior draws.
    #[getter]
    pub fn n_draws(&self) -> usize {
        self.inner.ensemble().n_draws()
    }

    /// Number of chains in the metadata.
    #[getter]
    pub fn n_chains(&self) -> usize {
        self.inner.ensemble().n_chains()
    }

    /// Finest-section boundary depths the model predicts on by default.
    #[getter]
    pub fn modelled_depths(&self) -> Vec<f64> {
        self.inner.modelled_depths().to_vec()
    }

    /// Section boundary depths per hierarchy level, coarse to fine.
    pub fn hierarchy_depths(&self) -> Vec<Vec<f64>> {
        self.inner.hierarchy_depths()
    }

    /// Reconstruct one draw's age profile on the boundary grid.
    pub fn realization(&self, draw: usize) -> PyResult<Vec<f64>> {
        Ok(self.inner.realization(draw)?)
    }

    /// Build the `[n_draws × n_depths]` age matrix, row-major.
    ///
    /// With `query_depths=None` the columns are the modelled boundary
    /// depths; otherwise each realization is linearly interpolated at the
    /// given depths, with NaN marking depths outside the modelled range.
    #[pyo3(
        text_signature = "(self, /, query_depths=None)",
        signature = (query_depths = None)
    )]
    pub fn predict(&self, query_depths: Option<Vec<f64>>) -> PyResult<Vec<Vec<f64>>> {
        let table = self.inner.predict(query_depths.as_deref())?;
        let ages = table.ages();
        Ok((0..ages.nrows()).map(|row| ages.row(row).to_vec()).collect())
    }

    /// Summarize the age distribution per depth.
    #[pyo3(
        text_signature = "(self, /, query_depths=None, quantiles=None)",
        signature = (query_depths = None, quantiles = None)
    )]
    pub fn summarize(
        &self, query_depths: Option<Vec<f64>>, quantiles: Option<Vec<f64>>,
    ) -> PyResult<Vec<DepthSummary>> {
        let options = extract_summary_options(quantiles)?;
        let rows = self.inner.summarize(query_depths.as_deref(), &options)?;
        Ok(rows.into_iter().map(|inner| DepthSummary { inner }).collect())
    }

    /// Summarize the ensemble's scalar parameters.
    #[pyo3(
        text_signature = "(self, /, quantiles=None)",
        signature = (quantiles = None)
    )]
    pub fn parameter_summaries(
        &self, quantiles: Option<Vec<f64>>,
    ) -> PyResult<Vec<ParameterSummary>> {
        let options = extract_summary_options(quantiles)?;
        let rows = self.inner.parameter_summaries(&options)?;
        Ok(rows.into_iter().map(|inner| ParameterSummary { inner }).collect())
    }
}

/// DepthSummary — one per-depth summary row exposed to Python.
///
/// Purpose
/// -------
/// Present the fields of [`DepthAgeSummary`] as read-only Python
/// properties. `ess`/`rhat` are `None` for interpolated tables and NaN
/// when not computable.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_agedepth.age_models")]
pub struct DepthSummary {
    /// The Rust-side summary row.
    inner: DepthAgeSummary,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl DepthSummary {
    #[getter]
    pub fn depth(&self) -> f64 {
        self.inner.depth
    }

    #[getter]
    pub fn mean(&self) -> f64 {
        self.inner.mean
    }

    #[getter]
    pub fn sd(&self) -> f64 {
        self.inner.sd
    }

    /// `(probability, age)` pairs in request order.
    #[getter]
    pub fn quantiles(&self) -> Vec<(f64, f64)> {
        self.inner.quantiles.clone()
    }

    /// Number of finite ages at this depth.
    #[getter]
    pub fn n(&self) -> usize {
        self.inner.n
    }

    #[getter]
    pub fn ess(&self) -> Option<f64> {
        self.inner.ess
    }

    #[getter]
    pub fn rhat(&self) -> Option<f64> {
        self.inner.rhat
    }

    #[getter]
    pub fn low_ess(&self) -> bool {
        self.inner.low_ess
    }
}

/// ParameterSummary — one scalar-parameter summary row exposed to Python.
#[cfg(feature = "python-bindings")]
#[pyclass(module = "rust_agedepth.age_models")]
pub struct ParameterSummary {
    /// The Rust-side summary row.
    inner: ScalarSummary,
}

#[cfg(feature = "python-bindings")]
#[pymethods]
impl ParameterSummary {
    #[getter]
    pub fn name(&self) -> String {
        self.inner.name.clone()
    }

    #[getter]
    pub fn mean(&self) -> f64 {
        self.inner.mean
    }

    #[getter]
    pub fn sd(&self) -> f64 {
        self.inner.sd
    }

    #[getter]
    pub fn quantiles(&self) -> Vec<(f64, f64)> {
        self.inner.quantiles.clone()
    }

    #[getter]
    pub fn n(&self) -> usize {
        self.inner.n
    }

    #[getter]
    pub fn ess(&self) -> f64 {
        self.inner.ess
    }

    #[getter]
    pub fn rhat(&self) -> f64 {
        self.inner.rhat
    }

    #[getter]
    pub fn low_ess(&self) -> bool {
        self.inner.low_ess
    }
}

/// _rust_agedepth — PyO3 module initializer for the Python extension.
///
/// Purpose
/// -------
/// Define the `_rust_agedepth` Python module and register its submodules
/// used by the public `rust_agedepth` package.
///
/// Key behaviors
/// -------------
/// - Create `hierarchy` and `age_models` submodules.
/// - Attach those submodules to the parent `_rust_agedepth` module.
/// - Register the submodules in `sys.modules` so they are importable via
///   dotted paths from Python.
///
/// Errors
/// ------
/// - `PyErr`
///   If creating submodules or manipulating `sys.modules` fails.
///
/// Notes
/// -----
/// - This function is invoked automatically by Python when importing the
///   compiled extension; it is not called directly by user code.
#[cfg(feature = "python-bindings")]
#[pymodule]
fn _rust_agedepth<'py>(_py: Python<'py>, m: &Bound<'py, PyModule>) -> PyResult<()> {
    let hierarchy_mod = PyModule::new(_py, "hierarchy")?;
    let age_models_mod = PyModule::new(_py, "age_models")?;
    hierarchy_module(_py, m, &hierarchy_mod)?;
    age_models_module(_py, m, &age_models_mod)?;

    // Manually add submodules into sys.modules to allow for dot notation.
    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_agedepth.hierarchy", hierarchy_mod)?;

    _py.import("sys")?
        .getattr("modules")?
        .set_item("rust_agedepth.age_models", age_models_mod)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn hierarchy_module<'py>(
    _py: Python, rust_agedepth: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<Hierarchy>()?;
    rust_agedepth.add_submodule(m)?;
    Ok(())
}

#[cfg(feature = "python-bindings")]
fn age_models_module<'py>(
    _py: Python, rust_agedepth: &Bound<'py, PyModule>, m: &Bound<'py, PyModule>,
) -> PyResult<()> {
    m.add_class::<AgeModel>()?;
    m.add_class::<DepthSummary>()?;
    m.add_class::<ParameterSummary>()?;
    rust_agedepth.add_submodule(m)?;
    Ok(())
}
