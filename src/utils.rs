#[cfg(feature = "python-bindings")]
use ndarray::{Array1, Array2};

#[cfg(feature = "python-bindings")]
use pyo3::{exceptions::PyValueError, prelude::*, types::PyAny};

#[cfg(feature = "python-bindings")]
use crate::{
    agemodel::{AgeDepthModel, Anchor, SummaryOptions},
    hierarchy::SectionHierarchy,
    posterior::PosteriorEnsemble,
};

#[cfg(feature = "python-bindings")]
use numpy::{
    IntoPyArray,    // Vec → PyArray
    PyArrayMethods, // .readonly()
    PyReadonlyArray1, PyReadonlyArray2,
};

/// Convert a 1-D array-like into a read-only contiguous float64 view.
///
/// Accepts a contiguous `numpy.ndarray` directly, anything exposing a
/// `to_numpy` method (e.g. `pandas.Series`), or a plain sequence of
/// floats, which is copied into a fresh array once.
#[cfg(feature = "python-bindings")]
#[inline]
pub fn extract_f64_array<'py>(
    py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<PyReadonlyArray1<'py, f64>> {
    if let Ok(contiguous) = raw_data.extract::<PyReadonlyArray1<f64>>() {
        if contiguous.as_slice().is_ok() {
            return Ok(contiguous);
        }
    }

    // pandas.Series and friends: borrow the backing array when possible.
    if let Ok(materialized) = raw_data.call_method("to_numpy", (false,), None) {
        if let Ok(contiguous) = materialized.extract::<PyReadonlyArray1<f64>>() {
            if contiguous.as_slice().is_ok() {
                return Ok(contiguous);
            }
        }
    }

    let values: Vec<f64> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 1-D contiguous float64 array, a pandas.Series, or a sequence of floats",
        )
    })?;
    Ok(values.into_pyarray(py).readonly())
}

/// Convert a 2-D array-like into an owned `Array2<f64>`.
///
/// Accepts a contiguous `numpy.ndarray` of shape `[n_rows × n_cols]` or a
/// sequence of equal-length float64 sequences.
#[cfg(feature = "python-bindings")]
pub fn extract_f64_matrix<'py>(
    _py: Python<'py>, raw_data: &Bound<'py, PyAny>,
) -> PyResult<Array2<f64>> {
    if let Ok(arr_ro) = raw_data.extract::<PyReadonlyArray2<f64>>() {
        return Ok(arr_ro.as_array().to_owned());
    }

    let rows: Vec<Vec<f64>> = raw_data.extract().map_err(|_| {
        pyo3::exceptions::PyTypeError::new_err(
            "expected a 2-D numpy.ndarray or sequence of float64 sequences",
        )
    })?;
    if rows.is_empty() {
        return Err(PyValueError::new_err("draw matrix must not be empty"));
    }
    let ncols = rows[0].len();
    if rows.iter().any(|r| r.len() != ncols) {
        return Err(PyValueError::new_err("draw matrix rows must have equal lengths"));
    }
    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((flat.len() / ncols.max(1), ncols), flat)
        .map_err(|_| PyValueError::new_err("draw matrix rows must have equal lengths"))
}

/// Build [`SummaryOptions`] from an optional Python quantile list.
#[cfg(feature = "python-bindings")]
pub fn extract_summary_options(quantiles: Option<Vec<f64>>) -> PyResult<SummaryOptions> {
    match quantiles {
        Some(q) => Ok(SummaryOptions::new(&q)?),
        None => Ok(SummaryOptions::default()),
    }
}

/// Assemble an [`AgeDepthModel`] from Python-friendly arguments.
///
/// Builds the hierarchy (explicit branching or auto), ingests the flat draw
/// matrix into a validated ensemble, and binds the anchor; every failure is
/// mapped to `ValueError` by the core error conversions.
#[cfg(feature = "python-bindings")]
#[allow(clippy::too_many_arguments)]
pub fn build_age_model<'py>(
    py: Python<'py>, depth_min: f64, depth_max: f64, draws: &Bound<'py, PyAny>,
    memory: &Bound<'py, PyAny>, chain_id: Vec<usize>, anchor_depth: f64, anchor_age: f64,
    branching: Option<Vec<usize>>,
) -> PyResult<AgeDepthModel> {
    let hierarchy = match branching {
        Some(k) => SectionHierarchy::with_branching(depth_min, depth_max, &k)?,
        None => SectionHierarchy::auto(depth_min, depth_max)?,
    };

    let draw_matrix = extract_f64_matrix(py, draws)?;

    let memory_arr = extract_f64_array(py, memory)?;
    let memory_slice = memory_arr.as_slice().map_err(|_| {
        PyValueError::new_err("memory must be a 1-D contiguous float64 array or sequence")
    })?;
    let memory_vec = Array1::from(memory_slice.to_vec());

    let ensemble = PosteriorEnsemble::from_flat(&hierarchy, draw_matrix, memory_vec, chain_id)?;
    let anchor = Anchor::new(anchor_depth, anchor_age)?;

    Ok(AgeDepthModel::new(hierarchy, ensemble, anchor)?)
}
