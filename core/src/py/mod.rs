use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::error::CoreError;

// ──────────────────────────────────────────────────────────────────────────────
// HJELPERE
// ──────────────────────────────────────────────────────────────────────────────

/// Godta både str og dict/objekt; dict serialiseres med Python sin json.dumps.
fn payload_to_json(py: Python<'_>, payload: &PyAny) -> PyResult<String> {
    if let Ok(s) = payload.extract::<&str>() {
        return Ok(s.to_owned());
    }
    let json_mod = py
        .import("json")
        .map_err(|e| PyValueError::new_err(format!("failed to import json: {e}")))?;
    json_mod
        .call_method1("dumps", (payload,))
        .and_then(|o| o.extract::<String>())
        .map_err(|e| PyValueError::new_err(format!("failed to serialize payload with json.dumps: {e}")))
}

fn json_to_py(py: Python<'_>, out: &str) -> PyResult<PyObject> {
    let json_mod = py
        .import("json")
        .map_err(|e| PyValueError::new_err(format!("failed to import json: {e}")))?;
    let obj = json_mod
        .call_method1("loads", (out,))
        .map_err(|e| PyValueError::new_err(format!("internal JSON parse error via json.loads: {e}")))?;
    Ok(obj.into_py(py))
}

fn to_py_err(e: CoreError) -> PyErr {
    PyValueError::new_err(e.to_string())
}

// ──────────────────────────────────────────────────────────────────────────────
// PyO3-FUNKSJONER
// ──────────────────────────────────────────────────────────────────────────────

/// Segmentering: str/dict inn → dict ut (intervals, skipped, discarded).
#[pyfunction]
fn segment_json(py: Python<'_>, payload: &PyAny) -> PyResult<PyObject> {
    let json_in = payload_to_json(py, payload)?;
    let out = crate::segment_json(&json_in).map_err(to_py_err)?;
    json_to_py(py, &out)
}

#[pyfunction]
fn envelope_json(py: Python<'_>, payload: &PyAny) -> PyResult<PyObject> {
    let json_in = payload_to_json(py, payload)?;
    let out = crate::envelope_json(&json_in).map_err(to_py_err)?;
    json_to_py(py, &out)
}

#[pyfunction]
fn compute_alpha(mean_power: f64, mean_compound: f64, mean_machine: f64, cooling_surface: f64) -> PyResult<f64> {
    if mean_compound == mean_machine {
        return Err(PyValueError::new_err(
            "compound temperature equals machine temperature, coefficient undefined",
        ));
    }
    Ok(crate::coefficient(mean_power, mean_compound, mean_machine, cooling_surface))
}

/// Prometheus tekstformat for prosessens tellere.
#[pyfunction]
fn metrics_text() -> String {
    crate::METRICS.gather_text()
}

// ──────────────────────────────────────────────────────────────────────────────
// PyO3-MODUL
// ──────────────────────────────────────────────────────────────────────────────

#[pymodule]
fn tempcoef_core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(segment_json, m)?)?;
    m.add_function(wrap_pyfunction!(envelope_json, m)?)?;
    m.add_function(wrap_pyfunction!(compute_alpha, m)?)?;
    m.add_function(wrap_pyfunction!(metrics_text, m)?)?;
    Ok(())
}
