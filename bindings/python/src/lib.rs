//! Python bindings for JobSafe
//!
//! Thin wrapper around `jobsafe-core` — ZERO logic here.
//! All behavior comes from the Rust implementation.

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

/// Classify one line of contract text.
///
/// Args:
///     line: a single line of text
///
/// Returns:
///     The section symbol letter ("H", "R", ... "X"), or None when the line
///     is blank or matches no rule
#[pyfunction]
fn classify(line: &str) -> Option<String> {
    jobsafe_core::classify(line).map(|s| s.to_string())
}

/// Validate a token stream with the pushdown automaton.
///
/// Args:
///     tokens: list of symbol letters, e.g. ["H", "R", "D"]
///
/// Returns:
///     (accepted, trace) where trace is a list of human-readable entries
///
/// Raises:
///     ValueError: If a token is not one of H, R, D, S, C, B, F, T, X
#[pyfunction]
fn validate(tokens: Vec<String>) -> PyResult<(bool, Vec<String>)> {
    let symbols = tokens
        .iter()
        .map(|t| t.parse::<jobsafe_core::Symbol>())
        .collect::<jobsafe_core::Result<Vec<_>>>()
        .map_err(|e| PyValueError::new_err(e.to_string()))?;

    let validation = jobsafe_core::validate(&symbols);
    let trace = validation.trace_lines();
    Ok((validation.accepted, trace))
}

/// Classify and validate a whole document.
///
/// Args:
///     text: contract text, one section line per line
///
/// Returns:
///     JSON string with the token generation log, token stream, and
///     validation result (verdict, structured trace, final state and stack)
#[pyfunction]
fn analyze(text: &str) -> PyResult<String> {
    let analysis = jobsafe_core::analyze(text);
    serde_json::to_string_pretty(&analysis)
        .map_err(|e| PyValueError::new_err(format!("Serialization error: {}", e)))
}

/// Compute the structural fingerprint (SHA-256 hex) of a document.
///
/// Documents with the same section structure share a fingerprint.
#[pyfunction]
fn fingerprint(text: &str) -> String {
    jobsafe_core::analyze(text).fingerprint()
}

/// JobSafe Python module — employment contract structure validator
#[pymodule]
fn jobsafe(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(classify, m)?)?;
    m.add_function(wrap_pyfunction!(validate, m)?)?;
    m.add_function(wrap_pyfunction!(analyze, m)?)?;
    m.add_function(wrap_pyfunction!(fingerprint, m)?)?;
    Ok(())
}
