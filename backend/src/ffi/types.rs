//! Type conversion utilities for FFI boundary
//!
//! Converts Rust results and events to Python dicts. Decimal amounts cross
//! the boundary as strings so no precision is lost.

use pyo3::prelude::*;
use pyo3::types::PyDict;

use crate::models::event::Event;
use crate::orchestrator::{SimulationError, TickResult};

/// Map an orchestrator error to a Python exception
pub fn to_py_err(context: &str, err: SimulationError) -> PyErr {
    match err {
        SimulationError::InvalidConfig(_)
        | SimulationError::SerializationError(_)
        | SimulationError::StateValidationError(_) => {
            PyErr::new::<pyo3::exceptions::PyValueError, _>(format!("{}: {}", context, err))
        }
        other => PyErr::new::<pyo3::exceptions::PyRuntimeError, _>(format!("{}: {}", context, other)),
    }
}

/// Convert TickResult to Python dict
pub fn tick_result_to_py(py: Python, result: &TickResult) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);

    dict.set_item("period", result.period)?;
    dict.set_item("num_assessed", result.num_assessed)?;
    dict.set_item("num_waived", result.num_waived)?;
    dict.set_item("num_shortfalls", result.num_shortfalls)?;
    dict.set_item("taxes_assessed", result.taxes_assessed.to_string())?;
    dict.set_item("taxes_collected", result.taxes_collected.to_string())?;

    Ok(dict.unbind())
}

/// Convert Event to Python dict with an `event_type` discriminator
pub fn event_to_py(py: Python, event: &Event) -> PyResult<Py<PyDict>> {
    let dict = PyDict::new_bound(py);
    dict.set_item("event_type", event.event_type())?;
    dict.set_item("period", event.period())?;

    match event {
        Event::TaxAssessed { agent_id, due, amount, .. } => {
            dict.set_item("agent_id", agent_id)?;
            dict.set_item("due", due)?;
            dict.set_item("amount", amount)?;
        }
        Event::TaxWaived { agent_id, due, .. } => {
            dict.set_item("agent_id", agent_id)?;
            dict.set_item("due", due)?;
        }
        Event::LiquidityDrawn { agent_id, source, target, amount, .. } => {
            dict.set_item("agent_id", agent_id)?;
            dict.set_item("source", source.to_string())?;
            dict.set_item("target", target.to_string())?;
            dict.set_item("amount", amount.to_string())?;
        }
        Event::TaxPaid { agent_id, receiver_id, amount, .. } => {
            dict.set_item("agent_id", agent_id)?;
            dict.set_item("receiver_id", receiver_id)?;
            dict.set_item("amount", amount.to_string())?;
        }
        Event::TaxShortfall { agent_id, required, collected, .. } => {
            dict.set_item("agent_id", agent_id)?;
            dict.set_item("required", required.to_string())?;
            dict.set_item("collected", collected.to_string())?;
        }
        Event::RatesUpdated { multiplier, num_strategies, .. } => {
            dict.set_item("multiplier", multiplier)?;
            dict.set_item("num_strategies", num_strategies)?;
        }
        Event::EndOfYear { year, .. } => {
            dict.set_item("year", year)?;
        }
    }

    Ok(dict.unbind())
}
