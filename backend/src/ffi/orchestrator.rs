//! PyO3 wrapper for Orchestrator
//!
//! This module provides the Python interface to the Rust orchestrator.

use pyo3::prelude::*;
use pyo3::types::{PyDict, PyList};

use super::types::{event_to_py, tick_result_to_py, to_py_err};
use crate::orchestrator::{Orchestrator as RustOrchestrator, OrchestratorConfig};

/// Python wrapper for Rust Orchestrator
///
/// # Example (from Python)
///
/// ```python
/// from stockflow._core import Orchestrator
///
/// orch = Orchestrator.from_json(open("economy.json").read())
/// orch.set_pre_tax_profits("FIRM_1", 120.0)
/// result = orch.tick()
/// print(f"Period {result['period']}: collected {result['taxes_collected']}")
/// ```
#[pyclass(name = "Orchestrator", unsendable)]
pub struct PyOrchestrator {
    inner: RustOrchestrator,
}

#[pymethods]
impl PyOrchestrator {
    /// Create a new orchestrator from a JSON configuration
    ///
    /// # Errors
    ///
    /// Raises ValueError if the JSON is malformed or the configuration is
    /// inconsistent (duplicate agents, unknown government, missing accounts).
    #[staticmethod]
    fn from_json(config: &str) -> PyResult<Self> {
        let rust_config = OrchestratorConfig::from_json(config)
            .map_err(|e| to_py_err("Failed to parse config", e))?;
        let inner = RustOrchestrator::new(rust_config)
            .map_err(|e| to_py_err("Failed to create orchestrator", e))?;
        Ok(PyOrchestrator { inner })
    }

    /// Restore an orchestrator from a checkpoint taken with the same config
    #[staticmethod]
    fn load_state(config: &str, state: &str) -> PyResult<Self> {
        let rust_config = OrchestratorConfig::from_json(config)
            .map_err(|e| to_py_err("Failed to parse config", e))?;
        let inner = RustOrchestrator::load_state(rust_config, state)
            .map_err(|e| to_py_err("Failed to load checkpoint", e))?;
        Ok(PyOrchestrator { inner })
    }

    /// Execute one period of tax collection
    ///
    /// # Returns
    ///
    /// Dictionary containing period results:
    /// - `period`: Period just processed
    /// - `num_assessed`, `num_waived`, `num_shortfalls`: payer counts
    /// - `taxes_assessed`, `taxes_collected`: decimal strings
    fn tick(&mut self, py: Python) -> PyResult<Py<PyDict>> {
        let result = self
            .inner
            .tick()
            .map_err(|e| to_py_err("Tick execution failed", e))?;
        tick_result_to_py(py, &result)
    }

    fn current_period(&self) -> usize {
        self.inner.current_period()
    }

    /// Apply the fiscal feedback multiplier to every tax strategy
    fn update_tax_rates(&mut self, multiplier: f64) {
        self.inner.update_tax_rates(multiplier);
    }

    fn set_pre_tax_profits(&mut self, agent_id: &str, profits: f64) -> PyResult<()> {
        self.inner
            .set_pre_tax_profits(agent_id, profits)
            .map_err(|e| to_py_err("Failed to set profits", e))
    }

    /// Net wealth of an agent as a decimal string, or None if unknown
    fn get_net_wealth(&self, agent_id: &str) -> Option<String> {
        self.inner
            .state()
            .get_agent(agent_id)
            .map(|_| self.inner.state().net_wealth(agent_id).to_string())
    }

    fn get_agent_ids(&self) -> Vec<String> {
        self.inner.state().agent_ids()
    }

    /// Serialize the current state to a JSON checkpoint
    fn save_state(&self) -> PyResult<String> {
        self.inner
            .save_state()
            .map_err(|e| to_py_err("Failed to save checkpoint", e))
    }

    /// All events of one period, in the order they were logged
    fn get_events_for_period(&self, py: Python, period: usize) -> PyResult<Py<PyList>> {
        let py_list = PyList::empty_bound(py);
        for event in self.inner.event_log().events_at_period(period) {
            py_list.append(event_to_py(py, event)?)?;
        }
        Ok(py_list.unbind())
    }
}
