//! Stock-Flow Tax Core - Rust Engine
//!
//! Stock-flow consistent economy engine: balance-sheet items held and issued
//! by agents, liquidity reallocation across a payer's accounts, and
//! profits-and-wealth taxation with a fiscal feedback rule.
//!
//! # Architecture
//!
//! - **core**: Period clock and fiscal years
//! - **models**: Domain types (Agent, StockItem, ledger, State, events)
//! - **settlement**: Liability suppliers and liquidity reallocation
//! - **policy**: Tax payer strategies and their persistence codec
//! - **orchestrator**: Per-period tax collection round and checkpoints
//!
//! # Critical Invariants
//!
//! 1. Stock values are exact decimals; every transfer conserves value
//! 2. Item values only change through the issuing agent
//! 3. FFI boundary is minimal and safe

// Module declarations
pub mod core;
pub mod models;
pub mod orchestrator;
pub mod policy;
pub mod settlement;

// Re-exports for convenience
pub use core::time::TimeManager;
pub use models::{
    agent::{Agent, AgentRole, PayerClass},
    event::{Event, EventLog},
    state::SimulationState,
    stock::{ItemId, StockItem, StockTypeId},
};
pub use orchestrator::{
    AgentConfig, FiscalConfig, Orchestrator, OrchestratorConfig, SimulationError, StockItemConfig,
    TickResult,
};

// FFI module (when feature enabled)
#[cfg(feature = "pyo3")]
pub mod ffi;

// PyO3 exports (when feature enabled)
#[cfg(feature = "pyo3")]
use pyo3::prelude::*;

#[cfg(feature = "pyo3")]
#[pymodule]
fn stockflow_core_rs(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<ffi::orchestrator::PyOrchestrator>()?;
    Ok(())
}
