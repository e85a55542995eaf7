//! Orchestrator - per-period tax collection round
//!
//! Implements the period loop integrating strategies, reallocation and
//! issuer-mediated payment.
//!
//! See `engine.rs` for full implementation.

pub mod checkpoint;
pub mod engine;

// Re-export main types for convenience
pub use engine::{
    AgentConfig, FiscalConfig, Orchestrator, OrchestratorConfig, SimulationError, StockItemConfig,
    TickResult,
};

// Re-export checkpoint types
pub use checkpoint::{
    compute_config_hash, validate_snapshot, AgentSnapshot, StateSnapshot, StockItemSnapshot,
    StrategySnapshot,
};
