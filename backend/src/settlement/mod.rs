//! Settlement Module
//!
//! Moves value between stock items:
//! - **supplier**: issuer-side transfers (`LiabilitySupplier`)
//! - **reallocation**: liquidity reallocation engine that decides how much to
//!   draw from each source account
//!
//! # Critical Invariants
//!
//! 1. **Issuer Mediation**: only the issuer of an item moves value out of it
//! 2. **Stock-Flow Consistency**: the sum of all agents' net worth is unchanged
//!    by any transfer
//! 3. **Determinism**: draws follow source order exactly
//!
//! # Example
//!
//! ```rust
//! use stockflow_core_rs::{Agent, AgentRole, SimulationState};
//! use stockflow_core_rs::settlement;
//! use rust_decimal::Decimal;
//!
//! let mut state = SimulationState::new(vec![
//!     Agent::new("HH_1".to_string(), AgentRole::Household),
//!     Agent::liability_supplier("BANK_A".to_string(), AgentRole::Bank, 3),
//! ]);
//! let savings = state.open_item(2, "HH_1", "BANK_A", Decimal::from(500)).unwrap();
//! let current = state.open_item(1, "HH_1", "BANK_A", Decimal::ZERO).unwrap();
//!
//! let outcome = settlement::reallocate_liquidity(&mut state, Decimal::from(120), &[savings], current).unwrap();
//! assert_eq!(outcome.total_drawn(), Decimal::from(120));
//! assert_eq!(state.item(&savings).unwrap().value(), Decimal::from(380));
//! ```

pub mod reallocation;
pub mod supplier;

// Re-export public API
pub use reallocation::{
    draw_amount, reallocate_liquidity, ExecutedDraw, ReallocationError, ReallocationOutcome,
};
pub use supplier::{LiabilitySupplier, SupplierProfile, TransferError};
