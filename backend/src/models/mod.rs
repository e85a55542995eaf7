//! Domain models for the stock-flow simulator

pub mod agent;
pub mod event;
pub mod ledger;
pub mod state;
pub mod stock;

// Re-exports
pub use agent::{Agent, AgentRole, PayerClass};
pub use event::{Event, EventLog};
pub use ledger::{LedgerError, StockLedger};
pub use state::{SimulationState, StateError};
pub use stock::{ItemId, StockItem, StockTypeId};
