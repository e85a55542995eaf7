//! Simulation State
//!
//! Represents the complete stock-flow matrix of the simulation: all agents and
//! the ledger of stock items they hold and issue.
//!
//! # Critical Invariants
//!
//! 1. **Referential Integrity**: every item's holder and issuer is a known agent
//! 2. **Issuer-Mediated Mutation**: item values only change through the
//!    issuing agent's `LiabilitySupplier::transfer`
//! 3. **Stock-Flow Consistency**: the sum of all agents' net worth is zero
//!
//! # Concurrency
//!
//! Items are mutated in place. All mutation goes through `&mut SimulationState`
//! so callers are serialized by the borrow checker; payers sharing an account
//! are processed one after the other.

use crate::models::agent::Agent;
use crate::models::ledger::{LedgerError, StockLedger};
use crate::models::stock::{ItemId, StockItem, StockTypeId};
use crate::settlement::supplier::{LiabilitySupplier, TransferError};
use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by state lookups and issuer-mediated transfers
#[derive(Debug, Error, PartialEq)]
pub enum StateError {
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Stock item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Agent {0} is not a liability supplier")]
    NotALiabilitySupplier(String),

    #[error("Transfer error: {0}")]
    Transfer(#[from] TransferError),

    #[error("Ledger error: {0}")]
    Ledger(#[from] LedgerError),
}

/// Complete simulation state
///
/// # Example
///
/// ```rust
/// use stockflow_core_rs::{Agent, AgentRole, SimulationState};
/// use rust_decimal::Decimal;
///
/// let mut state = SimulationState::new(vec![
///     Agent::new("FIRM_1".to_string(), AgentRole::Firm),
///     Agent::liability_supplier("BANK_A".to_string(), AgentRole::Bank, 3),
/// ]);
/// let deposit = state
///     .open_item(1, "FIRM_1", "BANK_A", Decimal::new(250, 0))
///     .unwrap();
///
/// assert_eq!(state.item(&deposit).unwrap().value(), Decimal::new(250, 0));
/// assert_eq!(state.net_wealth("FIRM_1"), Decimal::new(250, 0));
/// ```
#[derive(Debug, Clone, Default)]
pub struct SimulationState {
    /// All agents, indexed by id
    agents: HashMap<String, Agent>,

    ledger: StockLedger,
}

impl SimulationState {
    pub fn new(agents: Vec<Agent>) -> Self {
        let agents = agents
            .into_iter()
            .map(|agent| (agent.id().to_string(), agent))
            .collect();

        Self {
            agents,
            ledger: StockLedger::new(),
        }
    }

    pub fn get_agent(&self, id: &str) -> Option<&Agent> {
        self.agents.get(id)
    }

    pub fn get_agent_mut(&mut self, id: &str) -> Option<&mut Agent> {
        self.agents.get_mut(id)
    }

    pub fn agents(&self) -> &HashMap<String, Agent> {
        &self.agents
    }

    pub fn num_agents(&self) -> usize {
        self.agents.len()
    }

    /// Agent ids in sorted order (deterministic iteration)
    pub fn agent_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.agents.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn ledger(&self) -> &StockLedger {
        &self.ledger
    }

    pub fn item(&self, id: &ItemId) -> Option<&StockItem> {
        self.ledger.get(id)
    }

    /// Open a new stock item between two known agents
    pub fn open_item(
        &mut self,
        stock_type: StockTypeId,
        asset_holder: &str,
        liability_holder: &str,
        value: Decimal,
    ) -> Result<ItemId, StateError> {
        self.insert_item(StockItem::new(
            stock_type,
            asset_holder.to_string(),
            liability_holder.to_string(),
            value,
        ))
    }

    /// Insert an existing item (checkpoint restore)
    pub fn insert_item(&mut self, item: StockItem) -> Result<ItemId, StateError> {
        for agent_id in [item.asset_holder(), item.liability_holder()] {
            if !self.agents.contains_key(agent_id) {
                return Err(StateError::AgentNotFound(agent_id.to_string()));
            }
        }
        Ok(self.ledger.insert(item)?)
    }

    /// All items of `stock_type` held (`is_asset`) or issued by `agent_id`
    pub fn items_of(&self, agent_id: &str, is_asset: bool, stock_type: StockTypeId) -> Vec<&StockItem> {
        self.ledger.items_of(agent_id, is_asset, stock_type)
    }

    /// First item of `stock_type` held (`is_asset`) or issued by `agent_id`
    pub fn item_of(&self, agent_id: &str, is_asset: bool, stock_type: StockTypeId) -> Option<&StockItem> {
        self.ledger.item_of(agent_id, is_asset, stock_type)
    }

    /// Net wealth of an agent (assets minus liabilities)
    pub fn net_wealth(&self, agent_id: &str) -> Decimal {
        self.ledger.net_worth(agent_id)
    }

    /// Sum of every agent's net worth; zero in a consistent matrix
    pub fn total_net_worth(&self) -> Decimal {
        self.agents.keys().map(|id| self.ledger.net_worth(id)).sum()
    }

    /// Move `amount` from `source` to `target` through the source's issuer
    ///
    /// Resolves the issuer of `source` and delegates to its
    /// `LiabilitySupplier::transfer`. How the issuer balances its own books
    /// is up to the supplier.
    pub fn transfer_through_issuer(
        &mut self,
        source: ItemId,
        target: ItemId,
        amount: Decimal,
    ) -> Result<(), StateError> {
        let issuer_id = self
            .ledger
            .get(&source)
            .ok_or(StateError::ItemNotFound(source))?
            .liability_holder()
            .to_string();

        let Self { agents, ledger } = self;
        let supplier = agents
            .get_mut(&issuer_id)
            .ok_or_else(|| StateError::AgentNotFound(issuer_id.clone()))?
            .supplier_mut()
            .ok_or_else(|| StateError::NotALiabilitySupplier(issuer_id.clone()))?;

        supplier.transfer(ledger, source, target, amount)?;
        Ok(())
    }

    /// Check that `transfer_through_issuer` would succeed, without mutating
    pub fn check_transfer_through_issuer(
        &self,
        source: ItemId,
        target: ItemId,
        amount: Decimal,
    ) -> Result<(), StateError> {
        let issuer_id = self
            .ledger
            .get(&source)
            .ok_or(StateError::ItemNotFound(source))?
            .liability_holder();

        let supplier = self
            .agents
            .get(issuer_id)
            .ok_or_else(|| StateError::AgentNotFound(issuer_id.to_string()))?
            .supplier()
            .ok_or_else(|| StateError::NotALiabilitySupplier(issuer_id.to_string()))?;

        supplier.validate_transfer(&self.ledger, source, target, amount)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::agent::AgentRole;

    #[test]
    fn test_open_item_requires_known_agents() {
        let mut state = SimulationState::new(vec![Agent::new("H".to_string(), AgentRole::Household)]);
        let result = state.open_item(1, "H", "BANK_X", Decimal::ONE);
        assert_eq!(result, Err(StateError::AgentNotFound("BANK_X".to_string())));
    }

    #[test]
    fn test_transfer_requires_supplier_issuer() {
        let mut state = SimulationState::new(vec![
            Agent::new("H".to_string(), AgentRole::Household),
            Agent::new("F".to_string(), AgentRole::Firm),
        ]);
        // A trade credit issued by a firm: the firm cannot move it
        let source = state.open_item(9, "H", "F", Decimal::from(10)).unwrap();
        let target = state.open_item(9, "H", "F", Decimal::ZERO).unwrap();

        let result = state.transfer_through_issuer(source, target, Decimal::ONE);
        assert_eq!(result, Err(StateError::NotALiabilitySupplier("F".to_string())));
    }

    #[test]
    fn test_agent_ids_sorted() {
        let state = SimulationState::new(vec![
            Agent::new("Z".to_string(), AgentRole::Firm),
            Agent::new("A".to_string(), AgentRole::Firm),
        ]);
        assert_eq!(state.agent_ids(), vec!["A".to_string(), "Z".to_string()]);
    }
}
