//! Agent model
//!
//! Represents a participant of the stock-flow economy (bank, firm, household,
//! government, central bank).
//!
//! Agents do not own their stock items: items live in the shared ledger of
//! `SimulationState` and reference agents by id. An agent carries:
//! - its **role**, which resolves the capability set once (tax payer class,
//!   profits tax liability)
//! - its **pre-tax profits** for the current period (set by the scheduler)
//! - an optional **liability supplier** profile when it issues instruments
//!   that other agents hold

use crate::models::stock::StockTypeId;
use crate::settlement::supplier::SupplierProfile;
use serde::{Deserialize, Serialize};

/// Role of an agent in the economy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AgentRole {
    Bank,
    Firm,
    Household,
    Government,
    CentralBank,
}

/// How a tax payer is treated by tax strategies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayerClass {
    /// Bank-like payer: taxed without a liquidity check
    Bank,
    /// Any other payer: taxed only when its liquid assets cover the tax
    NonBank,
}

/// A participant of the simulation
///
/// # Example
/// ```
/// use stockflow_core_rs::{Agent, AgentRole};
///
/// let firm = Agent::new("FIRM_1".to_string(), AgentRole::Firm);
/// assert!(firm.pays_profit_taxes());
/// assert!(!firm.is_liability_supplier());
///
/// let bank = Agent::liability_supplier("BANK_A".to_string(), AgentRole::Bank, 3);
/// assert!(bank.is_liability_supplier());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    id: String,
    role: AgentRole,

    /// Pre-tax profits of the current period
    pre_tax_profits: f64,

    /// Issuer capability (None for agents that issue nothing transferable)
    supplier: Option<SupplierProfile>,
}

impl Agent {
    /// Create an agent without issuer capability
    pub fn new(id: String, role: AgentRole) -> Self {
        Self {
            id,
            role,
            pre_tax_profits: 0.0,
            supplier: None,
        }
    }

    /// Create an agent able to transfer value between items it issues
    ///
    /// `settlement_type` is the stock type used to settle with other issuers
    /// when a transfer leaves this agent's books (reserves for a bank, cash
    /// for the central bank).
    pub fn liability_supplier(id: String, role: AgentRole, settlement_type: StockTypeId) -> Self {
        let supplier = SupplierProfile::new(id.clone(), settlement_type);
        Self {
            id,
            role,
            pre_tax_profits: 0.0,
            supplier: Some(supplier),
        }
    }

    /// Restore an agent from checkpoint data
    pub fn from_snapshot(
        id: String,
        role: AgentRole,
        pre_tax_profits: f64,
        supplier: Option<SupplierProfile>,
    ) -> Self {
        Self {
            id,
            role,
            pre_tax_profits,
            supplier,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn role(&self) -> AgentRole {
        self.role
    }

    pub fn pre_tax_profits(&self) -> f64 {
        self.pre_tax_profits
    }

    pub fn set_pre_tax_profits(&mut self, profits: f64) {
        self.pre_tax_profits = profits;
    }

    /// Banks and firms are liable to the profits tax
    pub fn pays_profit_taxes(&self) -> bool {
        matches!(self.role, AgentRole::Bank | AgentRole::Firm)
    }

    pub fn payer_class(&self) -> PayerClass {
        match self.role {
            AgentRole::Bank => PayerClass::Bank,
            _ => PayerClass::NonBank,
        }
    }

    pub fn is_liability_supplier(&self) -> bool {
        self.supplier.is_some()
    }

    pub fn supplier(&self) -> Option<&SupplierProfile> {
        self.supplier.as_ref()
    }

    pub fn supplier_mut(&mut self) -> Option<&mut SupplierProfile> {
        self.supplier.as_mut()
    }
}
