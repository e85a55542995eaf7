//! Tax Payer Strategy Module
//!
//! This module defines the interface of per-period tax rules.
//!
//! # Overview
//!
//! Each tax-paying agent owns a strategy. Every period the scheduler asks the
//! strategy how much tax the agent owes (`compute_taxes`) and, when the fiscal
//! rule says so, rescales its rates (`update_rates`). Strategies can be
//! checkpointed through a fixed-layout byte record (`encode` / `decode`).
//!
//! A strategy sees its agent through the `TaxPayer` trait. The capability set
//! of the agent (bank or non-bank, profits tax liability) is resolved once
//! when the `PayerView` is built.
//!
//! # Policy Interface
//!
//! ```rust
//! use stockflow_core_rs::policy::{CodecError, TaxError, TaxPayer, TaxPayerStrategy};
//! use stockflow_core_rs::{ItemId, SimulationState};
//!
//! struct FlatTax(f64);
//!
//! impl TaxPayerStrategy for FlatTax {
//!     fn compute_taxes(&self, _payer: &dyn TaxPayer) -> Result<f64, TaxError> {
//!         Ok(self.0)
//!     }
//!
//!     fn tax_due(&self, _payer: &dyn TaxPayer) -> f64 {
//!         self.0
//!     }
//!
//!     fn update_rates(&mut self, multiplier: f64) {
//!         self.0 *= multiplier;
//!     }
//!
//!     fn paying_stocks(&self, _payer: &dyn TaxPayer) -> Result<Vec<ItemId>, TaxError> {
//!         Ok(vec![])
//!     }
//!
//!     fn encode(&self) -> Vec<u8> {
//!         self.0.to_be_bytes().to_vec()
//!     }
//!
//!     fn decode(&mut self, _content: &[u8], _population: &SimulationState) -> Result<(), CodecError> {
//!         Ok(())
//!     }
//!
//!     fn as_any(&self) -> &dyn std::any::Any {
//!         self
//!     }
//! }
//! ```

use crate::models::agent::{Agent, PayerClass};
use crate::models::state::SimulationState;
use crate::models::stock::{ItemId, StockItem, StockTypeId};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod codec;
pub mod profits_wealth_tax;

pub use codec::CodecError;
pub use profits_wealth_tax::ProfitsWealthTaxStrategy;

/// Errors raised while computing taxes
#[derive(Debug, Error, PartialEq)]
pub enum TaxError {
    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Agent {0} is not liable to the profits tax")]
    NotAProfitsTaxPayer(String),

    #[error("Agent {agent} holds no liquid asset of type {stock_type}")]
    MissingLiquidAsset { agent: String, stock_type: StockTypeId },
}

/// Financial view of a tax-paying agent
pub trait TaxPayer {
    fn payer_id(&self) -> &str;

    fn pre_tax_profits(&self) -> f64;

    fn net_wealth(&self) -> f64;

    fn payer_class(&self) -> PayerClass;

    /// All asset items of `stock_type`, in ledger order
    fn asset_items(&self, stock_type: StockTypeId) -> Vec<&StockItem>;

    /// First asset item of `stock_type`
    fn asset_item(&self, stock_type: StockTypeId) -> Option<&StockItem>;
}

/// Per-period tax rule of one agent
pub trait TaxPayerStrategy {
    /// Tax owed this period (never negative)
    fn compute_taxes(&self, payer: &dyn TaxPayer) -> Result<f64, TaxError>;

    /// Tax implied by the rates alone, before any floor or liquidity check
    fn tax_due(&self, payer: &dyn TaxPayer) -> f64;

    /// Rescale rates by the fiscal feedback multiplier
    fn update_rates(&mut self, multiplier: f64);

    /// Accounts the tax is paid from, in draw priority order
    fn paying_stocks(&self, payer: &dyn TaxPayer) -> Result<Vec<ItemId>, TaxError>;

    /// Fixed-layout byte record of the strategy's adjustable state
    fn encode(&self) -> Vec<u8>;

    /// Restore adjustable state from a record produced by `encode`
    ///
    /// `population` is available to strategies that reference other agents.
    fn decode(&mut self, content: &[u8], population: &SimulationState) -> Result<(), CodecError>;

    /// Get reference as Any for downcasting
    fn as_any(&self) -> &dyn std::any::Any;
}

/// Tax strategy configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TaxStrategyConfig {
    /// Tax on net wealth plus a bounded tax on pre-tax profits
    ProfitsWealth {
        wealth_tax_rate: f64,
        profit_tax_rate: f64,
        max_profit_tax_rate: f64,
        min_profit_tax_rate: f64,
        /// Liquid asset types: all items of the first, one of each other
        liquid_assets_id: [StockTypeId; 3],
    },
}

/// Build the strategy described by `config`
pub fn create_strategy(config: &TaxStrategyConfig) -> Box<dyn TaxPayerStrategy> {
    match config {
        TaxStrategyConfig::ProfitsWealth {
            wealth_tax_rate,
            profit_tax_rate,
            max_profit_tax_rate,
            min_profit_tax_rate,
            liquid_assets_id,
        } => Box::new(ProfitsWealthTaxStrategy::new(
            *wealth_tax_rate,
            *profit_tax_rate,
            *max_profit_tax_rate,
            *min_profit_tax_rate,
            *liquid_assets_id,
        )),
    }
}

/// `TaxPayer` view of an agent inside a `SimulationState`
#[derive(Debug, Clone, Copy)]
pub struct PayerView<'a> {
    agent: &'a Agent,
    state: &'a SimulationState,
}

impl<'a> PayerView<'a> {
    /// Resolve `agent_id` as a profits tax payer
    pub fn new(state: &'a SimulationState, agent_id: &str) -> Result<Self, TaxError> {
        let agent = state
            .get_agent(agent_id)
            .ok_or_else(|| TaxError::AgentNotFound(agent_id.to_string()))?;
        if !agent.pays_profit_taxes() {
            return Err(TaxError::NotAProfitsTaxPayer(agent_id.to_string()));
        }
        Ok(Self { agent, state })
    }
}

impl TaxPayer for PayerView<'_> {
    fn payer_id(&self) -> &str {
        self.agent.id()
    }

    fn pre_tax_profits(&self) -> f64 {
        self.agent.pre_tax_profits()
    }

    fn net_wealth(&self) -> f64 {
        self.state
            .net_wealth(self.agent.id())
            .to_f64()
            .unwrap_or_default()
    }

    fn payer_class(&self) -> PayerClass {
        self.agent.payer_class()
    }

    fn asset_items(&self, stock_type: StockTypeId) -> Vec<&StockItem> {
        self.state.items_of(self.agent.id(), true, stock_type)
    }

    fn asset_item(&self, stock_type: StockTypeId) -> Option<&StockItem> {
        self.state.item_of(self.agent.id(), true, stock_type)
    }
}
