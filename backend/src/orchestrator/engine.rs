//! Orchestrator Engine
//!
//! Per-period tax round integrating all components:
//! - Tax assessment (strategy per payer)
//! - Liquidity reallocation (gather the payer's liquid assets)
//! - Tax payment (issuer-mediated transfer to the government)
//! - Fiscal rule (rate feedback at the end of each fiscal year)
//! - Event logging (complete round history)
//!
//! # Architecture
//!
//! ```text
//! For each period t:
//! 1. For each payer with a tax strategy, in sorted id order:
//!    a. Compute the tax (TaxPayerStrategy::compute_taxes)
//!    b. Reallocate the payer's liquid assets into its primary account
//!    c. Pay min(tax, primary balance) to the government's receiving account
//! 2. At the end of a fiscal year, rescale rates by the configured multiplier
//! 3. Advance time
//! ```
//!
//! Payers are processed one after the other: two payers drawing on the same
//! account never interleave.
//!
//! # Example
//!
//! ```rust
//! use stockflow_core_rs::orchestrator::{AgentConfig, FiscalConfig, Orchestrator, OrchestratorConfig, StockItemConfig};
//! use stockflow_core_rs::policy::TaxStrategyConfig;
//! use stockflow_core_rs::AgentRole;
//! use rust_decimal::Decimal;
//!
//! const DEPOSIT: u32 = 1;
//! const CASH: u32 = 2;
//! const RESERVES: u32 = 3;
//! const BONDS: u32 = 4;
//!
//! let config = OrchestratorConfig {
//!     periods_per_year: 4,
//!     agent_configs: vec![
//!         AgentConfig::new("CB", AgentRole::CentralBank).with_settlement_type(CASH),
//!         AgentConfig::new("GOV", AgentRole::Government),
//!         AgentConfig::new("BANK_A", AgentRole::Bank).with_settlement_type(RESERVES),
//!         AgentConfig::new("FIRM_1", AgentRole::Firm)
//!             .with_pre_tax_profits(100.0)
//!             .with_tax_strategy(TaxStrategyConfig::ProfitsWealth {
//!                 wealth_tax_rate: 0.0,
//!                 profit_tax_rate: 0.2,
//!                 max_profit_tax_rate: 0.5,
//!                 min_profit_tax_rate: 0.1,
//!                 liquid_assets_id: [DEPOSIT, CASH, BONDS],
//!             }),
//!     ],
//!     stock_items: vec![
//!         StockItemConfig::new(RESERVES, "GOV", "CB", Decimal::ZERO),
//!         StockItemConfig::new(RESERVES, "BANK_A", "CB", Decimal::from(1_000)),
//!         StockItemConfig::new(DEPOSIT, "FIRM_1", "BANK_A", Decimal::from(500)),
//!         StockItemConfig::new(CASH, "FIRM_1", "CB", Decimal::from(50)),
//!         StockItemConfig::new(BONDS, "FIRM_1", "GOV", Decimal::from(10)),
//!     ],
//!     fiscal: FiscalConfig::new("GOV", RESERVES, RESERVES),
//! };
//!
//! let mut orchestrator = Orchestrator::new(config).unwrap();
//! let result = orchestrator.tick().unwrap();
//! assert_eq!(result.taxes_collected, Decimal::from(20));
//! ```

use crate::core::time::TimeManager;
use crate::models::agent::{Agent, AgentRole, PayerClass};
use crate::models::event::{Event, EventLog};
use crate::models::state::{SimulationState, StateError};
use crate::models::stock::{ItemId, StockTypeId};
use crate::policy::{
    create_strategy, CodecError, PayerView, TaxError, TaxPayer, TaxPayerStrategy,
    TaxStrategyConfig,
};
use crate::settlement::{reallocate_liquidity, ReallocationError};
use log::{info, warn};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

// ============================================================================
// Configuration Types
// ============================================================================

/// Complete orchestrator configuration
///
/// Serializable so it can be loaded from JSON and hashed for checkpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Number of periods per fiscal year (e.g. 4 = quarterly)
    pub periods_per_year: usize,

    /// Per-agent configuration
    pub agent_configs: Vec<AgentConfig>,

    /// Opening balance sheets
    pub stock_items: Vec<StockItemConfig>,

    /// Tax collection parameters
    pub fiscal: FiscalConfig,
}

impl OrchestratorConfig {
    /// Parse a configuration from JSON
    pub fn from_json(json: &str) -> Result<Self, SimulationError> {
        serde_json::from_str(json)
            .map_err(|e| SimulationError::SerializationError(format!("Config parse failed: {}", e)))
    }
}

/// Per-agent configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Unique agent identifier
    pub id: String,

    pub role: AgentRole,

    /// Pre-tax profits of the first period
    #[serde(default)]
    pub pre_tax_profits: f64,

    /// Settlement stock type; makes the agent a liability supplier when set
    #[serde(default)]
    pub settlement_type: Option<StockTypeId>,

    /// Tax strategy; only banks and firms may carry one
    #[serde(default)]
    pub tax_strategy: Option<TaxStrategyConfig>,
}

impl AgentConfig {
    pub fn new(id: &str, role: AgentRole) -> Self {
        Self {
            id: id.to_string(),
            role,
            pre_tax_profits: 0.0,
            settlement_type: None,
            tax_strategy: None,
        }
    }

    pub fn with_pre_tax_profits(mut self, profits: f64) -> Self {
        self.pre_tax_profits = profits;
        self
    }

    pub fn with_settlement_type(mut self, settlement_type: StockTypeId) -> Self {
        self.settlement_type = Some(settlement_type);
        self
    }

    pub fn with_tax_strategy(mut self, strategy: TaxStrategyConfig) -> Self {
        self.tax_strategy = Some(strategy);
        self
    }

    fn build_agent(&self) -> Agent {
        let mut agent = match self.settlement_type {
            Some(settlement_type) => Agent::liability_supplier(self.id.clone(), self.role, settlement_type),
            None => Agent::new(self.id.clone(), self.role),
        };
        agent.set_pre_tax_profits(self.pre_tax_profits);
        agent
    }
}

/// Opening stock item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItemConfig {
    pub stock_type: StockTypeId,
    pub asset_holder: String,
    pub liability_holder: String,
    pub value: Decimal,
}

impl StockItemConfig {
    pub fn new(stock_type: StockTypeId, asset_holder: &str, liability_holder: &str, value: Decimal) -> Self {
        Self {
            stock_type,
            asset_holder: asset_holder.to_string(),
            liability_holder: liability_holder.to_string(),
            value,
        }
    }
}

/// Tax collection parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalConfig {
    /// Agent receiving taxes
    pub government_id: String,

    /// Stock type of the government's receiving account
    pub receiving_type: StockTypeId,

    /// Stock type banks pay their taxes from (typically reserves)
    pub bank_paying_type: StockTypeId,

    /// Multiplier applied to all tax rates at the end of each fiscal year
    #[serde(default)]
    pub rate_multiplier: Option<f64>,
}

impl FiscalConfig {
    pub fn new(government_id: &str, receiving_type: StockTypeId, bank_paying_type: StockTypeId) -> Self {
        Self {
            government_id: government_id.to_string(),
            receiving_type,
            bank_paying_type,
            rate_multiplier: None,
        }
    }

    pub fn with_rate_multiplier(mut self, multiplier: f64) -> Self {
        self.rate_multiplier = Some(multiplier);
        self
    }
}

// ============================================================================
// Results and Errors
// ============================================================================

/// Summary of one period
#[derive(Debug, Clone, PartialEq)]
pub struct TickResult {
    pub period: usize,

    /// Payers whose tax was computed
    pub num_assessed: usize,

    /// Payers excused for lack of liquidity
    pub num_waived: usize,

    /// Payers that could not gather their full tax
    pub num_shortfalls: usize,

    /// Sum of taxes owed
    pub taxes_assessed: Decimal,

    /// Sum of taxes paid into the government's account
    pub taxes_collected: Decimal,
}

/// Errors raised by the orchestrator
#[derive(Debug, Error, PartialEq)]
pub enum SimulationError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Agent not found: {0}")]
    AgentNotFound(String),

    #[error("Tax of {agent} is not a finite amount: {amount}")]
    NonFiniteTax { agent: String, amount: f64 },

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("State validation error: {0}")]
    StateValidationError(String),

    #[error("State error: {0}")]
    State(#[from] StateError),

    #[error("Tax error: {0}")]
    Tax(#[from] TaxError),

    #[error("Reallocation error: {0}")]
    Reallocation(#[from] ReallocationError),

    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),
}

// ============================================================================
// Orchestrator
// ============================================================================

pub struct Orchestrator {
    config: OrchestratorConfig,
    state: SimulationState,
    time: TimeManager,

    /// Tax strategies by payer id (sorted for deterministic iteration)
    strategies: BTreeMap<String, Box<dyn TaxPayerStrategy>>,

    event_log: EventLog,
}

impl Orchestrator {
    /// Build a simulation from its configuration
    ///
    /// # Errors
    ///
    /// `InvalidConfig` when agent ids repeat, a tax strategy is attached to an
    /// agent that does not pay profit taxes, or the government has no
    /// receiving account; `State` when an item references an unknown agent.
    pub fn new(config: OrchestratorConfig) -> Result<Self, SimulationError> {
        Self::validate_config(&config)?;

        let agents = config.agent_configs.iter().map(AgentConfig::build_agent).collect();
        let mut state = SimulationState::new(agents);
        for item in &config.stock_items {
            state.open_item(item.stock_type, &item.asset_holder, &item.liability_holder, item.value)?;
        }

        let fiscal = &config.fiscal;
        if state.item_of(&fiscal.government_id, true, fiscal.receiving_type).is_none() {
            return Err(SimulationError::InvalidConfig(format!(
                "Government {} has no receiving account of type {}",
                fiscal.government_id, fiscal.receiving_type
            )));
        }

        let strategies = Self::build_strategies(&config);
        let time = TimeManager::new(config.periods_per_year);

        Ok(Self {
            config,
            state,
            time,
            strategies,
            event_log: EventLog::new(),
        })
    }

    /// Reassemble an orchestrator from restored parts (checkpoint restore)
    pub(crate) fn from_parts(
        config: OrchestratorConfig,
        state: SimulationState,
        time: TimeManager,
        strategies: BTreeMap<String, Box<dyn TaxPayerStrategy>>,
    ) -> Self {
        Self {
            config,
            state,
            time,
            strategies,
            event_log: EventLog::new(),
        }
    }

    pub(crate) fn validate_config(config: &OrchestratorConfig) -> Result<(), SimulationError> {
        if config.periods_per_year == 0 {
            return Err(SimulationError::InvalidConfig(
                "periods_per_year must be positive".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for agent in &config.agent_configs {
            if !seen.insert(agent.id.as_str()) {
                return Err(SimulationError::InvalidConfig(format!(
                    "Duplicate agent id: {}",
                    agent.id
                )));
            }
            if agent.tax_strategy.is_some() && !matches!(agent.role, AgentRole::Bank | AgentRole::Firm) {
                return Err(SimulationError::InvalidConfig(format!(
                    "Agent {} ({:?}) cannot carry a profits tax strategy",
                    agent.id, agent.role
                )));
            }
        }

        if !seen.contains(config.fiscal.government_id.as_str()) {
            return Err(SimulationError::AgentNotFound(config.fiscal.government_id.clone()));
        }

        Ok(())
    }

    pub(crate) fn build_strategies(config: &OrchestratorConfig) -> BTreeMap<String, Box<dyn TaxPayerStrategy>> {
        config
            .agent_configs
            .iter()
            .filter_map(|agent| {
                agent
                    .tax_strategy
                    .as_ref()
                    .map(|strategy| (agent.id.clone(), create_strategy(strategy)))
            })
            .collect()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    /// Mutable state access for the surrounding model (production, markets)
    pub fn state_mut(&mut self) -> &mut SimulationState {
        &mut self.state
    }

    pub fn current_period(&self) -> usize {
        self.time.current_period()
    }

    pub fn time(&self) -> &TimeManager {
        &self.time
    }

    pub fn event_log(&self) -> &EventLog {
        &self.event_log
    }

    pub fn strategy(&self, agent_id: &str) -> Option<&dyn TaxPayerStrategy> {
        self.strategies.get(agent_id).map(|strategy| strategy.as_ref())
    }

    pub(crate) fn strategies(&self) -> &BTreeMap<String, Box<dyn TaxPayerStrategy>> {
        &self.strategies
    }

    /// Record the pre-tax profits of an agent for the current period
    pub fn set_pre_tax_profits(&mut self, agent_id: &str, profits: f64) -> Result<(), SimulationError> {
        self.state
            .get_agent_mut(agent_id)
            .ok_or_else(|| SimulationError::AgentNotFound(agent_id.to_string()))?
            .set_pre_tax_profits(profits);
        Ok(())
    }

    // ========================================================================
    // Period Loop
    // ========================================================================

    /// Run one period of tax collection
    ///
    /// On error the state and event log are restored to how they were before
    /// the call and the period does not advance.
    pub fn tick(&mut self) -> Result<TickResult, SimulationError> {
        let period = self.time.current_period();
        let mut result = TickResult {
            period,
            num_assessed: 0,
            num_waived: 0,
            num_shortfalls: 0,
            taxes_assessed: Decimal::ZERO,
            taxes_collected: Decimal::ZERO,
        };

        // A failed round is rolled back as a whole so it can be retried
        let saved_state = self.state.clone();
        let saved_events = self.event_log.len();

        let payer_ids: Vec<String> = self.strategies.keys().cloned().collect();
        for payer_id in &payer_ids {
            if let Err(err) = self.collect_taxes(payer_id, period, &mut result) {
                warn!("Period {} aborted while collecting from {}: {}", period, payer_id, err);
                self.state = saved_state;
                self.event_log.truncate(saved_events);
                return Err(err);
            }
        }

        if self.time.is_end_of_year() {
            if let Some(multiplier) = self.config.fiscal.rate_multiplier {
                self.update_tax_rates(multiplier);
            }
            self.event_log.log(Event::EndOfYear {
                period,
                year: self.time.current_year(),
            });
        }

        info!(
            "Period {}: {} assessed, {} waived, {} short, collected {} of {}",
            period,
            result.num_assessed,
            result.num_waived,
            result.num_shortfalls,
            result.taxes_collected,
            result.taxes_assessed
        );

        self.time.advance_period();
        Ok(result)
    }

    /// Apply the fiscal feedback multiplier to every strategy
    pub fn update_tax_rates(&mut self, multiplier: f64) {
        for strategy in self.strategies.values_mut() {
            strategy.update_rates(multiplier);
        }
        self.event_log.log(Event::RatesUpdated {
            period: self.time.current_period(),
            multiplier,
            num_strategies: self.strategies.len(),
        });
        info!("Tax rates rescaled by {} for {} payers", multiplier, self.strategies.len());
    }

    fn collect_taxes(
        &mut self,
        payer_id: &str,
        period: usize,
        result: &mut TickResult,
    ) -> Result<(), SimulationError> {
        let strategy = self
            .strategies
            .get(payer_id)
            .ok_or_else(|| SimulationError::AgentNotFound(payer_id.to_string()))?;

        let (due, amount, sources) = {
            let payer = PayerView::new(&self.state, payer_id)?;
            let due = strategy.tax_due(&payer);
            let amount = strategy.compute_taxes(&payer)?;

            let sources = if amount > 0.0 {
                match payer.payer_class() {
                    PayerClass::Bank => self
                        .state
                        .items_of(payer_id, true, self.config.fiscal.bank_paying_type)
                        .iter()
                        .map(|item| item.id())
                        .collect(),
                    PayerClass::NonBank => strategy.paying_stocks(&payer)?,
                }
            } else {
                Vec::new()
            };
            (due, amount, sources)
        };

        result.num_assessed += 1;
        self.event_log.log(Event::TaxAssessed {
            period,
            agent_id: payer_id.to_string(),
            due,
            amount,
        });

        if amount <= 0.0 {
            if due > 0.0 {
                result.num_waived += 1;
                self.event_log.log(Event::TaxWaived {
                    period,
                    agent_id: payer_id.to_string(),
                    due,
                });
            }
            return Ok(());
        }

        let tax = Decimal::from_f64(amount).ok_or_else(|| SimulationError::NonFiniteTax {
            agent: payer_id.to_string(),
            amount,
        })?;
        result.taxes_assessed += tax;

        let collected = match sources.last() {
            Some(&primary) => self.pay_from_primary(payer_id, period, tax, &sources, primary)?,
            None => Decimal::ZERO,
        };
        result.taxes_collected += collected;

        if collected < tax {
            result.num_shortfalls += 1;
            warn!("{} paid {} of {} tax", payer_id, collected, tax);
            self.event_log.log(Event::TaxShortfall {
                period,
                agent_id: payer_id.to_string(),
                required: tax,
                collected,
            });
        }

        Ok(())
    }

    /// Gather `tax` on `primary` and pay what it holds, up to `tax`, to the government
    fn pay_from_primary(
        &mut self,
        payer_id: &str,
        period: usize,
        tax: Decimal,
        sources: &[ItemId],
        primary: ItemId,
    ) -> Result<Decimal, SimulationError> {
        let outcome = reallocate_liquidity(&mut self.state, tax, sources, primary)?;
        for draw in &outcome.draws {
            self.event_log.log(Event::LiquidityDrawn {
                period,
                agent_id: payer_id.to_string(),
                source: draw.source,
                target: primary,
                amount: draw.amount,
            });
        }

        let available = self
            .state
            .item(&primary)
            .ok_or(StateError::ItemNotFound(primary))?
            .value();
        let collected = tax.min(available).max(Decimal::ZERO);
        if collected.is_zero() {
            return Ok(collected);
        }

        let fiscal = &self.config.fiscal;
        let receiver = self
            .state
            .item_of(&fiscal.government_id, true, fiscal.receiving_type)
            .ok_or_else(|| {
                SimulationError::InvalidConfig(format!(
                    "Government {} has no receiving account of type {}",
                    fiscal.government_id, fiscal.receiving_type
                ))
            })?
            .id();
        let receiver_id = fiscal.government_id.clone();

        self.state.transfer_through_issuer(primary, receiver, collected)?;
        self.event_log.log(Event::TaxPaid {
            period,
            agent_id: payer_id.to_string(),
            receiver_id,
            amount: collected,
        });

        Ok(collected)
    }
}
