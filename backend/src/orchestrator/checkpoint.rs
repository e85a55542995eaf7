//! Checkpoint - Save/Load Simulation State
//!
//! Enables serialization and deserialization of complete orchestrator state
//! for pause/resume functionality.
//!
//! # Critical Invariants
//!
//! - **Config Matching**: State can only be loaded with matching config
//! - **Referential Integrity**: Every item's holder and issuer is a snapshot agent
//! - **Item Uniqueness**: No item id appears twice
//! - **Strategy Records**: Every record carries at least the 16-byte rate payload
//!
//! Strategy rates travel as their codec record; bounds and liquid asset types
//! come from the config the snapshot is restored over.

use crate::core::time::TimeManager;
use crate::models::agent::{Agent, AgentRole};
use crate::models::state::SimulationState;
use crate::models::stock::{ItemId, StockItem, StockTypeId};
use crate::orchestrator::engine::{Orchestrator, OrchestratorConfig, SimulationError};
use crate::policy::codec::PAYLOAD_LEN;
use crate::settlement::SupplierProfile;
use log::info;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;

// ============================================================================
// Snapshot Structures
// ============================================================================

/// Complete orchestrator state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Period the restored simulation resumes at
    pub current_period: usize,

    pub agents: Vec<AgentSnapshot>,

    /// All stock items, in ledger insertion order
    pub items: Vec<StockItemSnapshot>,

    /// Encoded strategy records, sorted by agent id
    pub strategies: Vec<StrategySnapshot>,

    /// SHA256 hash of original config (for validation)
    pub config_hash: String,
}

/// Agent state snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: String,
    pub role: AgentRole,
    pub pre_tax_profits: f64,
    pub supplier: Option<SupplierProfile>,
}

impl From<&Agent> for AgentSnapshot {
    fn from(agent: &Agent) -> Self {
        AgentSnapshot {
            id: agent.id().to_string(),
            role: agent.role(),
            pre_tax_profits: agent.pre_tax_profits(),
            supplier: agent.supplier().cloned(),
        }
    }
}

impl From<AgentSnapshot> for Agent {
    fn from(snapshot: AgentSnapshot) -> Self {
        Agent::from_snapshot(
            snapshot.id,
            snapshot.role,
            snapshot.pre_tax_profits,
            snapshot.supplier,
        )
    }
}

/// Stock item snapshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItemSnapshot {
    pub id: ItemId,
    pub stock_type: StockTypeId,
    pub asset_holder: String,
    pub liability_holder: String,
    pub value: Decimal,
}

impl From<&StockItem> for StockItemSnapshot {
    fn from(item: &StockItem) -> Self {
        StockItemSnapshot {
            id: item.id(),
            stock_type: item.stock_type(),
            asset_holder: item.asset_holder().to_string(),
            liability_holder: item.liability_holder().to_string(),
            value: item.value(),
        }
    }
}

impl From<StockItemSnapshot> for StockItem {
    fn from(snapshot: StockItemSnapshot) -> Self {
        StockItem::with_id(
            snapshot.id,
            snapshot.stock_type,
            snapshot.asset_holder,
            snapshot.liability_holder,
            snapshot.value,
        )
    }
}

/// Encoded strategy record of one payer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategySnapshot {
    pub agent_id: String,
    pub bytes: Vec<u8>,
}

// ============================================================================
// Config Hashing
// ============================================================================

/// Compute deterministic SHA256 hash of config
///
/// Uses canonical JSON serialization with sorted keys to ensure
/// deterministic hashing regardless of map iteration order.
pub fn compute_config_hash<T: Serialize>(config: &T) -> Result<String, SimulationError> {
    use serde_json::Value;
    use std::collections::BTreeMap;

    let value = serde_json::to_value(config).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    // Recursively sort all object keys for canonical representation
    fn canonicalize(value: Value) -> Value {
        match value {
            Value::Object(map) => {
                let sorted: BTreeMap<String, Value> =
                    map.into_iter().map(|(k, v)| (k, canonicalize(v))).collect();
                Value::Object(sorted.into_iter().collect())
            }
            Value::Array(arr) => Value::Array(arr.into_iter().map(canonicalize).collect()),
            other => other,
        }
    }

    let json = serde_json::to_string(&canonicalize(value)).map_err(|e| {
        SimulationError::SerializationError(format!("Config serialization failed: {}", e))
    })?;

    let mut hasher = Sha256::new();
    hasher.update(json.as_bytes());
    Ok(format!("{:x}", hasher.finalize()))
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Validate state snapshot integrity
///
/// Checks critical invariants:
/// - Agent id uniqueness
/// - Item referential integrity and id uniqueness
/// - Strategy records belong to known agents and are long enough to decode
pub fn validate_snapshot(snapshot: &StateSnapshot) -> Result<(), SimulationError> {
    let mut agent_ids = HashSet::new();
    for agent in &snapshot.agents {
        if !agent_ids.insert(agent.id.as_str()) {
            return Err(SimulationError::StateValidationError(format!(
                "Duplicate agent {}",
                agent.id
            )));
        }
    }

    let mut item_ids = HashSet::new();
    for item in &snapshot.items {
        if !item_ids.insert(item.id) {
            return Err(SimulationError::StateValidationError(format!(
                "Duplicate stock item {}",
                item.id
            )));
        }
        for holder in [&item.asset_holder, &item.liability_holder] {
            if !agent_ids.contains(holder.as_str()) {
                return Err(SimulationError::StateValidationError(format!(
                    "Stock item {} references unknown agent {}",
                    item.id, holder
                )));
            }
        }
    }

    for strategy in &snapshot.strategies {
        if !agent_ids.contains(strategy.agent_id.as_str()) {
            return Err(SimulationError::StateValidationError(format!(
                "Strategy record for unknown agent {}",
                strategy.agent_id
            )));
        }
        if strategy.bytes.len() < PAYLOAD_LEN {
            return Err(SimulationError::StateValidationError(format!(
                "Strategy record of {} has {} bytes, expected at least {}",
                strategy.agent_id,
                strategy.bytes.len(),
                PAYLOAD_LEN
            )));
        }
    }

    Ok(())
}

// ============================================================================
// Orchestrator Save/Load
// ============================================================================

impl Orchestrator {
    /// Capture the current state as a snapshot
    pub fn snapshot(&self) -> Result<StateSnapshot, SimulationError> {
        let state = self.state();

        let agents = state
            .agent_ids()
            .iter()
            .filter_map(|id| state.get_agent(id))
            .map(AgentSnapshot::from)
            .collect();
        let items = state.ledger().iter().map(StockItemSnapshot::from).collect();
        let strategies = self
            .strategies()
            .iter()
            .map(|(agent_id, strategy)| StrategySnapshot {
                agent_id: agent_id.clone(),
                bytes: strategy.encode(),
            })
            .collect();

        Ok(StateSnapshot {
            current_period: self.current_period(),
            agents,
            items,
            strategies,
            config_hash: compute_config_hash(self.config())?,
        })
    }

    /// Serialize the current state to JSON
    pub fn save_state(&self) -> Result<String, SimulationError> {
        let snapshot = self.snapshot()?;
        serde_json::to_string(&snapshot)
            .map_err(|e| SimulationError::SerializationError(format!("Snapshot serialization failed: {}", e)))
    }

    /// Restore an orchestrator from a JSON snapshot taken with the same config
    ///
    /// # Errors
    ///
    /// - `StateValidationError` on a config hash mismatch or a snapshot that
    ///   breaks an integrity invariant
    /// - `SerializationError` on malformed JSON
    pub fn load_state(config: OrchestratorConfig, json: &str) -> Result<Self, SimulationError> {
        let snapshot: StateSnapshot = serde_json::from_str(json)
            .map_err(|e| SimulationError::SerializationError(format!("Snapshot parse failed: {}", e)))?;
        Self::restore(config, snapshot)
    }

    /// Restore an orchestrator from a snapshot taken with the same config
    pub fn restore(config: OrchestratorConfig, snapshot: StateSnapshot) -> Result<Self, SimulationError> {
        Self::validate_config(&config)?;

        let config_hash = compute_config_hash(&config)?;
        if config_hash != snapshot.config_hash {
            return Err(SimulationError::StateValidationError(format!(
                "Config hash mismatch: snapshot {}, config {}",
                snapshot.config_hash, config_hash
            )));
        }
        validate_snapshot(&snapshot)?;

        let agents = snapshot.agents.into_iter().map(Agent::from).collect();
        let mut state = SimulationState::new(agents);
        for item in snapshot.items {
            state.insert_item(StockItem::from(item))?;
        }

        let mut strategies = Self::build_strategies(&config);
        for record in &snapshot.strategies {
            let strategy = strategies.get_mut(&record.agent_id).ok_or_else(|| {
                SimulationError::StateValidationError(format!(
                    "Agent {} has no configured tax strategy",
                    record.agent_id
                ))
            })?;
            strategy.decode(&record.bytes, &state)?;
        }

        let time = TimeManager::at_period(config.periods_per_year, snapshot.current_period);
        info!(
            "Restored checkpoint at period {} ({} agents, {} items)",
            snapshot.current_period,
            state.num_agents(),
            state.ledger().len()
        );

        Ok(Self::from_parts(config, state, time, strategies))
    }
}
