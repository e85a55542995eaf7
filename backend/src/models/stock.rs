//! Stock item model
//!
//! A stock item is one entry of the stock-flow matrix. The same item appears
//! twice in the accounts:
//! - as an **asset** on the balance sheet of its `asset_holder`
//! - as a **liability** on the balance sheet of its `liability_holder` (issuer)
//!
//! Values are `Decimal` so that repeated transfers across thousands of periods
//! do not drift at the cent level.
//!
//! CRITICAL: `value` is only mutated through the issuer's transfer
//! (see `settlement::supplier`). The setters here are crate-private.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Stock type identifier (deposits, cash, reserves, ...)
///
/// The meaning of each id is defined by the model configuration, not by
/// this crate.
pub type StockTypeId = u32;

/// Unique identifier of a stock item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Generate a fresh random id
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing uuid (used when restoring checkpoints)
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single balance-sheet entry
///
/// # Example
/// ```
/// use stockflow_core_rs::StockItem;
/// use rust_decimal::Decimal;
///
/// let deposit = StockItem::new(1, "FIRM_1".to_string(), "BANK_A".to_string(), Decimal::new(500, 0));
/// assert_eq!(deposit.asset_holder(), "FIRM_1");
/// assert_eq!(deposit.liability_holder(), "BANK_A");
/// assert_eq!(deposit.value(), Decimal::new(500, 0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    id: ItemId,

    /// Type of instrument (deposit, cash, reserves, ...)
    stock_type: StockTypeId,

    /// Agent holding the item on the asset side
    asset_holder: String,

    /// Agent that issued the item (liability side)
    liability_holder: String,

    value: Decimal,
}

impl StockItem {
    /// Create a new item with a freshly generated id
    pub fn new(
        stock_type: StockTypeId,
        asset_holder: String,
        liability_holder: String,
        value: Decimal,
    ) -> Self {
        Self::with_id(ItemId::new(), stock_type, asset_holder, liability_holder, value)
    }

    /// Create an item with a known id (checkpoint restore)
    pub fn with_id(
        id: ItemId,
        stock_type: StockTypeId,
        asset_holder: String,
        liability_holder: String,
        value: Decimal,
    ) -> Self {
        Self {
            id,
            stock_type,
            asset_holder,
            liability_holder,
            value,
        }
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn stock_type(&self) -> StockTypeId {
        self.stock_type
    }

    pub fn asset_holder(&self) -> &str {
        &self.asset_holder
    }

    pub fn liability_holder(&self) -> &str {
        &self.liability_holder
    }

    pub fn value(&self) -> Decimal {
        self.value
    }

    /// True if `agent_id` holds this item on either side of its balance sheet
    pub fn involves(&self, agent_id: &str) -> bool {
        self.asset_holder == agent_id || self.liability_holder == agent_id
    }

    pub(crate) fn increase(&mut self, amount: Decimal) {
        self.value += amount;
    }

    pub(crate) fn decrease(&mut self, amount: Decimal) {
        self.value -= amount;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_ids_are_unique() {
        let a = StockItem::new(1, "H".to_string(), "B".to_string(), Decimal::ZERO);
        let b = StockItem::new(1, "H".to_string(), "B".to_string(), Decimal::ZERO);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_increase_and_decrease() {
        let mut item = StockItem::new(1, "H".to_string(), "B".to_string(), Decimal::new(100, 0));
        item.increase(Decimal::new(25, 1));
        assert_eq!(item.value(), Decimal::new(1025, 1));
        item.decrease(Decimal::new(1025, 1));
        assert_eq!(item.value(), Decimal::ZERO);
    }

    #[test]
    fn test_involves_both_sides() {
        let item = StockItem::new(2, "FIRM".to_string(), "BANK".to_string(), Decimal::ONE);
        assert!(item.involves("FIRM"));
        assert!(item.involves("BANK"));
        assert!(!item.involves("GOV"));
    }
}
