//! Stock ledger
//!
//! Storage for every stock item of the simulation, with the holder/issuer
//! lookups that strategies use to find an agent's accounts.
//!
//! # Critical Invariants
//!
//! 1. **Item Uniqueness**: each `ItemId` appears exactly once
//! 2. **Deterministic Order**: lookups return items in insertion order, so
//!    strategies that build draw priorities from them are reproducible
//! 3. **Double Entry**: each item counts once as an asset (holder) and once as
//!    a liability (issuer); the system-wide sum of net worth is always zero

use crate::models::stock::{ItemId, StockItem, StockTypeId};
use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised when building the ledger
#[derive(Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error("Stock item {0} already exists")]
    DuplicateItem(ItemId),
}

#[derive(Debug, Clone, Default)]
pub struct StockLedger {
    items: HashMap<ItemId, StockItem>,
    order: Vec<ItemId>,
}

impl StockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an item to the ledger
    pub fn insert(&mut self, item: StockItem) -> Result<ItemId, LedgerError> {
        let id = item.id();
        if self.items.contains_key(&id) {
            return Err(LedgerError::DuplicateItem(id));
        }
        self.items.insert(id, item);
        self.order.push(id);
        Ok(id)
    }

    pub fn get(&self, id: &ItemId) -> Option<&StockItem> {
        self.items.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: &ItemId) -> Option<&mut StockItem> {
        self.items.get_mut(id)
    }

    pub fn contains(&self, id: &ItemId) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// All items in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &StockItem> + '_ {
        self.order.iter().filter_map(move |id| self.items.get(id))
    }

    /// All items of `stock_type` on one side of `agent_id`'s balance sheet
    ///
    /// `is_asset = true` selects items the agent holds, `false` selects items
    /// the agent issued.
    pub fn items_of(&self, agent_id: &str, is_asset: bool, stock_type: StockTypeId) -> Vec<&StockItem> {
        self.iter()
            .filter(|item| item.stock_type() == stock_type && Self::on_side(item, agent_id, is_asset))
            .collect()
    }

    /// First item of `stock_type` on one side of `agent_id`'s balance sheet
    pub fn item_of(&self, agent_id: &str, is_asset: bool, stock_type: StockTypeId) -> Option<&StockItem> {
        self.iter()
            .find(|item| item.stock_type() == stock_type && Self::on_side(item, agent_id, is_asset))
    }

    /// First asset item of `stock_type` held by `holder` and issued by `issuer`
    pub fn asset_issued_by(
        &self,
        holder: &str,
        issuer: &str,
        stock_type: StockTypeId,
    ) -> Option<&StockItem> {
        self.iter().find(|item| {
            item.stock_type() == stock_type
                && item.asset_holder() == holder
                && item.liability_holder() == issuer
        })
    }

    pub fn total_assets(&self, agent_id: &str) -> Decimal {
        self.iter()
            .filter(|item| item.asset_holder() == agent_id)
            .map(StockItem::value)
            .sum()
    }

    pub fn total_liabilities(&self, agent_id: &str) -> Decimal {
        self.iter()
            .filter(|item| item.liability_holder() == agent_id)
            .map(StockItem::value)
            .sum()
    }

    /// Assets minus liabilities
    pub fn net_worth(&self, agent_id: &str) -> Decimal {
        self.total_assets(agent_id) - self.total_liabilities(agent_id)
    }

    fn on_side(item: &StockItem, agent_id: &str, is_asset: bool) -> bool {
        if is_asset {
            item.asset_holder() == agent_id
        } else {
            item.liability_holder() == agent_id
        }
    }
}
