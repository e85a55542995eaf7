//! Liability suppliers
//!
//! A liability supplier is an agent that issues an instrument (deposits,
//! cash, reserves) and can move value between two instances of it.
//!
//! # Transfer Flow
//!
//! ```text
//! source (issued by S)  ──amount──▶  target (issued by T)
//!          │                                  │
//!          └── if S != T: S hands the settlement medium to T
//!              (bank: reserves at the central bank, central bank: cash)
//! ```
//!
//! # Critical Invariants
//!
//! - **Exact Amount**: the supplier moves exactly the requested amount
//! - **Issuer Conservation**: every agent other than the source holder and the
//!   target holder keeps its net worth unchanged
//! - **Atomicity**: validation happens before any item is touched

use crate::models::ledger::StockLedger;
use crate::models::stock::{ItemId, StockTypeId};
use log::debug;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur during a supplier transfer
#[derive(Debug, Error, PartialEq)]
pub enum TransferError {
    #[error("Transfer amount must be non-negative, got {0}")]
    NegativeAmount(Decimal),

    #[error("Stock item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("Agent {supplier} did not issue stock item {item}")]
    NotIssuer { supplier: String, item: ItemId },

    #[error("Insufficient funds on {item}: required {required}, available {available}")]
    InsufficientFunds {
        item: ItemId,
        required: Decimal,
        available: Decimal,
    },

    #[error("Agent {agent} holds no settlement account of type {stock_type} issued by {issuer}")]
    MissingSettlementAccount {
        agent: String,
        issuer: String,
        stock_type: StockTypeId,
    },
}

/// Capability of an issuing agent to move value between items it issues
pub trait LiabilitySupplier {
    /// Check that `transfer` would succeed, without touching the ledger
    fn validate_transfer(
        &self,
        ledger: &StockLedger,
        source: ItemId,
        target: ItemId,
        amount: Decimal,
    ) -> Result<(), TransferError>;

    /// Move `amount` from `source` (issued by this supplier) to `target`
    fn transfer(
        &mut self,
        ledger: &mut StockLedger,
        source: ItemId,
        target: ItemId,
        amount: Decimal,
    ) -> Result<(), TransferError>;
}

/// Issuer state attached to an agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierProfile {
    issuer_id: String,

    /// Stock type handed to other issuers when value leaves this issuer's books
    settlement_type: StockTypeId,

    transfers_executed: usize,
    volume_transferred: Decimal,
}

impl SupplierProfile {
    pub fn new(issuer_id: String, settlement_type: StockTypeId) -> Self {
        Self {
            issuer_id,
            settlement_type,
            transfers_executed: 0,
            volume_transferred: Decimal::ZERO,
        }
    }

    pub fn issuer_id(&self) -> &str {
        &self.issuer_id
    }

    pub fn settlement_type(&self) -> StockTypeId {
        self.settlement_type
    }

    pub fn transfers_executed(&self) -> usize {
        self.transfers_executed
    }

    pub fn volume_transferred(&self) -> Decimal {
        self.volume_transferred
    }

    /// Resolve the settlement legs for a transfer towards `target_issuer`
    ///
    /// Returns the item to debit on this issuer's side (None when this issuer
    /// creates the medium itself) and the item to credit on the target
    /// issuer's side (None when the target issuer is the medium's issuer).
    fn settlement_legs(
        &self,
        ledger: &StockLedger,
        target_issuer: &str,
    ) -> Result<(Option<ItemId>, Option<ItemId>), TransferError> {
        let debit = ledger.item_of(&self.issuer_id, true, self.settlement_type);
        let medium_issuer = debit
            .map(|item| item.liability_holder().to_string())
            .unwrap_or_else(|| self.issuer_id.clone());

        let credit = if target_issuer == medium_issuer {
            None
        } else {
            let item = ledger
                .asset_issued_by(target_issuer, &medium_issuer, self.settlement_type)
                .ok_or_else(|| TransferError::MissingSettlementAccount {
                    agent: target_issuer.to_string(),
                    issuer: medium_issuer.clone(),
                    stock_type: self.settlement_type,
                })?;
            Some(item.id())
        };

        Ok((debit.map(|item| item.id()), credit))
    }

    /// Validate a transfer and resolve its settlement legs
    ///
    /// Returns the target issuer and the `(debit, credit)` legs.
    fn plan_transfer(
        &self,
        ledger: &StockLedger,
        source: ItemId,
        target: ItemId,
        amount: Decimal,
    ) -> Result<(String, (Option<ItemId>, Option<ItemId>)), TransferError> {
        if amount < Decimal::ZERO {
            return Err(TransferError::NegativeAmount(amount));
        }

        let source_item = ledger.get(&source).ok_or(TransferError::ItemNotFound(source))?;
        if source_item.liability_holder() != self.issuer_id {
            return Err(TransferError::NotIssuer {
                supplier: self.issuer_id.clone(),
                item: source,
            });
        }
        if source_item.value() < amount {
            return Err(TransferError::InsufficientFunds {
                item: source,
                required: amount,
                available: source_item.value(),
            });
        }

        let target_issuer = ledger
            .get(&target)
            .ok_or(TransferError::ItemNotFound(target))?
            .liability_holder()
            .to_string();

        let legs = if target_issuer == self.issuer_id {
            (None, None)
        } else {
            self.settlement_legs(ledger, &target_issuer)?
        };

        Ok((target_issuer, legs))
    }
}

impl LiabilitySupplier for SupplierProfile {
    fn validate_transfer(
        &self,
        ledger: &StockLedger,
        source: ItemId,
        target: ItemId,
        amount: Decimal,
    ) -> Result<(), TransferError> {
        self.plan_transfer(ledger, source, target, amount).map(|_| ())
    }

    fn transfer(
        &mut self,
        ledger: &mut StockLedger,
        source: ItemId,
        target: ItemId,
        amount: Decimal,
    ) -> Result<(), TransferError> {
        let (target_issuer, legs) = self.plan_transfer(ledger, source, target, amount)?;

        // All lookups validated above; mutations below cannot fail
        if let Some(item) = ledger.get_mut(&source) {
            item.decrease(amount);
        }
        if let Some(item) = ledger.get_mut(&target) {
            item.increase(amount);
        }
        if let Some(item) = legs.0.and_then(|id| ledger.get_mut(&id)) {
            item.decrease(amount);
        }
        if let Some(item) = legs.1.and_then(|id| ledger.get_mut(&id)) {
            item.increase(amount);
        }

        self.transfers_executed += 1;
        self.volume_transferred += amount;

        debug!(
            "{} transferred {} from {} to {} (target issuer {})",
            self.issuer_id, amount, source, target, target_issuer
        );

        Ok(())
    }
}
