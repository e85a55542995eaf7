//! Liquidity Reallocation Engine
//!
//! Gathers liquidity from an ordered list of source items into a target item
//! until the target holds the required amount.
//!
//! # Draw Rule
//!
//! ```text
//! raised = target.value
//! for source in sources (stop once raised >= amount):
//!     skip source == target
//!     remaining = max(0, source.value + raised - amount)   // stays on source
//!     drawn     = source.value - remaining                 // moves to target
//!     raised   += drawn
//!     issuer(source).transfer(source, target, drawn)       // when drawn > 0
//! ```
//!
//! The engine decides **how much** to move and **from where**. The balancing
//! entries on the issuers' books are left to each issuer's
//! `LiabilitySupplier::transfer`.
//!
//! # Critical Invariants
//!
//! - **No Overdraw**: total drawn never exceeds `amount - initial target value`
//! - **Conservation**: final target value is `min(amount, target + sum(sources))`
//! - **Order Sensitivity**: earlier sources are drained first
//! - **Partial Fulfillment**: running out of sources is not an error; the
//!   outcome reports the shortfall
//! - **All or Nothing**: a draw that cannot settle aborts the call before any
//!   value moves

use crate::models::state::{SimulationState, StateError};
use crate::models::stock::ItemId;
use log::{debug, warn};
use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;

/// Errors that can occur during reallocation
#[derive(Debug, Error, PartialEq)]
pub enum ReallocationError {
    #[error("Reallocation amount must be non-negative, got {0}")]
    InvalidAmount(Decimal),

    #[error("Stock item not found: {0}")]
    ItemNotFound(ItemId),

    #[error("State error: {0}")]
    State(#[from] StateError),
}

/// A single draw executed by the engine
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutedDraw {
    pub source: ItemId,
    pub amount: Decimal,
}

/// What a reallocation call did
#[derive(Debug, Clone, PartialEq)]
pub struct ReallocationOutcome {
    /// Draws in execution order
    pub draws: Vec<ExecutedDraw>,

    /// Value gathered on the target (initial value plus draws)
    pub raised: Decimal,

    /// `amount - raised` when the sources ran dry, zero otherwise
    pub shortfall: Decimal,
}

impl ReallocationOutcome {
    pub fn total_drawn(&self) -> Decimal {
        self.draws.iter().map(|draw| draw.amount).sum()
    }

    pub fn is_fully_funded(&self) -> bool {
        self.shortfall.is_zero()
    }
}

/// Portion of `available` needed to bring `raised` up to `amount`
///
/// Non-positive sources contribute nothing.
pub fn draw_amount(available: Decimal, raised: Decimal, amount: Decimal) -> Decimal {
    let remaining = (available + raised - amount).max(Decimal::ZERO);
    (available - remaining).max(Decimal::ZERO)
}

/// Apply the draw rule to current balances without moving anything
fn plan_draws(
    state: &SimulationState,
    amount: Decimal,
    sources: &[ItemId],
    target: ItemId,
    initial: Decimal,
) -> Result<Vec<ExecutedDraw>, ReallocationError> {
    let mut raised = initial;
    let mut planned: HashMap<ItemId, Decimal> = HashMap::new();
    let mut draws = Vec::new();

    for &source in sources {
        if raised >= amount {
            break;
        }
        if source == target {
            continue;
        }

        let value = state
            .item(&source)
            .ok_or(ReallocationError::ItemNotFound(source))?
            .value();
        let already = planned.get(&source).copied().unwrap_or(Decimal::ZERO);
        let drawn = draw_amount(value - already, raised, amount);
        if drawn.is_zero() {
            continue;
        }

        *planned.entry(source).or_insert(Decimal::ZERO) += drawn;
        raised += drawn;
        draws.push(ExecutedDraw { source, amount: drawn });
    }

    Ok(draws)
}

/// Reallocate liquidity from `sources` into `target`
///
/// # Arguments
///
/// * `state` - Simulation state holding the items and their issuers
/// * `amount` - Value the target must hold after the call
/// * `sources` - Candidate items, in draw priority order (may contain `target`)
/// * `target` - Item receiving the liquidity
///
/// # Returns
///
/// - `Ok(ReallocationOutcome)` describing the draws, including partial funding
/// - `Err(ReallocationError)` on a negative amount, an unknown item, or a
///   source whose issuer cannot transfer. All draws are checked first, so an
///   error leaves every item untouched.
///
/// # Example
///
/// ```rust
/// use stockflow_core_rs::{Agent, AgentRole, SimulationState};
/// use stockflow_core_rs::settlement::reallocate_liquidity;
/// use rust_decimal::Decimal;
///
/// let mut state = SimulationState::new(vec![
///     Agent::new("FIRM_1".to_string(), AgentRole::Firm),
///     Agent::liability_supplier("BANK_A".to_string(), AgentRole::Bank, 3),
/// ]);
/// let target = state.open_item(1, "FIRM_1", "BANK_A", Decimal::from(20)).unwrap();
/// let a = state.open_item(1, "FIRM_1", "BANK_A", Decimal::from(50)).unwrap();
/// let b = state.open_item(1, "FIRM_1", "BANK_A", Decimal::from(60)).unwrap();
///
/// let outcome = reallocate_liquidity(&mut state, Decimal::from(100), &[a, b], target).unwrap();
/// assert!(outcome.is_fully_funded());
/// assert_eq!(state.item(&target).unwrap().value(), Decimal::from(100));
/// assert_eq!(state.item(&a).unwrap().value(), Decimal::ZERO);
/// assert_eq!(state.item(&b).unwrap().value(), Decimal::from(30));
/// ```
pub fn reallocate_liquidity(
    state: &mut SimulationState,
    amount: Decimal,
    sources: &[ItemId],
    target: ItemId,
) -> Result<ReallocationOutcome, ReallocationError> {
    if amount < Decimal::ZERO {
        return Err(ReallocationError::InvalidAmount(amount));
    }

    let initial = state
        .item(&target)
        .ok_or(ReallocationError::ItemNotFound(target))?
        .value();

    let draws = plan_draws(state, amount, sources, target, initial)?;

    // Every leg must resolve before the first one moves value
    for draw in &draws {
        state.check_transfer_through_issuer(draw.source, target, draw.amount)?;
    }

    let mut raised = initial;
    for draw in &draws {
        state.transfer_through_issuer(draw.source, target, draw.amount)?;
        raised += draw.amount;
        debug!(
            "Drew {} from {} into {} (raised {}/{})",
            draw.amount, draw.source, target, raised, amount
        );
    }

    let shortfall = (amount - raised).max(Decimal::ZERO);
    if !shortfall.is_zero() {
        warn!(
            "Sources exhausted: target {} raised {} of {} (short {})",
            target, raised, amount, shortfall
        );
    }

    Ok(ReallocationOutcome {
        draws,
        raised,
        shortfall,
    })
}
