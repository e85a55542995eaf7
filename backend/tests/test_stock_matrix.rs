//! Tests for the stock-flow matrix: ledger lookups and balance-sheet totals

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use stockflow_core_rs::models::StateError;
use stockflow_core_rs::{Agent, AgentRole, SimulationState, StockItem};

const DEPOSIT: u32 = 1;
const CASH: u32 = 2;
const RESERVES: u32 = 3;

fn economy() -> SimulationState {
    SimulationState::new(vec![
        Agent::liability_supplier("CB".to_string(), AgentRole::CentralBank, CASH),
        Agent::liability_supplier("BANK_A".to_string(), AgentRole::Bank, RESERVES),
        Agent::liability_supplier("BANK_B".to_string(), AgentRole::Bank, RESERVES),
        Agent::new("FIRM_1".to_string(), AgentRole::Firm),
        Agent::new("HH_1".to_string(), AgentRole::Household),
    ])
}

#[test]
fn test_items_of_preserves_insertion_order() {
    let mut state = economy();
    let first = state.open_item(DEPOSIT, "FIRM_1", "BANK_B", dec!(10)).unwrap();
    state.open_item(CASH, "FIRM_1", "CB", dec!(5)).unwrap();
    let second = state.open_item(DEPOSIT, "FIRM_1", "BANK_A", dec!(20)).unwrap();

    let deposits: Vec<_> = state
        .items_of("FIRM_1", true, DEPOSIT)
        .iter()
        .map(|item| item.id())
        .collect();
    assert_eq!(deposits, vec![first, second]);
    assert_eq!(state.item_of("FIRM_1", true, DEPOSIT).unwrap().id(), first);
}

#[test]
fn test_items_of_liability_side() {
    let mut state = economy();
    state.open_item(DEPOSIT, "FIRM_1", "BANK_A", dec!(10)).unwrap();
    state.open_item(DEPOSIT, "HH_1", "BANK_A", dec!(30)).unwrap();
    state.open_item(DEPOSIT, "HH_1", "BANK_B", dec!(7)).unwrap();

    let issued = state.items_of("BANK_A", false, DEPOSIT);
    assert_eq!(issued.len(), 2);
    assert!(issued.iter().all(|item| item.liability_holder() == "BANK_A"));

    // Nothing held on the asset side
    assert!(state.item_of("BANK_A", true, DEPOSIT).is_none());
}

#[test]
fn test_net_worth_sums_to_zero() {
    let mut state = economy();
    state.open_item(RESERVES, "BANK_A", "CB", dec!(1000)).unwrap();
    state.open_item(DEPOSIT, "FIRM_1", "BANK_A", dec!(400.25)).unwrap();
    state.open_item(CASH, "HH_1", "CB", dec!(12.5)).unwrap();

    assert_eq!(state.net_wealth("BANK_A"), dec!(599.75));
    assert_eq!(state.net_wealth("CB"), dec!(-1012.5));
    assert_eq!(state.total_net_worth(), Decimal::ZERO);
}

#[test]
fn test_insert_item_rejects_duplicate_id() {
    let mut state = economy();
    let item = StockItem::new(DEPOSIT, "FIRM_1".to_string(), "BANK_A".to_string(), dec!(1));
    state.insert_item(item.clone()).unwrap();

    assert!(matches!(state.insert_item(item), Err(StateError::Ledger(_))));
}

#[test]
fn test_open_item_rejects_unknown_holder() {
    let mut state = economy();
    let result = state.open_item(DEPOSIT, "FIRM_9", "BANK_A", dec!(1));
    assert_eq!(result, Err(StateError::AgentNotFound("FIRM_9".to_string())));
    assert!(state.ledger().is_empty());
}
