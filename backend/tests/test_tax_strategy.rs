//! Tests for the profits and wealth tax strategy
//!
//! Covers:
//! - Bank payers: floor at zero, no liquidity check
//! - Non-bank payers: strict waiver boundary
//! - Liquid asset ordering (paying stocks)
//! - Fiscal feedback rule and its clamp asymmetry

use rust_decimal_macros::dec;
use stockflow_core_rs::policy::{
    PayerView, ProfitsWealthTaxStrategy, TaxError, TaxPayer, TaxPayerStrategy,
};
use stockflow_core_rs::{Agent, AgentRole, ItemId, PayerClass, SimulationState};

const DEPOSIT: u32 = 1;
const CASH: u32 = 2;
const RESERVES: u32 = 3;
const BONDS: u32 = 4;

fn firm_strategy(wealth_tax_rate: f64, profit_tax_rate: f64) -> ProfitsWealthTaxStrategy {
    ProfitsWealthTaxStrategy::new(wealth_tax_rate, profit_tax_rate, 0.5, 0.1, [DEPOSIT, CASH, BONDS])
}

fn economy() -> SimulationState {
    SimulationState::new(vec![
        Agent::liability_supplier("CB".to_string(), AgentRole::CentralBank, CASH),
        Agent::liability_supplier("BANK_A".to_string(), AgentRole::Bank, RESERVES),
        Agent::new("GOV".to_string(), AgentRole::Government),
        Agent::new("FIRM_1".to_string(), AgentRole::Firm),
        Agent::new("HH_1".to_string(), AgentRole::Household),
    ])
}

/// FIRM_1 holds 60 in deposits, 30 in cash and 10 in bonds (liquidity 100)
fn liquid_firm(state: &mut SimulationState) -> (ItemId, ItemId, ItemId, ItemId) {
    let d1 = state.open_item(DEPOSIT, "FIRM_1", "BANK_A", dec!(25)).unwrap();
    let d2 = state.open_item(DEPOSIT, "FIRM_1", "BANK_A", dec!(35)).unwrap();
    let cash = state.open_item(CASH, "FIRM_1", "CB", dec!(30)).unwrap();
    let bond = state.open_item(BONDS, "FIRM_1", "GOV", dec!(10)).unwrap();
    (d1, d2, cash, bond)
}

fn set_profits(state: &mut SimulationState, agent_id: &str, profits: f64) {
    state.get_agent_mut(agent_id).unwrap().set_pre_tax_profits(profits);
}

// ============================================================================
// Non-bank payers
// ============================================================================

#[test]
fn test_due_equal_to_liquidity_is_taxed() {
    let mut state = economy();
    liquid_firm(&mut state);
    set_profits(&mut state, "FIRM_1", 200.0);

    let payer = PayerView::new(&state, "FIRM_1").unwrap();
    let strategy = firm_strategy(0.0, 0.5);

    assert_eq!(strategy.tax_due(&payer), 100.0);
    assert_eq!(strategy.compute_taxes(&payer), Ok(100.0));
}

#[test]
fn test_due_above_liquidity_is_waived() {
    let mut state = economy();
    liquid_firm(&mut state);
    set_profits(&mut state, "FIRM_1", 202.0);

    let payer = PayerView::new(&state, "FIRM_1").unwrap();
    let strategy = firm_strategy(0.0, 0.5);

    assert_eq!(strategy.tax_due(&payer), 101.0);
    assert_eq!(strategy.compute_taxes(&payer), Ok(0.0));
}

#[test]
fn test_negative_due_floors_at_zero() {
    let mut state = economy();
    liquid_firm(&mut state);
    set_profits(&mut state, "FIRM_1", -500.0);

    let payer = PayerView::new(&state, "FIRM_1").unwrap();
    assert_eq!(firm_strategy(0.0, 0.2).compute_taxes(&payer), Ok(0.0));
}

#[test]
fn test_wealth_component_uses_net_wealth() {
    let mut state = economy();
    liquid_firm(&mut state);
    // A loan from the bank lowers net wealth to 60
    state.open_item(5, "BANK_A", "FIRM_1", dec!(40)).unwrap();
    set_profits(&mut state, "FIRM_1", 10.0);

    let payer = PayerView::new(&state, "FIRM_1").unwrap();
    assert_eq!(payer.net_wealth(), 60.0);

    let tax = firm_strategy(0.5, 0.2).compute_taxes(&payer).unwrap();
    assert!((tax - 32.0).abs() < 1e-9);
}

#[test]
fn test_missing_singular_liquid_asset_is_an_error() {
    let mut state = economy();
    state.open_item(DEPOSIT, "FIRM_1", "BANK_A", dec!(25)).unwrap();
    state.open_item(CASH, "FIRM_1", "CB", dec!(30)).unwrap();
    set_profits(&mut state, "FIRM_1", 10.0);

    let payer = PayerView::new(&state, "FIRM_1").unwrap();
    assert_eq!(
        firm_strategy(0.0, 0.2).compute_taxes(&payer),
        Err(TaxError::MissingLiquidAsset {
            agent: "FIRM_1".to_string(),
            stock_type: BONDS,
        })
    );
}

// ============================================================================
// Bank payers
// ============================================================================

#[test]
fn test_bank_taxed_without_liquidity_check() {
    let mut state = economy();
    state.open_item(RESERVES, "BANK_A", "CB", dec!(5)).unwrap();
    set_profits(&mut state, "BANK_A", 1_000.0);

    let payer = PayerView::new(&state, "BANK_A").unwrap();
    assert_eq!(payer.payer_class(), PayerClass::Bank);

    let strategy = ProfitsWealthTaxStrategy::new(0.0, 0.25, 0.5, 0.1, [DEPOSIT, CASH, BONDS]);
    assert_eq!(strategy.compute_taxes(&payer), Ok(250.0));
}

#[test]
fn test_bank_negative_due_floors_at_zero() {
    let mut state = economy();
    set_profits(&mut state, "BANK_A", -80.0);

    let payer = PayerView::new(&state, "BANK_A").unwrap();
    assert_eq!(firm_strategy(0.0, 0.25).compute_taxes(&payer), Ok(0.0));
}

#[test]
fn test_household_is_not_a_profits_tax_payer() {
    let state = economy();
    assert_eq!(
        PayerView::new(&state, "HH_1").err(),
        Some(TaxError::NotAProfitsTaxPayer("HH_1".to_string()))
    );
    assert_eq!(
        PayerView::new(&state, "NOBODY").err(),
        Some(TaxError::AgentNotFound("NOBODY".to_string()))
    );
}

// ============================================================================
// Paying stocks
// ============================================================================

#[test]
fn test_paying_stocks_keep_last_deposit_last() {
    let mut state = economy();
    let (d1, d2, cash, bond) = liquid_firm(&mut state);

    let payer = PayerView::new(&state, "FIRM_1").unwrap();
    let stocks = firm_strategy(0.0, 0.2).paying_stocks(&payer).unwrap();

    assert_eq!(stocks, vec![d1, cash, bond, d2]);
}

#[test]
fn test_paying_stocks_with_empty_first_group() {
    let mut state = economy();
    let cash = state.open_item(CASH, "FIRM_1", "CB", dec!(30)).unwrap();
    let bond = state.open_item(BONDS, "FIRM_1", "GOV", dec!(10)).unwrap();

    let payer = PayerView::new(&state, "FIRM_1").unwrap();
    let stocks = firm_strategy(0.0, 0.2).paying_stocks(&payer).unwrap();

    assert_eq!(stocks, vec![bond, cash]);
}

// ============================================================================
// Fiscal feedback rule
// ============================================================================

#[test]
fn test_rate_at_max_not_reduced() {
    let mut strategy = ProfitsWealthTaxStrategy::new(0.02, 0.5, 0.5, 0.1, [DEPOSIT, CASH, BONDS]);
    strategy.update_rates(0.8);

    assert_eq!(strategy.profit_tax_rate(), 0.5);
    assert!((strategy.wealth_tax_rate() - 0.016).abs() < 1e-15);
}

#[test]
fn test_rate_at_min_not_raised() {
    let mut strategy = ProfitsWealthTaxStrategy::new(0.0, 0.1, 0.5, 0.1, [DEPOSIT, CASH, BONDS]);
    strategy.update_rates(1.5);
    assert_eq!(strategy.profit_tax_rate(), 0.1);
}

#[test]
fn test_rate_inside_band_scaled() {
    let mut strategy = firm_strategy(0.01, 0.2);
    strategy.update_rates(1.25);
    assert!((strategy.profit_tax_rate() - 0.25).abs() < 1e-15);
}

#[test]
fn test_strategy_downcast() {
    let strategy: Box<dyn TaxPayerStrategy> = Box::new(firm_strategy(0.01, 0.2));
    let concrete = strategy
        .as_any()
        .downcast_ref::<ProfitsWealthTaxStrategy>()
        .unwrap();
    assert_eq!(concrete.liquid_assets_id(), [DEPOSIT, CASH, BONDS]);
}
