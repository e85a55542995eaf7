//! Tests for the strategy persistence record

use proptest::prelude::{any, prop_assert_eq, prop_assume, proptest};
use stockflow_core_rs::policy::codec::{decode_rates, encode_rates, PAYLOAD_LEN, RECORD_LEN};
use stockflow_core_rs::policy::{CodecError, ProfitsWealthTaxStrategy, TaxPayerStrategy};
use stockflow_core_rs::SimulationState;

fn strategy(wealth_tax_rate: f64, profit_tax_rate: f64) -> ProfitsWealthTaxStrategy {
    ProfitsWealthTaxStrategy::new(wealth_tax_rate, profit_tax_rate, 0.5, 0.1, [1, 2, 4])
}

#[test]
fn test_encode_layout_is_big_endian_doubles() {
    let bytes = strategy(0.01, 0.25).encode();

    assert_eq!(bytes.len(), RECORD_LEN);
    assert_eq!(&bytes[..8], &0.01f64.to_be_bytes());
    assert_eq!(&bytes[8..PAYLOAD_LEN], &0.25f64.to_be_bytes());
    assert!(bytes[PAYLOAD_LEN..].iter().all(|&b| b == 0));
}

#[test]
fn test_decode_restores_rates_only() {
    let source = strategy(0.03, 0.4);
    let mut restored = ProfitsWealthTaxStrategy::new(0.0, 0.0, 0.9, 0.05, [7, 8, 9]);

    restored
        .decode(&source.encode(), &SimulationState::default())
        .unwrap();

    assert_eq!(restored.wealth_tax_rate(), 0.03);
    assert_eq!(restored.profit_tax_rate(), 0.4);
    // Bounds and liquid asset types are configuration, not persisted state
    assert_eq!(restored.max_profit_tax_rate(), 0.9);
    assert_eq!(restored.liquid_assets_id(), [7, 8, 9]);
}

#[test]
fn test_decode_truncated_record_leaves_strategy_untouched() {
    let mut restored = strategy(0.01, 0.2);
    let result = restored.decode(&[0u8; 12], &SimulationState::default());

    assert_eq!(
        result,
        Err(CodecError::Truncated {
            expected: PAYLOAD_LEN,
            actual: 12
        })
    );
    assert_eq!(restored.profit_tax_rate(), 0.2);
}

#[test]
fn test_zero_and_negative_rates_round_trip() {
    for (wealth, profit) in [(0.0, 0.0), (-0.0, -0.15), (-1e-300, 3.5)] {
        let (w, p) = decode_rates(&encode_rates(wealth, profit)).unwrap();
        assert_eq!(w.to_bits(), f64::to_bits(wealth));
        assert_eq!(p.to_bits(), f64::to_bits(profit));
    }
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(128))]

    #[test]
    fn prop_strategy_round_trip_is_bit_exact(wealth in any::<f64>(), profit in any::<f64>()) {
        prop_assume!(wealth.is_finite() && profit.is_finite());

        let source = strategy(wealth, profit);
        let mut restored = strategy(0.0, 0.0);
        restored.decode(&source.encode(), &SimulationState::default()).unwrap();

        prop_assert_eq!(restored.wealth_tax_rate().to_bits(), wealth.to_bits());
        prop_assert_eq!(restored.profit_tax_rate().to_bits(), profit.to_bits());
    }
}
