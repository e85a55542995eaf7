//! Profits and wealth tax strategy
//!
//! Tax due = `wealth_tax_rate * net_wealth + profit_tax_rate * pre_tax_profits`.
//!
//! - **Banks** pay `max(due, 0)` with no liquidity check.
//! - **Other payers** pay `max(due, 0)` only if their liquid assets cover it;
//!   when `due` exceeds liquidity the payer is excused entirely (tax 0).
//!
//! Liquid assets are assembled from three stock types: every asset item of
//! the first type, then one item of the second and one of the third type, each
//! inserted just before the last element of the list built so far. The last
//! item of the first group therefore stays last, and the list order is the
//! draw priority when the tax is collected.

use crate::models::agent::PayerClass;
use crate::models::state::SimulationState;
use crate::models::stock::{ItemId, StockItem, StockTypeId};
use crate::policy::codec::{self, CodecError};
use crate::policy::{TaxError, TaxPayer, TaxPayerStrategy};
use log::debug;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitsWealthTaxStrategy {
    wealth_tax_rate: f64,
    profit_tax_rate: f64,
    max_profit_tax_rate: f64,
    min_profit_tax_rate: f64,
    liquid_assets_id: [StockTypeId; 3],
}

impl ProfitsWealthTaxStrategy {
    /// Create a strategy
    ///
    /// `min_profit_tax_rate <= max_profit_tax_rate` is assumed, not checked.
    ///
    /// # Example
    /// ```
    /// use stockflow_core_rs::policy::ProfitsWealthTaxStrategy;
    ///
    /// let strategy = ProfitsWealthTaxStrategy::new(0.01, 0.2, 0.4, 0.1, [1, 2, 4]);
    /// assert_eq!(strategy.profit_tax_rate(), 0.2);
    /// ```
    pub fn new(
        wealth_tax_rate: f64,
        profit_tax_rate: f64,
        max_profit_tax_rate: f64,
        min_profit_tax_rate: f64,
        liquid_assets_id: [StockTypeId; 3],
    ) -> Self {
        Self {
            wealth_tax_rate,
            profit_tax_rate,
            max_profit_tax_rate,
            min_profit_tax_rate,
            liquid_assets_id,
        }
    }

    pub fn wealth_tax_rate(&self) -> f64 {
        self.wealth_tax_rate
    }

    pub fn set_wealth_tax_rate(&mut self, rate: f64) {
        self.wealth_tax_rate = rate;
    }

    pub fn profit_tax_rate(&self) -> f64 {
        self.profit_tax_rate
    }

    pub fn set_profit_tax_rate(&mut self, rate: f64) {
        self.profit_tax_rate = rate;
    }

    pub fn max_profit_tax_rate(&self) -> f64 {
        self.max_profit_tax_rate
    }

    pub fn set_max_profit_tax_rate(&mut self, rate: f64) {
        self.max_profit_tax_rate = rate;
    }

    pub fn min_profit_tax_rate(&self) -> f64 {
        self.min_profit_tax_rate
    }

    pub fn set_min_profit_tax_rate(&mut self, rate: f64) {
        self.min_profit_tax_rate = rate;
    }

    pub fn liquid_assets_id(&self) -> [StockTypeId; 3] {
        self.liquid_assets_id
    }

    pub fn set_liquid_assets_id(&mut self, ids: [StockTypeId; 3]) {
        self.liquid_assets_id = ids;
    }

    fn liquid_assets<'p>(&self, payer: &'p dyn TaxPayer) -> Result<Vec<&'p StockItem>, TaxError> {
        let [first, second, third] = self.liquid_assets_id;
        let mut stocks = payer.asset_items(first);

        for stock_type in [second, third] {
            let item = payer
                .asset_item(stock_type)
                .ok_or_else(|| TaxError::MissingLiquidAsset {
                    agent: payer.payer_id().to_string(),
                    stock_type,
                })?;
            // Before the last element; at the front when the list is empty
            let position = stocks.len().saturating_sub(1);
            stocks.insert(position, item);
        }

        Ok(stocks)
    }
}

impl TaxPayerStrategy for ProfitsWealthTaxStrategy {
    fn compute_taxes(&self, payer: &dyn TaxPayer) -> Result<f64, TaxError> {
        let due = self.tax_due(payer);

        match payer.payer_class() {
            PayerClass::Bank => Ok(due.max(0.0)),
            PayerClass::NonBank => {
                let liquidity: Decimal = self
                    .liquid_assets(payer)?
                    .iter()
                    .map(|item| item.value())
                    .sum();
                let liquidity = liquidity.to_f64().unwrap_or_default();

                if due > liquidity {
                    debug!(
                        "Tax waived for {}: due {} exceeds liquidity {}",
                        payer.payer_id(),
                        due,
                        liquidity
                    );
                    Ok(0.0)
                } else {
                    Ok(due.max(0.0))
                }
            }
        }
    }

    fn tax_due(&self, payer: &dyn TaxPayer) -> f64 {
        self.wealth_tax_rate * payer.net_wealth() + self.profit_tax_rate * payer.pre_tax_profits()
    }

    fn update_rates(&mut self, multiplier: f64) {
        self.wealth_tax_rate *= multiplier;

        // Bounds are checked before scaling: a rate sitting on a bound stays there
        if self.profit_tax_rate >= self.max_profit_tax_rate {
            self.profit_tax_rate = self.max_profit_tax_rate;
        } else if self.profit_tax_rate <= self.min_profit_tax_rate {
            self.profit_tax_rate = self.min_profit_tax_rate;
        } else {
            self.profit_tax_rate *= multiplier;
        }
    }

    fn paying_stocks(&self, payer: &dyn TaxPayer) -> Result<Vec<ItemId>, TaxError> {
        Ok(self
            .liquid_assets(payer)?
            .iter()
            .map(|item| item.id())
            .collect())
    }

    fn encode(&self) -> Vec<u8> {
        codec::encode_rates(self.wealth_tax_rate, self.profit_tax_rate)
    }

    fn decode(&mut self, content: &[u8], _population: &SimulationState) -> Result<(), CodecError> {
        let (wealth_tax_rate, profit_tax_rate) = codec::decode_rates(content)?;
        self.wealth_tax_rate = wealth_tax_rate;
        self.profit_tax_rate = profit_tax_rate;
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy(profit_tax_rate: f64) -> ProfitsWealthTaxStrategy {
        ProfitsWealthTaxStrategy::new(0.02, profit_tax_rate, 0.4, 0.1, [1, 2, 4])
    }

    #[test]
    fn test_update_rates_scales_inside_bounds() {
        let mut s = strategy(0.2);
        s.update_rates(1.5);
        assert!((s.profit_tax_rate() - 0.3).abs() < 1e-12);
        assert!((s.wealth_tax_rate() - 0.03).abs() < 1e-12);
    }

    #[test]
    fn test_update_rates_can_overshoot_bound_once() {
        // Checked before scaling, so one step may leave the band
        let mut s = strategy(0.3);
        s.update_rates(2.0);
        assert!((s.profit_tax_rate() - 0.6).abs() < 1e-12);
        s.update_rates(2.0);
        assert_eq!(s.profit_tax_rate(), 0.4);
    }

    #[test]
    fn test_update_rates_locked_at_min() {
        let mut s = strategy(0.1);
        s.update_rates(3.0);
        assert_eq!(s.profit_tax_rate(), 0.1);
    }

    #[test]
    fn test_wealth_rate_always_scaled() {
        let mut s = strategy(0.4);
        s.update_rates(0.5);
        assert_eq!(s.wealth_tax_rate(), 0.01);
        assert_eq!(s.profit_tax_rate(), 0.4);
    }
}
