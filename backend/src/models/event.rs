//! Event logging for simulation replay and auditing.
//!
//! This module defines the Event enum which captures all significant state changes
//! during a tax round. Events enable:
//! - Debugging (understand what happened and when)
//! - Auditing (verify that every draw and payment balances)
//! - Analysis (tax revenue, waivers, shortfalls per period)
//!
//! # Event Types
//!
//! - **Assessment**: tax computed for a payer, or waived for lack of liquidity
//! - **Reallocation**: liquidity drawn from a payer's account into its primary account
//! - **Payment**: tax paid to the government, or collected short
//! - **Fiscal rule**: rates rescaled, end of fiscal year
//!
//! # Example
//!
//! ```rust
//! use stockflow_core_rs::models::Event;
//!
//! let event = Event::TaxAssessed {
//!     period: 10,
//!     agent_id: "FIRM_1".to_string(),
//!     due: 120.0,
//!     amount: 120.0,
//! };
//!
//! assert_eq!(event.period(), 10);
//! assert_eq!(event.event_type(), "TaxAssessed");
//! ```

use crate::models::stock::ItemId;
use rust_decimal::Decimal;

/// Simulation event capturing a state change.
///
/// All events include a period number for temporal ordering.
/// Events are logged in the order they occur within a period.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Strategy computed the tax of a payer
    TaxAssessed {
        period: usize,
        agent_id: String,
        /// Rates applied to wealth and profits, before floor and liquidity check
        due: f64,
        /// Tax actually owed
        amount: f64,
    },

    /// Positive tax due excused because liquid assets could not cover it
    TaxWaived {
        period: usize,
        agent_id: String,
        due: f64,
    },

    /// Liquidity moved from one of the payer's accounts into its primary account
    LiquidityDrawn {
        period: usize,
        agent_id: String,
        source: ItemId,
        target: ItemId,
        amount: Decimal,
    },

    /// Tax moved from the payer's primary account to the government
    TaxPaid {
        period: usize,
        agent_id: String,
        receiver_id: String,
        amount: Decimal,
    },

    /// Payer could not gather the full tax; the available part was paid
    TaxShortfall {
        period: usize,
        agent_id: String,
        required: Decimal,
        collected: Decimal,
    },

    /// Fiscal rule rescaled the rates of every strategy
    RatesUpdated {
        period: usize,
        multiplier: f64,
        num_strategies: usize,
    },

    /// Last period of a fiscal year was processed
    EndOfYear { period: usize, year: usize },
}

impl Event {
    /// Get the period when this event occurred
    pub fn period(&self) -> usize {
        match self {
            Event::TaxAssessed { period, .. } => *period,
            Event::TaxWaived { period, .. } => *period,
            Event::LiquidityDrawn { period, .. } => *period,
            Event::TaxPaid { period, .. } => *period,
            Event::TaxShortfall { period, .. } => *period,
            Event::RatesUpdated { period, .. } => *period,
            Event::EndOfYear { period, .. } => *period,
        }
    }

    /// Get a short description of the event type
    pub fn event_type(&self) -> &'static str {
        match self {
            Event::TaxAssessed { .. } => "TaxAssessed",
            Event::TaxWaived { .. } => "TaxWaived",
            Event::LiquidityDrawn { .. } => "LiquidityDrawn",
            Event::TaxPaid { .. } => "TaxPaid",
            Event::TaxShortfall { .. } => "TaxShortfall",
            Event::RatesUpdated { .. } => "RatesUpdated",
            Event::EndOfYear { .. } => "EndOfYear",
        }
    }

    /// Get agent ID if event relates to a specific agent
    pub fn agent_id(&self) -> Option<&str> {
        match self {
            Event::TaxAssessed { agent_id, .. } => Some(agent_id),
            Event::TaxWaived { agent_id, .. } => Some(agent_id),
            Event::LiquidityDrawn { agent_id, .. } => Some(agent_id),
            Event::TaxPaid { agent_id, .. } => Some(agent_id),
            Event::TaxShortfall { agent_id, .. } => Some(agent_id),
            _ => None,
        }
    }
}

/// Event log for storing and querying simulation events.
///
/// This is a simple wrapper around Vec<Event> with convenience methods.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn log(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Get the number of events logged
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if the log is empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Get all events
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Get events for a specific period
    pub fn events_at_period(&self, period: usize) -> Vec<&Event> {
        self.events.iter().filter(|e| e.period() == period).collect()
    }

    /// Get events of a specific type
    pub fn events_of_type(&self, event_type: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get events for a specific agent
    pub fn events_for_agent(&self, agent_id: &str) -> Vec<&Event> {
        self.events
            .iter()
            .filter(|e| e.agent_id() == Some(agent_id))
            .collect()
    }

    /// Drop every event logged after the first `len`
    pub(crate) fn truncate(&mut self, len: usize) {
        self.events.truncate(len);
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_period() {
        let event = Event::TaxWaived {
            period: 42,
            agent_id: "FIRM_1".to_string(),
            due: 10.0,
        };
        assert_eq!(event.period(), 42);
        assert_eq!(event.agent_id(), Some("FIRM_1"));
    }

    #[test]
    fn test_event_log_filters() {
        let mut log = EventLog::new();
        log.log(Event::TaxPaid {
            period: 1,
            agent_id: "FIRM_1".to_string(),
            receiver_id: "GOV".to_string(),
            amount: Decimal::from(10),
        });
        log.log(Event::RatesUpdated {
            period: 1,
            multiplier: 1.1,
            num_strategies: 2,
        });
        log.log(Event::EndOfYear { period: 3, year: 0 });

        assert_eq!(log.len(), 3);
        assert_eq!(log.events_at_period(1).len(), 2);
        assert_eq!(log.events_of_type("TaxPaid").len(), 1);
        assert_eq!(log.events_for_agent("FIRM_1").len(), 1);

        log.clear();
        assert!(log.is_empty());
    }
}
