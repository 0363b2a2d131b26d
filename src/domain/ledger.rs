//! Running-balance chain for a customer's cash ledger.
//!
//! The ledger is an append-only log; `customers.cash_balance` is a cached
//! projection of its last `balance_after`. Both are written in the same
//! transaction, so the chain is built here from the locked prior balance and
//! handed to the store as a batch.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::customer::LedgerEntry;

/// An entry computed in memory, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedEntry {
    pub seq: i32,
    pub amount: Decimal,
    pub description: String,
    pub balance_after: Decimal,
    pub reference_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct LedgerChain {
    balance: Decimal,
    last_seq: i32,
    pending: Vec<PlannedEntry>,
}

impl LedgerChain {
    /// Continues the chain after the customer's latest persisted entry.
    pub fn resume(balance: Decimal, last_seq: i32) -> Self {
        Self {
            balance,
            last_seq,
            pending: Vec::new(),
        }
    }

    pub fn append(&mut self, amount: Decimal, description: impl Into<String>, reference_id: Option<i64>) {
        self.balance += amount;
        self.last_seq += 1;
        self.pending.push(PlannedEntry {
            seq: self.last_seq,
            amount,
            description: description.into(),
            balance_after: self.balance,
            reference_id,
        });
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn into_entries(self) -> Vec<PlannedEntry> {
        self.pending
    }
}

/// First point where a persisted chain stops being a prefix sum.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChainBreak {
    pub seq: i32,
    pub expected_balance_after: Decimal,
    pub recorded_balance_after: Decimal,
}

/// Replays entries (ordered by `seq`) from zero and returns the final balance.
pub fn replay(entries: &[LedgerEntry]) -> Result<Decimal, ChainBreak> {
    let mut running = Decimal::ZERO;
    for entry in entries {
        running += entry.amount;
        if running != entry.balance_after {
            return Err(ChainBreak {
                seq: entry.seq,
                expected_balance_after: running,
                recorded_balance_after: entry.balance_after,
            });
        }
    }
    Ok(running)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;

    fn persisted(planned: &[PlannedEntry]) -> Vec<LedgerEntry> {
        planned
            .iter()
            .map(|p| LedgerEntry {
                id: p.seq as i64,
                customer_id: 1,
                seq: p.seq,
                amount: p.amount,
                description: p.description.clone(),
                balance_after: p.balance_after,
                reference_id: p.reference_id,
                created_at: Utc::now(),
            })
            .collect()
    }

    #[test]
    fn sale_then_payment_returns_to_zero() {
        let mut chain = LedgerChain::resume(Decimal::ZERO, 0);
        chain.append(dec!(-600), "Order #1 Sale", Some(1));
        chain.append(dec!(600), "Order #1 Payment", Some(1));

        assert_eq!(chain.balance(), Decimal::ZERO);
        let entries = chain.into_entries();
        assert_eq!(entries.len(), 2);
        assert_eq!((entries[0].seq, entries[0].balance_after), (1, dec!(-600)));
        assert_eq!((entries[1].seq, entries[1].balance_after), (2, Decimal::ZERO));
    }

    #[test]
    fn resumed_chain_continues_sequence_and_balance() {
        let mut chain = LedgerChain::resume(dec!(-150.50), 7);
        chain.append(dec!(-49.50), "Order #9 Sale", Some(9));

        let entries = chain.into_entries();
        assert_eq!(entries[0].seq, 8);
        assert_eq!(entries[0].balance_after, dec!(-200.00));
    }

    #[test]
    fn replay_reproduces_final_balance() {
        let mut chain = LedgerChain::resume(Decimal::ZERO, 0);
        chain.append(dec!(-600), "Order #1 Sale", Some(1));
        chain.append(dec!(600), "Order #1 Payment", Some(1));
        chain.append(dec!(-250.75), "Order #2 Sale", Some(2));
        chain.append(dec!(100), "Order #2 Payment", Some(2));
        let balance = chain.balance();

        let entries = persisted(&chain.into_entries());
        assert_eq!(replay(&entries), Ok(balance));
        assert_eq!(balance, dec!(-150.75));
    }

    #[test]
    fn replay_reports_first_broken_link() {
        let mut chain = LedgerChain::resume(Decimal::ZERO, 0);
        chain.append(dec!(-100), "Order #1 Sale", Some(1));
        chain.append(dec!(40), "Order #1 Payment", Some(1));
        let mut entries = persisted(&chain.into_entries());
        entries[1].balance_after = dec!(0);

        let broken = replay(&entries).unwrap_err();
        assert_eq!(broken.seq, 2);
        assert_eq!(broken.expected_balance_after, dec!(-60));
        assert_eq!(broken.recorded_balance_after, dec!(0));
    }

    #[test]
    fn empty_ledger_replays_to_zero() {
        assert_eq!(replay(&[]), Ok(Decimal::ZERO));
    }
}
