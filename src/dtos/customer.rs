use serde::Serialize;

use crate::domain::ledger::ChainBreak;
use crate::models::customer::{Customer, LedgerEntry};

#[derive(Debug, Serialize)]
pub struct CustomerStatement {
    pub customer: Customer,
    pub entries: Vec<LedgerEntry>,
    /// Replay from zero matches every `balance_after` and the cached balance.
    pub chain_valid: bool,
    pub chain_break: Option<ChainBreak>,
}
