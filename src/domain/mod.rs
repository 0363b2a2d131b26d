//! Pure reconciliation logic. Nothing here touches the database.

pub mod fulfillment;
pub mod handover;
pub mod ledger;
pub mod summary;
