pub mod cash_handover;
pub mod customer;
pub mod expense;
pub mod fulfillment;
