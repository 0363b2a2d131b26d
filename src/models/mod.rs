pub mod bottle_wallet;
pub mod cash_handover;
pub mod customer;
pub mod expense;
pub mod order;
pub mod user;
