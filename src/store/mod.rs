//! Row-level data access. Every function takes a connection so callers decide
//! which transaction it runs in.

pub mod customers;
pub mod expenses;
pub mod handovers;
pub mod inventory;
pub mod ledger;
pub mod orders;
pub mod users;
pub mod wallets;
