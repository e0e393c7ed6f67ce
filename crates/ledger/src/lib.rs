//! Ledger module (accounts and their deposit/withdrawal history).
//!
//! Pure domain logic only: no IO, no HTTP, no persistence concerns.

pub mod account;
pub mod transaction;

pub use account::Account;
pub use transaction::{Transaction, TransactionKind};
