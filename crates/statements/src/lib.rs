//! Statement generation (pure computation over ledger data).
//!
//! No IO: callers fetch the account and in-window transactions and hand them
//! to [`StatementEngine`].

pub mod engine;
pub mod window;

pub use engine::{Statement, StatementEngine, StatementLine};
pub use window::StatementWindow;
