//! Infrastructure layer: storage adapters, the statement worker pool and the
//! statement workflow that ties them together.

pub mod jobs;
pub mod ledger_store;
pub mod statement_workflow;

pub use ledger_store::{AccountSnapshot, InMemoryLedgerStore, LedgerStore, LedgerStoreError};
pub use statement_workflow::{StatementRequest, StatementWorkflow, WorkflowError};
