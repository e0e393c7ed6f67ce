use std::sync::Arc;

use banking_infra::jobs::{ExecutorError, InMemoryJobStore, StatementExecutor};
use banking_infra::{InMemoryLedgerStore, StatementWorkflow};

use crate::config::AppConfig;

pub type StatementService = StatementWorkflow<Arc<InMemoryLedgerStore>, Arc<InMemoryJobStore>>;

/// Shared services handed to every handler.
pub struct AppServices {
    pub ledger: Arc<InMemoryLedgerStore>,
    pub statements: StatementService,
}

/// Wire the in-memory stores and start the statement worker pool.
pub fn build_services(config: &AppConfig) -> Result<AppServices, ExecutorError> {
    let ledger = Arc::new(InMemoryLedgerStore::new());
    let jobs = InMemoryJobStore::arc();
    let executor = Arc::new(StatementExecutor::new(config.statements.clone())?);

    tracing::info!(
        core_workers = config.statements.core_workers,
        max_workers = config.statements.max_workers,
        queue_capacity = config.statements.queue_capacity,
        "services initialized"
    );

    Ok(AppServices {
        statements: StatementWorkflow::new(ledger.clone(), jobs, executor),
        ledger,
    })
}
