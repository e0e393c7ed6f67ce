//! Statement job system: records, storage, and the bounded worker pool.
//!
//! ## Design
//!
//! - Jobs are tenant-scoped; every lookup co-requires job id and tenant id
//! - Status moves forward only: Pending -> Processing -> Completed | Failed
//! - Exactly one worker task owns a job from Processing to its terminal state
//! - The worker pool is bounded; submissions past capacity are rejected, not queued
//!
//! ## Components
//!
//! - `StatementJob`: job record with lifecycle transitions
//! - `JobStore`: persistence for jobs (in-memory for now)
//! - `StatementExecutor`: core/max worker pool with a bounded backlog

pub mod executor;
pub mod store;
pub mod types;

pub use executor::{ExecutorError, ExecutorStats, StatementExecutor, StatementExecutorConfig};
pub use store::{InMemoryJobStore, JobStore, JobStoreError};
pub use types::{JobId, JobStatus, JobTransitionError, StatementJob};
