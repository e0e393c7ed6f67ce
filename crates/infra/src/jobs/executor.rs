//! Bounded worker pool for statement generation.
//!
//! Sizing follows a core/max pool: up to `core_workers` threads are started
//! on demand and stay alive; further work waits in a FIFO backlog of
//! `queue_capacity`; once the backlog is full, extra threads are started up to
//! `max_workers`. Past that, `submit` fails with `CapacityExceeded` so the
//! caller can reject the request instead of growing an unbounded queue.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

/// Unit of work run by a pool thread.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Worker pool configuration.
#[derive(Debug, Clone)]
pub struct StatementExecutorConfig {
    /// Thread name prefix, also used in logs
    pub name: String,
    /// Threads kept alive while idle
    pub core_workers: usize,
    /// Hard cap on threads
    pub max_workers: usize,
    /// Tasks allowed to wait for a free thread
    pub queue_capacity: usize,
    /// Idle time after which a thread above the core count exits
    pub keep_alive: Duration,
}

impl Default for StatementExecutorConfig {
    fn default() -> Self {
        Self {
            name: "statement-worker".to_string(),
            core_workers: 2,
            max_workers: 5,
            queue_capacity: 100,
            keep_alive: Duration::from_secs(60),
        }
    }
}

impl StatementExecutorConfig {
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_workers(mut self, core: usize, max: usize) -> Self {
        self.core_workers = core;
        self.max_workers = max;
        self
    }

    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity;
        self
    }

    pub fn with_keep_alive(mut self, keep_alive: Duration) -> Self {
        self.keep_alive = keep_alive;
        self
    }

    pub fn validate(&self) -> Result<(), ExecutorError> {
        if self.core_workers == 0 {
            return Err(ExecutorError::InvalidConfig(
                "core_workers must be at least 1".to_string(),
            ));
        }
        if self.max_workers < self.core_workers {
            return Err(ExecutorError::InvalidConfig(format!(
                "max_workers ({}) must be >= core_workers ({})",
                self.max_workers, self.core_workers
            )));
        }
        Ok(())
    }
}

/// Executor error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExecutorError {
    #[error("worker pool at capacity ({workers} workers busy, {queued} tasks queued)")]
    CapacityExceeded { workers: usize, queued: usize },
    #[error("worker pool is shutting down")]
    ShuttingDown,
    #[error("failed to spawn worker thread: {0}")]
    Spawn(String),
    #[error("invalid executor config: {0}")]
    InvalidConfig(String),
}

/// Executor runtime statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutorStats {
    pub tasks_submitted: u64,
    pub tasks_completed: u64,
    pub tasks_panicked: u64,
    pub tasks_rejected: u64,
    pub workers: usize,
    pub queued: usize,
}

struct PoolState {
    queue: VecDeque<Task>,
    workers: usize,
    next_worker_index: usize,
    shutdown: bool,
    handles: Vec<thread::JoinHandle<()>>,
    stats: ExecutorStats,
}

struct Shared {
    config: StatementExecutorConfig,
    state: Mutex<PoolState>,
    available: Condvar,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, PoolState> {
        // Tasks never run while the lock is held, so poisoning can only come
        // from this module; the state itself stays consistent.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Background worker pool.
pub struct StatementExecutor {
    shared: Arc<Shared>,
}

impl std::fmt::Debug for StatementExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementExecutor")
            .field("config", &self.shared.config)
            .field("stats", &self.stats())
            .finish()
    }
}

impl StatementExecutor {
    /// Create an idle pool; threads start as work arrives.
    pub fn new(config: StatementExecutorConfig) -> Result<Self, ExecutorError> {
        config.validate()?;
        info!(
            executor = %config.name,
            core_workers = config.core_workers,
            max_workers = config.max_workers,
            queue_capacity = config.queue_capacity,
            "statement executor created"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                config,
                state: Mutex::new(PoolState {
                    queue: VecDeque::new(),
                    workers: 0,
                    next_worker_index: 0,
                    shutdown: false,
                    handles: Vec::new(),
                    stats: ExecutorStats::default(),
                }),
                available: Condvar::new(),
            }),
        })
    }

    pub fn config(&self) -> &StatementExecutorConfig {
        &self.shared.config
    }

    /// Hand a task to the pool without waiting for it to run.
    pub fn submit(&self, task: Task) -> Result<(), ExecutorError> {
        let config = &self.shared.config;
        let mut state = self.shared.lock();

        if state.shutdown {
            state.stats.tasks_rejected += 1;
            return Err(ExecutorError::ShuttingDown);
        }

        if state.workers < config.core_workers {
            spawn_worker(&self.shared, &mut state, task)?;
        } else if state.queue.len() < config.queue_capacity {
            state.queue.push_back(task);
            self.shared.available.notify_one();
        } else if state.workers < config.max_workers {
            spawn_worker(&self.shared, &mut state, task)?;
        } else {
            state.stats.tasks_rejected += 1;
            let err = ExecutorError::CapacityExceeded {
                workers: state.workers,
                queued: state.queue.len(),
            };
            warn!(executor = %config.name, error = %err, "task rejected");
            return Err(err);
        }

        state.stats.tasks_submitted += 1;
        Ok(())
    }

    /// Get current executor statistics.
    pub fn stats(&self) -> ExecutorStats {
        let state = self.shared.lock();
        ExecutorStats {
            workers: state.workers,
            queued: state.queue.len(),
            ..state.stats.clone()
        }
    }

    /// Stop accepting work, let queued tasks finish, and join all threads.
    pub fn shutdown(&self) {
        let handles = {
            let mut state = self.shared.lock();
            state.shutdown = true;
            std::mem::take(&mut state.handles)
        };
        self.shared.available.notify_all();

        for handle in handles {
            if handle.join().is_err() {
                error!(executor = %self.shared.config.name, "worker thread terminated abnormally");
            }
        }
        info!(executor = %self.shared.config.name, "statement executor stopped");
    }
}

impl Drop for StatementExecutor {
    fn drop(&mut self) {
        // Release idle threads; they exit once the backlog is drained.
        self.shared.lock().shutdown = true;
        self.shared.available.notify_all();
    }
}

fn spawn_worker(
    shared: &Arc<Shared>,
    state: &mut PoolState,
    first_task: Task,
) -> Result<(), ExecutorError> {
    state.handles.retain(|h| !h.is_finished());

    let index = state.next_worker_index;
    let name = format!("{}-{}", shared.config.name, index);
    let worker_shared = shared.clone();

    let handle = thread::Builder::new()
        .name(name.clone())
        .spawn(move || worker_loop(worker_shared, first_task))
        .map_err(|e| {
            state.stats.tasks_rejected += 1;
            ExecutorError::Spawn(e.to_string())
        })?;

    state.next_worker_index += 1;
    state.workers += 1;
    state.handles.push(handle);
    debug!(worker = %name, workers = state.workers, "worker started");
    Ok(())
}

fn worker_loop(shared: Arc<Shared>, first_task: Task) {
    let mut next = Some(first_task);

    while let Some(task) = next.take().or_else(|| next_task(&shared)) {
        run_task(&shared, task);
    }

    debug!(executor = %shared.config.name, "worker exiting");
}

/// Block until a task is available; `None` tells the worker to exit.
fn next_task(shared: &Shared) -> Option<Task> {
    let config = &shared.config;
    let mut state = shared.lock();

    loop {
        if let Some(task) = state.queue.pop_front() {
            return Some(task);
        }

        if state.shutdown {
            state.workers -= 1;
            return None;
        }

        if state.workers > config.core_workers {
            let (guard, timeout) = shared
                .available
                .wait_timeout(state, config.keep_alive)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;

            if timeout.timed_out() && state.queue.is_empty() && state.workers > config.core_workers {
                state.workers -= 1;
                return None;
            }
        } else {
            state = shared
                .available
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

fn run_task(shared: &Shared, task: Task) {
    let outcome = panic::catch_unwind(AssertUnwindSafe(task));

    let mut state = shared.lock();
    match outcome {
        Ok(()) => state.stats.tasks_completed += 1,
        Err(payload) => {
            state.stats.tasks_panicked += 1;
            error!(
                executor = %shared.config.name,
                panic = %panic_message(payload.as_ref()),
                "task panicked; worker continues"
            );
        }
    }
}

/// Best-effort text of a panic payload.
pub fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
