//! Delay scheduler: run work items at a future time, with cancellation.
//!
//! # Architecture
//!
//! - **Scheduler**: one dedicated thread sleeps until the earliest deadline
//!   in a min-heap, then hands the due task to an execution facility.
//!   Producers on any thread call `add_event` / `stop_event` / `shutdown`.
//! - **Cancellation**: by identity only. `stop_event` removes the identity
//!   from the pending set; the heap entry is dropped when it comes due.
//! - **Execution facilities**: the scheduler depends on the one-method
//!   [`ExecutionFacility`] trait. [`Dispatcher`] runs tasks on a worker
//!   thread with queue expiry; [`AsyncBridge`] forwards them to tokio.
//!
//! ```no_run
//! # fn example() -> delay_scheduler::Result<()> {
//! use delay_scheduler::{Config, Dispatcher, ExecutionFacility, TaskScheduler, create_scheduler_task};
//! use std::sync::Arc;
//!
//! let config = Config::default();
//! let dispatcher = Arc::new(Dispatcher::start(&config.dispatcher)?);
//! let facility: Arc<dyn ExecutionFacility> = dispatcher.clone();
//! let scheduler = TaskScheduler::start(&config.scheduler, facility)?;
//!
//! let id = scheduler.add_event(create_scheduler_task(500, || println!("fired")));
//! scheduler.stop_event(id);
//!
//! scheduler.shutdown();
//! scheduler.join();
//! dispatcher.shutdown();
//! dispatcher.join();
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod dispatcher;
pub mod error;
pub mod lifecycle;
pub mod scheduler;

pub use config::{Config, DispatcherConfig, SchedulerConfig};
pub use dispatcher::{Dispatcher, ExecutionFacility};
pub use error::{Result, SchedulerError};
pub use lifecycle::ThreadState;
pub use scheduler::{
    AsyncBridge, EventId, ExpiryPolicy, ScheduledTask, TaskScheduler, create_scheduler_task,
};
