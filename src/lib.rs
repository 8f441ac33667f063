//! # Sequential Job Queue
//! src/lib.rs
//!
//! Cola de jobs que garantiza ejecución secuencial (uno a la vez, FIFO)
//! sobre un servicio de ejecución concurrente, sin consumir recursos cuando
//! está ociosa: no hay thread de scheduling ni polling.
//!
//! ## Arquitectura
//!
//! - `jobs`: la cola, los jobs y sus handles de finalización
//! - `executor`: interfaz del servicio de ejecución, pool de workers y
//!   executor manual para tests
//! - `config`: configuración (CLI + variables de entorno)
//! - `error`: tipos de error
//! - `telemetry`: inicialización de logging
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//! use sequential_job_queue::executor::{PoolConfig, ThreadPool};
//! use sequential_job_queue::jobs::SequentialJobQueue;
//!
//! let pool = Arc::new(ThreadPool::new(PoolConfig::with_workers(4)).unwrap());
//! let queue = SequentialJobQueue::create(pool);
//!
//! queue.submit(|interrupt| {
//!     interrupt.sleep(Duration::from_millis(200))?;
//!     Ok(())
//! });
//! let last = queue.submit(|_| Ok(()));
//!
//! last.get_timeout(Duration::from_secs(1)).unwrap();
//! ```

pub mod config;
pub mod error;
pub mod executor;
pub mod jobs;
pub mod telemetry;

pub use error::{Interrupted, JobError};
pub use executor::{ExecutorService, Interrupt};
pub use jobs::{CompletionHandle, SequentialJobQueue};
