//! # Pool de Workers
//! src/executor/pool.rs
//!
//! Pool fijo de threads que implementa `ExecutorService`. Los workers
//! esperan en un `Condvar` sobre una cola FIFO compartida.

use crate::config::Config;
use crate::error::{ConfigError, PoolError};
use crate::executor::task::{Task, TaskHandle};
use crate::executor::ExecutorService;
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use tracing::{debug, info};

/// Configuración del pool
#[derive(Debug, Clone, Serialize)]
pub struct PoolConfig {
    /// Número de workers
    pub workers: usize,

    /// Prefijo para los nombres de los threads ("{prefix}-{i}")
    pub thread_name: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            workers: 4,
            thread_name: "job-worker".to_string(),
        }
    }
}

impl PoolConfig {
    /// Crea una configuración desde el Config principal
    pub fn from_config(config: &Config) -> Self {
        Self {
            workers: config.workers,
            thread_name: config.thread_name.clone(),
        }
    }

    pub fn with_workers(workers: usize) -> Self {
        Self {
            workers,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.thread_name.is_empty() {
            return Err(ConfigError::EmptyThreadName);
        }
        Ok(())
    }
}

/// Cola interna del pool
struct PoolQueue {
    tasks: VecDeque<(Task, Arc<TaskHandle>)>,
    shutdown: bool,
}

struct PoolShared {
    queue: Mutex<PoolQueue>,
    available: Condvar,
}

/// Pool fijo de workers
pub struct ThreadPool {
    shared: Arc<PoolShared>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadPool {
    /// Crea el pool e inicia los workers
    pub fn new(config: PoolConfig) -> Result<Self, PoolError> {
        config.validate()?;

        let shared = Arc::new(PoolShared {
            queue: Mutex::new(PoolQueue {
                tasks: VecDeque::new(),
                shutdown: false,
            }),
            available: Condvar::new(),
        });

        let mut workers = Vec::with_capacity(config.workers);
        for i in 0..config.workers {
            let name = format!("{}-{}", config.thread_name, i);
            let worker_shared = Arc::clone(&shared);
            let handle = thread::Builder::new()
                .name(name.clone())
                .spawn(move || Self::worker_loop(name, worker_shared))?;
            workers.push(handle);
        }

        info!(workers = config.workers, "thread pool started");

        Ok(Self { shared, workers })
    }

    /// Loop principal del worker
    fn worker_loop(name: String, shared: Arc<PoolShared>) {
        debug!(worker = %name, "worker started");

        loop {
            let next = {
                let queue = shared.queue.lock().unwrap_or_else(PoisonError::into_inner);
                let mut queue = shared
                    .available
                    .wait_while(queue, |q| q.tasks.is_empty() && !q.shutdown)
                    .unwrap_or_else(PoisonError::into_inner);
                queue.tasks.pop_front()
            };

            match next {
                Some((task, handle)) => handle.run(task),
                // Cola vacía y shutdown activo
                None => break,
            }
        }

        debug!(worker = %name, "worker stopped");
    }

    /// Deja de aceptar tareas. Las ya encoladas se terminan de ejecutar.
    pub fn shutdown(&self) {
        let mut queue = self.lock_queue();
        if !queue.shutdown {
            queue.shutdown = true;
            info!("thread pool shutting down");
        }
        self.shared.available.notify_all();
    }

    pub fn is_shutdown(&self) -> bool {
        self.lock_queue().shutdown
    }

    /// Tareas esperando un worker libre
    pub fn queued(&self) -> usize {
        self.lock_queue().tasks.len()
    }

    pub fn workers(&self) -> usize {
        self.workers.len()
    }

    fn lock_queue(&self) -> std::sync::MutexGuard<'_, PoolQueue> {
        self.shared
            .queue
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl ExecutorService for ThreadPool {
    fn submit(&self, task: Task) -> Arc<TaskHandle> {
        let mut queue = self.lock_queue();
        if queue.shutdown {
            drop(queue);
            debug!("task rejected, pool is shut down");
            // Dropear la tarea fuera del lock: su drop puede volver a llamar a submit
            drop(task);
            return TaskHandle::rejected();
        }

        let handle = TaskHandle::new();
        queue.tasks.push_back((task, Arc::clone(&handle)));
        self.shared.available.notify_one();
        handle
    }
}

impl Drop for ThreadPool {
    fn drop(&mut self) {
        self.shutdown();

        let current = thread::current().id();
        for worker in self.workers.drain(..) {
            // El último Arc puede soltarse desde un worker del propio pool
            if worker.thread().id() == current {
                continue;
            }
            let _ = worker.join();
        }
    }
}
