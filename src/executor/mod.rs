//! # Servicio de Ejecución
//!
//! Interfaz que la cola consume para correr trabajo fuera del thread que
//! llama a `submit`, más dos implementaciones:
//!
//! - `ThreadPool`: pool fijo de workers
//! - `ManualExecutor`: ejecuta solo cuando se le pide (tests y demos)

pub mod manual;
pub mod pool;
pub mod task;

pub use manual::ManualExecutor;
pub use pool::{PoolConfig, ThreadPool};
pub use task::{boxed, Interrupt, Task, TaskHandle};

use std::sync::Arc;

/// Servicio que acepta trabajo y lo ejecuta de forma asíncrona
pub trait ExecutorService: Send + Sync {
    /// Entrega una tarea para ejecución y retorna el handle de su finalización.
    ///
    /// No debe bloquear esperando a la tarea. Si la tarea se descarta sin
    /// ejecutarse, el `Task` debe ser dropeado (nunca filtrado).
    fn submit(&self, task: Task) -> Arc<TaskHandle>;
}
