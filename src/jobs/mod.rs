//! # Sistema de Jobs
//!
//! Cola secuencial: los jobs se ejecutan de a uno, en el orden en que se
//! enviaron, sobre un `ExecutorService`.
//!
//! - `queue`: `SequentialJobQueue` (admisión FIFO y avance)
//! - `handle`: `CompletionHandle` (espera en dos etapas, timeout, cancelación)
//! - `job`: `Job` y su `CompletionSlot`
//! - `types`: estados y estadísticas

pub mod handle;
pub mod job;
pub mod queue;
pub mod types;

pub use handle::CompletionHandle;
pub use queue::SequentialJobQueue;
pub use types::{HandleState, QueueStats};
