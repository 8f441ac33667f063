//! # Cola Secuencial de Jobs
//! src/jobs/queue.rs
//!
//! Cola FIFO que corre un job a la vez sobre un `ExecutorService`.
//!
//! No hay thread propio ni polling: el siguiente job se despacha desde el
//! final del job anterior (`advance`), así que una cola vacía no consume
//! recursos.

use crate::executor::task::{boxed, Interrupt};
use crate::executor::ExecutorService;
use crate::jobs::handle::CompletionHandle;
use crate::jobs::job::Job;
use crate::jobs::types::QueueStats;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use tracing::{debug, warn};

/// Estado protegido por el lock de la cola
struct QueueState {
    /// Jobs esperando, en orden de ejecución
    pending: VecDeque<Job>,

    /// true mientras haya un job entregado al executor que no terminó
    executing: bool,

    /// Un thread está dentro de `drain` entregando jobs al executor
    draining: bool,

    /// El job despachado terminó mientras `drain` seguía activo; `drain`
    /// debe despachar el siguiente en vez de retornar
    advance_requested: bool,
}

/// Contadores para `stats()`
#[derive(Default)]
struct Counters {
    submitted: AtomicU64,
    completed: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
}

struct QueueInner {
    executor: Arc<dyn ExecutorService>,
    state: Mutex<QueueState>,
    counters: Counters,
}

/// Cola secuencial de jobs
#[derive(Clone)]
pub struct SequentialJobQueue {
    inner: Arc<QueueInner>,
}

impl SequentialJobQueue {
    /// Crea una cola sobre `executor`. No envía nada al executor.
    pub fn create(executor: Arc<dyn ExecutorService>) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                executor,
                state: Mutex::new(QueueState {
                    pending: VecDeque::new(),
                    executing: false,
                    draining: false,
                    advance_requested: false,
                }),
                counters: Counters::default(),
            }),
        }
    }

    /// Encola un job.
    ///
    /// Si la cola está ociosa el job se despacha de inmediato; si no, espera
    /// a que terminen todos los enviados antes. Nunca bloquea esperando la
    /// ejecución y nunca falla: los errores llegan por el handle.
    pub fn submit<F>(&self, action: F) -> CompletionHandle
    where
        F: FnOnce(&Interrupt) -> anyhow::Result<()> + Send + 'static,
    {
        let job = Job::new(boxed(action));
        let handle = CompletionHandle::new(Arc::clone(&job.slot));
        self.inner.counters.submitted.fetch_add(1, Ordering::Relaxed);

        let to_dispatch = {
            let mut state = self.inner.lock_state();
            if state.executing {
                state.pending.push_back(job);
                debug!(pending = state.pending.len(), "job queued");
                None
            } else {
                state.executing = true;
                state.draining = true;
                Some(job)
            }
        };

        // `executing` queda en true, así que nadie más despacha mientras tanto
        if let Some(job) = to_dispatch {
            debug!("queue idle, dispatching job immediately");
            QueueInner::drain(&self.inner, job);
        }

        handle
    }

    /// Jobs esperando turno (sin contar el que está corriendo)
    pub fn pending_len(&self) -> usize {
        self.inner.lock_state().pending.len()
    }

    pub fn is_idle(&self) -> bool {
        !self.inner.lock_state().executing
    }

    pub fn stats(&self) -> QueueStats {
        let (pending, executing) = {
            let state = self.inner.lock_state();
            (state.pending.len(), state.executing)
        };
        let counters = &self.inner.counters;

        QueueStats {
            pending,
            executing,
            submitted: counters.submitted.load(Ordering::Relaxed),
            completed: counters.completed.load(Ordering::Relaxed),
            failed: counters.failed.load(Ordering::Relaxed),
            skipped: counters.skipped.load(Ordering::Relaxed),
        }
    }
}

impl QueueInner {
    /// Entrega `job` al executor y guarda el handle resultante en su slot
    fn dispatch(this: &Arc<Self>, job: Job) {
        let Job { action, slot } = job;
        let guard = AdvanceGuard {
            queue: Arc::clone(this),
        };
        let task_slot = Arc::clone(&slot);

        let inner_handle = this.executor.submit(boxed(move |interrupt| {
            let advance = guard;

            if !task_slot.begin() {
                debug!("skipping cancelled job");
                advance.queue.counters.skipped.fetch_add(1, Ordering::Relaxed);
                return Ok(());
            }

            let result = action(interrupt);
            match &result {
                Ok(()) => {
                    advance.queue.counters.completed.fetch_add(1, Ordering::Relaxed);
                }
                Err(error) => {
                    warn!(error = %error, "job failed");
                    advance.queue.counters.failed.fetch_add(1, Ordering::Relaxed);
                }
            }
            result
        }));

        slot.fill(inner_handle);
    }

    /// Despacha el siguiente job pendiente o marca la cola como ociosa.
    ///
    /// Si hay un `drain` activo (por ejemplo, el executor rechazó la tarea
    /// dentro de `submit`), solo deja el pedido anotado y ese `drain` lo
    /// atiende. Así la pila no crece con cada job rechazado.
    fn advance(this: &Arc<Self>) {
        let next = {
            let mut state = this.lock_state();
            if state.draining {
                state.advance_requested = true;
                return;
            }
            match Self::pop_next(&mut state) {
                Some(job) => {
                    state.draining = true;
                    job
                }
                None => return,
            }
        };

        Self::drain(this, next);
    }

    /// Despacha `job` y sigue con los pendientes mientras los jobs
    /// despachados terminen antes de que `dispatch` retorne.
    /// Quien llama ya puso `draining` en true.
    fn drain(this: &Arc<Self>, mut job: Job) {
        loop {
            Self::dispatch(this, job);

            let mut state = this.lock_state();
            if !state.advance_requested {
                state.draining = false;
                return;
            }
            state.advance_requested = false;
            match Self::pop_next(&mut state) {
                Some(next) => job = next,
                None => {
                    state.draining = false;
                    return;
                }
            }
        }
    }

    /// Saca el siguiente job; si no hay, marca la cola como ociosa
    fn pop_next(state: &mut QueueState) -> Option<Job> {
        let next = state.pending.pop_front();
        if next.is_none() {
            state.executing = false;
            debug!("queue drained, now idle");
        }
        next
    }

    fn lock_state(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Corre `advance` al soltarse: al terminar la acción, si hace panic, o si
/// el executor descarta la tarea sin ejecutarla.
struct AdvanceGuard {
    queue: Arc<QueueInner>,
}

impl Drop for AdvanceGuard {
    fn drop(&mut self) {
        if thread::panicking() {
            warn!("job panicked");
            self.queue.counters.failed.fetch_add(1, Ordering::Relaxed);
        }
        QueueInner::advance(&self.queue);
    }
}
