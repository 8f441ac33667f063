//! # Estructura de Job
//!
//! Un `Job` une la acción del usuario con su `CompletionSlot`: la primera
//! etapa del handle, que se resuelve cuando el job se entrega al executor.

use crate::error::JobError;
use crate::executor::task::{Task, TaskHandle};
use crate::jobs::types::JobLifecycle;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Un job enviado a la cola
pub(crate) struct Job {
    pub(crate) action: Task,
    pub(crate) slot: Arc<CompletionSlot>,
}

impl Job {
    pub(crate) fn new(action: Task) -> Self {
        Self {
            action,
            slot: Arc::new(CompletionSlot::new()),
        }
    }
}

/// Celda de asignación única con el `TaskHandle` del executor, más el
/// estado atómico que decide entre "la acción corre" y "cancelado".
pub(crate) struct CompletionSlot {
    lifecycle: AtomicU8,
    handle: Mutex<Option<Arc<TaskHandle>>>,
    resolved: Condvar,
}

impl CompletionSlot {
    fn new() -> Self {
        Self {
            lifecycle: AtomicU8::new(JobLifecycle::Pending as u8),
            handle: Mutex::new(None),
            resolved: Condvar::new(),
        }
    }

    /// Escribe el handle del executor. Solo el despachador lo llama, una vez.
    pub(crate) fn fill(&self, handle: Arc<TaskHandle>) {
        let mut slot = self.lock_handle();
        debug_assert!(slot.is_none(), "completion slot filled twice");
        *slot = Some(handle);
        self.resolved.notify_all();
    }

    pub(crate) fn try_get(&self) -> Option<Arc<TaskHandle>> {
        self.lock_handle().clone()
    }

    /// Pasa a `Running` justo antes de invocar la acción.
    /// Retorna false si el job ya fue cancelado.
    pub(crate) fn begin(&self) -> bool {
        self.transition(JobLifecycle::Pending, JobLifecycle::Running)
    }

    /// Cancela un job cuya acción todavía no empezó.
    /// Retorna false si la acción ya empezó o si ya estaba cancelado.
    pub(crate) fn cancel_pending(&self) -> bool {
        if !self.transition(JobLifecycle::Pending, JobLifecycle::Cancelled) {
            return false;
        }
        // Tomar el lock antes de notificar para no perder el wakeup
        let _slot = self.lock_handle();
        self.resolved.notify_all();
        true
    }

    pub(crate) fn lifecycle(&self) -> JobLifecycle {
        JobLifecycle::from(self.lifecycle.load(Ordering::Acquire))
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.lifecycle() == JobLifecycle::Cancelled
    }

    /// Bloquea hasta que el job sea despachado o cancelado
    pub(crate) fn wait(&self) -> Result<Arc<TaskHandle>, JobError> {
        let slot = self.lock_handle();
        let slot = self
            .resolved
            .wait_while(slot, |h| h.is_none() && !self.is_cancelled())
            .unwrap_or_else(PoisonError::into_inner);
        self.resolution(&slot)
    }

    /// Como `wait`, pero falla con `JobError::Timeout` pasado `timeout`
    pub(crate) fn wait_timeout(&self, timeout: Duration) -> Result<Arc<TaskHandle>, JobError> {
        // Un timeout que no entra en un `Instant` equivale a esperar sin límite
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.wait();
        };
        let mut slot = self.lock_handle();

        while slot.is_none() && !self.is_cancelled() {
            let now = Instant::now();
            if now >= deadline {
                return Err(JobError::Timeout);
            }
            slot = self
                .resolved
                .wait_timeout(slot, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }

        self.resolution(&slot)
    }

    fn resolution(&self, slot: &Option<Arc<TaskHandle>>) -> Result<Arc<TaskHandle>, JobError> {
        if self.is_cancelled() {
            return Err(JobError::Cancelled);
        }
        slot.clone().ok_or(JobError::Cancelled)
    }

    fn transition(&self, from: JobLifecycle, to: JobLifecycle) -> bool {
        self.lifecycle
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    fn lock_handle(&self) -> MutexGuard<'_, Option<Arc<TaskHandle>>> {
        self.handle.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::task::boxed;
    use std::thread;

    fn job() -> Job {
        Job::new(boxed(|_| Ok(())))
    }

    #[test]
    fn test_new_job_is_pending() {
        let job = job();
        assert_eq!(job.slot.lifecycle(), JobLifecycle::Pending);
        assert!(job.slot.try_get().is_none());
    }

    #[test]
    fn test_begin_and_cancel_are_exclusive() {
        let job = job();
        assert!(job.slot.begin());
        assert!(!job.slot.cancel_pending());
        assert_eq!(job.slot.lifecycle(), JobLifecycle::Running);

        let other = self::job();
        assert!(other.slot.cancel_pending());
        assert!(!other.slot.begin());
        assert!(!other.slot.cancel_pending());
        assert!(other.slot.is_cancelled());
    }

    #[test]
    fn test_wait_returns_filled_handle() {
        let job = job();
        let slot = Arc::clone(&job.slot);

        let filler = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            slot.fill(TaskHandle::new());
        });

        assert!(job.slot.wait().is_ok());
        filler.join().unwrap();
    }

    #[test]
    fn test_wait_wakes_on_cancel() {
        let job = job();
        let slot = Arc::clone(&job.slot);

        let canceller = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            assert!(slot.cancel_pending());
        });

        assert!(matches!(job.slot.wait(), Err(JobError::Cancelled)));
        canceller.join().unwrap();
    }

    #[test]
    fn test_wait_timeout_expires() {
        let job = job();
        let result = job.slot.wait_timeout(Duration::from_millis(10));
        assert!(matches!(result, Err(JobError::Timeout)));
    }

    #[test]
    fn test_wait_timeout_with_huge_budget() {
        let job = job();
        job.slot.fill(TaskHandle::new());
        assert!(job.slot.wait_timeout(Duration::MAX).is_ok());

        let other = self::job();
        assert!(other.slot.cancel_pending());
        assert!(matches!(
            other.slot.wait_timeout(Duration::MAX),
            Err(JobError::Cancelled)
        ));
    }
}
