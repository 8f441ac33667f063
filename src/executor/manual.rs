//! # Executor Manual
//! src/executor/manual.rs
//!
//! Executor determinístico: guarda las tareas recibidas y solo las ejecuta
//! (en el thread que llama) cuando se invoca `run_next`.

use crate::executor::task::{Task, TaskHandle};
use crate::executor::ExecutorService;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError};

#[derive(Default)]
struct ManualState {
    submitted: VecDeque<(Task, Arc<TaskHandle>)>,
    total: usize,
}

/// Executor que corre tareas bajo demanda
#[derive(Default)]
pub struct ManualExecutor {
    state: Mutex<ManualState>,
}

impl ManualExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ejecuta la tarea más antigua. Retorna false si no había ninguna.
    pub fn run_next(&self) -> bool {
        // La tarea corre sin el lock: al terminar puede enviar la siguiente
        let next = self.lock_state().submitted.pop_front();
        match next {
            Some((task, handle)) => {
                handle.run(task);
                true
            }
            None => false,
        }
    }

    /// Ejecuta tareas hasta vaciar la cola; retorna cuántas corrió
    pub fn run_all(&self) -> usize {
        let mut ran = 0;
        while self.run_next() {
            ran += 1;
        }
        ran
    }

    /// Tareas recibidas que todavía no se ejecutaron
    pub fn pending(&self) -> usize {
        self.lock_state().submitted.len()
    }

    /// Total de llamadas a `submit` desde la creación
    pub fn total_submitted(&self) -> usize {
        self.lock_state().total
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ManualState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ExecutorService for ManualExecutor {
    fn submit(&self, task: Task) -> Arc<TaskHandle> {
        let handle = TaskHandle::new();
        let mut state = self.lock_state();
        state.total += 1;
        state.submitted.push_back((task, Arc::clone(&handle)));
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::task::boxed;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_nothing_runs_until_asked() {
        let executor = ManualExecutor::new();
        let ran = Arc::new(AtomicBool::new(false));
        let ran_clone = Arc::clone(&ran);

        let handle = executor.submit(boxed(move |_| {
            ran_clone.store(true, Ordering::SeqCst);
            Ok(())
        }));

        assert_eq!(executor.pending(), 1);
        assert!(!ran.load(Ordering::SeqCst));
        assert!(!handle.is_done());

        assert!(executor.run_next());
        assert!(ran.load(Ordering::SeqCst));
        assert!(handle.is_done());
        assert_eq!(executor.pending(), 0);
        assert_eq!(executor.total_submitted(), 1);
    }

    #[test]
    fn test_run_next_on_empty() {
        let executor = ManualExecutor::new();
        assert!(!executor.run_next());
        assert_eq!(executor.run_all(), 0);
    }
}
