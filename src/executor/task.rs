//! # Handle de Tarea del Executor
//! src/executor/task.rs
//!
//! `TaskHandle` representa la finalización de un trabajo entregado al
//! servicio de ejecución (el "handle interno" de un job). `Interrupt` es el
//! mecanismo cooperativo de interrupción que recibe cada tarea.

use crate::error::{Interrupted, JobError};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Trabajo que corre en un worker del executor
pub type Task = Box<dyn FnOnce(&Interrupt) -> anyhow::Result<()> + Send + 'static>;

/// Empaqueta un closure como `Task`
pub fn boxed<F>(f: F) -> Task
where
    F: FnOnce(&Interrupt) -> anyhow::Result<()> + Send + 'static,
{
    Box::new(f)
}

/// Señal de interrupción compartida entre el handle y la tarea en ejecución
#[derive(Clone, Default)]
pub struct Interrupt {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl Interrupt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marca la interrupción y despierta a quien esté en `sleep`
    pub fn interrupt(&self) {
        let (flag, condvar) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner) = true;
        condvar.notify_all();
    }

    pub fn is_interrupted(&self) -> bool {
        let (flag, _) = &*self.inner;
        *flag.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Retorna `Err(Interrupted)` si la tarea fue interrumpida
    pub fn check(&self) -> Result<(), Interrupted> {
        if self.is_interrupted() {
            Err(Interrupted)
        } else {
            Ok(())
        }
    }

    /// Duerme `duration`, despertando antes si llega una interrupción
    pub fn sleep(&self, duration: Duration) -> Result<(), Interrupted> {
        let (flag, condvar) = &*self.inner;
        let guard = flag.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = condvar
            .wait_timeout_while(guard, duration, |interrupted| !*interrupted)
            .unwrap_or_else(PoisonError::into_inner);

        if *guard {
            Err(Interrupted)
        } else {
            Ok(())
        }
    }
}

impl std::fmt::Debug for Interrupt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interrupt")
            .field("interrupted", &self.is_interrupted())
            .finish()
    }
}

/// Estados posibles de una tarea en el executor
#[derive(Debug, Clone)]
enum TaskState {
    /// En la cola del executor, todavía no empezó
    Pending,

    /// Un worker la está ejecutando
    Running,

    /// Terminó (con éxito o con error)
    Finished(Result<(), JobError>),

    /// Fue cancelada
    Cancelled,
}

/// Handle sobre la finalización de una tarea del executor
pub struct TaskHandle {
    state: Mutex<TaskState>,
    done: Condvar,
    interrupt: Interrupt,
}

impl TaskHandle {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(TaskState::Pending),
            done: Condvar::new(),
            interrupt: Interrupt::new(),
        })
    }

    /// Handle ya terminado con `JobError::Rejected`
    pub fn rejected() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(TaskState::Finished(Err(JobError::Rejected))),
            done: Condvar::new(),
            interrupt: Interrupt::new(),
        })
    }

    /// Ejecuta la tarea en el thread actual y registra el resultado.
    ///
    /// Si el handle fue cancelado antes de empezar, la tarea se descarta sin
    /// ejecutarse. Los panics se capturan y quedan como `JobError::Panicked`.
    pub fn run(&self, task: Task) {
        {
            let mut state = self.lock_state();
            match *state {
                TaskState::Pending => *state = TaskState::Running,
                _ => return,
            }
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| task(&self.interrupt)));
        let result = match outcome {
            Ok(Ok(())) => Ok(()),
            Ok(Err(error)) => Err(JobError::Failed(Arc::new(error))),
            Err(payload) => Err(JobError::Panicked(panic_message(payload.as_ref()))),
        };

        let mut state = self.lock_state();
        // Una cancelación durante la ejecución tiene prioridad sobre el resultado
        if matches!(*state, TaskState::Running) {
            *state = TaskState::Finished(result);
        }
        self.done.notify_all();
    }

    pub fn is_done(&self) -> bool {
        matches!(
            *self.lock_state(),
            TaskState::Finished(_) | TaskState::Cancelled
        )
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(*self.lock_state(), TaskState::Cancelled)
    }

    /// Bloquea hasta que la tarea termine
    pub fn get(&self) -> Result<(), JobError> {
        let state = self.lock_state();
        let state = self
            .done
            .wait_while(state, |s| is_unfinished(s))
            .unwrap_or_else(PoisonError::into_inner);
        outcome_of(&state)
    }

    /// Bloquea como máximo `timeout`; `JobError::Timeout` si no terminó
    pub fn get_timeout(&self, timeout: Duration) -> Result<(), JobError> {
        let Some(deadline) = Instant::now().checked_add(timeout) else {
            return self.get();
        };
        let mut state = self.lock_state();

        while is_unfinished(&state) {
            let now = Instant::now();
            if now >= deadline {
                return Err(JobError::Timeout);
            }
            state = self
                .done
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }

        outcome_of(&state)
    }

    /// Cancela la tarea.
    ///
    /// Pendiente: no se ejecutará. En ejecución: queda cancelada y, si
    /// `may_interrupt`, se dispara su `Interrupt`. Retorna false si ya había
    /// terminado o estaba cancelada.
    pub fn cancel(&self, may_interrupt: bool) -> bool {
        let mut state = self.lock_state();
        match *state {
            TaskState::Pending => {
                *state = TaskState::Cancelled;
            }
            TaskState::Running => {
                *state = TaskState::Cancelled;
                if may_interrupt {
                    self.interrupt.interrupt();
                }
            }
            TaskState::Finished(_) | TaskState::Cancelled => return false,
        }
        self.done.notify_all();
        true
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, TaskState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskHandle")
            .field("state", &*self.lock_state())
            .finish()
    }
}

fn is_unfinished(state: &TaskState) -> bool {
    matches!(state, TaskState::Pending | TaskState::Running)
}

fn outcome_of(state: &TaskState) -> Result<(), JobError> {
    match state {
        TaskState::Finished(result) => result.clone(),
        TaskState::Cancelled => Err(JobError::Cancelled),
        TaskState::Pending | TaskState::Running => Err(JobError::Timeout),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_run_success() {
        let handle = TaskHandle::new();
        assert!(!handle.is_done());

        handle.run(boxed(|_| Ok(())));

        assert!(handle.is_done());
        assert!(handle.get().is_ok());
    }

    #[test]
    fn test_run_error_is_recorded() {
        let handle = TaskHandle::new();
        handle.run(boxed(|_| Err(anyhow::anyhow!("bad input"))));

        let err = handle.get().unwrap_err();
        assert!(matches!(err, JobError::Failed(_)));
        assert!(err.to_string().contains("bad input"));
    }

    #[test]
    fn test_run_panic_is_recorded() {
        let handle = TaskHandle::new();
        handle.run(boxed(|_| panic!("kaboom")));

        match handle.get() {
            Err(JobError::Panicked(message)) => assert_eq!(message, "kaboom"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_cancel_pending_skips_task() {
        let handle = TaskHandle::new();
        assert!(handle.cancel(false));

        let ran = Arc::new(Mutex::new(false));
        let ran_clone = Arc::clone(&ran);
        handle.run(boxed(move |_| {
            *ran_clone.lock().unwrap() = true;
            Ok(())
        }));

        assert!(!*ran.lock().unwrap());
        assert!(handle.is_cancelled());
        assert!(handle.is_done());
        assert!(matches!(handle.get(), Err(JobError::Cancelled)));
    }

    #[test]
    fn test_cancel_finished_returns_false() {
        let handle = TaskHandle::new();
        handle.run(boxed(|_| Ok(())));
        assert!(!handle.cancel(true));
        assert!(!handle.is_cancelled());
    }

    #[test]
    fn test_get_timeout_expires() {
        let handle = TaskHandle::new();
        let result = handle.get_timeout(Duration::from_millis(20));
        assert!(matches!(result, Err(JobError::Timeout)));
    }

    #[test]
    fn test_get_timeout_zero_on_finished() {
        let handle = TaskHandle::new();
        handle.run(boxed(|_| Ok(())));
        assert!(handle.get_timeout(Duration::ZERO).is_ok());
    }

    #[test]
    fn test_get_timeout_huge_budget_waits_for_result() {
        let handle = TaskHandle::new();

        let runner = {
            let handle = Arc::clone(&handle);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(20));
                handle.run(boxed(|_| Err(anyhow::anyhow!("late failure"))));
            })
        };

        assert!(matches!(
            handle.get_timeout(Duration::MAX),
            Err(JobError::Failed(_))
        ));
        runner.join().unwrap();
    }

    #[test]
    fn test_cancel_running_interrupts() {
        let handle = TaskHandle::new();
        let interrupted = Arc::new(Mutex::new(false));

        let runner = {
            let handle = Arc::clone(&handle);
            let interrupted = Arc::clone(&interrupted);
            thread::spawn(move || {
                handle.run(boxed(move |interrupt| {
                    if interrupt.sleep(Duration::from_secs(5)).is_err() {
                        *interrupted.lock().unwrap() = true;
                    }
                    Ok(())
                }));
            })
        };

        thread::sleep(Duration::from_millis(50));
        assert!(handle.cancel(true));
        runner.join().unwrap();

        assert!(*interrupted.lock().unwrap());
        assert!(matches!(handle.get(), Err(JobError::Cancelled)));
    }

    #[test]
    fn test_rejected_handle() {
        let handle = TaskHandle::rejected();
        assert!(handle.is_done());
        assert!(matches!(handle.get(), Err(JobError::Rejected)));
    }

    #[test]
    fn test_interrupt_sleep_without_interrupt() {
        let interrupt = Interrupt::new();
        assert!(interrupt.sleep(Duration::from_millis(5)).is_ok());
        assert!(interrupt.check().is_ok());

        interrupt.interrupt();
        assert_eq!(interrupt.check(), Err(Interrupted));
        assert_eq!(interrupt.sleep(Duration::from_secs(5)), Err(Interrupted));
    }
}
