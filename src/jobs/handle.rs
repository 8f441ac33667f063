//! # Handle de Finalización
//! src/jobs/handle.rs
//!
//! `CompletionHandle` compone dos esperas: que el job sea despachado
//! (etapa 1, el `CompletionSlot`) y que el executor termine de correrlo
//! (etapa 2, el `TaskHandle` guardado en el slot).

use crate::error::JobError;
use crate::jobs::job::CompletionSlot;
use crate::jobs::types::{HandleState, JobLifecycle};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// Handle que recibe quien llama a `submit`
#[derive(Clone)]
pub struct CompletionHandle {
    slot: Arc<CompletionSlot>,
}

impl CompletionHandle {
    pub(crate) fn new(slot: Arc<CompletionSlot>) -> Self {
        Self { slot }
    }

    /// true si el job terminó o fue cancelado. No bloquea.
    pub fn is_done(&self) -> bool {
        if self.slot.is_cancelled() {
            return true;
        }
        self.slot.try_get().is_some_and(|inner| inner.is_done())
    }

    /// Bloquea hasta que el job termine
    pub fn get(&self) -> Result<(), JobError> {
        let inner = self.slot.wait()?;
        let result = inner.get();
        self.finish(result)
    }

    /// Bloquea como máximo `timeout` en total, sumando el tiempo en cola y
    /// el tiempo de ejecución.
    pub fn get_timeout(&self, timeout: Duration) -> Result<(), JobError> {
        let start = Instant::now();
        let inner = self.slot.wait_timeout(timeout)?;

        // Sin presupuesto restante no se espera: una duración cero no es "sin límite"
        let remaining = timeout
            .checked_sub(start.elapsed())
            .filter(|remaining| !remaining.is_zero())
            .ok_or(JobError::Timeout)?;

        let result = inner.get_timeout(remaining);
        self.finish(result)
    }

    /// Cancela el job.
    ///
    /// Si la acción todavía no empezó, nunca va a correr. Si ya está
    /// corriendo, la cancelación se delega al executor y `may_interrupt`
    /// decide si se dispara el `Interrupt` de la tarea.
    pub fn cancel(&self, may_interrupt: bool) -> bool {
        if self.slot.cancel_pending() {
            debug!("job cancelled before running");
            return true;
        }

        match self.slot.lifecycle() {
            JobLifecycle::Cancelled | JobLifecycle::Pending => false,
            JobLifecycle::Running => {
                // La acción ya empezó, así que el despachador está por llenar el slot
                match self.slot.wait() {
                    Ok(inner) => {
                        let accepted = inner.cancel(may_interrupt);
                        debug!(accepted, may_interrupt, "cancel requested for running job");
                        accepted
                    }
                    Err(_) => false,
                }
            }
        }
    }

    /// true una vez aceptada una cancelación sobre este handle
    pub fn is_cancelled(&self) -> bool {
        self.slot.is_cancelled() || self.slot.try_get().is_some_and(|inner| inner.is_cancelled())
    }

    pub fn state(&self) -> HandleState {
        if self.is_cancelled() {
            return HandleState::Cancelled;
        }
        match self.slot.try_get() {
            None => HandleState::PendingDispatch,
            Some(inner) if inner.is_done() => HandleState::Completed,
            Some(_) => HandleState::Dispatched,
        }
    }

    /// Un job cancelado mientras esperaba su turno termina "bien" en el
    /// executor (la acción se salta), pero para quien espera es cancelado.
    fn finish(&self, result: Result<(), JobError>) -> Result<(), JobError> {
        if self.slot.is_cancelled() {
            Err(JobError::Cancelled)
        } else {
            result
        }
    }
}

impl std::fmt::Debug for CompletionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionHandle")
            .field("state", &self.state())
            .finish()
    }
}
