//! # Tipos del Sistema de Jobs
//! src/jobs/types.rs
//!
//! Estados de un job y estadísticas de la cola.

use serde::Serialize;

/// Ciclo de vida de la acción de un job, guardado en un `AtomicU8`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub(crate) enum JobLifecycle {
    /// La acción todavía no empezó
    Pending = 0,

    /// El wrapper de despacho empezó a ejecutar la acción
    Running = 1,

    /// Cancelado antes de empezar; la acción nunca corre
    Cancelled = 2,
}

impl From<u8> for JobLifecycle {
    fn from(value: u8) -> Self {
        match value {
            0 => JobLifecycle::Pending,
            1 => JobLifecycle::Running,
            _ => JobLifecycle::Cancelled,
        }
    }
}

/// Estado observable de un `CompletionHandle`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleState {
    /// Esperando en la cola, todavía no entregado al executor
    PendingDispatch,

    /// Entregado al executor, todavía no terminó
    Dispatched,

    /// Terminó (con éxito o con error registrado)
    Completed,

    /// Cancelado antes o durante la ejecución
    Cancelled,
}

impl HandleState {
    pub fn as_str(&self) -> &'static str {
        match self {
            HandleState::PendingDispatch => "pending_dispatch",
            HandleState::Dispatched => "dispatched",
            HandleState::Completed => "completed",
            HandleState::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, HandleState::Completed | HandleState::Cancelled)
    }
}

/// Estadísticas de una cola
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    /// Jobs esperando en la cola
    pub pending: usize,

    /// Hay un job entregado al executor
    pub executing: bool,

    /// Total de llamadas a `submit`
    pub submitted: u64,

    /// Acciones que terminaron sin error
    pub completed: u64,

    /// Acciones que retornaron error o hicieron panic
    pub failed: u64,

    /// Jobs cancelados antes de correr (la acción se saltó)
    pub skipped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_from_u8() {
        assert_eq!(JobLifecycle::from(0), JobLifecycle::Pending);
        assert_eq!(JobLifecycle::from(1), JobLifecycle::Running);
        assert_eq!(JobLifecycle::from(2), JobLifecycle::Cancelled);
    }

    #[test]
    fn test_handle_state_terminal() {
        assert!(!HandleState::PendingDispatch.is_terminal());
        assert!(!HandleState::Dispatched.is_terminal());
        assert!(HandleState::Completed.is_terminal());
        assert!(HandleState::Cancelled.is_terminal());
        assert_eq!(HandleState::PendingDispatch.as_str(), "pending_dispatch");
    }

    #[test]
    fn test_stats_json() {
        let stats = QueueStats {
            pending: 2,
            executing: true,
            submitted: 3,
            ..QueueStats::default()
        };
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["pending"], 2);
        assert_eq!(json["executing"], true);
        assert_eq!(json["submitted"], 3);
        assert_eq!(json["failed"], 0);
    }
}
