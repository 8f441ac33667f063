//! # Tipos de Error
//! src/error.rs
//!
//! Errores visibles para quien usa la cola. Las fallas de un job nunca
//! detienen la cola: se guardan y solo aparecen al llamar `get` sobre el
//! handle de ese job.

use std::sync::Arc;
use thiserror::Error;

/// Resultado de esperar un job
#[derive(Error, Debug, Clone)]
pub enum JobError {
    /// La acción del job retornó un error
    #[error("job failed: {0}")]
    Failed(Arc<anyhow::Error>),

    /// La acción del job hizo panic
    #[error("job panicked: {0}")]
    Panicked(String),

    /// El job fue cancelado (antes o durante su ejecución)
    #[error("job was cancelled")]
    Cancelled,

    /// Se agotó el tiempo de espera en `get_timeout`
    #[error("timed out waiting for job")]
    Timeout,

    /// El servicio de ejecución rechazó el trabajo (pool detenido)
    #[error("executor rejected the job")]
    Rejected,
}

impl JobError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, JobError::Timeout)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, JobError::Cancelled)
    }

    /// true si el error viene de la propia acción (error o panic)
    pub fn is_execution_failure(&self) -> bool {
        matches!(self, JobError::Failed(_) | JobError::Panicked(_))
    }
}

/// Una espera interrumpible fue interrumpida por `cancel(true)`
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("job was interrupted")]
pub struct Interrupted;

/// Errores al construir el pool de workers
#[derive(Error, Debug)]
pub enum PoolError {
    #[error("invalid pool configuration: {0}")]
    InvalidConfig(#[from] ConfigError),

    #[error("failed to spawn worker thread: {0}")]
    Spawn(#[from] std::io::Error),
}

/// Errores de validación de configuración
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("workers must be >= 1")]
    NoWorkers,

    #[error("thread name prefix must not be empty")]
    EmptyThreadName,

    #[error("timeout must be > 0")]
    ZeroTimeout,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_display_includes_cause() {
        let err = JobError::Failed(Arc::new(anyhow::anyhow!("disk full")));
        assert_eq!(err.to_string(), "job failed: disk full");
        assert!(err.is_execution_failure());
        assert!(!err.is_timeout());
    }

    #[test]
    fn test_clone_keeps_cause() {
        let err = JobError::Failed(Arc::new(anyhow::anyhow!("boom")));
        let copy = err.clone();
        assert_eq!(err.to_string(), copy.to_string());
    }

    #[test]
    fn test_kinds() {
        assert!(JobError::Timeout.is_timeout());
        assert!(JobError::Cancelled.is_cancelled());
        assert!(!JobError::Rejected.is_execution_failure());
    }
}
