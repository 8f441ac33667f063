//! # Configuración
//! src/config.rs
//!
//! Configuración del pool de workers y del binario de demo, con soporte
//! para argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./sequential_job_queue --workers 4 --jobs 5 --job-ms 200 --timeout-ms 2000
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! QUEUE_WORKERS=2 QUEUE_JOBS=10 ./sequential_job_queue
//! ```

use crate::error::ConfigError;
use clap::Parser;
use serde::Serialize;
use std::time::Duration;

/// Configuración de la cola y su executor
#[derive(Debug, Clone, Parser, Serialize)]
#[command(name = "sequential_job_queue")]
#[command(about = "Cola secuencial de jobs sobre un pool de workers")]
#[command(version = "0.1.0")]
pub struct Config {
    // === Executor ===

    /// Número de workers del pool
    #[arg(short, long, default_value = "4", env = "QUEUE_WORKERS")]
    pub workers: usize,

    /// Prefijo de los nombres de los threads del pool
    #[arg(long = "thread-name", default_value = "job-worker", env = "QUEUE_THREAD_NAME")]
    pub thread_name: String,

    // === Demo ===

    /// Cantidad de jobs a encolar
    #[arg(short, long, default_value = "5", env = "QUEUE_JOBS")]
    pub jobs: usize,

    /// Duración de cada job en milisegundos
    #[arg(long = "job-ms", default_value = "200", env = "QUEUE_JOB_MS")]
    pub job_ms: u64,

    /// Timeout total para esperar el último job, en milisegundos
    #[arg(long = "timeout-ms", default_value = "5000", env = "QUEUE_TIMEOUT_MS")]
    pub timeout_ms: u64,

    /// Filtro de logging por defecto (si RUST_LOG no está definido)
    #[arg(long = "log", default_value = "info", env = "QUEUE_LOG")]
    pub log_filter: String,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    pub fn job_duration(&self) -> Duration {
        Duration::from_millis(self.job_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Valida la configuración
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        if self.thread_name.is_empty() {
            return Err(ConfigError::EmptyThreadName);
        }
        if self.timeout_ms == 0 {
            return Err(ConfigError::ZeroTimeout);
        }
        Ok(())
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            workers: 4,
            thread_name: "job-worker".to_string(),
            jobs: 5,
            job_ms: 200,
            timeout_ms: 5_000,
            log_filter: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::PoolConfig;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.workers, 4);
        assert_eq!(config.jobs, 5);
        assert_eq!(config.job_duration(), Duration::from_millis(200));
        assert_eq!(config.timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_validate_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_workers() {
        let mut config = Config::default();
        config.workers = 0;
        assert_eq!(config.validate(), Err(ConfigError::NoWorkers));
    }

    #[test]
    fn test_validate_invalid_timeout() {
        let mut config = Config::default();
        config.timeout_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroTimeout));
    }

    #[test]
    fn test_parse_args() {
        let config = Config::try_parse_from([
            "sequential_job_queue",
            "--workers",
            "2",
            "--jobs",
            "10",
            "--job-ms",
            "50",
        ])
        .unwrap();

        assert_eq!(config.workers, 2);
        assert_eq!(config.jobs, 10);
        assert_eq!(config.job_ms, 50);
        assert_eq!(config.thread_name, "job-worker");
    }

    #[test]
    fn test_pool_config_from_config() {
        let mut config = Config::default();
        config.workers = 3;
        config.thread_name = "seq".to_string();

        let pool = PoolConfig::from_config(&config);
        assert_eq!(pool.workers, 3);
        assert_eq!(pool.thread_name, "seq");
    }
}
