//! # Logging
//! src/telemetry.rs

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Inicializa `tracing` con filtro desde `RUST_LOG`
pub fn init_telemetry(default_filter: &str) {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
