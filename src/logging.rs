//! # Logging
//! src/logging.rs
//!
//! Inicializa `tracing` con un subscriber `fmt`. `RUST_LOG` tiene prioridad
//! sobre el nivel pasado por CLI.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Instala el subscriber global. Llamar una sola vez, al arrancar.
pub fn init(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("minihttp={}", default_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_thread_names(true))
        .init();
}
