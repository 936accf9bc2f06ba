//! # Servidor TCP
//! src/server/tcp.rs
//!
//! Un único loop de `accept` en el thread principal; cada conexión se
//! entrega al [`WorkerPool`], que la atiende de forma bloqueante.

use super::connection::{self, ServerState};
use super::pool::WorkerPool;
use crate::config::Config;
use crate::error::ServerError;
use std::io;
use std::net::{SocketAddr, TcpListener};
use std::sync::Arc;

/// Servidor HTTP con pool de workers
pub struct Server {
    state: Arc<ServerState>,
    listener: TcpListener,
    pool: WorkerPool,
}

impl Server {
    /// Valida la configuración, hace bind y arranca el pool.
    ///
    /// Con `port = 0` el sistema elige un puerto libre; usar
    /// [`Server::local_addr`] para conocerlo.
    pub fn bind(config: &Config) -> Result<Self, ServerError> {
        config.validate()?;

        let address = config.address();
        let listener = TcpListener::bind(&address).map_err(|source| ServerError::Bind {
            address: address.clone(),
            source,
        })?;

        let pool = WorkerPool::new(config.worker_count(), config.queue_capacity)?;

        match config.directory() {
            Some(dir) => tracing::info!(directory = %dir.display(), "serving files"),
            None => tracing::warn!("no --directory given, /files will answer 500"),
        }
        tracing::info!(
            address = %listener.local_addr()?,
            workers = pool.size(),
            queue_capacity = config.queue_capacity,
            "listening"
        );

        Ok(Self {
            state: Arc::new(ServerState::from_config(config)),
            listener,
            pool,
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Loop de accept. Solo retorna si el pool se cerró.
    pub fn run(&self) -> Result<(), ServerError> {
        for stream in self.listener.incoming() {
            match stream {
                Ok(stream) => {
                    let state = Arc::clone(&self.state);
                    self.pool.execute(move || {
                        if let Err(e) = connection::handle_connection(stream, &state) {
                            tracing::warn!(error = %e, "connection error");
                        }
                    })?;
                }
                Err(e) => {
                    tracing::warn!(error = %e, "failed to accept connection");
                }
            }
        }

        Ok(())
    }
}
