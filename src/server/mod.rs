//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! 1. `tcp`: escucha en un puerto y acepta conexiones
//! 2. `pool`: workers que atienden las conexiones en paralelo
//! 3. `connection`: lee, procesa y responde un request por conexión

pub mod connection;
pub mod pool;
pub mod tcp;

pub use connection::ServerState;
pub use pool::WorkerPool;
pub use tcp::Server;
