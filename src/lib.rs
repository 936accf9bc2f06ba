//! # minihttp
//! src/lib.rs
//!
//! Servidor HTTP/1.1 mínimo: un request por conexión, cuatro rutas fijas
//! y compresión gzip opcional.
//!
//! ## Arquitectura
//!
//! - `http`: codec de requests/responses y negociación de encoding
//! - `router`: endpoint → ruta, con fallback 404
//! - `handlers`: `/`, `/user-agent`, `/echo`, `/files`
//! - `server`: acceptor TCP, pool de workers y atención de conexiones
//! - `config`: CLI y variables de entorno
//! - `logging`: inicialización de `tracing`
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use minihttp::config::Config;
//! use minihttp::server::Server;
//!
//! let config = Config::default();
//! let server = Server::bind(&config).expect("Error al iniciar servidor");
//! server.run().expect("Error en el loop de accept");
//! ```

pub mod config;
pub mod error;
pub mod handlers;
pub mod http;
pub mod logging;
pub mod router;
pub mod server;
