//! # Errores del Servidor
//! src/error.rs
//!
//! Todos los errores tipados del crate. Los errores de parsing y de lectura
//! nunca llegan al cliente como tales: el dispatcher los convierte en una
//! respuesta HTTP (400, 408, 413) antes de cerrar la conexión.

use std::io;
use thiserror::Error;

/// Errores al parsear un request (familia "MalformedRequest")
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// No llegó ningún byte útil
    #[error("Empty request")]
    EmptyRequest,

    /// No existe la línea vacía que separa headers del body
    #[error("Missing blank line between headers and body")]
    MissingHeaderBoundary,

    /// Los headers no son UTF-8 válido
    #[error("Request head is not valid UTF-8")]
    InvalidEncoding,

    /// La request line no tiene exactamente 3 tokens
    #[error("Invalid request line: {0:?}")]
    InvalidRequestLine(String),

    /// Método fuera del conjunto conocido
    #[error("Unsupported HTTP method: {0}")]
    UnsupportedMethod(String),

    /// Versión distinta de HTTP/1.0 o HTTP/1.1
    #[error("Invalid HTTP version: {0}")]
    InvalidHttpVersion(String),

    /// Header sin ':'
    #[error("Invalid header: {0:?}")]
    InvalidHeader(String),

    /// `Content-Length` que no es un entero decimal representable
    #[error("Invalid Content-Length: {0:?}")]
    InvalidContentLength(String),

    #[error("Conflicting Content-Length values: {first} and {second}")]
    ConflictingContentLength { first: usize, second: usize },

    /// El body recibido es más corto que el declarado
    #[error("Incomplete body: declared {declared} bytes, received {received}")]
    IncompleteBody { declared: usize, received: usize },
}

/// Errores al leer un request completo desde el socket
#[derive(Debug, Error)]
pub enum ReadError {
    /// El cliente cerró sin mandar nada
    #[error("Connection closed by peer")]
    Closed,

    /// El read expiró (cliente lento o silencioso)
    #[error("Timed out waiting for request data")]
    Timeout,

    #[error("Request head exceeds {limit} bytes")]
    HeaderTooLarge { limit: usize },

    #[error("Request body of {declared} bytes exceeds {limit} bytes")]
    BodyTooLarge { declared: usize, limit: usize },

    #[error("I/O error while reading request: {0}")]
    Io(#[from] io::Error),
}

/// Configuración inválida (se reporta al arrancar, nunca en runtime)
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("Files directory {0:?} does not exist or is not a directory")]
    InvalidDirectory(String),

    #[error("{0} must be >= 1")]
    ZeroLimit(&'static str),
}

/// Errores de nivel superior del servidor
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: io::Error,
    },

    #[error("Worker pool is shut down")]
    PoolClosed,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
