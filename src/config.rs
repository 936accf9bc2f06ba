//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración por argumentos CLI y variables de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./minihttp --directory /tmp/files \
//!   --port 4221 \
//!   --workers 8 \
//!   --read-timeout-ms 5000
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=4221 FILES_DIR=/tmp/files ./minihttp
//! ```

use crate::error::ConfigError;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

/// Configuración del servidor
#[derive(Debug, Clone, Parser)]
#[command(name = "minihttp")]
#[command(about = "Servidor HTTP/1.1 mínimo con rutas de echo, archivos y compresión gzip")]
#[command(version)]
pub struct Config {
    /// Host/IP en el que escucha
    #[arg(long, default_value = "127.0.0.1", env = "HTTP_HOST")]
    pub host: String,

    /// Puerto en el que escucha el servidor
    #[arg(short, long, default_value = "4221", env = "HTTP_PORT")]
    pub port: u16,

    /// Directorio base para GET/POST /files
    #[arg(long, env = "FILES_DIR")]
    pub directory: Option<PathBuf>,

    // === Workers ===

    /// Threads del pool (por defecto 2 × CPUs)
    #[arg(long, env = "WORKERS")]
    pub workers: Option<usize>,

    /// Conexiones aceptadas que pueden esperar un worker libre
    #[arg(long = "queue-capacity", default_value = "1024", env = "QUEUE_CAPACITY")]
    pub queue_capacity: usize,

    // === Timeouts ===

    /// Timeout de lectura del socket en milisegundos
    #[arg(long = "read-timeout-ms", default_value = "5000", env = "READ_TIMEOUT_MS")]
    pub read_timeout_ms: u64,

    /// Timeout de escritura del socket en milisegundos
    #[arg(long = "write-timeout-ms", default_value = "5000", env = "WRITE_TIMEOUT_MS")]
    pub write_timeout_ms: u64,

    // === Límites ===

    /// Tamaño máximo de request line + headers
    #[arg(long = "max-header-bytes", default_value = "8192", env = "MAX_HEADER_BYTES")]
    pub max_header_bytes: usize,

    /// Tamaño máximo del body
    #[arg(long = "max-body-bytes", default_value = "10485760", env = "MAX_BODY_BYTES")]
    pub max_body_bytes: usize,

    // === Logging ===

    /// Nivel de log por defecto (RUST_LOG tiene prioridad)
    #[arg(long = "log-level", default_value = "info", env = "LOG_LEVEL")]
    pub log_level: String,
}

impl Config {
    /// Parsea argumentos CLI (y variables de entorno)
    pub fn new() -> Self {
        Config::parse()
    }

    /// Dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use minihttp::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "127.0.0.1:4221");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Workers efectivos: el valor explícito o 2 × paralelismo disponible
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            thread::available_parallelism()
                .map(|n| n.get() * 2)
                .unwrap_or(8)
        })
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn write_timeout(&self) -> Duration {
        Duration::from_millis(self.write_timeout_ms)
    }

    pub fn directory(&self) -> Option<&Path> {
        self.directory.as_deref()
    }

    /// Valida la configuración antes de arrancar.
    ///
    /// Un `--directory` inexistente es un error fatal: nunca se opera sobre
    /// un path indefinido.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(dir) = &self.directory {
            if !dir.is_dir() {
                return Err(ConfigError::InvalidDirectory(dir.display().to_string()));
            }
        }

        if self.workers == Some(0) {
            return Err(ConfigError::ZeroLimit("workers"));
        }
        if self.queue_capacity == 0 {
            return Err(ConfigError::ZeroLimit("queue capacity"));
        }
        if self.read_timeout_ms == 0 {
            return Err(ConfigError::ZeroLimit("read timeout"));
        }
        if self.write_timeout_ms == 0 {
            return Err(ConfigError::ZeroLimit("write timeout"));
        }
        if self.max_header_bytes == 0 {
            return Err(ConfigError::ZeroLimit("max header bytes"));
        }
        if self.max_body_bytes == 0 {
            return Err(ConfigError::ZeroLimit("max body bytes"));
        }

        Ok(())
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 4221,
            directory: None,
            workers: None,
            queue_capacity: 1024,
            read_timeout_ms: 5_000,
            write_timeout_ms: 5_000,
            max_header_bytes: 8 * 1024,
            max_body_bytes: 10 * 1024 * 1024,
            log_level: "info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.port, 4221);
        assert_eq!(config.host, "127.0.0.1");
        assert!(config.directory.is_none());
        assert!(config.worker_count() >= 1);
    }

    #[test]
    fn test_address_custom() {
        let mut config = Config::default();
        config.host = "0.0.0.0".to_string();
        config.port = 3000;
        assert_eq!(config.address(), "0.0.0.0:3000");
    }

    #[test]
    fn test_validate_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_parse_cli_flags() {
        let config = Config::parse_from([
            "minihttp",
            "--directory",
            "/tmp",
            "--port",
            "9000",
            "--workers",
            "3",
        ]);

        assert_eq!(config.directory(), Some(Path::new("/tmp")));
        assert_eq!(config.port, 9000);
        assert_eq!(config.worker_count(), 3);
    }

    #[test]
    fn test_validate_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.directory = Some(dir.path().to_path_buf());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.directory = Some(dir.path().join("nope"));

        assert!(matches!(config.validate(), Err(ConfigError::InvalidDirectory(_))));
    }

    #[test]
    fn test_validate_file_is_not_a_directory() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let mut config = Config::default();
        config.directory = Some(file.path().to_path_buf());

        assert!(matches!(config.validate(), Err(ConfigError::InvalidDirectory(_))));
    }

    #[test]
    fn test_validate_zero_workers() {
        let mut config = Config::default();
        config.workers = Some(0);
        assert_eq!(config.validate(), Err(ConfigError::ZeroLimit("workers")));
    }

    #[test]
    fn test_validate_zero_queue() {
        let mut config = Config::default();
        config.queue_capacity = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroLimit("queue capacity")));
    }

    #[test]
    fn test_validate_zero_timeouts() {
        let mut config = Config::default();
        config.read_timeout_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroLimit("read timeout")));

        let mut config = Config::default();
        config.write_timeout_ms = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroLimit("write timeout")));
    }

    #[test]
    fn test_validate_zero_size_limits() {
        let mut config = Config::default();
        config.max_header_bytes = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroLimit("max header bytes")));

        let mut config = Config::default();
        config.max_body_bytes = 0;
        assert_eq!(config.validate(), Err(ConfigError::ZeroLimit("max body bytes")));
    }

    #[test]
    fn test_default_timeouts() {
        let config = Config::default();
        assert_eq!(config.read_timeout(), Duration::from_secs(5));
        assert_eq!(config.write_timeout(), Duration::from_secs(5));
    }
}
