//! # Handler de Archivos
//! src/handlers/files.rs
//!
//! `/files/{nombre}` lee (GET) o escribe (POST) archivos planos dentro del
//! directorio configurado con `--directory`.
//!
//! | Caso                              | Status |
//! |-----------------------------------|--------|
//! | GET, archivo existe               | 200    |
//! | GET, archivo no existe            | 404    |
//! | POST, escritura correcta          | 201    |
//! | POST, escritura fallida           | 400    |
//! | nombre con `..`, `/`, `\` o vacío | 400    |
//! | otro método                       | 405    |
//! | sin directorio configurado        | 500    |
//!
//! Los accesos al mismo archivo se serializan con un `RwLock` por path:
//! varios GET pueden leer a la vez, un POST escribe en exclusiva.

use super::basic::tail_segment;
use crate::http::{Method, Request, Response, StatusCode};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError, RwLock};

/// Cuántos locks se acumulan antes de podar los que nadie usa
const LOCK_PRUNE_THRESHOLD: usize = 256;

/// Directorio base + registro de locks por archivo
#[derive(Debug)]
pub struct FileStore {
    root: PathBuf,
    locks: Mutex<HashMap<PathBuf, Arc<RwLock<()>>>>,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: Mutex::new(HashMap::new()),
        }
    }

    /// Resuelve `{root}/{name}`. El nombre ya debe estar validado.
    fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    fn lock_for(&self, path: &Path) -> Arc<RwLock<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);

        if locks.len() >= LOCK_PRUNE_THRESHOLD {
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
        }

        Arc::clone(locks.entry(path.to_path_buf()).or_default())
    }

    /// Lee el archivo completo bajo lock compartido
    pub fn read(&self, name: &str) -> io::Result<Vec<u8>> {
        let path = self.resolve(name);
        let lock = self.lock_for(&path);
        let _guard = lock.read().unwrap_or_else(PoisonError::into_inner);
        fs::read(&path)
    }

    /// Crea o trunca el archivo bajo lock exclusivo
    pub fn write(&self, name: &str, contents: &[u8]) -> io::Result<()> {
        let path = self.resolve(name);
        let lock = self.lock_for(&path);
        let _guard = lock.write().unwrap_or_else(PoisonError::into_inner);
        fs::write(&path, contents)
    }
}

/// Un nombre válido es un único componente de path normal
pub fn is_safe_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Handler para `/files/{nombre}`
pub fn files_handler(req: &Request, res: &mut Response, store: Option<&FileStore>) {
    let Some(store) = store else {
        tracing::error!("/files requested but no --directory was configured");
        res.set_status(StatusCode::InternalServerError);
        return;
    };

    let name = tail_segment(req.target());
    if !is_safe_file_name(name) {
        tracing::warn!(file = name, "rejected unsafe file name");
        res.set_status(StatusCode::BadRequest);
        return;
    }

    match req.method() {
        Method::GET => read_file(store, name, res),
        Method::POST => write_file(store, name, req.body(), res),
        other => {
            tracing::debug!(method = %other, "method not allowed on /files");
            res.set_status(StatusCode::MethodNotAllowed);
            res.set_header("Allow", "GET, POST");
        }
    }
}

fn read_file(store: &FileStore, name: &str, res: &mut Response) {
    match store.read(name) {
        Ok(contents) => {
            res.set_header("Content-Type", "application/octet-stream");
            res.set_header("Content-Length", contents.len());
            res.set_body(contents);
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(file = name, "file not found");
            res.set_status(StatusCode::NotFound);
        }
        Err(e) => {
            tracing::error!(file = name, error = %e, "failed to read file");
            res.set_status(StatusCode::InternalServerError);
        }
    }
}

fn write_file(store: &FileStore, name: &str, contents: &[u8], res: &mut Response) {
    match store.write(name, contents) {
        Ok(()) => {
            tracing::info!(file = name, bytes = contents.len(), "file written");
            res.set_status(StatusCode::Created);
        }
        Err(e) => {
            tracing::warn!(file = name, error = %e, "failed to write file");
            res.set_status(StatusCode::BadRequest);
        }
    }
}
