//! # Handlers de Rutas
//!
//! Un handler por endpoint soportado. Cada uno recibe el request ya
//! parseado y muta la respuesta (que arranca en 200 OK, sin headers).
//!
//! - **basic**: `/`, `/user-agent`, `/echo` y el fallback 404
//! - **files**: lectura y escritura bajo el directorio configurado

pub mod basic;
pub mod files;

pub use basic::{echo_handler, not_found_handler, root_handler, user_agent_handler};
pub use files::{files_handler, FileStore};

/// Estado compartido, de solo lectura, que necesitan los handlers
#[derive(Debug, Default)]
pub struct HandlerContext {
    /// `None` si el servidor arrancó sin `--directory`
    files: Option<FileStore>,
}

impl HandlerContext {
    pub fn new(files: Option<FileStore>) -> Self {
        Self { files }
    }

    pub fn files(&self) -> Option<&FileStore> {
        self.files.as_ref()
    }
}
