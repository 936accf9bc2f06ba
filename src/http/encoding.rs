//! # Negociación de Content-Encoding
//! src/http/encoding.rs
//!
//! Lee `Accept-Encoding` del request y, si el cliente acepta algún esquema
//! que el servidor ofrece, comprime el body de la respuesta y ajusta sus
//! headers de framing (`Content-Encoding`, `Content-Length`).
//!
//! Se aplica como máximo un esquema por respuesta: gana el primer token de
//! la lista del cliente que el servidor conozca.

use super::{Request, Response};
use flate2::write::GzEncoder;
use flate2::Compression;
use std::io::{self, Write};

/// Transformación body → body comprimido
pub type Compressor = fn(&[u8]) -> io::Result<Vec<u8>>;

/// Comprime con gzip (nivel por defecto)
pub fn gzip(body: &[u8]) -> io::Result<Vec<u8>> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(body.len() / 2 + 32), Compression::default());
    encoder.write_all(body)?;
    encoder.finish()
}

/// Tabla de esquemas ofrecidos por el servidor. Se construye una vez y se
/// comparte entre todos los workers.
#[derive(Clone)]
pub struct ContentNegotiator {
    schemes: Vec<(&'static str, Compressor)>,
}

impl ContentNegotiator {
    /// Negociador sin esquemas (nunca comprime)
    pub fn empty() -> Self {
        Self { schemes: Vec::new() }
    }

    /// Registra un esquema bajo su token de `Accept-Encoding`
    pub fn register(&mut self, token: &'static str, compressor: Compressor) {
        self.schemes.push((token, compressor));
    }

    fn lookup(&self, token: &str) -> Option<Compressor> {
        self.schemes
            .iter()
            .find(|(name, _)| *name == token)
            .map(|(_, compressor)| *compressor)
    }

    /// Aplica el primer esquema aceptable. Retorna `true` si comprimió.
    ///
    /// Si el compresor falla, la respuesta queda intacta y se retorna `false`.
    pub fn negotiate(&self, request: &Request, response: &mut Response) -> bool {
        let Some(accepted) = request.header("Accept-Encoding") else {
            return false;
        };

        let Some((token, compressor)) = accepted
            .split(',')
            .map(str::trim)
            .find_map(|token| self.lookup(token).map(|compressor| (token, compressor)))
        else {
            return false;
        };

        match compressor(response.body()) {
            Ok(compressed) => {
                tracing::debug!(
                    scheme = token,
                    original = response.body().len(),
                    compressed = compressed.len(),
                    "body compressed"
                );
                response.set_header("Content-Encoding", token);
                response.set_header("Content-Length", compressed.len());
                response.set_body(compressed);
                true
            }
            Err(e) => {
                tracing::warn!(scheme = token, error = %e, "compression failed, sending identity body");
                false
            }
        }
    }
}

impl std::fmt::Debug for ContentNegotiator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.schemes.iter().map(|(token, _)| token))
            .finish()
    }
}

impl Default for ContentNegotiator {
    /// Solo gzip
    fn default() -> Self {
        let mut negotiator = Self::empty();
        negotiator.register("gzip", gzip);
        negotiator
    }
}
