//! # Construcción de Respuestas HTTP
//!
//! Una [`Response`] es un acumulador mutable: nace en 200 OK sin headers ni
//! body, los handlers y el negociador de encoding la van modificando, y al
//! final se serializa con [`Response::to_bytes`].
//!
//! ## Formato
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 3\r\n
//! \r\n
//! abc
//! ```
//!
//! Los headers se emiten en el orden en que se agregaron. Reemplazar un
//! header existente conserva su posición original.
//!
//! ## Ejemplo de uso
//!
//! ```
//! use minihttp::http::{Response, StatusCode};
//!
//! let response = Response::new(StatusCode::Ok)
//!     .with_header("Content-Type", "text/plain")
//!     .with_body(b"abc".to_vec());
//!
//! let bytes = response.to_bytes();
//! assert!(bytes.ends_with(b"\r\n\r\nabc"));
//! ```

use super::StatusCode;

/// Representa una respuesta HTTP/1.1 completa
#[derive(Debug, Clone, Default)]
pub struct Response {
    /// Código de estado HTTP (200 por defecto)
    status: StatusCode,

    /// Headers en orden de inserción
    headers: Vec<(String, String)>,

    /// Cuerpo de la respuesta; siempre bytes crudos
    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta vacía con el código indicado
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Versión builder de [`Response::set_header`]
    pub fn with_header(mut self, name: &str, value: impl ToString) -> Self {
        self.set_header(name, value);
        self
    }

    /// Versión builder de [`Response::set_body`]
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.set_body(body);
        self
    }

    pub fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    /// Agrega un header, o reemplaza su valor si ya existe.
    ///
    /// ```
    /// use minihttp::http::Response;
    ///
    /// let mut response = Response::default();
    /// response.set_header("Content-Length", 3);
    /// response.set_header("Content-Type", "text/plain");
    /// response.set_header("Content-Length", 20);
    ///
    /// let names: Vec<&str> = response.headers().iter().map(|(n, _)| n.as_str()).collect();
    /// assert_eq!(names, ["Content-Length", "Content-Type"]);
    /// assert_eq!(response.header("Content-Length"), Some("20"));
    /// ```
    pub fn set_header(&mut self, name: &str, value: impl ToString) {
        let value = value.to_string();
        match self.headers.iter_mut().find(|(existing, _)| existing == name) {
            Some((_, slot)) => *slot = value,
            None => self.headers.push((name.to_string(), value)),
        }
    }

    /// Reemplaza el body. No toca `Content-Length`: eso es tarea de quien
    /// arma la respuesta.
    pub fn set_body(&mut self, body: Vec<u8>) {
        self.body = body;
    }

    /// Serializa la respuesta completa para enviarla por el socket
    ///
    /// - Status line: `HTTP/1.1 200 OK\r\n`
    /// - Headers: `Header-Name: Value\r\n`
    /// - Línea vacía: `\r\n`
    /// - Body: bytes tal cual (comprimidos o no)
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = Vec::with_capacity(64 + self.body.len());

        let status_line = format!("HTTP/1.1 {}\r\n", self.status);
        result.extend_from_slice(status_line.as_bytes());

        for (name, value) in &self.headers {
            let header_line = format!("{}: {}\r\n", name, value);
            result.extend_from_slice(header_line.as_bytes());
        }

        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);

        result
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Busca un header por nombre exacto
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
