//! # Parsing de Requests HTTP/1.1
//! src/http/request.rs
//!
//! Este módulo decodifica los bytes crudos de un request en un [`Request`].
//!
//! ## Formato de un Request
//!
//! ```text
//! POST /files/notes.txt HTTP/1.1\r\n
//! Host: localhost:4221\r\n
//! Content-Length: 5\r\n
//! \r\n
//! hello
//! ```
//!
//! ## Componentes
//!
//! 1. **Request Line**: `METHOD TARGET VERSION`, separados por un espacio
//! 2. **Headers**: Pares `Name: Value` (uno por línea)
//! 3. **Línea vacía**: el primer `\r\n\r\n` separa headers del body
//! 4. **Body**: exactamente `Content-Length` bytes si viene; si no, todo lo
//!    que sigue
//!
//! Los nombres de header conservan su capitalización original: `header()`
//! busca por nombre exacto. Solo `Content-Length` se busca sin distinguir
//! mayúsculas, porque define el framing.

use crate::error::ParseError;
use memchr::memmem;
use std::collections::HashMap;
use std::str::FromStr;

/// Separador entre headers y body
pub const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Métodos HTTP conocidos
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
    HEAD,
    POST,
    PUT,
    DELETE,
    PATCH,
    OPTIONS,
    CONNECT,
    TRACE,
}

impl Method {
    /// Convierte el método a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::DELETE => "DELETE",
            Method::PATCH => "PATCH",
            Method::OPTIONS => "OPTIONS",
            Method::CONNECT => "CONNECT",
            Method::TRACE => "TRACE",
        }
    }
}

impl FromStr for Method {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::GET),
            "HEAD" => Ok(Method::HEAD),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            "PATCH" => Ok(Method::PATCH),
            "OPTIONS" => Ok(Method::OPTIONS),
            "CONNECT" => Ok(Method::CONNECT),
            "TRACE" => Ok(Method::TRACE),
            _ => Err(ParseError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Representa un request HTTP parseado. Inmutable una vez construido.
#[derive(Debug, Clone)]
pub struct Request {
    /// Método HTTP
    method: Method,

    /// Path + query tal como llegó (ej: "/echo/abc?x=1")
    target: String,

    /// Clave de routing: `target` truncado en la última '/'
    endpoint: String,

    /// Versión HTTP ("HTTP/1.0" o "HTTP/1.1")
    version: String,

    /// Headers HTTP; el último duplicado gana
    headers: HashMap<String, String>,

    /// Body crudo
    body: Vec<u8>,
}

/// Busca el fin de los headers (posición del primer `\r\n\r\n`)
pub fn find_head_end(buffer: &[u8]) -> Option<usize> {
    memmem::find(buffer, HEAD_TERMINATOR)
}

/// Extrae `Content-Length` de un bloque de headers ya decodificado.
///
/// La comparación del nombre ignora mayúsculas. Un valor que no es un
/// entero decimal (o que no cabe en `usize`) es un error, igual que dos
/// `Content-Length` con valores distintos.
pub fn declared_content_length(head: &str) -> Result<Option<usize>, ParseError> {
    let mut declared = None;

    for line in head.split("\r\n").skip(1) {
        let Some((name, value)) = line.split_once(':') else {
            continue;
        };
        if !name.trim().eq_ignore_ascii_case("Content-Length") {
            continue;
        }

        let value = value.trim();
        if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidContentLength(value.to_string()));
        }
        let len: usize = value
            .parse()
            .map_err(|_| ParseError::InvalidContentLength(value.to_string()))?;

        match declared {
            Some(first) if first != len => {
                return Err(ParseError::ConflictingContentLength { first, second: len })
            }
            _ => declared = Some(len),
        }
    }

    Ok(declared)
}

/// Calcula el endpoint de routing a partir del target.
///
/// `/echo/abc` → `/echo`, `/files/a.txt` → `/files`, pero `/user-agent`
/// y `/` quedan intactos porque su última '/' está en la posición 0.
pub fn endpoint_of(target: &str) -> &str {
    match target.rfind('/') {
        Some(idx) if idx > 0 => &target[..idx],
        _ => target,
    }
}

impl Request {
    /// Parsea un request desde bytes
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use minihttp::http::Request;
    ///
    /// let raw = b"GET /echo/abc HTTP/1.1\r\nUser-Agent: curl\r\n\r\n";
    /// let request = Request::parse(raw).unwrap();
    ///
    /// assert_eq!(request.target(), "/echo/abc");
    /// assert_eq!(request.endpoint(), "/echo");
    /// assert_eq!(request.header("User-Agent"), Some("curl"));
    /// ```
    pub fn parse(buffer: &[u8]) -> Result<Self, ParseError> {
        if buffer.iter().all(u8::is_ascii_whitespace) {
            return Err(ParseError::EmptyRequest);
        }

        let head_end = find_head_end(buffer).ok_or(ParseError::MissingHeaderBoundary)?;
        let head = std::str::from_utf8(&buffer[..head_end])
            .map_err(|_| ParseError::InvalidEncoding)?;

        let mut lines = head.split("\r\n");

        // 1. Request line (split siempre produce al menos un elemento)
        let request_line = lines.next().unwrap_or_default();
        let (method, target, version) = Self::parse_request_line(request_line)?;

        // 2. Headers
        let headers = Self::parse_headers(lines)?;

        // 3. Body
        let rest = &buffer[head_end + HEAD_TERMINATOR.len()..];
        let body = match declared_content_length(head)? {
            Some(len) if rest.len() < len => {
                return Err(ParseError::IncompleteBody {
                    declared: len,
                    received: rest.len(),
                })
            }
            Some(len) => rest[..len].to_vec(),
            None => rest.to_vec(),
        };

        let endpoint = endpoint_of(&target).to_string();

        Ok(Request {
            method,
            target,
            endpoint,
            version,
            headers,
            body,
        })
    }

    /// Formato: `GET /path HTTP/1.1`, exactamente un espacio entre tokens
    fn parse_request_line(line: &str) -> Result<(Method, String, String), ParseError> {
        let parts: Vec<&str> = line.split(' ').collect();

        if parts.len() != 3 || parts.iter().any(|part| part.is_empty()) {
            return Err(ParseError::InvalidRequestLine(line.to_string()));
        }

        let method = parts[0].parse::<Method>()?;
        let target = parts[1].to_string();

        let version = parts[2].to_string();
        if version != "HTTP/1.0" && version != "HTTP/1.1" {
            return Err(ParseError::InvalidHttpVersion(version));
        }

        Ok((method, target, version))
    }

    /// Cada header tiene formato "Name: Value"; se corta en el primer ':'
    fn parse_headers<'a>(
        lines: impl Iterator<Item = &'a str>,
    ) -> Result<HashMap<String, String>, ParseError> {
        let mut headers = HashMap::new();

        for line in lines {
            let (name, value) = line
                .split_once(':')
                .ok_or_else(|| ParseError::InvalidHeader(line.to_string()))?;
            headers.insert(name.to_string(), value.trim().to_string());
        }

        Ok(headers)
    }

    // === Acceso a los campos ===

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Clave usada por el router
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Obtiene un header por nombre exacto (sensible a mayúsculas)
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }
}
