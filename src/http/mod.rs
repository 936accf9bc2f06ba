//! # Módulo HTTP
//!
//! Codec del subconjunto de HTTP/1.1 que habla el servidor: un request y
//! una respuesta por conexión, sin keep-alive ni chunked encoding.
//!
//! - Parsing de requests ([`request`])
//! - Construcción y serialización de responses ([`response`])
//! - Códigos de estado ([`status`])
//! - Negociación de `Content-Encoding` ([`encoding`])
//!
//! ### Formato de Request
//!
//! ```text
//! GET /echo/abc HTTP/1.1\r\n
//! Accept-Encoding: gzip\r\n
//! \r\n
//! ```
//!
//! ### Formato de Response
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Content-Type: text/plain\r\n
//! Content-Length: 3\r\n
//! \r\n
//! abc
//! ```

pub mod encoding;
pub mod request;
pub mod response;
pub mod status;

pub use encoding::ContentNegotiator;
pub use request::{Method, Request};
pub use response::Response;
pub use status::StatusCode;
