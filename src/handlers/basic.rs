//! # Handlers Básicos
//! src/handlers/basic.rs
//!
//! - `/`: respuesta vacía
//! - `/user-agent`: devuelve el header `User-Agent`
//! - `/echo/{texto}`: devuelve el segmento después de `/echo/`
//! - fallback: 404 para cualquier endpoint no registrado
//!
//! Todos reciben la respuesta en su estado por defecto (200 OK) y solo
//! tocan lo que necesitan.

use crate::http::{Request, Response, StatusCode};

/// Tercer segmento del target separado por '/'; todo lo que sigue a
/// `/{ruta}/`, incluidas barras adicionales. Vacío si no existe.
pub(crate) fn tail_segment(target: &str) -> &str {
    target.splitn(3, '/').nth(2).unwrap_or_default()
}

fn plain_text(response: &mut Response, body: &str) {
    response.set_header("Content-Type", "text/plain");
    response.set_header("Content-Length", body.len());
    response.set_body(body.as_bytes().to_vec());
}

/// Handler para `/`
pub fn root_handler(_req: &Request, res: &mut Response) {
    res.set_header("Content-Length", 0);
}

/// Handler para `/user-agent`
///
/// # Ejemplo
/// ```
/// use minihttp::handlers::basic::user_agent_handler;
/// use minihttp::http::{Request, Response};
///
/// let req = Request::parse(b"GET /user-agent HTTP/1.1\r\nUser-Agent: foo/1.0\r\n\r\n").unwrap();
/// let mut res = Response::default();
/// user_agent_handler(&req, &mut res);
///
/// assert_eq!(res.body(), b"foo/1.0");
/// assert_eq!(res.header("Content-Length"), Some("7"));
/// ```
pub fn user_agent_handler(req: &Request, res: &mut Response) {
    let agent = req.header("User-Agent").unwrap_or_default();
    plain_text(res, agent);
}

/// Handler para `/echo/{texto}`
pub fn echo_handler(req: &Request, res: &mut Response) {
    plain_text(res, tail_segment(req.target()));
}

/// Fallback para endpoints no registrados
pub fn not_found_handler(req: &Request, res: &mut Response) {
    tracing::debug!(target_path = req.target(), "requested undefined route");
    res.set_status(StatusCode::NotFound);
}
