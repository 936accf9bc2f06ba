//! # Atención de una Conexión
//! src/server/connection.rs
//!
//! Cada conexión aceptada pasa por una única secuencia, sin keep-alive:
//!
//! ```text
//! READ → DECODE → ROUTE → NEGOTIATE → ENCODE → WRITE → CLOSE
//! ```
//!
//! La lectura acumula bytes hasta ver `\r\n\r\n` y luego lee exactamente
//! `Content-Length` bytes más. Todo lo que pase entre DECODE y NEGOTIATE
//! corre dentro de un `catch_unwind`: cualquier fallo termina en una
//! respuesta 400 completa, nunca en una conexión cortada sin respuesta.

use crate::config::Config;
use crate::error::ReadError;
use crate::handlers::{FileStore, HandlerContext};
use crate::http::request::{declared_content_length, find_head_end, HEAD_TERMINATOR};
use crate::http::{ContentNegotiator, Request, Response, StatusCode};
use crate::router::{Route, Router};
use std::io::{self, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::panic::{self, AssertUnwindSafe};
use std::time::{Duration, Instant};

/// Tamaño de cada `read` sobre el socket
const READ_CHUNK: usize = 4096;

/// Máximo de bytes no leídos que se descartan antes de cerrar tras un 4xx
const DRAIN_LIMIT: usize = 64 * 1024;

/// Espera máxima por bytes pendientes al descartar
const DRAIN_TIMEOUT: Duration = Duration::from_millis(250);

/// Límites de tamaño del request
#[derive(Debug, Clone, Copy)]
pub struct Limits {
    pub max_header_bytes: usize,
    pub max_body_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_header_bytes: 8 * 1024,
            max_body_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Todo lo que comparten los workers. Se construye una vez y nunca se muta.
#[derive(Debug)]
pub struct ServerState {
    pub router: Router,
    pub negotiator: ContentNegotiator,
    pub context: HandlerContext,
    pub limits: Limits,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
}

impl ServerState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            router: Router::default(),
            negotiator: ContentNegotiator::default(),
            context: HandlerContext::new(config.directory().map(FileStore::new)),
            limits: Limits {
                max_header_bytes: config.max_header_bytes,
                max_body_bytes: config.max_body_bytes,
            },
            read_timeout: config.read_timeout(),
            write_timeout: config.write_timeout(),
        }
    }
}

/// Resultado de procesar un request ya leído
#[derive(Debug)]
pub struct Exchange {
    pub response: Response,
    /// `None` si el request no llegó a rutearse
    pub route: Option<Route>,
    pub compressed: bool,
}

impl Exchange {
    /// Respuesta de error sin body, con framing explícito
    fn failure(status: StatusCode) -> Self {
        Self {
            response: Response::new(status).with_header("Content-Length", 0),
            route: None,
            compressed: false,
        }
    }
}

fn read_chunk<R: Read>(reader: &mut R, chunk: &mut [u8]) -> Result<usize, ReadError> {
    loop {
        match reader.read(chunk) {
            Ok(n) => return Ok(n),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) if matches!(e.kind(), io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut) => {
                return Err(ReadError::Timeout)
            }
            Err(e) => return Err(ReadError::Io(e)),
        }
    }
}

/// Lee un request completo: headers hasta `\r\n\r\n`, luego el body según
/// `Content-Length` (cero si no viene).
///
/// Si el cliente cierra antes de completar, o si `Content-Length` es
/// inválido, se devuelve lo recibido y el parser lo rechaza.
pub fn read_request<R: Read>(reader: &mut R, limits: &Limits) -> Result<Vec<u8>, ReadError> {
    let mut buffer = Vec::with_capacity(READ_CHUNK);
    let mut chunk = [0u8; READ_CHUNK];

    let head_end = loop {
        if let Some(pos) = find_head_end(&buffer) {
            break pos;
        }
        if buffer.len() > limits.max_header_bytes {
            return Err(ReadError::HeaderTooLarge {
                limit: limits.max_header_bytes,
            });
        }

        let n = read_chunk(reader, &mut chunk)?;
        if n == 0 {
            if buffer.is_empty() {
                return Err(ReadError::Closed);
            }
            return Ok(buffer);
        }
        buffer.extend_from_slice(&chunk[..n]);
    };

    if head_end > limits.max_header_bytes {
        return Err(ReadError::HeaderTooLarge {
            limit: limits.max_header_bytes,
        });
    }

    let head = String::from_utf8_lossy(&buffer[..head_end]);
    let declared = match declared_content_length(&head) {
        Ok(declared) => declared.unwrap_or(0),
        Err(_) => return Ok(buffer),
    };
    if declared > limits.max_body_bytes {
        return Err(ReadError::BodyTooLarge {
            declared,
            limit: limits.max_body_bytes,
        });
    }

    let total = head_end + HEAD_TERMINATOR.len() + declared;
    while buffer.len() < total {
        let n = read_chunk(reader, &mut chunk)?;
        if n == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..n]);
    }
    buffer.truncate(total);

    Ok(buffer)
}

/// Descarta lo que el cliente siga mandando, hasta `limit` bytes o EOF.
///
/// Cerrar un socket con datos sin leer hace que el kernel mande RST, y el
/// cliente puede perder la respuesta que ya se le escribió.
fn drain<R: Read>(reader: &mut R, limit: usize) -> usize {
    let mut chunk = [0u8; READ_CHUNK];
    let mut discarded = 0;

    while discarded < limit {
        match reader.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => discarded += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(_) => break,
        }
    }

    discarded
}

/// DECODE → ROUTE → NEGOTIATE, dentro del límite de fallos
pub fn process(raw: &[u8], state: &ServerState) -> Exchange {
    match panic::catch_unwind(AssertUnwindSafe(|| process_request(raw, state))) {
        Ok(exchange) => exchange,
        Err(_) => {
            tracing::error!("request processing panicked");
            Exchange::failure(StatusCode::BadRequest)
        }
    }
}

fn process_request(raw: &[u8], state: &ServerState) -> Exchange {
    let request = match Request::parse(raw) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!(error = %e, "malformed request");
            return Exchange::failure(StatusCode::BadRequest);
        }
    };

    tracing::debug!(
        method = %request.method(),
        target_path = request.target(),
        endpoint = request.endpoint(),
        "request decoded"
    );

    let mut response = Response::default();
    let route = state.router.dispatch(&request, &mut response, &state.context);
    let compressed = state.negotiator.negotiate(&request, &mut response);

    Exchange {
        response,
        route: Some(route),
        compressed,
    }
}

/// Atiende una conexión de principio a fin y la cierra
pub fn handle_connection(mut stream: TcpStream, state: &ServerState) -> io::Result<()> {
    let start = Instant::now();
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".to_string());

    stream.set_read_timeout(Some(state.read_timeout))?;
    stream.set_write_timeout(Some(state.write_timeout))?;

    let exchange = match read_request(&mut stream, &state.limits) {
        Ok(raw) => process(&raw, state),
        Err(ReadError::Closed) => {
            tracing::debug!(%peer, "connection closed before any data");
            return Ok(());
        }
        Err(ReadError::Io(e)) => return Err(e),
        Err(e @ ReadError::Timeout) => {
            tracing::warn!(%peer, error = %e, "read timed out");
            Exchange::failure(StatusCode::RequestTimeout)
        }
        Err(e @ (ReadError::HeaderTooLarge { .. } | ReadError::BodyTooLarge { .. })) => {
            tracing::warn!(%peer, error = %e, "request rejected");
            Exchange::failure(StatusCode::PayloadTooLarge)
        }
    };

    let bytes = exchange.response.to_bytes();
    stream.write_all(&bytes)?;
    stream.flush()?;

    // El peer puede haber cerrado ya; no es un error nuestro
    let _ = stream.shutdown(Shutdown::Write);

    let status = exchange.response.status();
    if status.is_client_error() && stream.set_read_timeout(Some(DRAIN_TIMEOUT)).is_ok() {
        let discarded = drain(&mut stream, DRAIN_LIMIT);
        if discarded > 0 {
            tracing::debug!(%peer, discarded, "unread request bytes discarded");
        }
    }

    tracing::info!(
        %peer,
        route = exchange.route.map(Route::name).unwrap_or("-"),
        status = status.as_u16(),
        bytes = bytes.len(),
        compressed = exchange.compressed,
        latency_ms = start.elapsed().as_secs_f64() * 1000.0,
        "response sent"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use std::net::TcpListener;
    use std::thread;

    /// Reader que entrega los datos en pedazos pequeños, como un socket real
    struct Trickle<'a> {
        data: &'a [u8],
        step: usize,
    }

    impl Read for Trickle<'_> {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.step.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data = &self.data[n..];
            Ok(n)
        }
    }

    fn state_with_dir(dir: &std::path::Path) -> ServerState {
        let mut config = Config::default();
        config.directory = Some(dir.to_path_buf());
        ServerState::from_config(&config)
    }

    #[test]
    fn test_read_request_without_body() {
        let raw = b"GET / HTTP/1.1\r\nHost: x\r\n\r\n";
        let read = read_request(&mut Cursor::new(&raw[..]), &Limits::default()).unwrap();
        assert_eq!(read, raw.to_vec());
    }

    #[test]
    fn test_read_request_across_many_reads() {
        let raw = b"POST /files/a HTTP/1.1\r\nContent-Length: 11\r\n\r\nhello world";
        let mut reader = Trickle { data: raw, step: 3 };

        let read = read_request(&mut reader, &Limits::default()).unwrap();
        assert_eq!(read, raw.to_vec());
    }

    #[test]
    fn test_read_request_drops_bytes_past_content_length() {
        let raw = b"POST /files/a HTTP/1.1\r\nContent-Length: 2\r\n\r\nabGET / HTTP/1.1\r\n\r\n";
        let read = read_request(&mut Cursor::new(&raw[..]), &Limits::default()).unwrap();
        assert!(read.ends_with(b"\r\n\r\nab"));
    }

    #[test]
    fn test_read_request_large_body() {
        let body = vec![b'x'; 20_000];
        let mut raw = format!("POST /files/big HTTP/1.1\r\nContent-Length: {}\r\n\r\n", body.len()).into_bytes();
        raw.extend_from_slice(&body);

        let read = read_request(&mut Cursor::new(&raw[..]), &Limits::default()).unwrap();
        assert_eq!(read.len(), raw.len());
    }

    #[test]
    fn test_read_request_empty_is_closed() {
        let result = read_request(&mut Cursor::new(&b""[..]), &Limits::default());
        assert!(matches!(result, Err(ReadError::Closed)));
    }

    #[test]
    fn test_read_request_incomplete_head_is_returned() {
        let raw = b"GET / HTTP/1.1\r\nHost";
        let read = read_request(&mut Cursor::new(&raw[..]), &Limits::default()).unwrap();
        assert_eq!(read, raw.to_vec());
    }

    #[test]
    fn test_read_request_header_limit() {
        let limits = Limits {
            max_header_bytes: 32,
            max_body_bytes: 1024,
        };
        let raw = format!("GET / HTTP/1.1\r\nX-Long: {}\r\n\r\n", "a".repeat(10_000));

        let result = read_request(&mut Cursor::new(raw.as_bytes()), &limits);
        assert!(matches!(result, Err(ReadError::HeaderTooLarge { limit: 32 })));
    }

    #[test]
    fn test_read_request_body_limit() {
        let limits = Limits {
            max_header_bytes: 1024,
            max_body_bytes: 4,
        };
        let raw = b"POST /files/a HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello";

        let result = read_request(&mut Cursor::new(&raw[..]), &limits);
        assert!(matches!(result, Err(ReadError::BodyTooLarge { declared: 5, limit: 4 })));
    }

    #[test]
    fn test_read_request_short_body_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_dir(dir.path());
        let raw = b"POST /files/x HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc";

        let read = read_request(&mut Cursor::new(&raw[..]), &state.limits).unwrap();
        let exchange = process(&read, &state);

        assert_eq!(exchange.response.status(), StatusCode::BadRequest);
        assert!(!dir.path().join("x").exists());
    }

    #[test]
    fn test_read_request_invalid_content_length_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_dir(dir.path());

        for value in ["abc", "99999999999999999999999"] {
            let raw = format!("POST /files/x HTTP/1.1\r\nContent-Length: {}\r\n\r\nhello", value);

            let read = read_request(&mut Cursor::new(raw.as_bytes()), &state.limits).unwrap();
            let exchange = process(&read, &state);

            assert_eq!(exchange.response.status(), StatusCode::BadRequest, "value {}", value);
            assert!(!dir.path().join("x").exists());
        }
    }

    #[test]
    fn test_drain_stops_at_limit() {
        let data = vec![b'x'; 10_000];
        let mut reader = Cursor::new(&data[..]);

        assert_eq!(drain(&mut reader, 5_000), 8_192);
        assert_eq!(drain(&mut Cursor::new(&b"abc"[..]), 5_000), 3);
    }

    #[test]
    fn test_process_malformed_is_bad_request() {
        let state = ServerState::from_config(&Config::default());
        let exchange = process(b"\x00\x01\x02garbage\r\n\r\n", &state);

        assert_eq!(exchange.response.status(), StatusCode::BadRequest);
        assert_eq!(exchange.response.header("Content-Length"), Some("0"));
        assert!(exchange.route.is_none());
    }

    #[test]
    fn test_process_echo_with_gzip() {
        let state = ServerState::from_config(&Config::default());
        let exchange = process(b"GET /echo/hi HTTP/1.1\r\nAccept-Encoding: identity, gzip\r\n\r\n", &state);

        assert_eq!(exchange.route, Some(Route::Echo));
        assert!(exchange.compressed);
        assert_eq!(exchange.response.header("Content-Encoding"), Some("gzip"));
    }

    #[test]
    fn test_process_files_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_dir(dir.path());

        let post = process(b"POST /files/new.txt HTTP/1.1\r\nContent-Length: 5\r\n\r\nhello", &state);
        assert_eq!(post.response.status(), StatusCode::Created);

        let get = process(b"GET /files/new.txt HTTP/1.1\r\n\r\n", &state);
        assert_eq!(get.response.status(), StatusCode::Ok);
        assert_eq!(get.response.body(), b"hello");
    }

    fn serve_once(state: ServerState, request: &[u8]) -> Vec<u8> {
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            handle_connection(stream, &state).unwrap();
        });

        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(request).unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        server.join().unwrap();
        buf
    }

    #[test]
    fn test_handle_connection_root() {
        let state = ServerState::from_config(&Config::default());
        let response = serve_once(state, b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n");

        assert_eq!(response, b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n".to_vec());
    }

    #[test]
    fn test_handle_connection_parse_error() {
        let state = ServerState::from_config(&Config::default());
        let response = serve_once(state, b"NOT-HTTP\r\n\r\n");

        assert!(response.starts_with(b"HTTP/1.1 400 Bad Request\r\n"));
    }

    #[test]
    fn test_handle_connection_body_shorter_than_declared() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with_dir(dir.path());

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            handle_connection(stream, &state).unwrap();
        });

        // Declara 10 bytes, manda 3 y cierra su lado de escritura
        let mut client = TcpStream::connect(addr).unwrap();
        client
            .write_all(b"POST /files/short.txt HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc")
            .unwrap();
        client.shutdown(Shutdown::Write).unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        server.join().unwrap();

        assert!(buf.starts_with(b"HTTP/1.1 400 Bad Request\r\n"));
        assert!(!dir.path().join("short.txt").exists());
    }

    #[test]
    fn test_handle_connection_payload_too_large_with_body_in_flight() {
        let mut state = ServerState::from_config(&Config::default());
        state.limits.max_body_bytes = 1024;

        let body = vec![b'x'; 32 * 1024];
        let mut request = format!("POST /files/big HTTP/1.1\r\nContent-Length: {}\r\n\r\n", body.len()).into_bytes();
        request.extend_from_slice(&body);

        let response = serve_once(state, &request);
        assert!(response.starts_with(b"HTTP/1.1 413 Payload Too Large\r\n"));
    }

    #[test]
    fn test_handle_connection_timeout() {
        let mut config = Config::default();
        config.read_timeout_ms = 100;
        let state = ServerState::from_config(&config);

        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().unwrap();
        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            handle_connection(stream, &state).unwrap();
        });

        // Headers incompletos y el cliente se queda callado
        let mut client = TcpStream::connect(addr).unwrap();
        client.write_all(b"GET / HTTP/1.1\r\n").unwrap();

        let mut buf = Vec::new();
        client.read_to_end(&mut buf).unwrap();
        server.join().unwrap();

        assert!(buf.starts_with(b"HTTP/1.1 408 Request Timeout\r\n"));
    }

    #[test]
    fn test_handle_connection_peer_closed_immediately() {
        let state = ServerState::from_config(&Config::default());
        let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
        let addr = listener.local_addr().unwrap();

        let server = thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            handle_connection(stream, &state).unwrap();
        });

        drop(TcpStream::connect(addr).unwrap());
        server.join().unwrap();
    }
}
