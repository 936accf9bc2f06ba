//! # Códigos de Estado HTTP
//!
//! Códigos que el servidor puede devolver. El conjunto es cerrado: cada
//! handler y cada rama de error del dispatcher usa uno de estos.
//!
//! - **2xx**: 200 OK, 201 Created
//! - **4xx**: 400, 404, 405, 408, 413
//! - **5xx**: 500 (solo si `/files` no tiene directorio configurado)

/// Códigos de estado que soporta el servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusCode {
    /// 200 OK - Estado por defecto de toda respuesta
    #[default]
    Ok = 200,

    /// 201 Created - POST /files escribió el archivo
    Created = 201,

    /// 400 Bad Request - Request malformado o escritura fallida
    BadRequest = 400,

    /// 404 Not Found - Ruta o archivo inexistente
    NotFound = 404,

    /// 405 Method Not Allowed - Método distinto de GET/POST en /files
    MethodNotAllowed = 405,

    /// 408 Request Timeout - El cliente no terminó de enviar a tiempo
    RequestTimeout = 408,

    /// 413 Payload Too Large - Headers o body por encima del límite
    PayloadTooLarge = 413,

    /// 500 Internal Server Error
    InternalServerError = 500,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use minihttp::http::StatusCode;
    /// assert_eq!(StatusCode::Created.as_u16(), 201);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Texto de razón (reason phrase) asociado al código
    ///
    /// # Ejemplo
    /// ```
    /// use minihttp::http::StatusCode;
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::RequestTimeout => "Request Timeout",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }

    /// Verifica si el código indica error del cliente (4xx)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.as_u16())
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
