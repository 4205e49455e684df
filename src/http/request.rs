//! # Parsing de Requests HTTP
//! src/http/request.rs
//!
//! ## Formato de la request line
//!
//! ```text
//! GET /cgi-bin/adder?1&2 HTTP/1.1\r\n
//! Host: localhost:8080\r\n
//! \r\n
//! ```
//!
//! Solo se interpreta la primera línea: `METHOD SP target SP version`.
//! Los headers de HTTP/1.1 se consumen y se descartan en el handler.

use crate::router::{Resource, ResourceKind};
use std::path::Path;

/// Versión sin headers que consumir
pub const HTTP_1_0: &str = "HTTP/1.0";

/// Versión que obliga a consumir headers
pub const HTTP_1_1: &str = "HTTP/1.1";

/// Errores que pueden ocurrir durante el parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Request vacío (solo espacios)
    EmptyRequest,

    /// Menos de tres tokens en la request line
    InvalidRequestLine,

    /// La línea no es UTF-8 válido
    InvalidEncoding,

    /// Versión distinta de HTTP/1.0 y HTTP/1.1
    UnsupportedVersion(String),
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::EmptyRequest => write!(f, "Empty request"),
            ParseError::InvalidRequestLine => write!(f, "Invalid request line format"),
            ParseError::InvalidEncoding => write!(f, "Request line is not valid UTF-8"),
            ParseError::UnsupportedVersion(v) => write!(f, "Unsupported HTTP version: {}", v),
        }
    }
}

impl std::error::Error for ParseError {}

/// Primera línea del request, separada en sus tres tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub target: String,
    pub version: String,
}

impl RequestLine {
    /// Parsea la línea tal como llegó del socket
    ///
    /// Bytes que no son UTF-8 válido se rechazan en lugar de reemplazarse:
    /// dos targets distintos nunca deben resolver al mismo archivo.
    pub fn from_bytes(raw: &[u8]) -> Result<Self, ParseError> {
        let text = std::str::from_utf8(raw).map_err(|_| ParseError::InvalidEncoding)?;
        Self::parse(text)
    }

    /// Parsea `METHOD target version`
    ///
    /// Los tokens se separan por espacios en blanco. Tokens adicionales
    /// después del tercero se ignoran; menos de tres es un error. Solo se
    /// aceptan `HTTP/1.0` y `HTTP/1.1`.
    ///
    /// # Ejemplo
    ///
    /// ```
    /// use tiny_httpd::http::RequestLine;
    ///
    /// let line = RequestLine::parse("GET /index.html HTTP/1.0").unwrap();
    /// assert_eq!(line.method, "GET");
    /// assert_eq!(line.target, "/index.html");
    /// assert!(!line.wants_headers());
    /// ```
    pub fn parse(raw: &str) -> Result<Self, ParseError> {
        let mut tokens = raw.split_whitespace();

        let method = tokens.next().ok_or(ParseError::EmptyRequest)?;
        let target = tokens.next().ok_or(ParseError::InvalidRequestLine)?;
        let version = tokens.next().ok_or(ParseError::InvalidRequestLine)?;

        if version != HTTP_1_0 && version != HTTP_1_1 {
            return Err(ParseError::UnsupportedVersion(version.to_string()));
        }

        Ok(Self {
            method: method.to_string(),
            target: target.to_string(),
            version: version.to_string(),
        })
    }

    /// Solo se implementa GET (sin distinguir mayúsculas)
    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }

    /// HTTP/1.1 trae headers que hay que consumir; HTTP/1.0 no
    pub fn wants_headers(&self) -> bool {
        self.version == HTTP_1_1
    }
}

/// Request completamente resuelto: línea + recurso en el árbol de documentos
///
/// Inmutable después de construirse.
#[derive(Debug, Clone)]
pub struct Request {
    line: RequestLine,
    resource: Resource,
}

impl Request {
    pub fn new(line: RequestLine, resource: Resource) -> Self {
        Self { line, resource }
    }

    pub fn method(&self) -> &str {
        &self.line.method
    }

    pub fn target(&self) -> &str {
        &self.line.target
    }

    pub fn version(&self) -> &str {
        &self.line.version
    }

    /// Ruta en disco del archivo o ejecutable
    pub fn filename(&self) -> &Path {
        &self.resource.filename
    }

    /// Argumentos (lo que va después de `?`), vacío para estático
    pub fn args(&self) -> &str {
        &self.resource.args
    }

    pub fn kind(&self) -> ResourceKind {
        self.resource.kind
    }

}
