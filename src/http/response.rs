//! # Construcción de Respuestas HTTP
//!
//! Arma la cabecera (status line + headers) de una respuesta HTTP/1.0.
//! El cuerpo de los archivos estáticos no pasa por aquí: se copia
//! directamente del archivo al socket.
//!
//! ## Formato
//!
//! ```text
//! HTTP/1.0 200 OK\r\n
//! Server: tiny_httpd\r\n
//! Content-length: 13\r\n
//! Content-type: text/html\r\n
//! \r\n
//! ```

use super::StatusCode;

/// Valor del header `Server`
pub const SERVER_NAME: &str = "tiny_httpd";

/// Respuesta HTTP/1.0 con headers en el orden en que se agregan
#[derive(Debug, Clone)]
pub struct Response {
    /// Código de estado HTTP (200, 404, etc.)
    status: StatusCode,

    /// Headers en orden de inserción
    headers: Vec<(String, String)>,

    /// Cuerpo (vacío para las respuestas que solo envían cabecera)
    body: Vec<u8>,
}

impl Response {
    /// Crea una respuesta sin headers ni body
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: Vec::new(),
        }
    }

    /// Agrega un header (si ya existe se reemplaza su valor)
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.add_header(name, value);
        self
    }

    /// Versión mutable de `with_header`
    pub fn add_header(&mut self, name: &str, value: &str) {
        match self.headers.iter_mut().find(|(n, _)| n.eq_ignore_ascii_case(name)) {
            Some(entry) => entry.1 = value.to_string(),
            None => self.headers.push((name.to_string(), value.to_string())),
        }
    }

    /// Establece el cuerpo y su `Content-length`
    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.as_bytes().to_vec();
        let len = self.body.len().to_string();
        self.add_header("Content-length", &len);
        self
    }

    /// Cabecera de un archivo estático
    ///
    /// ```
    /// use tiny_httpd::http::Response;
    ///
    /// let head = Response::static_head(5, "text/html").to_bytes();
    /// let text = String::from_utf8(head).unwrap();
    /// assert!(text.starts_with("HTTP/1.0 200 OK\r\n"));
    /// assert!(text.ends_with("Content-type: text/html\r\n\r\n"));
    /// ```
    pub fn static_head(content_length: u64, content_type: &str) -> Self {
        Self::new(StatusCode::Ok)
            .with_header("Server", SERVER_NAME)
            .with_header("Content-length", &content_length.to_string())
            .with_header("Content-type", content_type)
    }

    /// Respuesta de error con un cuerpo de texto breve
    pub fn error(status: StatusCode) -> Self {
        let body = format!("{}\r\n", status);
        Self::new(status)
            .with_header("Server", SERVER_NAME)
            .with_header("Content-type", "text/plain")
            .with_body(&body)
    }

    /// Convierte la respuesta a bytes listos para enviar por el socket
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut result = format!("HTTP/1.0 {}\r\n", self.status).into_bytes();

        for (name, value) in &self.headers {
            result.extend_from_slice(format!("{}: {}\r\n", name, value).as_bytes());
        }

        // Línea vacía que separa headers del body
        result.extend_from_slice(b"\r\n");
        result.extend_from_slice(&self.body);
        result
    }
}

/// Prefijo de la respuesta dinámica
///
/// El proceso hijo escribe sus propios headers y el cuerpo a continuación.
pub fn dynamic_prefix() -> Vec<u8> {
    format!("HTTP/1.0 {}\r\nServer: {}\r\n", StatusCode::Ok, SERVER_NAME).into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_head_order() {
        let text = String::from_utf8(Response::static_head(42, "image/gif").to_bytes()).unwrap();

        assert_eq!(
            text,
            "HTTP/1.0 200 OK\r\nServer: tiny_httpd\r\nContent-length: 42\r\nContent-type: image/gif\r\n\r\n"
        );
    }

    #[test]
    fn test_add_header_replaces() {
        let response = Response::new(StatusCode::Ok)
            .with_header("Content-type", "text/plain")
            .with_header("content-type", "text/html");

        assert_eq!(response.to_bytes(), b"HTTP/1.0 200 OK\r\nContent-type: text/html\r\n\r\n".to_vec());
    }

    #[test]
    fn test_error_response() {
        let response = Response::error(StatusCode::NotFound);
        let text = String::from_utf8(response.to_bytes()).unwrap();

        assert!(text.starts_with("HTTP/1.0 404 Not Found\r\n"));
        assert!(text.ends_with("\r\n\r\n404 Not Found\r\n"));
        assert!(text.contains("Content-length: 15\r\n"));
    }

    #[test]
    fn test_dynamic_prefix() {
        assert_eq!(dynamic_prefix(), b"HTTP/1.0 200 OK\r\nServer: tiny_httpd\r\n".to_vec());
    }
}
