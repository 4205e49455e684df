//! # Módulo HTTP
//! src/http/mod.rs
//!
//! Subconjunto de HTTP/1.0 que entiende el servidor:
//! - `request`: request line y request resuelto
//! - `response`: cabeceras de respuesta
//! - `status`: códigos de estado
//! - `mime`: Content-type según extensión

pub mod mime;
pub mod request;
pub mod response;
pub mod status;

// Re-exportar para facilitar el uso
pub use mime::content_type_for;
pub use request::{ParseError, Request, RequestLine};
pub use response::Response;
pub use status::StatusCode;
