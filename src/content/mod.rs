//! # Servidores de Contenido
//! src/content/mod.rs
//!
//! - `static_file`: archivos del árbol de documentos
//! - `dynamic`: salida de ejecutables (CGI)

pub mod dynamic;
pub mod static_file;

pub use dynamic::{serve_dynamic, Subprocess, QUERY_ENV};
pub use static_file::serve_static;
