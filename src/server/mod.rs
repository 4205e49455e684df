//! # Módulo del Servidor HTTP
//! src/server/mod.rs
//!
//! - `tcp`: acceptor, dueño del socket de escucha y del pool
//! - `connection`: handler de una conexión
//! - `shutdown`: token de apagado y puente con las señales

pub mod connection;
pub mod shutdown;
pub mod tcp;

// Re-exportar para facilitar el uso
pub use connection::{handle_connection, HandlerContext, Outcome};
pub use shutdown::ShutdownToken;
pub use tcp::Server;
