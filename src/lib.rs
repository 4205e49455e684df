//! # tiny_httpd
//! src/lib.rs
//!
//! Servidor HTTP/1.0 que sirve archivos de un árbol de documentos o la
//! salida de ejecutables `cgi-bin`, con un número fijo de handlers
//! simultáneos.
//!
//! ## Arquitectura
//!
//! - `net`: lectura por líneas, escritura completa y espera de lectura
//! - `http`: request line, cabeceras de respuesta, códigos y tipos MIME
//! - `router`: resolución de targets contra el árbol de documentos
//! - `content`: respuestas estáticas y dinámicas
//! - `workers`: pool acotado de slots de ejecución
//! - `server`: acceptor, handler de conexión y apagado
//! - `metrics`: contadores del proceso
//!
//! ## Ejemplo de uso
//!
//! ```no_run
//! use tiny_httpd::config::Config;
//! use tiny_httpd::server::{Server, ShutdownToken};
//!
//! let config = Config::default();
//! let shutdown = ShutdownToken::new();
//! shutdown.register_signals().expect("signals");
//!
//! let server = Server::bind(&config).expect("Error al iniciar servidor");
//! server.run(&shutdown).expect("Error en el servidor");
//! ```

pub mod config;
pub mod content;
pub mod error;
pub mod http;
pub mod logging;
pub mod metrics;
pub mod net;
pub mod router;
pub mod server;
pub mod workers;
