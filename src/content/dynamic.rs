//! # Contenido Dinámico
//! src/content/dynamic.rs
//!
//! Ejecuta un programa del árbol `cgi-bin` con su salida estándar
//! redirigida al socket del cliente. Los argumentos del target viajan en
//! la variable de entorno `QUERY_STRING`.
//!
//! ```text
//! handler ── "HTTP/1.0 200 OK\r\nServer: ...\r\n" ──▶ socket
//!    │
//!    └─ spawn(program, QUERY_STRING=args, stdout=socket) ── wait()
//! ```

use crate::error::HandlerError;
use crate::http::response::dynamic_prefix;
use crate::net::send_all;
use std::io;
use std::net::TcpStream;
use std::os::fd::OwnedFd;
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use tracing::{debug, warn};

/// Variable de entorno con los argumentos del request
pub const QUERY_ENV: &str = "QUERY_STRING";

/// Proceso hijo lanzado con salida redirigida y entorno extra
///
/// Es la única pieza que conoce la semántica de procesos del sistema
/// operativo; el handler solo lanza y espera.
pub struct Subprocess {
    child: Child,
    program: String,
}

impl Subprocess {
    /// Lanza `program` con `env` agregado al entorno heredado
    ///
    /// La entrada estándar queda vacía y stderr se hereda del servidor.
    pub fn spawn(program: &Path, env: &[(&str, &str)], stdout: Stdio) -> io::Result<Self> {
        let mut command = Command::new(program);
        command.stdin(Stdio::null()).stdout(stdout);
        for (key, value) in env {
            command.env(key, value);
        }

        let child = command.spawn()?;
        Ok(Self {
            child,
            program: program.display().to_string(),
        })
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Bloquea hasta que el proceso termine
    pub fn wait(mut self) -> io::Result<ExitStatus> {
        let status = self.child.wait()?;
        debug!(program = %self.program, %status, "dynamic handler exited");
        Ok(status)
    }
}

/// Sirve la salida de `program` por `stream`
///
/// Un fallo del proceso hijo no se reporta al cliente: se registra y la
/// conexión se cierra igual cuando el hijo termina.
pub fn serve_dynamic(stream: &TcpStream, program: &Path, args: &str) -> Result<u64, HandlerError> {
    let mut writer = stream;
    let sent = send_all(&mut writer, &dynamic_prefix())? as u64;

    let stdout: OwnedFd = stream.try_clone()?.into();
    let child = Subprocess::spawn(program, &[(QUERY_ENV, args)], Stdio::from(stdout)).map_err(|source| {
        HandlerError::Spawn {
            program: program.display().to_string(),
            source,
        }
    })?;

    debug!(pid = child.id(), program = %program.display(), "dynamic handler started");

    let status = child.wait()?;
    if !status.success() {
        warn!(program = %program.display(), %status, "dynamic handler failed");
    }

    Ok(sent)
}
