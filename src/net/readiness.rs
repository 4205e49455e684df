//! # Espera de lectura
//! src/net/readiness.rs
//!
//! Bloquea hasta que un socket tenga datos para leer (o una conexión
//! pendiente, si es el socket de escucha). No lee ni bufferiza nada, así
//! que sirve tanto para el listener como para los clientes aceptados.

use std::io;
use std::os::fd::AsRawFd;
use std::time::Duration;
use thiserror::Error;

/// Timeout fijo de la espera acotada
pub const POLL_TIMEOUT: Duration = Duration::from_secs(2);

/// Modo de espera
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wait {
    /// Sin límite de tiempo
    Forever,
    /// Hasta `POLL_TIMEOUT`
    Bounded,
}

impl Wait {
    fn timeout_ms(self) -> libc::c_int {
        match self {
            Wait::Forever => -1,
            Wait::Bounded => POLL_TIMEOUT.as_millis() as libc::c_int,
        }
    }
}

#[derive(Debug, Error)]
pub enum PollError {
    /// Pasó el timeout sin datos
    #[error("timed out after {0:?} waiting for data")]
    TimedOut(Duration),

    /// poll(2) falló (incluye EINTR por una señal)
    #[error("poll failed: {0}")]
    Failed(#[source] io::Error),
}

impl PollError {
    /// Una señal cortó la espera (EINTR); no es una falla del socket
    pub fn is_interrupted(&self) -> bool {
        matches!(self, PollError::Failed(e) if e.kind() == io::ErrorKind::Interrupted)
    }
}

/// Espera hasta que `socket` sea legible
///
/// Un cierre del peer (POLLHUP) o un error pendiente también cuentan como
/// legibles: la próxima lectura los reporta.
pub fn wait_readable<S: AsRawFd>(socket: &S, wait: Wait) -> Result<(), PollError> {
    let mut fds = [libc::pollfd {
        fd: socket.as_raw_fd(),
        events: libc::POLLIN,
        revents: 0,
    }];

    // SAFETY: `fds` es un arreglo válido de un elemento que vive durante
    // toda la llamada y el fd pertenece a `socket`, que sigue abierto.
    let ready = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, wait.timeout_ms()) };

    match ready {
        -1 => Err(PollError::Failed(io::Error::last_os_error())),
        0 => Err(PollError::TimedOut(POLL_TIMEOUT)),
        _ if fds[0].revents & libc::POLLNVAL != 0 => Err(PollError::Failed(io::Error::new(
            io::ErrorKind::InvalidInput,
            "descriptor is not open",
        ))),
        _ => Ok(()),
    }
}
