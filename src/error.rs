//! # Errores del Servidor
//! src/error.rs
//!
//! Dos familias de errores:
//! - `ServerError`: fatales al arrancar (el servidor no inicia)
//! - `HandlerError`: afectan solo a una conexión; el loop sigue

use crate::http::{ParseError, StatusCode};
use std::io;
use thiserror::Error;

/// Errores fatales de arranque
#[derive(Debug, Error)]
pub enum ServerError {
    /// Configuración inválida
    #[error("invalid configuration: {0}")]
    Config(String),

    /// No se pudo crear/bindear/escuchar el socket
    #[error("cannot listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: io::Error,
    },

    /// No se pudo instalar el manejador de señales
    #[error("cannot install signal handler: {0}")]
    Signal(#[source] io::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Errores por conexión
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Fallo de lectura/escritura en el socket
    #[error("socket I/O failed: {0}")]
    Io(#[from] io::Error),

    /// La espera de lectura expiró o falló
    #[error("client never became readable")]
    Poll,

    /// Request line malformada
    #[error("bad request: {0}")]
    Parse(#[from] ParseError),

    /// Método distinto de GET
    #[error("method not implemented: {0}")]
    MethodNotAllowed(String),

    /// El recurso no existe
    #[error("resource not found: {0}")]
    NotFound(String),

    /// No es un archivo regular o faltan permisos
    #[error("access forbidden: {0}")]
    Forbidden(String),

    /// El archivo pasó la validación pero no se pudo abrir
    #[error("cannot open {target}: {source}")]
    Open {
        target: String,
        #[source]
        source: io::Error,
    },

    /// No se pudo lanzar el proceso dinámico
    #[error("cannot spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
}

impl HandlerError {
    /// Código HTTP que corresponde a este error
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerError::Parse(_) => StatusCode::BadRequest,
            HandlerError::MethodNotAllowed(_) => StatusCode::NotImplemented,
            HandlerError::NotFound(_) => StatusCode::NotFound,
            HandlerError::Forbidden(_) => StatusCode::Forbidden,
            HandlerError::Io(_) | HandlerError::Poll | HandlerError::Open { .. } | HandlerError::Spawn { .. } => {
                StatusCode::InternalServerError
            }
        }
    }

    /// Indica si vale la pena intentar enviar una respuesta de error
    ///
    /// Con el socket roto o sin datos del cliente no tiene sentido.
    pub fn is_reportable(&self) -> bool {
        !matches!(self, HandlerError::Io(_) | HandlerError::Poll)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(HandlerError::MethodNotAllowed("POST".into()).status(), StatusCode::NotImplemented);
        assert_eq!(HandlerError::NotFound("/x".into()).status(), StatusCode::NotFound);
        assert_eq!(HandlerError::Forbidden("/x".into()).status(), StatusCode::Forbidden);
        assert_eq!(HandlerError::Parse(ParseError::InvalidRequestLine).status(), StatusCode::BadRequest);
        assert_eq!(HandlerError::Parse(ParseError::InvalidEncoding).status(), StatusCode::BadRequest);
        assert_eq!(
            HandlerError::Parse(ParseError::UnsupportedVersion("HTTP/9".into())).status(),
            StatusCode::BadRequest
        );
    }

    #[test]
    fn test_io_errors_are_not_reportable() {
        let err = HandlerError::Io(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert!(!err.is_reportable());
        assert!(!HandlerError::Poll.is_reportable());
        assert!(HandlerError::NotFound("/x".into()).is_reportable());

        let open = HandlerError::Open {
            target: "/x".into(),
            source: io::Error::new(io::ErrorKind::Other, "too many files"),
        };
        assert!(open.is_reportable());
        assert_eq!(open.status(), StatusCode::InternalServerError);
    }

    #[test]
    fn test_bind_error_message() {
        let err = ServerError::Bind {
            addr: "0.0.0.0:80".into(),
            source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("0.0.0.0:80"));
    }
}
