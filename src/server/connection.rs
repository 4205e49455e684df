//! # Handler de Conexión
//! src/server/connection.rs
//!
//! Atiende una conexión aceptada de principio a fin:
//!
//! ```text
//! New → ReadLine → (Reject | ReadHeaders) → Resolve → Validate → Serve → Close
//! ```
//!
//! El handler es dueño exclusivo del `TcpStream`; el socket se cierra una
//! sola vez, cuando `handle_connection` lo suelta, en todos los caminos.

use crate::config::Config;
use crate::content::{serve_dynamic, serve_static};
use crate::error::HandlerError;
use crate::http::{Request, RequestLine, Response, StatusCode};
use crate::metrics::{MetricsCollector, Rejection};
use crate::net::{read_line, send_all, wait_readable, LineRead, Wait};
use crate::router::{DocumentTree, ResourceKind};
use std::fs::{self, File, Metadata};
use std::io::{self, BufRead, BufReader, ErrorKind};
use std::net::{SocketAddr, TcpStream};
use std::os::unix::fs::PermissionsExt;
use tracing::{debug, info, info_span, warn};

/// Permiso de lectura del dueño
const OWNER_READ: u32 = 0o400;

/// Permiso de ejecución del dueño
const OWNER_EXEC: u32 = 0o100;

/// Todo lo que un handler necesita, compartido (solo lectura) entre threads
#[derive(Clone)]
pub struct HandlerContext {
    pub tree: DocumentTree,
    pub max_line: usize,
    pub max_header_lines: usize,
    /// Enviar status 4xx/5xx antes de cerrar en los rechazos
    pub error_status: bool,
    pub metrics: MetricsCollector,
}

impl HandlerContext {
    pub fn from_config(config: &Config, metrics: MetricsCollector) -> Self {
        Self {
            tree: DocumentTree::new(&config.root, &config.cgi_root),
            max_line: config.max_line,
            max_header_lines: config.max_header_lines,
            error_status: config.error_status,
            metrics,
        }
    }
}

/// Cómo terminó una conexión
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Respuesta completa enviada
    Served { kind: ResourceKind, bytes: u64 },
    /// El peer cerró sin enviar nada
    NoData,
    /// Rechazada antes de servir; el `bool` indica si se envió status
    Rejected(StatusCode, bool),
    /// Falló a mitad de la respuesta (puede haber salida parcial)
    Failed,
}

/// Lo que se va a enviar
enum Content {
    /// Archivo ya abierto: un fallo al abrirlo todavía es un rechazo
    Static { file: File, size: u64 },
    Dynamic,
}

/// Request validado, listo para servir
struct Validated {
    request: Request,
    content: Content,
}

/// Atiende `stream` y lo cierra
pub fn handle_connection(stream: TcpStream, peer: SocketAddr, ctx: &HandlerContext) -> Outcome {
    let span = info_span!("conn", %peer);
    let _enter = span.enter();

    let outcome = match prepare(&stream, ctx) {
        Ok(Some(validated)) => serve(&stream, validated, ctx),
        Ok(None) => {
            info!("no data was read from client, closing connection");
            ctx.metrics.record_rejection(Rejection::NoData);
            Outcome::NoData
        }
        Err(err) => reject(&stream, err, ctx),
    };

    info!("closing client connection");
    drop(stream);
    outcome
}

/// ReadLine → ReadHeaders → Resolve → Validate
///
/// `Ok(None)` si el peer no envió nada.
fn prepare(stream: &TcpStream, ctx: &HandlerContext) -> Result<Option<Validated>, HandlerError> {
    wait_readable(stream, Wait::Bounded).map_err(|e| {
        warn!("client never sent data: {}", e);
        HandlerError::Poll
    })?;

    let mut reader = BufReader::new(stream);

    let raw = match read_line(&mut reader, ctx.max_line)? {
        LineRead::Line(raw) => raw,
        LineRead::NoData => return Ok(None),
        LineRead::EndOfHeaders => Vec::new(),
    };
    info!(request = %String::from_utf8_lossy(&raw), "client request");

    let line = RequestLine::from_bytes(&raw)?;

    if !line.is_get() {
        return Err(HandlerError::MethodNotAllowed(line.method));
    }

    if line.wants_headers() {
        skip_headers(&mut reader, ctx)?;
    }

    let resource = ctx.tree.resolve(&line.target)?;
    let request = Request::new(line, resource);
    let size = validate(&request)?;
    let content = match request.kind() {
        ResourceKind::Static => Content::Static {
            file: open_static(&request)?,
            size,
        },
        ResourceKind::Dynamic => Content::Dynamic,
    };

    Ok(Some(Validated { request, content }))
}

/// Consume hasta `max_header_lines` headers; no tienen efecto
fn skip_headers<R: BufRead>(reader: &mut R, ctx: &HandlerContext) -> Result<(), HandlerError> {
    for _ in 0..ctx.max_header_lines {
        match read_line(reader, ctx.max_line)? {
            LineRead::Line(header) => debug!(header = %String::from_utf8_lossy(&header), "ignoring header"),
            LineRead::EndOfHeaders | LineRead::NoData => break,
        }
    }
    Ok(())
}

/// Verifica existencia, tipo y permisos; retorna el tamaño del archivo
fn validate(request: &Request) -> Result<u64, HandlerError> {
    let filename = request.filename();
    let meta: Metadata = fs::metadata(filename).map_err(|e| {
        warn!(file = %filename.display(), "the file could not be found: {}", e);
        HandlerError::NotFound(request.target().to_string())
    })?;

    let required = match request.kind() {
        ResourceKind::Static => OWNER_READ,
        ResourceKind::Dynamic => OWNER_EXEC,
    };

    if !meta.is_file() || meta.permissions().mode() & required == 0 {
        warn!(file = %filename.display(), kind = request.kind().as_str(), "cannot serve the file");
        return Err(HandlerError::Forbidden(request.target().to_string()));
    }

    Ok(meta.len())
}

/// Abre el archivo antes de enviar la cabecera `200 OK`
fn open_static(request: &Request) -> Result<File, HandlerError> {
    File::open(request.filename()).map_err(|e| {
        warn!(file = %request.filename().display(), "cannot open the file: {}", e);
        open_error(request.target(), e)
    })
}

fn open_error(target: &str, err: io::Error) -> HandlerError {
    match err.kind() {
        ErrorKind::NotFound => HandlerError::NotFound(target.to_string()),
        ErrorKind::PermissionDenied => HandlerError::Forbidden(target.to_string()),
        _ => HandlerError::Open {
            target: target.to_string(),
            source: err,
        },
    }
}

fn serve(stream: &TcpStream, validated: Validated, ctx: &HandlerContext) -> Outcome {
    let Validated { request, content } = validated;
    let kind = request.kind();

    let result = match content {
        Content::Static { file, size } => {
            let mut writer = stream;
            serve_static(&mut writer, file, request.filename(), size).map_err(HandlerError::from)
        }
        Content::Dynamic => serve_dynamic(stream, request.filename(), request.args()),
    };

    match result {
        Ok(bytes) => {
            info!(
                method = request.method(),
                uri = request.target(),
                version = request.version(),
                kind = kind.as_str(),
                bytes,
                "response sent"
            );
            ctx.metrics.record_served(kind == ResourceKind::Dynamic, bytes);
            Outcome::Served { kind, bytes }
        }
        Err(err) => {
            warn!(uri = request.target(), "response failed: {}", err);
            ctx.metrics.record_rejection(Rejection::Failed);
            Outcome::Failed
        }
    }
}

/// Rechazo antes de servir: opcionalmente envía el status y cierra
fn reject(stream: &TcpStream, err: HandlerError, ctx: &HandlerContext) -> Outcome {
    let status = err.status();
    info!(%status, "rejecting request: {}", err);

    let cause = match &err {
        HandlerError::Parse(_) => Rejection::BadRequest,
        HandlerError::MethodNotAllowed(_) => Rejection::Method,
        HandlerError::NotFound(_) => Rejection::NotFound,
        HandlerError::Forbidden(_) => Rejection::Forbidden,
        HandlerError::Io(_) | HandlerError::Poll | HandlerError::Open { .. } | HandlerError::Spawn { .. } => {
            Rejection::Failed
        }
    };
    ctx.metrics.record_rejection(cause);

    let mut sent = false;
    if ctx.error_status && err.is_reportable() {
        let mut writer = stream;
        match send_all(&mut writer, &Response::error(status).to_bytes()) {
            Ok(_) => sent = true,
            Err(e) => warn!("cannot send error status: {}", e),
        }
    }

    Outcome::Rejected(status, sent)
}
