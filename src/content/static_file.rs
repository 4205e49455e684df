//! # Contenido Estático
//! src/content/static_file.rs
//!
//! Envía cabecera + contenido exacto de un archivo del árbol de documentos.

use crate::http::{content_type_for, Response};
use crate::net::send_all;
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;

/// Tamaño de bloque para copiar el archivo al socket
const CHUNK_SIZE: usize = 64 * 1024;

/// Sirve `file`, abierto desde `filename` por quien lo validó
///
/// Escribe `Content-length: size` y luego exactamente `size` bytes del
/// archivo. `filename` solo determina el `Content-type`. Retorna el total
/// de bytes enviados (cabecera + cuerpo).
pub fn serve_static<W: Write>(out: &mut W, file: File, filename: &Path, size: u64) -> io::Result<u64> {
    let head = Response::static_head(size, content_type_for(filename)).to_bytes();
    let mut sent = send_all(out, &head)? as u64;

    let mut body = file.take(size);
    let mut chunk = vec![0u8; CHUNK_SIZE];
    let mut copied = 0u64;

    loop {
        let n = match body.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        send_all(out, &chunk[..n])?;
        copied += n as u64;
    }

    // El archivo se achicó después del stat: el Content-length ya salió
    if copied < size {
        return Err(io::Error::new(
            io::ErrorKind::UnexpectedEof,
            format!("{} shrank to {} of {} bytes", filename.display(), copied, size),
        ));
    }

    sent += copied;
    Ok(sent)
}
