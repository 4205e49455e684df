//! # Lectura por líneas y escritura completa
//! src/net/stream.rs
//!
//! `read_line` reemplaza los códigos centinela de una lectura byte a byte
//! por un resultado tipado:
//!
//! | Entrada               | Resultado           |
//! |-----------------------|---------------------|
//! | `GET / HTTP/1.0\r\n`  | `Line("GET / ...")` |
//! | EOF antes del 1er byte| `NoData`            |
//! | `\r\n` (línea vacía)  | `EndOfHeaders`      |
//! | error de lectura      | `Err(io::Error)`    |

use std::io::{self, BufRead, ErrorKind, Write};

/// Resultado de leer una línea
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRead {
    /// Línea ordinaria, sin el terminador (bytes crudos, sin decodificar)
    Line(Vec<u8>),
    /// El peer cerró sin enviar nada
    NoData,
    /// Línea vacía: fin de los headers
    EndOfHeaders,
}

/// Lee una línea de a lo sumo `max_len` bytes (terminador incluido)
///
/// Tolera lecturas parciales: sigue pidiendo bytes al lector hasta ver
/// `\n`, llegar a `max_len` o encontrar EOF. Una línea cortada por
/// `max_len` o por EOF se retorna tal cual como `Line`. Los bytes no se
/// decodifican: eso le toca a quien interpreta la línea.
///
/// ```
/// use std::io::Cursor;
/// use tiny_httpd::net::{read_line, LineRead};
///
/// let mut input = Cursor::new(b"GET / HTTP/1.0\r\n".to_vec());
/// assert_eq!(read_line(&mut input, 1000).unwrap(), LineRead::Line("GET / HTTP/1.0".into()));
/// assert_eq!(read_line(&mut input, 1000).unwrap(), LineRead::NoData);
/// ```
pub fn read_line<R: BufRead>(reader: &mut R, max_len: usize) -> io::Result<LineRead> {
    let mut line = Vec::with_capacity(128);

    while line.len() < max_len {
        let available = match reader.fill_buf() {
            Ok(buf) => buf,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };

        if available.is_empty() {
            break;
        }

        let wanted = (max_len - line.len()).min(available.len());
        let (taken, found_newline) = match available[..wanted].iter().position(|&b| b == b'\n') {
            Some(pos) => (pos + 1, true),
            None => (wanted, false),
        };

        line.extend_from_slice(&available[..taken]);
        reader.consume(taken);

        if found_newline {
            break;
        }
    }

    if line.is_empty() {
        return Ok(LineRead::NoData);
    }
    if line == b"\r\n" || line == b"\n" {
        return Ok(LineRead::EndOfHeaders);
    }

    while matches!(line.last(), Some(b'\n') | Some(b'\r')) {
        line.pop();
    }

    Ok(LineRead::Line(line))
}

/// Escribe todos los bytes o falla
///
/// Reintenta las escrituras parciales e interrumpidas. Una escritura de
/// cero bytes (el peer cerró) es un error `WriteZero`.
pub fn send_all<W: Write>(writer: &mut W, bytes: &[u8]) -> io::Result<usize> {
    let mut sent = 0;

    while sent < bytes.len() {
        match writer.write(&bytes[sent..]) {
            Ok(0) => {
                return Err(io::Error::new(
                    ErrorKind::WriteZero,
                    format!("peer closed after {} of {} bytes", sent, bytes.len()),
                ));
            }
            Ok(n) => sent += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }

    Ok(sent)
}
