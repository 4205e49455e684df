//! Tests de integración para el servidor HTTP
//! tests/integration_test.rs
//!
//! Cada test levanta un `Server` completo en un puerto efímero sobre un
//! árbol de documentos temporal y lo apaga con el token al final.

use std::fs;
use std::io::{ErrorKind, Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tempfile::TempDir;
use tiny_httpd::config::Config;
use tiny_httpd::metrics::MetricsSnapshot;
use tiny_httpd::server::{Server, ShutdownToken};

/// Servidor corriendo en un thread de fondo
struct Running {
    addr: SocketAddr,
    shutdown: ShutdownToken,
    handle: JoinHandle<MetricsSnapshot>,
}

impl Running {
    fn start(root: &Path, workers: usize, error_status: bool) -> Self {
        let config = Config {
            port: 0,
            host: "127.0.0.1".to_string(),
            root: root.to_path_buf(),
            cgi_root: root.to_path_buf(),
            workers,
            error_status,
            ..Config::default()
        };

        let server = Server::bind(&config).expect("bind");
        let addr = server.local_addr().unwrap();
        let shutdown = ShutdownToken::new();
        let handle = thread::spawn({
            let shutdown = shutdown.clone();
            move || server.run(&shutdown).expect("run")
        });

        Self { addr, shutdown, handle }
    }

    /// Activa el token y despierta el poll con una conexión vacía
    fn stop(self) -> MetricsSnapshot {
        self.shutdown.trigger();
        drop(TcpStream::connect(self.addr).unwrap());
        self.handle.join().unwrap()
    }
}

/// Envía `raw` y retorna todo lo recibido hasta que el servidor cierra
fn send_raw(addr: SocketAddr, raw: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).unwrap();
    stream.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
    stream.write_all(raw).unwrap();

    let mut response = Vec::new();
    stream.read_to_end(&mut response).unwrap();
    response
}

fn get(addr: SocketAddr, target: &str) -> Vec<u8> {
    send_raw(addr, format!("GET {} HTTP/1.0\r\n\r\n", target).as_bytes())
}

/// Separa cabecera y cuerpo
fn split_response(raw: &[u8]) -> (String, Vec<u8>) {
    match raw.windows(4).position(|w| w == b"\r\n\r\n") {
        Some(pos) => (String::from_utf8_lossy(&raw[..pos]).into_owned(), raw[pos + 4..].to_vec()),
        None => (String::from_utf8_lossy(raw).into_owned(), Vec::new()),
    }
}

fn document_tree() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("index.html"), b"<html>home</html>").unwrap();
    fs::create_dir(dir.path().join("cgi-bin")).unwrap();
    dir
}

fn write_cgi(root: &Path, name: &str, body: &str) {
    let path = root.join("cgi-bin").join(name);
    fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
}

#[test]
fn test_static_file_is_byte_exact() {
    let tree = document_tree();
    let image: Vec<u8> = (0..50_000u32).map(|i| (i * 7 % 256) as u8).collect();
    fs::write(tree.path().join("photo.jpg"), &image).unwrap();
    let server = Running::start(tree.path(), 5, false);

    let (head, body) = split_response(&get(server.addr, "/photo.jpg"));

    assert!(head.starts_with("HTTP/1.0 200 OK"));
    assert!(head.contains("Content-length: 50000"));
    assert!(head.contains("Content-type: image/jpeg"));
    assert_eq!(body, image);

    let stats = server.stop();
    assert_eq!(stats.static_served, 1);
}

#[test]
fn test_root_serves_default_index() {
    let tree = document_tree();
    let server = Running::start(tree.path(), 5, false);

    let (head, body) = split_response(&get(server.addr, "/"));
    assert!(head.contains("Content-type: text/html"));
    assert_eq!(body, b"<html>home</html>");

    server.stop();
}

#[test]
fn test_http11_request_with_headers() {
    let tree = document_tree();
    let server = Running::start(tree.path(), 5, false);

    let raw = send_raw(
        server.addr,
        b"GET /index.html HTTP/1.1\r\nHost: localhost\r\nUser-Agent: test\r\n\r\n",
    );
    let (head, body) = split_response(&raw);
    assert!(head.starts_with("HTTP/1.0 200 OK"));
    assert_eq!(body, b"<html>home</html>");

    server.stop();
}

#[test]
fn test_dynamic_content_receives_query_string() {
    let tree = document_tree();
    write_cgi(
        tree.path(),
        "adder",
        "printf 'Content-type: text/plain\\r\\n\\r\\nargs=%s' \"$QUERY_STRING\"",
    );
    let server = Running::start(tree.path(), 5, false);

    let text = String::from_utf8(get(server.addr, "/cgi-bin/adder?1&2")).unwrap();
    assert!(text.starts_with("HTTP/1.0 200 OK\r\nServer: tiny_httpd\r\n"));
    assert!(text.ends_with("\r\n\r\nargs=1&2"));

    let stats = server.stop();
    assert_eq!(stats.dynamic_served, 1);
}

#[test]
fn test_post_gets_no_bytes() {
    let tree = document_tree();
    let server = Running::start(tree.path(), 5, false);

    let raw = send_raw(server.addr, b"POST /index.html HTTP/1.0\r\n\r\n");
    assert!(raw.is_empty());

    let stats = server.stop();
    assert_eq!(stats.rejected.method, 1);
    assert_eq!(stats.static_served, 0);
}

#[test]
fn test_missing_file_closes_without_response() {
    let tree = document_tree();
    let server = Running::start(tree.path(), 5, false);

    assert!(get(server.addr, "/missing.html").is_empty());

    let stats = server.stop();
    assert_eq!(stats.rejected.not_found, 1);
    assert_eq!(stats.static_served, 0);
}

#[test]
fn test_error_status_mode() {
    let tree = document_tree();
    write_cgi(tree.path(), "noexec", "echo hi");
    fs::set_permissions(
        tree.path().join("cgi-bin/noexec"),
        fs::Permissions::from_mode(0o644),
    )
    .unwrap();
    let server = Running::start(tree.path(), 5, true);

    let missing = String::from_utf8(get(server.addr, "/missing.html")).unwrap();
    assert!(missing.starts_with("HTTP/1.0 404 Not Found\r\n"));

    let forbidden = String::from_utf8(get(server.addr, "/cgi-bin/noexec")).unwrap();
    assert!(forbidden.starts_with("HTTP/1.0 403 Forbidden\r\n"));

    let post = String::from_utf8(send_raw(server.addr, b"POST / HTTP/1.0\r\n\r\n")).unwrap();
    assert!(post.starts_with("HTTP/1.0 501 Not Implemented\r\n"));

    let bad = String::from_utf8(send_raw(server.addr, b"GET\r\n")).unwrap();
    assert!(bad.starts_with("HTTP/1.0 400 Bad Request\r\n"));

    let version = String::from_utf8(send_raw(server.addr, b"GET / HTTP/9.9\r\n\r\n")).unwrap();
    assert!(version.starts_with("HTTP/1.0 400 Bad Request\r\n"));

    server.stop();
}

#[test]
fn test_capacity_one_blocks_second_connection() {
    let tree = document_tree();
    let server = Running::start(tree.path(), 1, false);

    // Primera conexión: ocupa el único slot sin enviar todavía
    let mut first = TcpStream::connect(server.addr).unwrap();
    thread::sleep(Duration::from_millis(200));

    // Segunda conexión: envía el request completo de inmediato
    let mut second = TcpStream::connect(server.addr).unwrap();
    second.write_all(b"GET / HTTP/1.0\r\n\r\n").unwrap();
    second.set_read_timeout(Some(Duration::from_millis(400))).unwrap();

    let mut probe = [0u8; 1];
    let blocked = second.read(&mut probe).unwrap_err();
    assert!(matches!(blocked.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut));

    // Al terminar la primera, la segunda se atiende
    first.write_all(b"GET / HTTP/1.0\r\n\r\n").unwrap();
    let mut first_response = Vec::new();
    first.read_to_end(&mut first_response).unwrap();
    assert!(first_response.starts_with(b"HTTP/1.0 200 OK"));

    second.set_read_timeout(Some(Duration::from_secs(10))).unwrap();
    let mut second_response = Vec::new();
    second.read_to_end(&mut second_response).unwrap();
    assert!(second_response.starts_with(b"HTTP/1.0 200 OK"));

    let stats = server.stop();
    assert!(stats.pool_drains >= 1);
    assert_eq!(stats.peak_concurrent, 1);
}

#[test]
fn test_concurrent_handlers_bounded_by_pool() {
    let tree = document_tree();
    write_cgi(tree.path(), "slow", "sleep 0.2; printf '\\r\\ndone'");
    let server = Running::start(tree.path(), 2, false);
    let addr = server.addr;

    let clients: Vec<_> = (0..6)
        .map(|_| thread::spawn(move || get(addr, "/cgi-bin/slow")))
        .collect();

    for client in clients {
        let text = String::from_utf8(client.join().unwrap()).unwrap();
        assert!(text.ends_with("\r\ndone"), "unexpected response: {}", text);
    }

    let stats = server.stop();
    assert_eq!(stats.dynamic_served, 6);
    assert!(stats.peak_concurrent <= 2);
}

#[test]
fn test_connection_without_data_is_closed() {
    let tree = document_tree();
    let server = Running::start(tree.path(), 5, false);

    let mut silent = TcpStream::connect(server.addr).unwrap();
    silent.shutdown(std::net::Shutdown::Write).unwrap();
    let mut buf = Vec::new();
    silent.read_to_end(&mut buf).unwrap();
    assert!(buf.is_empty());

    // El servidor sigue atendiendo
    assert!(!get(server.addr, "/").is_empty());
    server.stop();
}
