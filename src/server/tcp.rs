//! # Acceptor
//! src/server/tcp.rs
//!
//! Dueño del socket de escucha y del pool de workers.
//!
//! ```text
//! Init → Listening → { WaitReadable → Accepting → Dispatching }* → ShuttingDown → Closed
//! ```
//!
//! Cada conexión aceptada corre en su propio thread dentro de un slot del
//! pool. Cuando el pool está lleno no se acepta nada más hasta drenarlo.

use crate::config::Config;
use crate::error::ServerError;
use crate::metrics::{MetricsCollector, MetricsSnapshot};
use crate::net::{wait_readable, Wait};
use crate::server::connection::{handle_connection, HandlerContext};
use crate::server::shutdown::ShutdownToken;
use crate::workers::WorkerPool;
use socket2::{Domain, Protocol, Socket, Type};
use std::io::{self, ErrorKind};
use std::net::{SocketAddr, TcpListener, TcpStream, ToSocketAddrs};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Conexiones que el kernel encola antes del accept
const LISTEN_BACKLOG: i32 = 128;

/// Pausa tras el primer fallo de accept; se duplica con cada fallo seguido
const ACCEPT_BACKOFF_BASE: Duration = Duration::from_millis(10);

/// Tope de la pausa entre accepts fallidos
const ACCEPT_BACKOFF_MAX: Duration = Duration::from_secs(1);

/// Servidor HTTP/1.0 con pool acotado
pub struct Server {
    listener: TcpListener,
    pool: WorkerPool,
    ctx: Arc<HandlerContext>,
    metrics: MetricsCollector,
}

impl Server {
    /// Init: valida la configuración, crea el socket con SO_REUSEADDR, lo
    /// bindea y empieza a escuchar
    ///
    /// Cualquier fallo aquí es fatal: el servidor no arranca.
    pub fn bind(config: &Config) -> Result<Self, ServerError> {
        config.validate().map_err(ServerError::Config)?;

        let address = config.address();
        let listener = open_listener(&address).map_err(|source| {
            error!(%address, "failed to set up the server: {}", source);
            ServerError::Bind {
                addr: address.clone(),
                source,
            }
        })?;

        let local = listener.local_addr()?;
        info!(address = %local, workers = config.workers, "server is listening");

        let metrics = MetricsCollector::new();
        Ok(Self {
            listener,
            pool: WorkerPool::new(config.workers),
            ctx: Arc::new(HandlerContext::from_config(config, metrics.clone())),
            metrics,
        })
    }

    /// Dirección real de escucha (útil con puerto 0)
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn metrics(&self) -> MetricsCollector {
        self.metrics.clone()
    }

    /// Loop principal hasta que `shutdown` se active
    ///
    /// El token se revisa entre iteraciones. Si el loop está bloqueado
    /// esperando conexiones, el apagado se nota cuando la espera retorna
    /// (una conexión nueva o EINTR por la señal). Los handlers en curso
    /// terminan normalmente: antes de cerrar se drena el pool.
    pub fn run(self, shutdown: &ShutdownToken) -> Result<MetricsSnapshot, ServerError> {
        let mut accept_failures: u32 = 0;

        while !shutdown.is_triggered() {
            debug!("waiting for connections");

            match wait_readable(&self.listener, Wait::Forever) {
                Ok(()) => {}
                Err(e) if e.is_interrupted() => {
                    debug!("wait for connections interrupted by a signal");
                    continue;
                }
                Err(e) => {
                    self.metrics.record_poll_failure();
                    warn!("failed to wait for connections: {}", e);
                    continue;
                }
            }

            if self.pool.is_saturated() {
                let reclaimed = self.pool.drain();
                self.metrics.record_drain();
                info!(reclaimed, "worker pool released");
                continue;
            }

            let (stream, peer) = match self.accept() {
                Ok(Some(conn)) => {
                    accept_failures = 0;
                    conn
                }
                Ok(None) => continue,
                Err(e) => {
                    // Un error persistente (EMFILE) deja el listener legible
                    accept_failures = accept_failures.saturating_add(1);
                    self.metrics.record_accept_failure();
                    let pause = accept_backoff(accept_failures);
                    warn!(failures = accept_failures, ?pause, "failed to accept connection: {}", e);
                    thread::sleep(pause);
                    continue;
                }
            };

            self.metrics.record_accept();
            info!(%peer, "new client connection received");
            self.dispatch(stream, peer);
        }

        info!("shutting down the server");
        let reclaimed = self.pool.drain();
        debug!(reclaimed, "in-flight handlers finished");

        let snapshot = self.metrics.snapshot();
        info!(target: "output", "server statistics:\n{}", self.metrics.to_json());
        drop(self.listener);
        Ok(snapshot)
    }

    /// `Ok(None)` si la conexión desapareció entre el poll y el accept
    fn accept(&self) -> io::Result<Option<(TcpStream, SocketAddr)>> {
        match self.listener.accept() {
            Ok((stream, peer)) => {
                // Los handlers usan lecturas/escrituras bloqueantes
                stream.set_nonblocking(false)?;
                Ok(Some((stream, peer)))
            }
            Err(e) if e.kind() == ErrorKind::WouldBlock || e.kind() == ErrorKind::Interrupted => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn dispatch(&self, stream: TcpStream, peer: SocketAddr) {
        let slot = match self.pool.acquire() {
            Ok(slot) => slot,
            Err(e) => {
                // El stream se cierra al soltarse
                error!(%peer, "no worker slot for connection: {}", e);
                return;
            }
        };

        let ctx = Arc::clone(&self.ctx);
        let started = self.pool.start(slot, move || {
            handle_connection(stream, peer, &ctx);
        });

        match started {
            Ok(()) => self.metrics.record_concurrency(self.pool.peak_running()),
            Err(e) => {
                self.metrics.record_accept_failure();
                error!(%peer, %slot, "cannot start handler: {}", e);
            }
        }
    }
}

/// Pausa antes de reintentar tras `failures` accepts fallidos seguidos
fn accept_backoff(failures: u32) -> Duration {
    let shift = failures.saturating_sub(1).min(16);
    ACCEPT_BACKOFF_BASE.saturating_mul(1 << shift).min(ACCEPT_BACKOFF_MAX)
}

/// Crea el socket de escucha no bloqueante
fn open_listener(address: &str) -> io::Result<TcpListener> {
    let addr = address
        .to_socket_addrs()?
        .next()
        .ok_or_else(|| io::Error::new(ErrorKind::InvalidInput, "address resolved to nothing"))?;

    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
    socket.set_reuse_address(true)?;
    socket.bind(&addr.into())?;
    socket.listen(LISTEN_BACKLOG)?;
    socket.set_nonblocking(true)?;

    Ok(socket.into())
}
