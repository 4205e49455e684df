//! # Collector de Métricas
//! src/metrics/collector.rs
//!
//! Contadores del servidor compartidos entre el acceptor y los handlers.

use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

/// Causas por las que una conexión termina sin contenido
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    NoData,
    BadRequest,
    Method,
    NotFound,
    Forbidden,
    Failed,
}

/// Collector de métricas thread-safe
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<Mutex<MetricsData>>,
    start_time: Instant,
}

/// Datos internos de métricas
#[derive(Debug, Default)]
struct MetricsData {
    connections_accepted: u64,
    accept_failures: u64,
    poll_failures: u64,
    static_served: u64,
    dynamic_served: u64,
    rejected: RejectionCounts,
    bytes_sent: u64,
    pool_drains: u64,
    peak_concurrent: u64,
}

/// Conexiones rechazadas por causa
#[derive(Debug, Default, Clone, Serialize)]
pub struct RejectionCounts {
    pub no_data: u64,
    pub bad_request: u64,
    pub method: u64,
    pub not_found: u64,
    pub forbidden: u64,
    pub failed: u64,
}

/// Snapshot de métricas (para uso externo)
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: u64,
    pub connections_accepted: u64,
    pub accept_failures: u64,
    pub poll_failures: u64,
    pub static_served: u64,
    pub dynamic_served: u64,
    pub rejected: RejectionCounts,
    pub bytes_sent: u64,
    pub pool_drains: u64,
    pub peak_concurrent: u64,
}

impl MetricsCollector {
    /// Crea un nuevo collector de métricas
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MetricsData::default())),
            start_time: Instant::now(),
        }
    }

    fn data(&self) -> MutexGuard<'_, MetricsData> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn record_accept(&self) {
        self.data().connections_accepted += 1;
    }

    pub fn record_accept_failure(&self) {
        self.data().accept_failures += 1;
    }

    pub fn record_poll_failure(&self) {
        self.data().poll_failures += 1;
    }

    pub fn record_drain(&self) {
        self.data().pool_drains += 1;
    }

    /// Guarda el máximo de handlers simultáneos visto por el pool
    pub fn record_concurrency(&self, running: usize) {
        let mut data = self.data();
        data.peak_concurrent = data.peak_concurrent.max(running as u64);
    }

    /// Respuesta completa enviada
    pub fn record_served(&self, dynamic: bool, bytes: u64) {
        let mut data = self.data();
        if dynamic {
            data.dynamic_served += 1;
        } else {
            data.static_served += 1;
        }
        data.bytes_sent += bytes;
    }

    pub fn record_rejection(&self, cause: Rejection) {
        let mut data = self.data();
        let counter = match cause {
            Rejection::NoData => &mut data.rejected.no_data,
            Rejection::BadRequest => &mut data.rejected.bad_request,
            Rejection::Method => &mut data.rejected.method,
            Rejection::NotFound => &mut data.rejected.not_found,
            Rejection::Forbidden => &mut data.rejected.forbidden,
            Rejection::Failed => &mut data.rejected.failed,
        };
        *counter += 1;
    }

    /// Obtiene un snapshot de las métricas
    pub fn snapshot(&self) -> MetricsSnapshot {
        let data = self.data();

        MetricsSnapshot {
            uptime_secs: self.start_time.elapsed().as_secs(),
            connections_accepted: data.connections_accepted,
            accept_failures: data.accept_failures,
            poll_failures: data.poll_failures,
            static_served: data.static_served,
            dynamic_served: data.dynamic_served,
            rejected: data.rejected.clone(),
            bytes_sent: data.bytes_sent,
            pool_drains: data.pool_drains,
            peak_concurrent: data.peak_concurrent,
        }
    }

    /// Snapshot en JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(&self.snapshot()).unwrap_or_else(|e| format!(r#"{{"error": "{}"}}"#, e))
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}
