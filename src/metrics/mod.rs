//! # Sistema de Métricas
//! src/metrics/mod.rs
//!
//! Contadores del proceso:
//! - Conexiones aceptadas y fallos de accept/poll
//! - Respuestas estáticas/dinámicas y bytes enviados
//! - Rechazos por causa
//! - Drenados del pool y concurrencia máxima

pub mod collector;

pub use collector::{MetricsCollector, MetricsSnapshot, Rejection};
