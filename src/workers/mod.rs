//! # Workers
//! src/workers/mod.rs
//!
//! Pool acotado de slots de ejecución: como mucho N handlers corren al
//! mismo tiempo.

pub mod pool;

pub use pool::{PoolError, SlotId, WorkerPool};
