//! # Primitivas de Socket
//! src/net/mod.rs
//!
//! - `stream`: lectura por líneas y escritura completa
//! - `readiness`: espera de lectura con timeout opcional

pub mod readiness;
pub mod stream;

pub use readiness::{wait_readable, PollError, Wait, POLL_TIMEOUT};
pub use stream::{read_line, send_all, LineRead};
