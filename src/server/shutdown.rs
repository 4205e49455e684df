//! # Señal de Apagado
//! src/server/shutdown.rs
//!
//! Token compartido que el acceptor consulta entre iteraciones. Empieza en
//! `false`, se activa a lo sumo una vez y nunca se limpia. Las señales
//! SIGINT/SIGTERM se conectan al token con `signal-hook`; los tests lo
//! activan directamente con `trigger()`.

use signal_hook::consts::{SIGINT, SIGTERM};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct ShutdownToken {
    flag: Arc<AtomicBool>,
}

impl ShutdownToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pide el apagado
    pub fn trigger(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    pub fn is_triggered(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }

    /// Activa el token cuando llegue SIGINT o SIGTERM
    ///
    /// El manejador solo escribe el flag atómico. Si el acceptor está
    /// bloqueado en poll(2), la señal lo interrumpe con EINTR y el loop
    /// ve el token en la siguiente vuelta.
    pub fn register_signals(&self) -> io::Result<()> {
        for signal in [SIGINT, SIGTERM] {
            signal_hook::flag::register(signal, Arc::clone(&self.flag))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_clear_and_stays_set() {
        let token = ShutdownToken::new();
        assert!(!token.is_triggered());

        token.trigger();
        token.trigger();
        assert!(token.is_triggered());
    }

    #[test]
    fn test_clones_share_flag() {
        let token = ShutdownToken::new();
        let observer = token.clone();
        token.trigger();
        assert!(observer.is_triggered());
    }
}
