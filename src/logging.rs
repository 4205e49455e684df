//! # Logging
//! src/logging.rs
//!
//! Inicializa el subscriber de `tracing`. Los niveles del servidor son
//! error, warning, info y output; `output` se emite como `info!` con
//! target `output` para que siempre sea visible.
//!
//! ```text
//! por defecto:  warn,output=info
//! --verbose:    info
//! RUST_LOG:     tiene prioridad sobre ambos
//! ```

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Mutex;
use tracing_subscriber::EnvFilter;

/// Filtro por defecto sin `--verbose`
const DEFAULT_FILTER: &str = "warn,output=info";

/// Filtro con `--verbose`
const VERBOSE_FILTER: &str = "info";

/// Construye el filtro a partir de `RUST_LOG` o del flag verbose
fn build_filter(verbose: bool) -> EnvFilter {
    let fallback = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback))
}

/// Instala el subscriber global
///
/// Con `log_file` los mensajes se agregan al archivo (sin colores);
/// si no, van a stderr. Si ya había un subscriber instalado (por ejemplo
/// en tests) se retorna error y el servidor sigue funcionando igual.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<(), String> {
    let filter = build_filter(verbose);

    match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|e| format!("Cannot open log file {}: {}", path.display(), e))?;

            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_ansi(false)
                .with_thread_names(true)
                .with_writer(Mutex::new(file))
                .try_init()
                .map_err(|e| e.to_string())
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_thread_names(true)
            .with_writer(std::io::stderr)
            .try_init()
            .map_err(|e| e.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_unwritable_is_reported() {
        let result = init(false, Some(Path::new("/nonexistent-dir/x/server.log")));
        assert!(result.unwrap_err().contains("Cannot open log file"));
    }
}
