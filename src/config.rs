//! # Configuración del Servidor
//! src/config.rs
//!
//! Configuración del servidor con soporte para argumentos CLI y variables
//! de entorno.
//!
//! ## Ejemplos de uso
//!
//! ### CLI
//! ```bash
//! ./tiny_httpd 8080 --root ./www --workers 5 -v -l server.log
//! ```
//!
//! ### Variables de entorno
//! ```bash
//! HTTP_PORT=8080 DOC_ROOT=./www ./tiny_httpd
//! ```

use clap::Parser;
use std::path::PathBuf;

/// Capacidad por defecto del pool (número de slots de workers)
pub const DEFAULT_WORKERS: usize = 5;

/// Longitud máxima por defecto de una línea del request
pub const DEFAULT_MAX_LINE: usize = 1000;

/// Máximo por defecto de líneas de header que se consumen en HTTP/1.1
pub const DEFAULT_MAX_HEADER_LINES: usize = 10;

/// Configuración del servidor HTTP/1.0
#[derive(Debug, Clone, Parser)]
#[command(name = "tiny_httpd")]
#[command(about = "Servidor HTTP/1.0 con contenido estático y dinámico (CGI)")]
#[command(version = "0.1.0")]
pub struct Config {
    /// Puerto en el que escucha el servidor
    #[arg(default_value = "8080", env = "HTTP_PORT")]
    pub port: u16,

    /// Host/IP en el que escucha
    #[arg(long, default_value = "0.0.0.0", env = "HTTP_HOST")]
    pub host: String,

    /// Raíz del árbol de documentos estáticos
    #[arg(long, default_value = ".", env = "DOC_ROOT")]
    pub root: PathBuf,

    /// Directorio contra el que se resuelven los targets dinámicos (cgi-bin)
    #[arg(long = "cgi-root", default_value = ".", env = "CGI_ROOT")]
    pub cgi_root: PathBuf,

    /// Número de slots del pool de workers
    #[arg(long, default_value_t = DEFAULT_WORKERS, env = "WORKERS")]
    pub workers: usize,

    /// Longitud máxima de una línea del request
    #[arg(long = "max-line", default_value_t = DEFAULT_MAX_LINE)]
    pub max_line: usize,

    /// Máximo de líneas de header a consumir (HTTP/1.1)
    #[arg(long = "max-header-lines", default_value_t = DEFAULT_MAX_HEADER_LINES)]
    pub max_header_lines: usize,

    /// Enviar una línea de estado 4xx/5xx antes de cerrar en los rechazos
    #[arg(long = "error-status", env = "ERROR_STATUS")]
    pub error_status: bool,

    /// Logging detallado (nivel info)
    #[arg(short, long)]
    pub verbose: bool,

    /// Escribir el log en este archivo en lugar de stderr
    #[arg(short = 'l', long = "log-file")]
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Crea una nueva configuración parseando argumentos CLI
    pub fn new() -> Self {
        Config::parse()
    }

    /// Obtiene la dirección completa para bind (host:port)
    ///
    /// # Ejemplo
    /// ```rust
    /// use tiny_httpd::config::Config;
    ///
    /// let config = Config::default();
    /// assert_eq!(config.address(), "0.0.0.0:8080");
    /// ```
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Valida la configuración
    ///
    /// Retorna errores si hay valores inválidos
    pub fn validate(&self) -> Result<(), String> {
        if self.workers == 0 {
            return Err("Workers must be >= 1".to_string());
        }
        // "\r\n" necesita al menos dos bytes
        if self.max_line < 2 {
            return Err("Max line length must be >= 2".to_string());
        }
        if self.max_header_lines == 0 {
            return Err("Max header lines must be >= 1".to_string());
        }
        if !self.root.is_dir() {
            return Err(format!("Document root is not a directory: {}", self.root.display()));
        }
        if !self.cgi_root.is_dir() {
            return Err(format!("CGI root is not a directory: {}", self.cgi_root.display()));
        }
        Ok(())
    }

    /// Imprime un resumen de la configuración
    pub fn print_summary(&self) {
        println!("Network:");
        println!("   Address:       {}", self.address());
        println!("   Document root: {}", self.root.display());
        println!("   CGI root:      {}", self.cgi_root.display());
        println!("Workers:");
        println!("   Slots:         {}", self.workers);
        println!("   Max line:      {} bytes", self.max_line);
        println!("   Header lines:  {}", self.max_header_lines);
        println!("   Error status:  {}", if self.error_status { "enabled" } else { "disabled" });
        println!();
    }
}

impl Default for Config {
    /// Configuración por defecto
    fn default() -> Self {
        Self {
            port: 8080,
            host: "0.0.0.0".to_string(),
            root: PathBuf::from("."),
            cgi_root: PathBuf::from("."),
            workers: DEFAULT_WORKERS,
            max_line: DEFAULT_MAX_LINE,
            max_header_lines: DEFAULT_MAX_HEADER_LINES,
            error_status: false,
            verbose: false,
            log_file: None,
        }
    }
}
