//! # tiny_httpd - Entry Point
//! src/main.rs
//!
//! Parsea la CLI, configura el logging, conecta SIGINT/SIGTERM al token
//! de apagado y corre el servidor hasta que llegue una señal.

use std::process::ExitCode;
use tiny_httpd::config::Config;
use tiny_httpd::error::ServerError;
use tiny_httpd::logging;
use tiny_httpd::server::{Server, ShutdownToken};

fn main() -> ExitCode {
    let config = Config::new();

    if let Err(e) = logging::init(config.verbose, config.log_file.as_deref()) {
        eprintln!("Logging disabled: {}", e);
    }

    println!("=================================");
    println!("  tiny_httpd HTTP/1.0 Server");
    println!("=================================\n");
    config.print_summary();

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error fatal: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), ServerError> {
    let shutdown = ShutdownToken::new();
    shutdown.register_signals().map_err(ServerError::Signal)?;

    let server = Server::bind(config)?;
    let stats = server.run(&shutdown)?;

    println!(
        "Served {} static / {} dynamic responses over {} connections",
        stats.static_served, stats.dynamic_served, stats.connections_accepted
    );
    Ok(())
}
