//! Todo Service
//!
//! ```text
//!     Client ──▶ net::listener ──▶ http::server ──▶ handlers
//!                                                     │
//!                          /ping   /tokenz (auth::issuer)   /todos
//!                                                     │
//!                                    todo::service (auth::validator)
//!                                                     │
//!                                        todo::store (SQLite)
//!
//!     Cross-cutting: config, observability, lifecycle (startup/shutdown)
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use todo_service::config::load_config;
use todo_service::lifecycle::{signals, startup};
use todo_service::observability::{logging, metrics};
use todo_service::Shutdown;

#[derive(Parser)]
#[command(name = "todo-service")]
#[command(about = "Todo HTTP service", long_about = None)]
struct Cli {
    /// Optional TOML configuration file. Environment variables override it.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let dotenv = dotenvy::from_filename(".env");

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("todo-service: {e}");
            return ExitCode::FAILURE;
        }
    };

    logging::init(&config.observability);
    if let Err(e) = dotenv {
        tracing::warn!(error = %e, "Could not load .env, continuing with process environment");
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address(),
        database_url = %config.database.url,
        read_timeout_secs = config.timeouts.read_secs,
        write_timeout_secs = config.timeouts.write_secs,
        grace_period_secs = config.shutdown.grace_period_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let (server, listener) = match startup::start(config).await {
        Ok(ready) => ready,
        Err(e) => {
            tracing::error!(error = %e, "Startup failed");
            return ExitCode::FAILURE;
        }
    };

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    if let Err(e) = signals::spawn(shutdown.clone()) {
        tracing::error!(error = %e, "Failed to install signal handlers");
        return ExitCode::FAILURE;
    }

    let outcome = server.run(listener, signal).await;

    tracing::info!(outcome = ?outcome, exit_code = outcome.exit_code(), "Shutdown complete");
    ExitCode::from(outcome.exit_code())
}
