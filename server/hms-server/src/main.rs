use clap::Parser;
use colored::*;
use std::path::PathBuf;
use tracing::{info, warn};

use database_layer::DatabasePool;
use error_common::{HmsError, Result};
use hms_server::{create_app, HmsServer, Settings};

/// WardLine HMS HTTP Server
#[derive(Parser, Debug)]
#[command(name = "hms-server")]
#[command(about = "Hospital management REST API server")]
struct Args {
    /// Server bind address (overrides the config file)
    #[arg(long, env = "HMS_HOST")]
    host: Option<String>,

    /// Server port (overrides the config file)
    #[arg(short, long, env = "HMS_PORT")]
    port: Option<u16>,

    /// Configuration file path
    #[arg(short, long, env = "HMS_CONFIG", default_value = "hms-server.yaml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Run database migrations before serving
    #[arg(long)]
    migrate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load(Some(&args.config))?;
    if let Some(host) = args.host {
        settings.server.host = host;
    }
    if let Some(port) = args.port {
        settings.server.port = port;
    }

    logger_redacted::init(&settings.logger_config(args.verbose))?;
    if settings.logging.format == logger_redacted::LogFormat::Pretty {
        print_startup_banner();
    }

    info!("🏥 {}", format!("Starting {}", settings.server.name).bright_cyan());
    info!("📋 Version: {}", env!("CARGO_PKG_VERSION").bright_white());

    let db = DatabasePool::connect(&settings.database.url, &settings.database.pool)
        .await
        .map_err(|e| HmsError::DatabaseError(e.to_string()))?;
    info!("✅ {}", "Database connection established".bright_green());

    if args.migrate || settings.database.run_migrations {
        db.migrate()
            .await
            .map_err(|e| HmsError::DatabaseError(format!("Migration failed: {e}")))?;
        info!("✅ {}", "Database migrations applied".bright_green());
    }

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let server = HmsServer::new(settings, db.clone()).map_err(|e| HmsError::InternalError(e.to_string()))?;
    let inactive = server
        .staff
        .inactive_ids()
        .await
        .map_err(|e| HmsError::DatabaseError(format!("Failed to load deactivated staff: {e}")))?;
    server.revoked.extend(inactive).await;
    info!(revoked = server.revoked.len().await, "Loaded deactivated staff");

    let app = create_app(server);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| HmsError::NetworkError(format!("Failed to bind to {addr}: {e}")))?;

    info!("🚀 {}", format!("WardLine HMS running on http://{addr}").bright_green());
    info!("📋 {}", format!("Health check available at: http://{addr}/health").bright_blue());
    info!("📋 {}", format!("API v1 available at: http://{addr}/api/v1").bright_blue());
    info!("📖 {}", format!("API docs available at: http://{addr}/swagger-ui").bright_blue());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| HmsError::ServerError(format!("HTTP server error: {e}")))?;

    db.close().await;
    info!("👋 {}", "Server stopped".bright_white());
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, draining connections");
}

fn print_startup_banner() {
    println!("{}", "╔══════════════════════════════════════════════════════════════╗".bright_cyan());
    println!("{}", "║                     🏥 WARDLINE HMS                          ║".bright_cyan());
    println!("{}", "║              Hospital Management REST API                    ║".bright_cyan());
    println!("{}", "╚══════════════════════════════════════════════════════════════╝".bright_cyan());
    println!();
}
