//! autoroute service entry point.

use clap::{Parser, Subcommand};
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use autoroute::config::{Config, LogFormat};
use autoroute::discovery::{discover_routers, RouterDiscovery};
use autoroute::error::AppError;
use autoroute::metrics;
use autoroute::utils::shutdown_signal;
use autoroute::Application;

/// HTTP service with a greeting endpoint and auto-mounted route modules.
#[derive(Parser, Debug)]
#[command(name = "autoroute")]
#[command(about = "Serve the greeting endpoint and every discovered route module")]
#[command(version)]
struct Args {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP server (default).
    Serve {
        /// Address to bind, overrides HOST.
        #[arg(long)]
        host: Option<String>,

        /// Port to bind, overrides PORT.
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// List route modules and whether each mounts a router.
    Routes,

    /// Check configuration validity.
    CheckConfig,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Logging needs the config's level and format; fall back to defaults if it does not load.
    let config = Config::load();
    let (filter, log_format) = match &config {
        Ok(c) => (c.log_filter(args.verbose), c.log_format),
        Err(_) => (Config::default().log_filter(args.verbose), LogFormat::default()),
    };
    init_logging(filter, log_format);

    match args.command {
        Some(Command::CheckConfig) => cmd_check_config(config),
        Some(Command::Routes) => cmd_routes(),
        Some(Command::Serve { host, port }) => cmd_serve(config?, host, port).await,
        None => cmd_serve(config?, None, None).await,
    }
}

fn init_logging(filter: EnvFilter, format: LogFormat) {
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(fmt::layer()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}

/// Check configuration validity.
fn cmd_check_config(config: autoroute::Result<Config>) -> anyhow::Result<()> {
    println!("======================================================================");
    println!("AUTOROUTE - CONFIGURATION CHECK");
    println!("======================================================================");

    print!("Loading configuration... ");
    let config = match config {
        Ok(c) => {
            println!("OK");
            c
        }
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration load failed"));
        }
    };

    print!("Validating configuration... ");
    match config.validate() {
        Ok(()) => println!("OK"),
        Err(e) => {
            println!("FAILED");
            println!("  Error: {}", e);
            return Err(anyhow::anyhow!("Configuration validation failed"));
        }
    }

    println!("----------------------------------------------------------------------");
    println!("Configuration Summary:");
    println!("  Bind Address: {}:{}", config.host, config.port);
    println!("  Greeting: {}", config.greeting_message);
    println!("  Metrics: {}", if config.metrics_enabled { "Enabled" } else { "Disabled" });
    println!("  OpenAPI: {}", if config.openapi_enabled { "Enabled" } else { "Disabled" });
    println!("  Log Format: {}", config.log_format);
    println!("======================================================================");
    println!("CONFIGURATION CHECK PASSED");
    println!("======================================================================");

    Ok(())
}

/// List route modules in discovery order.
fn cmd_routes() -> anyhow::Result<()> {
    println!("======================================================================");
    println!("AUTOROUTE - ROUTE MODULES");
    println!("======================================================================");

    let routers = discover_routers()?;
    let discovery = RouterDiscovery::global();

    for name in discovery.candidates() {
        let mounted = routers.iter().any(|r| r.module == name);
        println!(
            "  {:<24} {}",
            name,
            if mounted { "router mounted" } else { "no router" }
        );
    }

    println!("----------------------------------------------------------------------");
    println!("  {} module(s), {} router(s)", discovery.candidates().len(), routers.len());
    println!("======================================================================");

    Ok(())
}

/// Run the HTTP server until a shutdown signal arrives.
async fn cmd_serve(
    mut config: Config,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> anyhow::Result<()> {
    if let Some(host) = host_override {
        config.host = host;
    }
    if let Some(port) = port_override {
        config.port = port;
    }

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(e.into());
    }
    let addr = config.bind_addr()?;
    info!("Configuration loaded successfully");

    let metrics_handle = if config.metrics_enabled {
        match metrics::install_recorder() {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("Failed to install metrics recorder: {}", e);
                None
            }
        }
    } else {
        None
    };
    metrics::init_metrics();

    let app = Application::global(&config, metrics_handle).map_err(|e| {
        error!("Startup failed: {}", e);
        e
    })?;
    info!("Mounted route modules: {:?}", app.mounted_modules());

    let listener = TcpListener::bind(addr).await.map_err(AppError::Io)?;
    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app.router())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}
