use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use here_maps_mcp::here::HereHttpClient;
use here_maps_mcp::mcp::McpServer;
use here_maps_mcp::tools::{MapToolRouter, ToolCatalog, ToolDispatcher};

mod cli;
mod config;

use cli::Cli;
use cli::commands::Commands;
use config::Config;

fn setup_logging(cli: &Cli, config: &Config) -> Result<PathBuf> {
    // Create log directory; stdout belongs to the protocol
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(env!("CARGO_PKG_NAME"))
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join(format!("{}.log", env!("CARGO_PKG_NAME")));

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    let level = if cli.is_verbose() {
        "debug"
    } else {
        config.log_level.as_deref().unwrap_or("info")
    };

    env_logger::Builder::new()
        .parse_filters(level)
        .parse_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(log_file)
}

fn build_router(cli: &Cli, config: &Config) -> Result<MapToolRouter> {
    let api_key = config.api_key(cli.api_key.as_deref())?;
    let http = HereHttpClient::new(config.here.timeout()).context("Failed to create HTTP client")?;

    Ok(MapToolRouter::new(Arc::new(http), api_key).with_endpoints(config.here.endpoints.clone()))
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    match cli.command.as_ref().unwrap_or(&Commands::Serve) {
        Commands::Serve => handle_serve(cli, config).await,
        Commands::Tools { json } => handle_tools(*json),
        Commands::Call { name, arguments } => handle_call(cli, config, name, arguments).await,
    }
}

async fn handle_serve(cli: &Cli, config: &Config) -> Result<()> {
    let router = build_router(cli, config)?;
    info!("Serving {} tools over stdio", router.catalog().len());

    McpServer::new(Arc::new(router))
        .run_stdio()
        .await
        .context("MCP server failed")?;

    info!("Shutting down");
    Ok(())
}

fn handle_tools(json: bool) -> Result<()> {
    let catalog = ToolCatalog::builtin();

    if json {
        println!("{}", serde_json::to_string_pretty(catalog.definitions())?);
        return Ok(());
    }

    for tool in catalog.definitions() {
        println!("{}", tool.name.green().bold());
        println!("  {}", tool.description);
        println!("  {} {}", "required:".cyan(), tool.required_params().join(", "));
    }
    Ok(())
}

async fn handle_call(cli: &Cli, config: &Config, name: &str, arguments: &str) -> Result<()> {
    let arguments: serde_json::Value =
        serde_json::from_str(arguments).context("Arguments must be a JSON object")?;
    let router = build_router(cli, config)?;

    info!("Calling {} from the command line", name);
    let envelope = router.dispatch(name, arguments).await;

    if envelope.is_error {
        eprintln!("{} {}", "Tool error:".red(), envelope.text());
    } else {
        println!("{}", envelope.text());
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    setup_logging(&cli, &config).context("Failed to setup logging")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
