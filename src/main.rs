//! Indodax MCP server - main entry point
//!
//! This binary provides two subcommands:
//! - serve: Run the MCP server on stdin/stdout (default)
//! - tools: Print the tool table and exit

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use indodax_mcp::{Config, IndodaxClient, McpServer, ToolRegistry};

#[derive(Parser, Debug)]
#[command(name = "indodax-mcp")]
#[command(about = "Indodax exchange API as MCP tools over stdio", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Load environment variables from this file instead of ./.env
    #[arg(long, global = true)]
    env_file: Option<PathBuf>,

    /// Directory for log files
    #[arg(long, global = true, default_value = "logs")]
    log_dir: String,

    /// Log to stderr only
    #[arg(long, global = true)]
    no_log_file: bool,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Commands {
    /// Run the MCP server over stdin/stdout
    Serve,

    /// List available tools with their parameters
    Tools,
}

fn setup_logging(verbose: bool, log_dir: Option<&str>) -> Result<()> {
    // Set log level - filter out noisy external crates
    let level = if verbose { "debug" } else { "info" };
    let filter_str = format!(
        "{},hyper=warn,hyper_util=warn,reqwest=warn,rustls=warn,h2=warn",
        level
    );
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&filter_str));

    // stdout carries protocol messages, so the console layer writes to stderr
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_ansi(false);

    let log_path = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)?;
            let log_filename = format!(
                "indodax-mcp_{}.log",
                chrono::Local::now().format("%Y-%m-%d_%H-%M-%S")
            );
            Some(Path::new(dir).join(log_filename))
        }
        None => None,
    };

    let file_layer = log_path.as_ref().map(|path| {
        let dir = path.parent().unwrap_or_else(|| Path::new("."));
        let name = path.file_name().unwrap_or_default();
        tracing_subscriber::fmt::layer()
            .with_writer(tracing_appender::rolling::never(dir, name))
            .with_target(true)
            .with_line_number(true)
            .with_file(true)
            .with_ansi(false)
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .init();

    if let Some(path) = log_path {
        info!("Log file: {}", path.display());
    }

    Ok(())
}

fn load_env(env_file: Option<&Path>) -> Result<()> {
    match env_file {
        Some(path) => {
            dotenv::from_path(path)
                .with_context(|| format!("Failed to load env file {}", path.display()))?;
        }
        None => {
            // A missing ./.env is fine; variables may come from the host process
            dotenv::dotenv().ok();
        }
    }
    Ok(())
}

async fn serve() -> Result<()> {
    let config = Config::from_env().context("Cannot start Indodax MCP server")?;
    info!(
        private_url = %config.client.private_url,
        public_url = %config.client.public_url,
        "Starting Indodax MCP server"
    );

    let client = IndodaxClient::with_config(config.credentials, config.client)
        .context("Failed to build HTTP client")?;

    McpServer::new(client).run_stdio().await
}

fn print_tools() {
    let registry = ToolRegistry::indodax();
    println!("{:<30} {:<24} PARAMS (* = required)", "TOOL", "METHOD");
    for tool in registry.tools() {
        let params: Vec<String> = tool
            .params
            .iter()
            .map(|p| {
                if p.required {
                    format!("{}*", p.name)
                } else {
                    p.name.to_string()
                }
            })
            .collect();
        println!(
            "{:<30} {:<24} {}",
            tool.name,
            tool.method.unwrap_or("(public)"),
            params.join(", ")
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    load_env(cli.env_file.as_deref())?;

    let command = cli.command.unwrap_or(Commands::Serve);
    let log_dir = match command {
        Commands::Serve if !cli.no_log_file => Some(cli.log_dir.as_str()),
        _ => None,
    };
    setup_logging(cli.verbose, log_dir)?;

    match command {
        Commands::Serve => {
            let result = serve().await;
            if let Err(e) = &result {
                error!("{:#}", e);
            }
            result
        }
        Commands::Tools => {
            print_tools();
            Ok(())
        }
    }
}
