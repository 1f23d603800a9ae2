//! Forge CLI
//!
//! Main entry point for the forge command-line tool: retrieval-grounded code
//! generation, refinement, publishing and an HTTP job server.

mod app;
mod commands;
mod server;

use clap::{Parser, Subcommand};
use commands::{
    DebugCommand, DocumentCommand, GenerateCommand, KnowledgeCommand, OptimizeCommand,
    PublishCommand, ServeCommand,
};
use forge_core::{config::AppConfig, logging, AppResult};
use std::path::PathBuf;

/// Forge - retrieval-grounded code generation
#[derive(Parser, Debug)]
#[command(name = "forge")]
#[command(about = "Retrieval-grounded code generation pipeline", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "FORGE_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "FORGE_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// Completion provider (openai, ollama)
    #[arg(short, long, global = true, env = "FORGE_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "FORGE_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate code from a natural-language prompt
    Generate(GenerateCommand),

    /// Find and fix bugs in a source file
    Debug(DebugCommand),

    /// Optimize a source file
    Optimize(OptimizeCommand),

    /// Add documentation to a source file
    Document(DocumentCommand),

    /// Commit a file to the configured GitHub repository
    Publish(PublishCommand),

    /// Retrieval store management
    Knowledge(KnowledgeCommand),

    /// Run the HTTP job server
    Serve(ServeCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    let config = AppConfig::load()?;

    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Forge CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    config.ensure_forge_dir()?;

    let command_name = match &cli.command {
        Commands::Generate(_) => "generate",
        Commands::Debug(_) => "debug",
        Commands::Optimize(_) => "optimize",
        Commands::Document(_) => "document",
        Commands::Publish(_) => "publish",
        Commands::Knowledge(_) => "knowledge",
        Commands::Serve(_) => "serve",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Generate(cmd) => cmd.execute(&config).await,
        Commands::Debug(cmd) => cmd.execute(&config).await,
        Commands::Optimize(cmd) => cmd.execute(&config).await,
        Commands::Document(cmd) => cmd.execute(&config).await,
        Commands::Publish(cmd) => cmd.execute(&config).await,
        Commands::Knowledge(cmd) => cmd.execute(&config).await,
        Commands::Serve(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
