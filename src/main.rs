//! Shaderkit CLI entry point

use clap::Parser;
use console::style;
use shaderkit::cli::{Cli, Commands};
use shaderkit::config::ConfigManager;
use shaderkit::error::ShaderkitResult;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> ShaderkitResult<()> {
    let cli = Cli::parse();

    let manager = match cli.config {
        Some(ref path) => ConfigManager::with_path(path.clone()),
        None => ConfigManager::new(),
    };
    let config = manager.load().await?;

    // 0 = warn, 1 = info, 2+ = debug; `general.verbose` counts as -v
    let verbosity = cli.verbose.max(u8::from(config.general.verbose));
    let filter = match verbosity {
        0 => EnvFilter::new("shaderkit=warn"),
        1 => EnvFilter::new("shaderkit=info"),
        _ => EnvFilter::new("shaderkit=debug"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();
    shaderkit::ui::init_theme();

    match cli.command {
        Commands::Count(args) => shaderkit::cli::commands::count(args, &config).await,
        Commands::Status(args) => shaderkit::cli::commands::status(args, &config).await,
        Commands::Install(args) => shaderkit::cli::commands::install(args, &config).await,
        Commands::Share(args) => shaderkit::cli::commands::share(args, &config).await,
        Commands::Config(args) => shaderkit::cli::commands::config(args, &config, &manager).await,
    }
}
