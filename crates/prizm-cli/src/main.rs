mod cli;
mod context;
mod handlers;
mod output;

use clap::{CommandFactory, Parser};
use cli::{Cli, Commands};
use context::CliContext;

fn main() -> anyhow::Result<()> {
    if let Ok(log_path) = std::env::var("PRIZM_DEBUG_LOG") {
        let log_file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)?;

        tracing_subscriber::fmt()
            .with_writer(log_file)
            .with_max_level(tracing::Level::DEBUG)
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_writer(std::io::stderr)
            .with_max_level(tracing::Level::WARN)
            .init();
    }

    let cli = Cli::parse();

    if let Commands::Completions { shell } = cli.command {
        clap_complete::generate(shell, &mut Cli::command(), "prizm", &mut std::io::stdout());
        return Ok(());
    }

    let ctx = CliContext::load(cli.config.as_deref())?;

    match cli.command {
        Commands::Detect(args) => handlers::detect::handle(&ctx, args)?,
        Commands::Import(args) => handlers::import::handle(&ctx, args)?,
        Commands::Formats => handlers::formats::handle(&ctx)?,
        Commands::Completions { .. } => {}
    }

    Ok(())
}
