use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rebinner::manager::Manager;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(version, about)]
struct CLI {
    #[arg(long)]
    work_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Simulate a new series
    Create,

    /// Rebin every series
    Rebin,

    /// Summarize every rebinned series
    Analyze,

    /// Remove generated files
    Clean,
}

fn main() {
    env_logger::Builder::new()
        .format_timestamp_millis()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    if let Err(error) = run_cli() {
        log::error!("{error:#?}");
        std::process::exit(1);
    }
}

fn run_cli() -> Result<()> {
    let args = CLI::parse();
    log::info!("{args:#?}");

    let mgr = Manager::new(args.work_dir).context("failed to construct mgr")?;

    match args.command {
        Command::Create => mgr.create_series()?,
        Command::Rebin => mgr.rebin_all()?,
        Command::Analyze => mgr.analyze_all()?,
        Command::Clean => mgr.clean()?,
    }

    Ok(())
}
