mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::export;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Info,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    // RUST_LOG, when set, overrides the -v level
    pretty_env_logger::formatted_timed_builder()
        .filter_level(level)
        .parse_default_env()
        .init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);
    match &cli.command {
        Commands::Export(args) => export::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
