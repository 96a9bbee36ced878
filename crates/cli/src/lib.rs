pub mod commands;
pub mod render;

use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(
    name = "smeta",
    about = "Smeta order parsing CLI",
    long_about = "Parse free-form customer order text against a merchant catalog and print a priced order draft with per-line match candidates.",
    after_help = "Examples:\n  smeta parse --demo --text \"цемент м500 10 мешков\"\n  smeta parse --catalog catalog.json --input order.txt --json\n  smeta catalog --demo"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Parse order text and print a priced draft with per-line candidates")]
    Parse(commands::parse::ParseArgs),
    #[command(about = "Load a catalog and print the items that survived column detection")]
    Catalog(commands::catalog::CatalogArgs),
    #[command(about = "Print the effective match dictionary tables")]
    Dictionary(commands::dictionary::DictionaryArgs),
}

pub fn run() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Parse(args) => commands::parse::run(&args),
        Command::Catalog(args) => commands::catalog::run(&args),
        Command::Dictionary(args) => commands::dictionary::run(&args),
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Diagnostics go to stderr so stdout stays machine-parseable under `--json`.
fn init_logging() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
