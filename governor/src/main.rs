use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;
use tracing_subscriber::{fmt, EnvFilter};

mod commands;
mod gauge;
#[cfg_attr(not(feature = "visualizer"), allow(dead_code))]
mod ring;
mod settings;
mod visualizer;

use settings::GlobalOpts;

#[derive(Parser)]
#[command(name = "governor", version)]
#[command(about = "Pipe filter that drops high-entropy lines from streamed LLM output", long_about = None)]
struct Cli {
    #[command(flatten)]
    opts: GlobalOpts,

    #[command(subcommand)]
    cmd: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream stdin to stdout, dropping blocked lines (default)
    Filter,
    /// Score the given strings and print their verdicts
    Score {
        /// Text to evaluate; each argument is scored on its own
        #[arg(value_name = "TEXT", required = true)]
        text: Vec<String>,
    },
    /// Print the effective configuration as JSON
    Config,
    /// Print version and exit (same as --version)
    Version,
}

fn init_tracing() {
    let _ = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> ExitCode {
    init_tracing();
    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    match cli.cmd.unwrap_or(Commands::Filter) {
        Commands::Filter => {
            let settings = settings::resolve(&cli.opts)?;
            commands::filter::run(&settings)
        }
        Commands::Score { text } => {
            let settings = settings::resolve(&cli.opts)?;
            commands::score::run(&settings, &text)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Config => {
            let settings = settings::resolve(&cli.opts)?;
            commands::config::run(&settings)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(ExitCode::SUCCESS)
        }
    }
}
