//! clinguard command-line interface

use clap::{Parser, Subcommand};
use clinguard::cli::output::{self, OutputFormat};
use clinguard::cli::{check, evaluate};
use std::path::PathBuf;

/// Clinical protocol evaluation tool
#[derive(Parser)]
#[command(name = "clinguard")]
#[command(author, version, about = "Clinical protocol rule evaluation", long_about = None)]
struct Cli {
    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output file (default: stdout)
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Color output (auto, always, never)
    #[arg(long, default_value = "auto", global = true)]
    color: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate protocols against a patient snapshot
    Evaluate {
        /// Patient state file (JSON)
        #[arg(short, long)]
        state: PathBuf,

        /// Protocol files (JSON), evaluated in the order given
        #[arg(short, long, required = true, num_args = 1..)]
        protocols: Vec<PathBuf>,

        /// Engine config file (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format
        #[arg(short = 'f', long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },

    /// Load protocol files and report errors
    Check {
        /// Protocol files to check
        files: Vec<PathBuf>,

        /// Result that means "nothing to do"
        #[arg(long, default_value = "no_action")]
        no_action_token: String,
    },
}

fn main() {
    human_panic::setup_panic!();

    let cli = Cli::parse();

    output::setup_colors(&cli.color);

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(level));

    let result = match cli.command {
        Commands::Evaluate {
            state,
            protocols,
            config,
            format,
        } => evaluate::evaluate(evaluate::EvaluateConfig {
            state,
            protocols,
            config,
            format,
            output_file: cli.output,
        }),

        Commands::Check {
            files,
            no_action_token,
        } => check::check(check::CheckConfig {
            files,
            no_action_token,
            verbose: cli.verbose,
        }),
    };

    if let Err(e) = result {
        eprintln!("{}", output::format_error(&e));
        std::process::exit(1);
    }
}
