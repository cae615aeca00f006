use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run a roux program
    Run {
        /// Path to the file to run
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Dry run (parse only)
        #[arg(long, default_value_t = false)]
        dry: bool,
        /// Print the value of every top-level form that has one
        #[arg(short, long, default_value_t = false)]
        print: bool,
        /// Level of verbosity
        #[arg(short, long, default_value_t = false)]
        verbose: bool,
    },
    /// Check that a roux program reads
    Check {
        /// Path to the file to check
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Level of verbosity
        #[arg(short, long, default_value_t = false)]
        verbose: bool,
    },
    /// Start a REPL
    Repl {
        /// Level of verbosity
        #[arg(short, long, default_value_t = false)]
        verbose: bool,
    },
}

impl Commands {
    pub fn verbose(&self) -> bool {
        match self {
            | Commands::Run { verbose, .. }
            | Commands::Check { verbose, .. }
            | Commands::Repl { verbose } => *verbose,
        }
    }
}
