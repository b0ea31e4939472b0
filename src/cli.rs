use clap::{Parser, Subcommand};
use std::path::PathBuf;
use anyhow::Result;

use crate::core::{AnalyzeOptions, Engine, OutputFormat};

#[derive(Parser)]
#[command(name = "docscope")]
#[command(about = "Docstring coverage and baseline documentation for Python source files")]
#[command(version)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze Python files and directories
    Analyze {
        /// Files or directories to analyze
        #[arg(required_unless_present = "stdin")]
        paths: Vec<PathBuf>,

        /// Output format (overrides the configured default)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Write the report to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Exit non-zero when any file's coverage is below this percentage
        #[arg(long, value_parser = parse_percentage)]
        fail_under: Option<f64>,

        /// Read one source text from standard input
        #[arg(long, conflicts_with = "paths")]
        stdin: bool,

        /// File name reported for standard input
        #[arg(long, default_value = "stdin.py", requires = "stdin")]
        name: String,
    },

    /// Write a default configuration file
    Init {
        /// Target file or directory (defaults to ./docscope.toml)
        #[arg(short, long)]
        path: Option<PathBuf>,

        /// Overwrite an existing configuration file
        #[arg(long)]
        force: bool,
    },
}

fn parse_percentage(value: &str) -> std::result::Result<f64, String> {
    let parsed: f64 = value
        .parse()
        .map_err(|_| format!("`{}` is not a number", value))?;
    if (0.0..=100.0).contains(&parsed) {
        Ok(parsed)
    } else {
        Err(format!("{} is not between 0 and 100", parsed))
    }
}

impl Cli {
    pub async fn execute(self, engine: Engine) -> Result<()> {
        match self.command {
            Commands::Analyze { paths, format, output, fail_under, stdin, name } => {
                let options = AnalyzeOptions { format, output, fail_under };
                if stdin {
                    engine.analyze_stdin(&name, options).await
                } else {
                    engine.analyze(&paths, options).await
                }
            }
            Commands::Init { path, force } => {
                engine.init(path, force)
            }
        }
    }
}
