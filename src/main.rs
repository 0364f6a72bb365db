//! homework-tools: staging and grouping of student submissions.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use homework_tools_lib::{Config, ManifestEngine, Toolkit};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Command {
    /// Extract submissions into a flat tree for copy detection
    #[value(name = "plagiarism:extract")]
    PlagiarismExtract,
    /// Write the similarity job for the extracted tree
    #[value(name = "plagiarism:check")]
    PlagiarismCheck,
    /// Copy submissions into session/table folders
    #[value(name = "session:group")]
    SessionGroup,
    /// Extract submissions with their original file names
    #[value(name = "testbench:extract")]
    TestbenchExtract,
}

/// General tools for TAs.
#[derive(Parser, Debug)]
#[command(name = "homework-tools")]
#[command(version)]
struct Args {
    /// Config file to define variables
    #[arg(short, long, default_value = "config.json", value_name = "FILEPATH")]
    config: PathBuf,

    /// Command to run
    #[arg(value_enum)]
    command: Command,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::from_path(&args.config)
        .with_context(|| format!("Failed to load {}", args.config.display()))?;
    let toolkit = Toolkit::new(config);

    match args.command {
        Command::PlagiarismExtract => {
            toolkit
                .plagiarism_extract()
                .context("plagiarism:extract failed")?;
        }
        Command::PlagiarismCheck => {
            let outcome = toolkit
                .plagiarism_check(&ManifestEngine)
                .context("plagiarism:check failed")?;
            log::info!("Similarity job ready: {}", outcome.report_path.display());
        }
        Command::SessionGroup => {
            let report = toolkit.session_group().context("session:group failed")?;
            if !report.ambiguous.is_empty() {
                log::warn!(
                    "{} name(s) matched several roster entries",
                    report.ambiguous.len()
                );
            }
        }
        Command::TestbenchExtract => {
            toolkit
                .testbench_extract()
                .context("testbench:extract failed")?;
        }
    }
    Ok(())
}
