//! Command-line interface definitions for stylemerge

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use stylemerge::MergeMode;

/// Merge policy selection
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    /// One document; lists continue the main document's numbering
    Smart,
    /// One document; every merged list restarts its numbering
    Simple,
    /// One restyled document per input
    StyleOnly,
}

impl From<ModeArg> for MergeMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Smart => MergeMode::SmartMerge,
            ModeArg::Simple => MergeMode::SimpleMerge,
            ModeArg::StyleOnly => MergeMode::StyleOnly,
        }
    }
}

/// CLI structure for the stylemerge application
#[derive(Parser)]
#[command(name = "stylemerge")]
#[command(version)]
#[command(about = "Merge documents under the styles of a main document", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands for stylemerge
#[derive(Subcommand)]
pub enum Commands {
    /// Merge documents into the style of a main document
    Merge {
        /// Input files or directories (.docx, .txt, .pdf)
        #[arg(value_name = "INPUTS", required = true)]
        inputs: Vec<PathBuf>,

        /// Main document providing styles (defaults to the first input)
        #[arg(short, long)]
        main: Option<PathBuf>,

        /// Merge policy (overrides the configuration file)
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,

        /// Configuration file (defaults to ./stylemerge.toml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Directory the merged documents are written to
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Start every merged document on a new page
        #[arg(long)]
        page_breaks: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show how documents are classified and styled
    Inspect {
        /// Documents to inspect
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Write an empty main document with default or configured styles
    Scaffold {
        /// Output .docx path
        output: PathBuf,

        /// Configuration file whose style overrides are applied
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}
