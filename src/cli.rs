use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "hquiz", version, about = "Timed quiz presenter with resumable sessions")]
pub struct Cli {
    /// Directory for the local cache [default: platform data dir]
    #[arg(long, global = true, value_name = "dir", env = "HQUIZ_CACHE_DIR")]
    pub cache_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Present the questionnaire interactively
    Present {
        /// Questionnaire file to open [default: last cached questionnaire]
        file: Option<PathBuf>,
    },
    /// Edit the questionnaire JSON in $EDITOR
    Edit {
        /// File to edit and save back to [default: cached questionnaire]
        file: Option<PathBuf>,
    },
    /// Create a new, empty questionnaire file
    New {
        file: PathBuf,

        #[arg(long)]
        title: Option<String>,
    },
    /// Import a questionnaire into the local cache
    Import { file: PathBuf },
    /// Export the cached questionnaire
    Export {
        /// Output path [default: derived from the title]
        #[arg(short, long, value_name = "path")]
        output: Option<PathBuf>,
    },
    /// Check a questionnaire file
    Validate { file: PathBuf },
    /// Show progress of the current session
    Status,
    /// List archived sessions
    History,
    /// Archive the current session and start over
    Reset,
}
