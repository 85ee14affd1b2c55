use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Keep files alongside the days they belong to.
#[derive(Debug, Parser)]
#[command(name = "lifetracker", version, about)]
pub struct Cli {
    /// Config file (default: config.toml in the platform config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
    /// Attachment storage root, overriding the config file
    #[arg(long, global = true, value_name = "PATH")]
    pub data_dir: Option<PathBuf>,
    /// Report why a delete or open failed instead of a bare failure
    #[arg(long, global = true)]
    pub strict: bool,
    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Copy files into a date's attachments
    Add {
        date: String,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// List a date's attachments, newest first
    List { date: String },
    /// Delete an attachment by name
    Delete { date: String, name: PathBuf },
    /// Open an attachment with the default application
    Open { date: String, name: PathBuf },
    /// Open a date's attachment folder
    Folder { date: String },
}
