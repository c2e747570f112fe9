use std::path::PathBuf;

use clap::Parser;

/// Simple tool to download videos from Uqload
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// The URL or ID of the video
    #[arg(short, long)]
    pub url: String,

    /// Folder where the file will be saved
    #[arg(short, long, env = "UQLOAD_OUTDIR")]
    pub outdir: Option<PathBuf>,

    /// Video name, without extension
    #[arg(short, long)]
    pub name: Option<String>,

    /// Download the video without asking for confirmation
    #[arg(short, long)]
    pub yes: bool,

    /// Print the video information as JSON
    #[arg(long)]
    pub json: bool,

    /// Path to a TOML configuration file
    #[arg(short, long, env = "UQLOAD_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    pub quiet: bool,
}
