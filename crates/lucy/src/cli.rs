//! CLI argument parsing with clap

use camino::Utf8PathBuf;
use clap::{Args, Parser, Subcommand};

/// Lucy - checks whether an image is still built on the current base image
#[derive(Parser, Debug)]
#[command(name = "lucy")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to lucy.yaml config file
    #[arg(short, long, global = true)]
    pub config: Option<Utf8PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether IMAGE is built on the current layers of BASE_IMAGE
    ///
    /// Prints `fresh` or `stale`. Exits 0 when fresh, 2 when stale and 1 on error.
    Check(CheckArgs),

    /// Show how an image reference is interpreted
    Parse(ParseArgs),

    /// Show version information
    Version(VersionArgs),
}

// Check command
#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Image to check (e.g. ghcr.io/org/app:1.0)
    pub image: String,

    /// Base image the image was built from (e.g. mcr.microsoft.com/dotnet/aspnet:8.0)
    pub base_image: String,

    /// Bearer token for the image's registry
    #[arg(long, env = "LUCY_IMAGE_TOKEN", hide_env_values = true)]
    pub image_token: Option<String>,

    /// Bearer token for the base image's registry
    #[arg(long, env = "LUCY_BASE_IMAGE_TOKEN", hide_env_values = true)]
    pub base_image_token: Option<String>,

    /// Operating system used when only one image is multi-platform
    #[arg(long)]
    pub os: Option<String>,

    /// Architecture used when only one image is multi-platform
    #[arg(long)]
    pub arch: Option<String>,

    /// OS version used when only one image is multi-platform (e.g. 10.0.20348.2340)
    #[arg(long)]
    pub os_version: Option<String>,

    /// CPU variant used when only one image is multi-platform (e.g. v7)
    #[arg(long)]
    pub variant: Option<String>,

    /// Output the full report as JSON
    #[arg(long)]
    pub json: bool,
}

// Parse command
#[derive(Args, Debug)]
pub struct ParseArgs {
    /// Image reference to parse
    pub image: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

// Version command
#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
