//! Command line interface definition

use clap::Parser;
use obae_types::MirrorSource;
use std::path::PathBuf;

/// obae - Download osu! beatmap sets and extract their background artwork
#[derive(Parser, Debug)]
#[command(name = "obae")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Download osu! beatmap sets and extract their background artwork")]
#[command(long_about = None)]
pub struct Cli {
    /// Beatmap set ID or https://osu.ppy.sh/beatmapsets/<id> link
    pub input: String,

    /// osu! session cookie; downloads from the official site instead of mirrors
    #[arg(long, env = "OBAE_SESSION_COOKIE", hide_env_values = true)]
    pub cookie: Option<String>,

    /// Mirrors to try, in order (nerinyan, osu_direct, beatconnect)
    #[arg(long = "mirror", value_name = "NAME", value_delimiter = ',')]
    pub mirrors: Vec<MirrorSource>,

    /// Per-mirror timeout in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// Directory for downloaded archives
    #[arg(long, value_name = "PATH")]
    pub working_dir: Option<PathBuf>,

    /// Directory for extracted artwork
    #[arg(long, value_name = "PATH")]
    pub output_dir: Option<PathBuf>,

    /// Use alternate config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,
}
