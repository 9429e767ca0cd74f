use clap::Parser;
use std::path::PathBuf;

/// Translate the subtitles of every Matroska file in a folder.
///
/// Reads API_KEY (required), MODEL, BASE_URL, DEEPSEEK_BASE_URL and
/// EMBED_SUBS from the environment.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Folder containing the input containers
    pub folder: PathBuf,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Translation mode (single, dual)
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Cues per translation block
    #[arg(short, long)]
    pub block_size: Option<usize>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
