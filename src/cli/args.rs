//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Optipost blog image optimizer CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Post directory to process (must contain a markdown file and Attachments/)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub source: PathBuf,

    /// Destination for rewritten markdown and images (default: <source>/processed)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Copy final artifacts into this Hugo content directory
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub hugo_path: Option<PathBuf>,

    /// Cap on the longer image dimension, in pixels
    #[arg(short, long, default_value_t = 1600)]
    pub max_width: u32,

    /// WebP encode quality (1-100)
    #[arg(short, long, default_value_t = 95, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Preview the processing plan without writing anything
    #[arg(short, long)]
    pub dry_run: bool,

    /// Keep original file stems instead of renaming to img_NN
    #[arg(long)]
    pub no_rename: bool,

    /// Print per-file resolution and skip detail
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress the end-of-run statistics block
    #[arg(long)]
    pub no_stats: bool,

    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,
}
