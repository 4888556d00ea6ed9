//! Optipost - image optimizer for Hugo blog posts.
//!
//! Converts a post's image attachments to size- and quality-bounded WebP,
//! renames them deterministically, and rewrites the markdown references
//! to match.

mod cli;
mod convert;
mod logger;
mod markdown;
mod post;
mod resolve;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    logger::set_verbose(cli.verbose);

    // HEIC decoding goes through an external converter; detect it once,
    // before any decode runs.
    convert::init_heic_support();

    let options = post::RunOptions::from_cli(&cli);
    post::process_post(&options)
}
