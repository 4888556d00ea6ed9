//! Shared helper modules.

pub mod exec;
pub mod path;
mod plural;
mod size;

pub use plural::{plural_count, plural_s};
pub use size::format_size;
