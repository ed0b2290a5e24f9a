//! CLI subcommand implementations.

pub mod cohort;
pub mod day;
pub mod export;
pub mod import;
pub mod logs;
pub mod period;
pub mod util;
