//! Attendance CLI library.
//!
//! This crate provides the CLI interface for the attendance engine.

mod cli;
pub mod commands;
mod config;

pub use cli::{
    Cli, CohortArgs, Commands, ExportArgs, FilterArgs, RecordFilterArgs, SelectionArgs, SortArgs,
};
pub use config::Config;
