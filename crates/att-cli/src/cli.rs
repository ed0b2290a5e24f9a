//! Command-line argument definitions.

use std::path::PathBuf;

use att_core::DailyStatus;
use clap::{Args, Parser, Subcommand};

/// Attendance reporting from clock punches.
///
/// Classifies each employee's day from raw IN/OUT punches and their shift,
/// then aggregates days into period and cohort reports.
#[derive(Debug, Parser)]
#[command(name = "att", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Import employees, shifts, punches and overtime as JSONL from stdin.
    Import,

    /// Classify one employee's day.
    Day {
        /// Employee code.
        #[arg(long)]
        employee: String,

        /// Date (YYYY-MM-DD, today, yesterday, or "N days ago").
        #[arg(long, default_value = "today")]
        date: String,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Summarize raw punch logs for every employee on a date.
    Logs {
        /// Date (YYYY-MM-DD, today, yesterday, or "N days ago").
        #[arg(long, default_value = "today")]
        date: String,

        #[command(flatten)]
        filter: FilterArgs,

        /// Output as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Attendance for one employee over a date range.
    Period {
        /// Employee code.
        #[arg(long)]
        employee: String,

        /// First date of the range (inclusive).
        #[arg(long)]
        from: String,

        /// Last date of the range (inclusive).
        #[arg(long)]
        to: String,

        /// Output as JSON.
        #[arg(long, conflicts_with = "flat")]
        json: bool,

        /// Output the day-by-day flat text table.
        #[arg(long)]
        flat: bool,
    },

    /// Filtered, sorted, paginated report across employees.
    Cohort(CohortArgs),

    /// Write every matching row as a flat text table.
    Export(ExportArgs),
}

/// Either a single date or an inclusive range.
#[derive(Debug, Clone, Default, Args)]
pub struct SelectionArgs {
    /// Single date (defaults to today when no range is given).
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub date: Option<String>,

    /// First date of the range (inclusive).
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// Last date of the range (inclusive).
    #[arg(long, requires = "from")]
    pub to: Option<String>,
}

/// Directory-level employee filters.
#[derive(Debug, Clone, Default, Args)]
pub struct FilterArgs {
    /// Employee id.
    #[arg(long)]
    pub employee_id: Option<i64>,

    /// Substring of the employee code (case-insensitive).
    #[arg(long)]
    pub code: Option<String>,

    /// Company id.
    #[arg(long)]
    pub company: Option<i64>,

    /// Department id.
    #[arg(long)]
    pub department: Option<i64>,

    /// Section id.
    #[arg(long)]
    pub section: Option<i64>,
}

/// Filters applied to classified days. Ignored for ranges.
#[derive(Debug, Clone, Default, Args)]
pub struct RecordFilterArgs {
    /// Daily status (present, absent, half-day, late).
    #[arg(long)]
    pub status: Option<DailyStatus>,

    /// Only late (true) or on-time (false) days.
    #[arg(long)]
    pub late: Option<bool>,

    /// Only early-leave (true) or full-stay (false) days.
    #[arg(long)]
    pub early_leave: Option<bool>,
}

/// Sort order.
#[derive(Debug, Clone, Default, Args)]
pub struct SortArgs {
    /// Sort key (name, department, status, checkin; ranges: percentage, present).
    #[arg(long)]
    pub sort: Option<String>,

    /// Sort direction (asc or desc).
    #[arg(long)]
    pub direction: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct CohortArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[command(flatten)]
    pub records: RecordFilterArgs,

    #[command(flatten)]
    pub sort: SortArgs,

    /// Page number (1-based).
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    /// Rows per page (defaults to the configured page size).
    #[arg(long)]
    pub page_size: Option<u32>,

    /// Output as JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub selection: SelectionArgs,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[command(flatten)]
    pub records: RecordFilterArgs,

    #[command(flatten)]
    pub sort: SortArgs,

    /// Export raw punch log summaries instead of classified days.
    #[arg(long, conflicts_with_all = ["from", "to"])]
    pub logs: bool,

    /// Title line (defaults to a description of the selection).
    #[arg(long)]
    pub title: Option<String>,

    /// Output file (stdout when omitted).
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn cohort_parses_filters_and_range() {
        let cli = Cli::try_parse_from([
            "att",
            "cohort",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-07",
            "--department",
            "10",
            "--status",
            "half_day",
            "--sort",
            "percentage",
            "--direction",
            "desc",
            "--page-size",
            "5",
        ])
        .unwrap();
        let Some(Commands::Cohort(args)) = cli.command else {
            panic!("expected cohort command");
        };
        assert_eq!(args.selection.from.as_deref(), Some("2024-01-01"));
        assert_eq!(args.filter.department, Some(10));
        assert_eq!(args.records.status, Some(DailyStatus::HalfDay));
        assert_eq!(args.page, 1);
        assert_eq!(args.page_size, Some(5));
    }

    #[test]
    fn date_conflicts_with_range() {
        let result = Cli::try_parse_from([
            "att",
            "cohort",
            "--date",
            "2024-01-02",
            "--from",
            "2024-01-01",
            "--to",
            "2024-01-07",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn range_needs_both_ends() {
        assert!(Cli::try_parse_from(["att", "cohort", "--from", "2024-01-01"]).is_err());
    }
}
