use std::io::{self, BufWriter};
use std::path::Path;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use att_cli::commands::util::{self, finish, parse_date};
use att_cli::commands::{cohort, day, export, import, logs, period};
use att_cli::{Cli, Commands, Config};
use att_core::{CohortReporter, EmployeeFilter};
use att_db::Database;

/// Load config and open database, ensuring the parent directory exists.
fn open_database(config_path: Option<&Path>) -> Result<(Database, Config)> {
    let config = Config::load_from(config_path).context("failed to load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent).context("failed to create database directory")?;
    }

    let db = Database::open(&config.database_path).with_context(|| {
        format!("failed to open database {}", config.database_path.display())
    })?;
    Ok((db, config))
}

/// Reporter reading every feed from the database.
fn reporter<'a>(db: &'a Database, config: &Config) -> CohortReporter<'a> {
    CohortReporter::new(db, db, db)
        .with_config(config.classifier())
        .with_fetch_strategy(config.fetch_strategy)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // try_init: tests may run the binary with a subscriber already installed
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    let Some(command) = &cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        println!();
        return Ok(());
    };

    let (mut db, config) = open_database(cli.config.as_deref())?;
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());

    match command {
        Commands::Import => {
            import::run(&mut db, io::stdin().lock(), &mut out)?;
        }
        Commands::Day {
            employee,
            date,
            json,
        } => {
            day::run(
                &mut out,
                &reporter(&db, &config),
                employee,
                parse_date(date)?,
                *json,
            )?;
        }
        Commands::Logs { date, filter, json } => {
            logs::run(
                &mut out,
                &reporter(&db, &config),
                &EmployeeFilter::from(filter),
                parse_date(date)?,
                *json,
            )?;
        }
        Commands::Period {
            employee,
            from,
            to,
            json,
            flat,
        } => {
            let output = if *json {
                period::Output::Json
            } else if *flat {
                period::Output::Flat {
                    generated_at: util::now(),
                }
            } else {
                period::Output::Text
            };
            period::run(
                &mut out,
                &reporter(&db, &config),
                employee,
                parse_date(from)?,
                parse_date(to)?,
                output,
            )?;
        }
        Commands::Cohort(args) => {
            cohort::run(
                &mut out,
                &reporter(&db, &config),
                args,
                config.default_page_size,
                util::today(),
            )?;
        }
        Commands::Export(args) => {
            export::run(
                &mut out,
                &reporter(&db, &config),
                args,
                util::today(),
                util::now(),
            )?;
        }
    }

    Ok(finish(&mut out)?)
}
