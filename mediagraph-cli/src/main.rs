//! mediagraph CLI
//!
//! Command-line interface for importing catalog exports and querying the
//! catalog with filter trees.

mod cli_types;
mod commands;
mod error;
mod progress;

use std::io::Write;

use clap::Parser;
use log::LevelFilter;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;

use cli_types::{Cli, Commands};
use commands::import::{ImportArgs, run_import};
use commands::query::{QueryArgs, run_query};
use error::CliError;

/// Install the logger. Info lines print bare; warnings and errors get a
/// colored level tag. `RUST_LOG` overrides the level chosen by flags.
fn init_logging(quiet: bool, verbose: bool) {
    let level = if verbose {
        LevelFilter::Debug
    } else if quiet {
        LevelFilter::Warn
    } else {
        LevelFilter::Info
    };

    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format(|buf, record| match record.level() {
            log::Level::Error => writeln!(
                buf,
                "{} {}",
                "error:".if_supports_color(Stderr, |t| t.red()),
                record.args()
            ),
            log::Level::Warn => writeln!(
                buf,
                "{} {}",
                "warning:".if_supports_color(Stderr, |t| t.yellow()),
                record.args()
            ),
            log::Level::Info => writeln!(buf, "{}", record.args()),
            _ => writeln!(
                buf,
                "{} [{}] {}",
                record.level().if_supports_color(Stderr, |t| t.dimmed()),
                record.target(),
                record.args()
            ),
        })
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Import {
            path,
            duplicate,
            missing_refs,
            time_zone,
            config,
            reset,
        } => run_import(
            ImportArgs {
                path,
                duplicate,
                missing_refs,
                time_zone,
                config,
                reset,
            },
            cli.db,
            cli.quiet,
        ),
        Commands::Query {
            entity,
            filter,
            q,
            sort,
            desc,
            page,
            per_page,
        } => run_query(
            QueryArgs {
                entity,
                filter,
                q,
                sort,
                desc,
                page,
                per_page,
            },
            cli.db,
        ),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.quiet, cli.verbose);

    if let Err(e) = run(cli) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
