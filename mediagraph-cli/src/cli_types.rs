//! CLI type definitions: command enums and argument structs.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use mediagraph_import::{DuplicateBehaviour, MissingRefBehaviour};

#[derive(Parser)]
#[command(name = "mediagraph")]
#[command(about = "Import and query a media catalog", long_about = None)]
pub(crate) struct Cli {
    /// Catalog database (defaults to <config dir>/mediagraph/mediagraph.sqlite)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Only show warnings and errors (suppress normal output)
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable verbose/debug logging, including generated SQL
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Import an exported catalog directory or .zip archive
    Import {
        /// Export directory or .zip file
        path: PathBuf,

        /// What to do when an object already exists
        #[arg(long)]
        duplicate: Option<DuplicateArg>,

        /// What to do when a referenced object does not exist
        #[arg(long)]
        missing_refs: Option<MissingRefsArg>,

        /// UTC offset for timestamps the export leaves out (e.g. +02:00)
        #[arg(long)]
        time_zone: Option<String>,

        /// Import config file (defaults to <config dir>/mediagraph/import.toml)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Drop and recreate every table before importing
        #[arg(long)]
        reset: bool,
    },

    /// Find objects of one type matching a filter
    Query {
        /// Object type to query
        entity: EntityArg,

        /// JSON file holding the filter tree
        #[arg(short, long)]
        filter: Option<PathBuf>,

        /// Free-text search terms
        #[arg(short, long)]
        q: Option<String>,

        /// Sort column (e.g. title, date, random, scenes_count)
        #[arg(long)]
        sort: Option<String>,

        /// Sort descending
        #[arg(long)]
        desc: bool,

        /// Page number, starting at 1
        #[arg(long)]
        page: Option<i64>,

        /// Results per page; negative for all
        #[arg(long, allow_hyphen_values = true)]
        per_page: Option<i64>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum DuplicateArg {
    Fail,
    Overwrite,
    Skip,
}

impl From<DuplicateArg> for DuplicateBehaviour {
    fn from(arg: DuplicateArg) -> Self {
        match arg {
            DuplicateArg::Fail => Self::Fail,
            DuplicateArg::Overwrite => Self::Overwrite,
            DuplicateArg::Skip => Self::Skip,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum MissingRefsArg {
    Fail,
    Ignore,
    Create,
}

impl From<MissingRefsArg> for MissingRefBehaviour {
    fn from(arg: MissingRefsArg) -> Self {
        match arg {
            MissingRefsArg::Fail => Self::Fail,
            MissingRefsArg::Ignore => Self::Ignore,
            MissingRefsArg::Create => Self::Create,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum EntityArg {
    Scenes,
    Images,
    Galleries,
    Performers,
    Studios,
    Movies,
    Tags,
}
