use std::io::IsTerminal;
use std::path::PathBuf;

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;

use mediagraph_import::{
    ImportConfig, ImportProgress, ImportReport, ImportTask, ItemResult, LogProgress,
    SilentProgress,
};

use super::{default_config_path, open_catalog};
use crate::cli_types::{DuplicateArg, MissingRefsArg};
use crate::error::CliError;
use crate::progress::BarProgress;

/// Flags of the `import` subcommand.
pub(crate) struct ImportArgs {
    pub path: PathBuf,
    pub duplicate: Option<DuplicateArg>,
    pub missing_refs: Option<MissingRefsArg>,
    pub time_zone: Option<String>,
    pub config: Option<PathBuf>,
    pub reset: bool,
}

/// Load the config file, then let command-line flags replace its fields.
fn resolve_config(args: &ImportArgs) -> Result<ImportConfig, CliError> {
    let path = args.config.clone().unwrap_or_else(default_config_path);
    if args.config.is_some() && !path.exists() {
        return Err(CliError::config(format!(
            "config file {} does not exist",
            path.display()
        )));
    }
    let mut config = ImportConfig::load(&path).map_err(CliError::config)?;

    if let Some(duplicate) = args.duplicate {
        config.duplicate_behaviour = duplicate.into();
    }
    if let Some(missing_refs) = args.missing_refs {
        config.missing_ref_behaviour = missing_refs.into();
    }
    if let Some(tz) = &args.time_zone {
        config.time_zone = tz.clone();
    }
    if args.reset {
        config.reset = true;
    }
    Ok(config)
}

/// Import an export directory or archive into the catalog.
pub(crate) fn run_import(
    args: ImportArgs,
    db_path: Option<PathBuf>,
    quiet: bool,
) -> Result<(), CliError> {
    let config = resolve_config(&args)?;
    let conn = open_catalog(db_path)?;

    log::info!(
        "{}",
        format!("Importing {}", args.path.display()).if_supports_color(Stdout, |t| t.bold()),
    );

    // A bar when attached to a terminal, throttled log lines otherwise.
    let bar;
    let lines;
    let progress: &dyn ImportProgress = if quiet {
        &SilentProgress
    } else if std::io::stderr().is_terminal() {
        bar = BarProgress::new();
        &bar
    } else {
        lines = LogProgress::every(500);
        &lines
    };

    let report = ImportTask::new(&conn, config)
        .with_progress(progress)
        .run(&args.path)?;

    print_summary(&report);

    let failed = report
        .kinds()
        .map(|kind| report.summary(kind).failed)
        .sum::<usize>();
    if failed > 0 {
        return Err(CliError::ItemsFailed(failed));
    }
    Ok(())
}

fn print_summary(report: &ImportReport) {
    for kind in report.kinds() {
        let summary = report.summary(kind);
        let mark = if summary.failed == 0 {
            "\u{2714}".if_supports_color(Stdout, |t| t.green()).to_string()
        } else {
            "\u{2718}".if_supports_color(Stdout, |t| t.red()).to_string()
        };
        log::info!(
            "  {} {:>14}: {}",
            mark,
            kind.to_string().if_supports_color(Stdout, |t| t.bold()),
            summary,
        );
    }

    for kind in report.kinds() {
        for item in report.items(kind) {
            if let ItemResult::Failed(_, message) = &item.result {
                log::warn!(
                    "  {} [{}] {}: {}",
                    "\u{2718}".if_supports_color(Stdout, |t| t.red()),
                    kind,
                    item.key,
                    message,
                );
            }
        }
    }

    if !report.warnings.is_empty() {
        log::info!(
            "  {} {} warning(s)",
            "\u{26A0}".if_supports_color(Stdout, |t| t.yellow()),
            report.warnings.len(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediagraph_import::{DuplicateBehaviour, MissingRefBehaviour};

    fn args(config: Option<PathBuf>) -> ImportArgs {
        ImportArgs {
            path: PathBuf::from("export"),
            duplicate: None,
            missing_refs: None,
            time_zone: None,
            config,
            reset: false,
        }
    }

    #[test]
    fn flags_replace_config_file_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("import.toml");
        std::fs::write(
            &path,
            "duplicate_behaviour = \"skip\"\nmissing_ref_behaviour = \"ignore\"\ntime_zone = \"+01:00\"\n",
        )
        .unwrap();

        let mut args = args(Some(path));
        args.missing_refs = Some(MissingRefsArg::Create);
        args.reset = true;
        let config = resolve_config(&args).unwrap();

        assert_eq!(config.duplicate_behaviour, DuplicateBehaviour::Skip);
        assert_eq!(config.missing_ref_behaviour, MissingRefBehaviour::Create);
        assert_eq!(config.time_zone, "+01:00");
        assert!(config.reset);
    }

    #[test]
    fn explicit_missing_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = args(Some(dir.path().join("absent.toml")));
        assert!(matches!(resolve_config(&args), Err(CliError::Config(_))));
    }
}
