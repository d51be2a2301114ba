use std::path::{Path, PathBuf};

use owo_colors::OwoColorize;
use owo_colors::Stream::Stdout;
use serde::Serialize;
use serde::de::DeserializeOwned;

use mediagraph_catalog::{FilterNode, FindFilter, SortDirection};
use mediagraph_db::{
    GalleryRepository, ImageRepository, MovieRepository, PerformerRepository, Queryable,
    SceneRepository, StudioRepository, TagRepository,
};

use super::open_catalog;
use crate::cli_types::EntityArg;
use crate::error::CliError;

/// Flags of the `query` subcommand.
pub(crate) struct QueryArgs {
    pub entity: EntityArg,
    pub filter: Option<PathBuf>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub desc: bool,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl QueryArgs {
    fn find_filter(&self) -> FindFilter {
        FindFilter {
            q: self.q.clone(),
            page: self.page,
            per_page: self.per_page,
            sort: self.sort.clone(),
            direction: Some(if self.desc {
                SortDirection::Desc
            } else {
                SortDirection::Asc
            }),
        }
    }
}

/// Print one page of matching objects as JSON lines, then the total.
pub(crate) fn run_query(args: QueryArgs, db_path: Option<PathBuf>) -> Result<(), CliError> {
    let conn = open_catalog(db_path)?;
    let find = args.find_filter();
    let filter = args.filter.as_deref();

    let total = match args.entity {
        EntityArg::Scenes => print_page(SceneRepository::new(&conn), filter, &find)?,
        EntityArg::Images => print_page(ImageRepository::new(&conn), filter, &find)?,
        EntityArg::Galleries => print_page(GalleryRepository::new(&conn), filter, &find)?,
        EntityArg::Performers => print_page(PerformerRepository::new(&conn), filter, &find)?,
        EntityArg::Studios => print_page(StudioRepository::new(&conn), filter, &find)?,
        EntityArg::Movies => print_page(MovieRepository::new(&conn), filter, &find)?,
        EntityArg::Tags => print_page(TagRepository::new(&conn), filter, &find)?,
    };

    log::info!(
        "{} {}",
        total.if_supports_color(Stdout, |t| t.bold()),
        "total".if_supports_color(Stdout, |t| t.dimmed()),
    );
    Ok(())
}

fn print_page<'c, R>(repo: R, filter: Option<&Path>, find: &FindFilter) -> Result<i64, CliError>
where
    R: Queryable<'c>,
    R::Criterion: DeserializeOwned,
    R::Entity: Serialize,
{
    let filter = filter.map(read_filter::<R::Criterion>).transpose()?;
    let (rows, total) = repo
        .query(filter.as_ref(), find)
        .map_err(CliError::database)?;
    for row in &rows {
        let line = serde_json::to_string(row).map_err(CliError::database)?;
        println!("{line}");
    }
    Ok(total)
}

fn read_filter<C: DeserializeOwned>(path: &Path) -> Result<FilterNode<C>, CliError> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str(&contents)
        .map_err(|e| CliError::filter(format!("{}: {}", path.display(), e)))
}
