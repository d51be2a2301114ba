use thiserror::Error;

/// Errors that can occur during CLI command execution.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    /// I/O error
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// Database could not be opened or queried
    #[error("Database error: {0}")]
    Database(String),

    /// Import configuration could not be loaded
    #[error("Config error: {0}")]
    Config(String),

    /// Filter file could not be read or parsed
    #[error("Filter error: {0}")]
    Filter(String),

    /// The import run could not start
    #[error("Import error: {0}")]
    Import(#[from] mediagraph_import::ImportError),

    /// The run finished but some instances failed
    #[error("{0} item(s) failed to import")]
    ItemsFailed(usize),
}

impl CliError {
    pub(crate) fn database(msg: impl ToString) -> Self {
        Self::Database(msg.to_string())
    }

    pub(crate) fn config(msg: impl ToString) -> Self {
        Self::Config(msg.to_string())
    }

    pub(crate) fn filter(msg: impl ToString) -> Self {
        Self::Filter(msg.to_string())
    }
}
