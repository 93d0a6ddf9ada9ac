use std::sync::Arc;

/// Errors surfaced by the binary.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Data(#[from] sheetgrid_lib::error::Error),

    #[error(transparent)]
    Fetch(#[from] Arc<sheetgrid_lib::error::Error>),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No source URL: pass --source-url or set SHEETGRID_SOURCE_URL")]
    MissingSource,

    #[error("Could not determine a data directory for the login marker")]
    NoDataDir,
}
