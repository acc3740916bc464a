//! CLI errors

use std::path::PathBuf;

use tabgrid::GridError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to initialize logger: {0}")]
    Logger(#[from] log::SetLoggerError),

    #[error(transparent)]
    Grid(#[from] GridError),
}

impl CliError {
    pub fn config(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Config {
            path: path.into(),
            source,
        }
    }
}
