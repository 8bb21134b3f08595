use std::io;
use std::path::PathBuf;

use recordfetch_core::ConfigError;

/// Errors that stop the CLI. Per-document failures are routing, not errors.
#[derive(thiserror::Error, Debug)]
pub enum CliError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("cannot open {}: {source}", path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
