use thiserror::Error;

use crate::config::ConfigError;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub(crate) enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("{failed} of {total} pipeline runs failed")]
    RunsFailed { failed: usize, total: usize },

    #[error(transparent)]
    Data(#[from] fairvalue::DataError),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => 2,
            Self::RunsFailed { .. } => 3,
            Self::Data(_) => 4,
            Self::Serialization(_) | Self::Io(_) => 10,
        }
    }
}
