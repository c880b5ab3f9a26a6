use thiserror::Error;

use crate::session::Stage;

/// All errors that can occur in bibrank-core.
#[derive(Debug, Error)]
pub enum BibrankError {
    #[error("Missing input: {0}")]
    MissingInput(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Action not available in stage '{actual}', expected '{expected}'")]
    InvalidStage { expected: Stage, actual: Stage },

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl From<csv::Error> for BibrankError {
    fn from(err: csv::Error) -> Self {
        let position = err
            .position()
            .map(|pos| format!(" at line {}", pos.line()))
            .unwrap_or_default();
        Self::Parse(format!("ranking CSV{position}: {err}"))
    }
}

impl BibrankError {
    /// Whether the user can fix this by changing their input and retrying.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::MissingInput(_) | Self::Parse(_) | Self::Validation(_)
        )
    }
}

/// Exit codes used by the CLI.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidInput = 3,
    FileSystemError = 4,
}

impl From<&BibrankError> for ExitCode {
    fn from(err: &BibrankError) -> Self {
        match err {
            BibrankError::Io(_) => Self::FileSystemError,
            e if e.is_user_error() => Self::InvalidInput,
            _ => Self::GeneralError,
        }
    }
}

pub type Result<T> = std::result::Result<T, BibrankError>;
