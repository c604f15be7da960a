use daric_core::ParseMoneyError;
use std::path::PathBuf;
use thiserror::Error;

/// A statement file that does not fit its format. Always names the file, and
/// the 1-based line when the problem is in a data row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedInputError {
    #[error("{file}: file is empty, expected a header row")]
    MissingHeader { file: String },
    #[error("{file}: header is missing column `{column}` (found: {found})")]
    MissingColumn {
        file: String,
        column: String,
        found: String,
    },
    #[error("{file}: content is not valid UTF-8 after byte {valid_up_to}")]
    Encoding { file: String, valid_up_to: usize },
    #[error("{file}: row {row}, column `{column}`: {reason}")]
    InvalidField {
        file: String,
        row: u64,
        column: String,
        reason: FieldError,
    },
    #[error("{file}: row {row}: {message}")]
    InvalidRow {
        file: String,
        row: u64,
        message: String,
    },
}

impl MalformedInputError {
    pub fn file(&self) -> &str {
        match self {
            MalformedInputError::MissingHeader { file }
            | MalformedInputError::MissingColumn { file, .. }
            | MalformedInputError::Encoding { file, .. }
            | MalformedInputError::InvalidField { file, .. }
            | MalformedInputError::InvalidRow { file, .. } => file,
        }
    }

    pub fn row(&self) -> Option<u64> {
        match self {
            MalformedInputError::InvalidField { row, .. }
            | MalformedInputError::InvalidRow { row, .. } => Some(*row),
            _ => None,
        }
    }

    /// True when the header itself is wrong, typically a file uploaded as
    /// the other statement format.
    pub fn is_header_error(&self) -> bool {
        matches!(
            self,
            MalformedInputError::MissingHeader { .. } | MalformedInputError::MissingColumn { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("invalid date '{value}', expected format {format}")]
    InvalidDate { value: String, format: String },
    #[error("invalid amount '{value}': {reason}")]
    InvalidAmount { value: String, reason: ParseMoneyError },
    #[error("neither debit nor credit holds an amount")]
    MissingAmount,
}

/// Errors from the cloud drive collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriveError {
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("not found: {0}")]
    NotFound(String),
    #[error("request failed: {0}")]
    Request(String),
}

#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("folder not found: {}", .0.display())]
    FolderNotFound(PathBuf),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("drive folder '{0}' contains no CSV files")]
    EmptyFolder(String),
    #[error("drive error: {0}")]
    Drive(#[from] DriveError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid category map JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("category map has an empty description or category near '{0}'")]
    EmptyEntry(String),
    #[error("'{description}' is mapped to both '{first}' and '{second}'")]
    Conflict {
        description: String,
        first: String,
        second: String,
    },
}

/// Anything that can stop an ingestion run.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error(transparent)]
    MalformedInput(#[from] MalformedInputError),
    #[error(transparent)]
    DataSource(#[from] DataSourceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}
