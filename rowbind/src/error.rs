//! Error types for rowbind

use thiserror::Error;

/// Result type alias for rowbind operations
pub type Result<T> = std::result::Result<T, Error>;

/// Broad category of an [`Error`].
///
/// Repository code usually only needs to know which side failed: the
/// environment (configuration), the database (data access), the mapping
/// into a record type (binding), or the caller's own row handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    DataAccess,
    Binding,
    Handler,
}

/// Errors that can occur while executing statements or binding rows
#[derive(Error, Debug)]
pub enum Error {
    /// Connection string unavailable or malformed
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Settings could not be loaded
    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    /// MySQL driver error
    #[error("MySQL error: {0}")]
    MySql(#[from] mysql_async::Error),

    /// Connection could not be opened or used
    #[error("Connection error: {0}")]
    Connection(String),

    /// Statement could not be executed or read
    #[error("Query error: {0}")]
    Query(String),

    /// Parameter set could not be bound to a command
    #[error("Parameter error: {0}")]
    Parameter(String),

    /// Type conversion error
    #[error("Type conversion error: expected {expected}, got {actual}")]
    TypeConversion {
        expected: &'static str,
        actual: String,
    },

    /// Null value for a non-optional target
    #[error("Unexpected null value, expected {0}")]
    UnexpectedNull(&'static str),

    /// Column not found in row
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// A column could not be bound to its record field
    #[error("Failed to bind column `{column}`: {source}")]
    Binding { column: String, source: Box<Error> },

    /// A caller-supplied row handler failed
    #[error("Row handler failed: {0}")]
    Handler(String),
}

impl Error {
    /// Wrap a conversion failure with the column it happened on.
    pub fn binding(column: impl Into<String>, source: Error) -> Self {
        Error::Binding {
            column: column.into(),
            source: Box::new(source),
        }
    }

    /// Failure raised from inside a row handler or transform.
    pub fn handler(message: impl Into<String>) -> Self {
        Error::Handler(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Configuration(_) | Error::Settings(_) => ErrorKind::Configuration,
            Error::MySql(_) | Error::Connection(_) | Error::Query(_) | Error::Parameter(_) => {
                ErrorKind::DataAccess
            }
            Error::TypeConversion { .. }
            | Error::UnexpectedNull(_)
            | Error::ColumnNotFound(_)
            | Error::Binding { .. } => ErrorKind::Binding,
            Error::Handler(_) => ErrorKind::Handler,
        }
    }
}
