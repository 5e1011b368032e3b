use std::result::Result as StdResult;

use thiserror::Error;

use crate::storage::Collection;

/// Unified error type for the validation, aggregation and storage layers.
#[derive(Error, Debug)]
pub enum EarningsError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Incomplete input: {0}")]
    IncompleteInput(String),
    #[error("Store unavailable ({collection}): {reason}")]
    StoreUnavailable {
        collection: Collection,
        reason: String,
    },
    #[error("Malformed {collection} row: {reason}")]
    MalformedRow {
        collection: Collection,
        reason: String,
    },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Authentication failed: {0}")]
    Authentication(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = StdResult<T, EarningsError>;

impl EarningsError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        EarningsError::Validation(message.into())
    }

    pub(crate) fn unavailable(collection: Collection, reason: impl ToString) -> Self {
        EarningsError::StoreUnavailable {
            collection,
            reason: reason.to_string(),
        }
    }

    pub(crate) fn malformed(collection: Collection, reason: impl Into<String>) -> Self {
        EarningsError::MalformedRow {
            collection,
            reason: reason.into(),
        }
    }

    /// Collection named by a storage failure, if any.
    pub fn collection(&self) -> Option<Collection> {
        match self {
            EarningsError::StoreUnavailable { collection, .. }
            | EarningsError::MalformedRow { collection, .. } => Some(*collection),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for EarningsError {
    fn from(err: serde_json::Error) -> Self {
        EarningsError::Config(err.to_string())
    }
}

/// Failures that stop the shell itself rather than a single command.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] EarningsError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Command(err.to_string())
    }
}
