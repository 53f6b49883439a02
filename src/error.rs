use csv::Error as CSV_ERROR;
use reqwest::Error as REQWEST_ERROR;
use serde_json::Error as JSON_ERROR;
use sqlx::error::Error as SQL_ERROR;
use std::{
    env::VarError, io::Error as IO_ERROR, num::ParseIntError,
    str::ParseBoolError as PARSE_BOOL_ERROR,
};
use thiserror::Error;
use tokio::sync::AcquireError as ACQUIRE_ERROR;
use tokio::task::JoinError;
use tokio::time::error::Elapsed;
use tracing::subscriber::SetGlobalDefaultError as TRACING_GLOBAL_DEFAULT_ERROR;
use url::ParseError as URL_ERROR;
use uuid::Error as UUID_ERROR;

#[derive(Error, Debug)]
pub enum Error {
    #[error("{0}")]
    Io(#[from] IO_ERROR),

    #[error("{0}")]
    URL(#[from] URL_ERROR),

    #[error("{0}")]
    INT(#[from] ParseIntError),

    #[error("{0}")]
    SQL(#[from] SQL_ERROR),

    #[error("{0}")]
    VAR(#[from] VarError),

    #[error("{0}")]
    TokioJoinError(#[from] JoinError),

    #[error("{0}")]
    TokioElapsedError(#[from] Elapsed),

    #[error("{0}")]
    AcquireError(#[from] ACQUIRE_ERROR),

    #[error("{0}")]
    ReqwestError(#[from] REQWEST_ERROR),

    #[error("{0}")]
    JsonError(#[from] JSON_ERROR),

    #[error("{0}")]
    CsvError(#[from] CSV_ERROR),

    #[error("{0}")]
    UuidError(#[from] UUID_ERROR),

    #[error("{0}")]
    ParseBoolError(#[from] PARSE_BOOL_ERROR),

    #[error("Tracing error: {0}")]
    SetGlobalDefaultError(#[from] TRACING_GLOBAL_DEFAULT_ERROR),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Currency not supported: {0}")]
    NotSupportedCurrency(String),

    #[error("Continuation is not supported: {0}")]
    ContinuationNotSupported(String),

    #[error("Invalid continuation token: {0}")]
    InvalidContinuation(String),

    #[error("Upstream error: {0}")]
    UpstreamError(String),

    #[error("Invalid report record: {0}")]
    InvalidReportRecord(String),

    #[error("Report sequence error: {0}")]
    ReportSequence(String),

    #[error("Failed to process deposit wallet: {wallet}: {source}")]
    WalletProcessing {
        wallet: String,
        #[source]
        source: Box<Error>,
    },

    #[error("Failed to process withdrawals provider: {provider}: {source}")]
    ProviderProcessing {
        provider: String,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Whether a failed page fetch may be attempted again.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            Error::ConfigurationError(_)
                | Error::UnknownProvider(_)
                | Error::NotSupportedCurrency(_)
                | Error::ContinuationNotSupported(_)
                | Error::InvalidContinuation(_)
                | Error::InvalidReportRecord(_)
                | Error::ReportSequence(_)
                | Error::TokioJoinError(_)
                | Error::AcquireError(_)
                | Error::WalletProcessing { .. }
                | Error::ProviderProcessing { .. }
        )
    }

    /// Errors that abort the whole run regardless of isolation settings.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::ReportSequence(_) => true,
            Error::WalletProcessing { source, .. }
            | Error::ProviderProcessing { source, .. } => source.is_fatal(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Error;

    #[test]
    fn upstream_errors_are_retryable() {
        assert!(Error::UpstreamError(String::from("busy")).is_retryable());
        assert!(!Error::ContinuationNotSupported(String::from("eth"))
            .is_retryable());
    }

    #[test]
    fn wrapped_sequence_error_is_fatal() {
        let error = Error::WalletProcessing {
            wallet: String::from("XRP:r:0"),
            source: Box::new(Error::ReportSequence(String::from("x"))),
        };

        assert!(error.is_fatal());
        assert!(!error.is_retryable());
    }
}
