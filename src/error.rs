use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TimeCodeError {
    #[error("Time-code must be 11 digits (YYYYDDDHHMM), got '{0}'")]
    Malformed(String),
    #[error("Time-code '{0}' does not describe a valid clock time")]
    InvalidTime(String),
}

/// Failure to retrieve a single image. Never fatal to a fetch run.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
