use crate::markdown;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IoError: {0}")]
    IoError(#[from] io::Error),
    #[error("Cassette error: {0}")]
    MarkdownError(#[from] markdown::error::Error),
    #[error("The lock was poisoned")]
    PoisonedLock,
    #[error("Invalid header name")]
    InvalidHeaderName,
    #[error("Invalid header value")]
    InvalidHeaderValue,
    #[error("Invalid body")]
    InvalidBody,
    #[error("The request URI has no scheme or host: {0}")]
    RelativeUri(String),
    #[error("Hyper error: {0}")]
    HyperError(#[from] hyper::Error),
    #[error("Http Error: {0}")]
    HttpError(#[from] hyper::http::Error),
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),
    #[error("The server has already been shut down")]
    ServerStopped,
    #[error("No recorded interaction matches {0}")]
    NoMatchingInteraction(String),
    #[error("{} request(s) had no matching recorded interaction: {}", .0.len(), .0.join(", "))]
    UnmatchedRequests(Vec<String>),
}

impl<T> From<std::sync::PoisonError<T>> for Error {
    fn from(_: std::sync::PoisonError<T>) -> Self {
        Error::PoisonedLock
    }
}

impl From<hyper::header::InvalidHeaderName> for Error {
    fn from(_: hyper::header::InvalidHeaderName) -> Self {
        Error::InvalidHeaderName
    }
}

impl From<hyper::header::InvalidHeaderValue> for Error {
    fn from(_: hyper::header::InvalidHeaderValue) -> Self {
        Error::InvalidHeaderValue
    }
}
