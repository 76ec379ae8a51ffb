use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("IoError: {0}")]
    IoError(#[from] io::Error),
    #[error("Markdown format is invalid")]
    InvalidMarkdownFormat,
    #[error("Couldn't parse interaction number from the markdown file: {0}")]
    InvalidInteractionNumber(String),
    #[error("The status code is invalid: {0}")]
    InvalidStatusCode(String),
}
