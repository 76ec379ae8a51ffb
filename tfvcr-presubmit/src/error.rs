use thiserror::Error;

/// Errors returned by the collaborators behind the traits in `github`.
pub type CollaboratorError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("did not provide {0} environment variable")]
    MissingVariable(String),
    #[error("did not provide {0} or GITHUB_TOKEN environment variable")]
    MissingToken(String),
    #[error("error parsing PR_NUMBER {value:?}: {source}")]
    InvalidPrNumber {
        value: String,
        source: std::num::ParseIntError,
    },
    #[error("couldn't decode diff processor output: {0}")]
    DiffProcessorOutput(#[from] serde_json::Error),
    #[error("error formatting message: {0}")]
    Render(#[source] CollaboratorError),
    #[error("error posting comment to PR {pr_number}: {source}")]
    PostComment {
        pr_number: u64,
        source: CollaboratorError,
    },
}
