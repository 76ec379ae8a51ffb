pub mod diff_processor;
mod downstream;
mod environment;
mod error;
mod github;
mod resources;
mod summary;

pub use downstream::{Downstream, ErrorLedger, ErrorSection, OTHER_ERRORS_TITLE};
pub use environment::GenerateCommentEnv;
pub use error::{CollaboratorError, Error};
pub use github::{publish, CommentRenderer, GithubClient, PublishContext, ServiceLabeler};
pub use resources::{file_to_resource, path_changed};
pub use summary::{
    summarize, BuildState, BuildStatus, Diff, DiffCommentData, ProviderReport, Summary,
    BREAKING_CHANGE_CONTEXT, CROSS_SERVICE_LABEL, MISSING_SERVICE_LABELS_CONTEXT,
    MULTIPLE_RESOURCES_CONTEXT, OVERRIDE_BREAKING_CHANGE_LABEL,
    OVERRIDE_MISSING_SERVICE_LABELS_LABEL, OVERRIDE_MULTIPLE_RESOURCES_LABEL,
};
