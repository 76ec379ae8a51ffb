use crate::{
    downstream::ErrorLedger,
    error::{CollaboratorError, Error},
    summary::{BuildState, BuildStatus, DiffCommentData, Summary, MULTIPLE_RESOURCES_CONTEXT},
};

pub trait GithubClient {
    fn post_build_status(
        &self,
        pr_number: u64,
        context: &str,
        state: BuildState,
        target_url: &str,
        commit_sha: &str,
    ) -> Result<(), CollaboratorError>;

    fn add_labels(&self, pr_number: u64, labels: &[String]) -> Result<(), CollaboratorError>;

    fn post_comment(&self, pr_number: u64, comment: &str) -> Result<(), CollaboratorError>;
}

/// Maps resource names to `service/*` labels.
pub trait ServiceLabeler {
    fn has_rules(&self) -> bool;

    fn labels_for(&self, resources: &[String]) -> Vec<String>;

    /// Whether any rule matches `resource`.
    fn covers(&self, resource: &str) -> bool;
}

pub trait CommentRenderer {
    fn render(&self, data: &DiffCommentData) -> Result<String, CollaboratorError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishContext {
    pub pr_number: u64,
    pub commit_sha: String,
    pub target_url: String,
}

/// Posts statuses and labels, then the rendered comment.
///
/// The multiple-resources status goes first, then the service labels, then
/// the remaining statuses. Status and label failures don't stop the run;
/// they show up in the comment's "Other" errors, in that same order.
pub fn publish<G, R>(
    mut summary: Summary,
    ctx: &PublishContext,
    github: &G,
    renderer: &R,
) -> Result<(), Error>
where
    G: GithubClient + ?Sized,
    R: CommentRenderer + ?Sized,
{
    let (before_labels, after_labels): (Vec<_>, Vec<_>) = summary
        .statuses
        .iter()
        .partition(|status| status.context == MULTIPLE_RESOURCES_CONTEXT);

    for status in before_labels {
        post_status(github, ctx, status, &mut summary.errors);
    }

    if !summary.labels.is_empty() {
        if let Err(error) = github.add_labels(ctx.pr_number, &summary.labels) {
            tracing::warn!(labels = ?summary.labels, %error, "error posting new service labels");
            summary.errors.push_other("Failed to update service labels");
        }
    }

    for status in after_labels {
        post_status(github, ctx, status, &mut summary.errors);
    }

    let data = summary.into_comment_data();
    let comment = renderer.render(&data).map_err(Error::Render)?;
    github
        .post_comment(ctx.pr_number, &comment)
        .map_err(|source| Error::PostComment {
            pr_number: ctx.pr_number,
            source,
        })?;

    tracing::info!(pr_number = ctx.pr_number, "posted diff comment");
    Ok(())
}

fn post_status<G: GithubClient + ?Sized>(
    github: &G,
    ctx: &PublishContext,
    status: &BuildStatus,
    errors: &mut ErrorLedger,
) {
    if let Err(error) = github.post_build_status(
        ctx.pr_number,
        status.context,
        status.state,
        &ctx.target_url,
        &ctx.commit_sha,
    ) {
        tracing::warn!(
            context = status.context,
            pr_number = ctx.pr_number,
            commit_sha = %ctx.commit_sha,
            %error,
            "error posting build status"
        );
        errors.push_other(status.failure_message());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::downstream::{Downstream, ErrorLedger};
    use crate::summary::{summarize, ProviderReport, BREAKING_CHANGE_CONTEXT};
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeGithub {
        fail_statuses: bool,
        fail_labels: bool,
        fail_comment: bool,
        statuses: RefCell<Vec<(String, BuildState)>>,
        labels: RefCell<Vec<String>>,
        comments: RefCell<Vec<String>>,
    }

    impl GithubClient for FakeGithub {
        fn post_build_status(
            &self,
            _pr_number: u64,
            context: &str,
            state: BuildState,
            _target_url: &str,
            _commit_sha: &str,
        ) -> Result<(), CollaboratorError> {
            if self.fail_statuses {
                return Err("status api unavailable".into());
            }
            self.statuses.borrow_mut().push((context.to_string(), state));
            Ok(())
        }

        fn add_labels(&self, _pr_number: u64, labels: &[String]) -> Result<(), CollaboratorError> {
            if self.fail_labels {
                return Err("labels api unavailable".into());
            }
            self.labels.borrow_mut().extend_from_slice(labels);
            Ok(())
        }

        fn post_comment(&self, _pr_number: u64, comment: &str) -> Result<(), CollaboratorError> {
            if self.fail_comment {
                return Err("comments api unavailable".into());
            }
            self.comments.borrow_mut().push(comment.to_string());
            Ok(())
        }
    }

    struct AllCompute;

    impl ServiceLabeler for AllCompute {
        fn has_rules(&self) -> bool {
            true
        }

        fn labels_for(&self, resources: &[String]) -> Vec<String> {
            if resources.is_empty() {
                Vec::new()
            } else {
                vec!["service/compute".to_string()]
            }
        }

        fn covers(&self, _resource: &str) -> bool {
            true
        }
    }

    /// Renders the error sections only.
    struct ErrorsRenderer;

    impl CommentRenderer for ErrorsRenderer {
        fn render(&self, data: &DiffCommentData) -> Result<String, CollaboratorError> {
            Ok(data
                .errors
                .iter()
                .map(|section| format!("{}: {}", section.title, section.errors.join("; ")))
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }

    struct BrokenRenderer;

    impl CommentRenderer for BrokenRenderer {
        fn render(&self, _data: &DiffCommentData) -> Result<String, CollaboratorError> {
            Err("template: unexpected EOF".into())
        }
    }

    fn ctx() -> PublishContext {
        PublishContext {
            pr_number: 1234,
            commit_sha: "sha1".into(),
            target_url: "https://example.com/build".into(),
        }
    }

    fn summary_with_resource() -> Summary {
        let mut ga = ProviderReport::new(Downstream::Ga);
        ga.schema_diff.modified_resources = vec!["google_compute_instance".into()];
        summarize(Vec::new(), &[ga], &[], &AllCompute, ErrorLedger::new())
    }

    #[test]
    fn publishes_statuses_labels_and_comment() {
        let github = FakeGithub::default();

        publish(summary_with_resource(), &ctx(), &github, &ErrorsRenderer).unwrap();

        assert_eq!(github.statuses.borrow().len(), 3);
        assert_eq!(*github.labels.borrow(), vec!["service/compute".to_string()]);
        assert_eq!(*github.comments.borrow(), vec![String::new()]);
    }

    #[test]
    fn collaborator_failures_end_up_in_the_comment() {
        let github = FakeGithub {
            fail_statuses: true,
            fail_labels: true,
            ..Default::default()
        };

        publish(summary_with_resource(), &ctx(), &github, &ErrorsRenderer).unwrap();

        let comments = github.comments.borrow();
        assert!(comments[0].starts_with("Other: "));
        assert!(comments[0].contains("Failed to update breaking-change status check with state: success"));
        assert!(comments[0].contains("Failed to update service labels"));
    }

    #[test]
    fn labels_are_added_between_multiple_resources_and_other_statuses() {
        let github = FakeGithub {
            fail_statuses: true,
            fail_labels: true,
            ..Default::default()
        };

        publish(summary_with_resource(), &ctx(), &github, &ErrorsRenderer).unwrap();

        assert_eq!(
            github.comments.borrow()[0],
            "Other: Failed to update multiple-resources status check with state: success; \
             Failed to update service labels; \
             Failed to update breaking-change status check with state: success; \
             Failed to update missing-service-labels status check with state: success"
        );
    }

    #[test]
    fn render_failure_is_returned() {
        let github = FakeGithub::default();

        let result = publish(summary_with_resource(), &ctx(), &github, &BrokenRenderer);

        assert!(matches!(result, Err(Error::Render(_))));
        assert!(github.comments.borrow().is_empty());
        assert!(github
            .statuses
            .borrow()
            .iter()
            .any(|(context, _)| context == BREAKING_CHANGE_CONTEXT));
    }

    #[test]
    fn comment_failure_is_returned() {
        let github = FakeGithub {
            fail_comment: true,
            ..Default::default()
        };

        let result = publish(summary_with_resource(), &ctx(), &github, &ErrorsRenderer);

        assert!(matches!(result, Err(Error::PostComment { pr_number: 1234, .. })));
    }
}
