use crate::{
    diff_processor::{BreakingChange, MissingDocsSummary, MissingTests, SimpleSchemaDiff},
    downstream::{Downstream, ErrorLedger, ErrorSection},
    github::ServiceLabeler,
    resources::file_to_resource,
};
use serde::Serialize;
use std::{
    collections::{BTreeMap, BTreeSet},
    fmt,
};

pub const MULTIPLE_RESOURCES_CONTEXT: &str = "terraform-provider-multiple-resources";
pub const BREAKING_CHANGE_CONTEXT: &str = "terraform-provider-breaking-change-test";
pub const MISSING_SERVICE_LABELS_CONTEXT: &str = "terraform-provider-missing-service-labels";

pub const OVERRIDE_MULTIPLE_RESOURCES_LABEL: &str = "override-multiple-resources";
pub const OVERRIDE_BREAKING_CHANGE_LABEL: &str = "override-breaking-change";
pub const OVERRIDE_MISSING_SERVICE_LABELS_LABEL: &str = "override-missing-service-labels";

pub const SERVICE_LABEL_PREFIX: &str = "service/";
pub const CROSS_SERVICE_LABEL: &str = "service/terraform";
const MAX_SERVICE_LABELS: usize = 3;

/// `git diff --shortstat` of one downstream between the old and new branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Diff {
    pub title: String,
    pub repo: String,
    pub short_stat: String,
    pub commit_sha: String,
    pub old_commit_sha: String,
}

/// Everything the diff processor reported for one provider.
///
/// `changed_files` stays empty when the repo could not be cloned.
#[derive(Debug, Clone)]
pub struct ProviderReport {
    pub downstream: Downstream,
    pub changed_files: Vec<String>,
    pub breaking_changes: Vec<BreakingChange>,
    pub schema_diff: SimpleSchemaDiff,
    pub missing_tests: Option<MissingTests>,
    pub missing_docs: Option<MissingDocsSummary>,
}

impl ProviderReport {
    pub fn new(downstream: Downstream) -> Self {
        ProviderReport {
            downstream,
            changed_files: Vec::new(),
            breaking_changes: Vec::new(),
            schema_diff: SimpleSchemaDiff::default(),
            missing_tests: None,
            missing_docs: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildState {
    Success,
    Failure,
}

impl BuildState {
    pub fn as_str(self) -> &'static str {
        match self {
            BuildState::Success => "success",
            BuildState::Failure => "failure",
        }
    }

    fn unless_overridden(failed: bool, override_label: &str, pr_labels: &[String]) -> Self {
        if failed && !pr_labels.iter().any(|label| label == override_label) {
            BuildState::Failure
        } else {
            BuildState::Success
        }
    }
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildStatus {
    pub context: &'static str,
    pub state: BuildState,
}

impl BuildStatus {
    /// Line recorded under "Other" when the status can't be posted.
    pub fn failure_message(&self) -> String {
        let check = match self.context {
            MULTIPLE_RESOURCES_CONTEXT => "multiple-resources",
            BREAKING_CHANGE_CONTEXT => "breaking-change",
            MISSING_SERVICE_LABELS_CONTEXT => "missing-service-labels",
            other => other,
        };
        format!("Failed to update {} status check with state: {}", check, self.state)
    }
}

/// Data handed to the comment template.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct DiffCommentData {
    pub diffs: Vec<Diff>,
    pub breaking_changes: Vec<BreakingChange>,
    pub missing_service_labels: Vec<String>,
    pub missing_tests: MissingTests,
    pub missing_docs: Option<MissingDocsSummary>,
    pub added_resources: Vec<String>,
    pub errors: Vec<ErrorSection>,
}

/// Outcome of a presubmit run before anything is sent to GitHub.
#[derive(Debug, Clone)]
pub struct Summary {
    pub diffs: Vec<Diff>,
    pub breaking_changes: Vec<BreakingChange>,
    pub added_resources: Vec<String>,
    pub affected_resources: Vec<String>,
    pub missing_service_labels: Vec<String>,
    pub missing_tests: MissingTests,
    pub missing_docs: Option<MissingDocsSummary>,
    pub statuses: Vec<BuildStatus>,
    /// Labels to add to the PR; empty when it already has service labels.
    pub labels: Vec<String>,
    pub errors: ErrorLedger,
}

impl Summary {
    pub fn into_comment_data(self) -> DiffCommentData {
        DiffCommentData {
            diffs: self.diffs,
            breaking_changes: self.breaking_changes,
            missing_service_labels: self.missing_service_labels,
            missing_tests: self.missing_tests,
            missing_docs: self.missing_docs,
            added_resources: self.added_resources,
            errors: self.errors.into_sections(),
        }
    }
}

pub fn summarize<L: ServiceLabeler + ?Sized>(
    diffs: Vec<Diff>,
    reports: &[ProviderReport],
    pr_labels: &[String],
    labeler: &L,
    errors: ErrorLedger,
) -> Summary {
    let mut breaking_changes = BTreeMap::new();
    let mut added = BTreeSet::new();
    let mut affected = BTreeSet::new();
    let mut missing_tests = MissingTests::new();
    let mut missing_docs = None;

    for report in reports {
        for change in &report.breaking_changes {
            breaking_changes
                .entry(change.message.clone())
                .or_insert_with(|| change.clone());
        }
        for resource in &report.schema_diff.added_resources {
            added.insert(resource.clone());
            affected.insert(resource.clone());
        }
        for resource in report
            .schema_diff
            .modified_resources
            .iter()
            .chain(&report.schema_diff.removed_resources)
        {
            affected.insert(resource.clone());
        }

        let from_files: BTreeSet<_> = report
            .changed_files
            .iter()
            .filter_map(|path| file_to_resource(path))
            .collect();
        tracing::debug!(
            repo = report.downstream.name(),
            resources = ?from_files,
            "affected resources based on changed files"
        );
        affected.extend(from_files);

        if let Some(tests) = &report.missing_tests {
            missing_tests.extend(tests.iter().map(|(k, v)| (k.clone(), v.clone())));
        }
        if report.missing_docs.is_some() {
            missing_docs = report.missing_docs.clone();
        }
    }

    let breaking_changes: Vec<_> = breaking_changes.into_values().collect();
    let added_resources: Vec<_> = added.into_iter().collect();
    let affected_resources: Vec<_> = affected.into_iter().collect();

    let mut statuses = vec![
        BuildStatus {
            context: MULTIPLE_RESOURCES_CONTEXT,
            state: BuildState::unless_overridden(
                added_resources.len() > 1,
                OVERRIDE_MULTIPLE_RESOURCES_LABEL,
                pr_labels,
            ),
        },
        BuildStatus {
            context: BREAKING_CHANGE_CONTEXT,
            state: BuildState::unless_overridden(
                !breaking_changes.is_empty(),
                OVERRIDE_BREAKING_CHANGE_LABEL,
                pr_labels,
            ),
        },
    ];

    let mut missing_service_labels = Vec::new();
    let mut labels = Vec::new();
    if labeler.has_rules() {
        missing_service_labels = added_resources
            .iter()
            .filter(|resource| !labeler.covers(resource))
            .cloned()
            .collect();
        statuses.push(BuildStatus {
            context: MISSING_SERVICE_LABELS_CONTEXT,
            state: BuildState::unless_overridden(
                !missing_service_labels.is_empty(),
                OVERRIDE_MISSING_SERVICE_LABELS_LABEL,
                pr_labels,
            ),
        });

        let already_labelled = pr_labels
            .iter()
            .any(|label| label.starts_with(SERVICE_LABEL_PREFIX));
        if !already_labelled {
            labels = service_labels(labeler.labels_for(&affected_resources));
        }
    }

    for status in &statuses {
        tracing::info!(context = status.context, state = %status.state, "computed build status");
    }

    Summary {
        diffs,
        breaking_changes,
        added_resources,
        affected_resources,
        missing_service_labels,
        missing_tests,
        missing_docs,
        statuses,
        labels,
        errors,
    }
}

fn service_labels(labels: Vec<String>) -> Vec<String> {
    let labels: BTreeSet<_> = labels.into_iter().collect();
    if labels.len() > MAX_SERVICE_LABELS {
        vec![CROSS_SERVICE_LABEL.to_string()]
    } else {
        labels.into_iter().collect()
    }
}
