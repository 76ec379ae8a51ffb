use serde::Serialize;
use std::collections::HashMap;

/// Repositories generated from one pull request, in the order they are
/// reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Downstream {
    Ga,
    Beta,
    Conversion,
    DocsExamples,
}

impl Downstream {
    pub const ALL: [Downstream; 4] = [
        Downstream::Ga,
        Downstream::Beta,
        Downstream::Conversion,
        Downstream::DocsExamples,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Downstream::Ga => "terraform-provider-google",
            Downstream::Beta => "terraform-provider-google-beta",
            Downstream::Conversion => "terraform-google-conversion",
            Downstream::DocsExamples => "docs-examples",
        }
    }

    /// Heading used for this repo in the comment.
    pub fn title(self) -> &'static str {
        match self {
            Downstream::Ga => "`google` provider",
            Downstream::Beta => "`google-beta` provider",
            Downstream::Conversion => "`terraform-google-conversion`",
            Downstream::DocsExamples => "Open in Cloud Shell",
        }
    }

    /// Providers get built, diff-processed and mapped to service labels.
    pub fn is_provider(self) -> bool {
        matches!(self, Downstream::Ga | Downstream::Beta)
    }
}

pub const OTHER_ERRORS_TITLE: &str = "Other";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ErrorSection {
    pub title: String,
    pub errors: Vec<String>,
}

/// Errors collected while generating the comment, per repo.
#[derive(Debug, Clone, Default)]
pub struct ErrorLedger {
    by_downstream: HashMap<Downstream, Vec<String>>,
    other: Vec<String>,
}

impl ErrorLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push<S: Into<String>>(&mut self, downstream: Downstream, error: S) {
        let error = error.into();
        tracing::warn!(repo = downstream.name(), %error, "recorded presubmit error");
        self.by_downstream.entry(downstream).or_default().push(error);
    }

    pub fn push_other<S: Into<String>>(&mut self, error: S) {
        let error = error.into();
        tracing::warn!(%error, "recorded presubmit error");
        self.other.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.other.is_empty() && self.by_downstream.values().all(Vec::is_empty)
    }

    /// Non-empty sections, repos first in report order, then "Other".
    pub fn into_sections(mut self) -> Vec<ErrorSection> {
        let mut sections: Vec<_> = Downstream::ALL
            .iter()
            .filter_map(|downstream| {
                let errors = self.by_downstream.remove(downstream)?;
                if errors.is_empty() {
                    None
                } else {
                    Some(ErrorSection {
                        title: downstream.title().into(),
                        errors,
                    })
                }
            })
            .collect();

        if !self.other.is_empty() {
            sections.push(ErrorSection {
                title: OTHER_ERRORS_TITLE.into(),
                errors: self.other,
            });
        }

        sections
    }
}
