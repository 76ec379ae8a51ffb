use regex::Regex;
use std::{collections::BTreeMap, fmt, sync::Arc};

/// Attributes of every resource in state, keyed by resource address.
pub type ResourceStates = BTreeMap<String, BTreeMap<String, String>>;

type CheckFn = dyn Fn(&ResourceStates) -> Result<(), String> + Send + Sync;

/// An assertion run against state after a step is applied.
#[derive(Clone)]
pub struct StepCheck(Arc<CheckFn>);

impl StepCheck {
    pub fn new<F>(check: F) -> Self
    where
        F: Fn(&ResourceStates) -> Result<(), String> + Send + Sync + 'static,
    {
        Self(Arc::new(check))
    }

    pub fn run(&self, states: &ResourceStates) -> Result<(), String> {
        (self.0)(states)
    }
}

impl fmt::Debug for StepCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("StepCheck(..)")
    }
}

/// One step of an acceptance test.
///
/// A step either carries a configuration to apply (and optionally an error
/// it is expected to fail with) or drives something else, such as an import
/// of `resource_name`.
#[derive(Debug, Clone, Default)]
pub struct TestStep {
    pub config: Option<String>,
    pub expect_error: Option<Regex>,
    pub plan_only: bool,
    pub expect_non_empty_plan: bool,
    pub check: Option<StepCheck>,

    pub resource_name: Option<String>,
    pub import_state: bool,
    pub import_state_verify: bool,
    pub import_state_verify_ignore: Vec<String>,
}

impl TestStep {
    pub fn with_config<S: Into<String>>(config: S) -> Self {
        Self {
            config: Some(config.into()),
            ..Self::default()
        }
    }

    /// An import step that verifies the imported state of `resource_name`.
    pub fn import<S: Into<String>>(resource_name: S) -> Self {
        Self {
            resource_name: Some(resource_name.into()),
            import_state: true,
            import_state_verify: true,
            ..Self::default()
        }
    }

    pub fn expecting_error(mut self, pattern: Regex) -> Self {
        self.expect_error = Some(pattern);
        self
    }

    pub fn ignoring_on_import<S: Into<String>, I: IntoIterator<Item = S>>(
        mut self,
        fields: I,
    ) -> Self {
        self.import_state_verify_ignore
            .extend(fields.into_iter().map(Into::into));
        self
    }

    pub fn with_check(mut self, check: StepCheck) -> Self {
        self.check = Some(check);
        self
    }

    pub fn has_config(&self) -> bool {
        self.config.is_some()
    }
}

#[derive(Debug, Clone, Default)]
pub struct TestCase {
    pub name: String,
    pub steps: Vec<TestStep>,
}

impl TestCase {
    pub fn new<S: Into<String>, I: IntoIterator<Item = TestStep>>(name: S, steps: I) -> Self {
        Self {
            name: name.into(),
            steps: steps.into_iter().collect(),
        }
    }
}
