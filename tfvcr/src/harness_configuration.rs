use crate::{
    cassette::Cassette,
    diff_steps,
    error::Error,
    steps::TestCase,
};
use std::{
    env,
    io::Write,
    path::{Path, PathBuf},
};

pub const VCR_MODE_ENV: &str = "VCR_MODE";
pub const VCR_PATH_ENV: &str = "VCR_PATH";
pub const RELEASE_DIFF_ENV: &str = "RELEASE_DIFF";

pub const DEFAULT_SOURCE_ALIAS: &str = "google-beta";
pub const DEFAULT_TARGET_ALIAS: &str = "google-local";

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum VcrMode {
    /// Requests go to the real API and nothing is recorded.
    Live,
    Replaying,
    Recording,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ReleaseDiff {
    pub source_alias: String,
    pub target_alias: String,
}

impl Default for ReleaseDiff {
    fn default() -> Self {
        Self {
            source_alias: DEFAULT_SOURCE_ALIAS.into(),
            target_alias: DEFAULT_TARGET_ALIAS.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HarnessConfiguration {
    mode: VcrMode,
    cassette_dir: Option<PathBuf>,
    release_diff: Option<ReleaseDiff>,
}

impl HarnessConfiguration {
    pub fn new(mode: VcrMode) -> Self {
        Self {
            mode,
            cassette_dir: None,
            release_diff: None,
        }
    }

    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the configuration from `lookup`, which resolves environment
    /// variable names. Empty values count as unset.
    pub fn from_lookup<F: Fn(&str) -> Option<String>>(lookup: F) -> Result<Self, Error> {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let mode = match lookup(VCR_MODE_ENV).as_deref() {
            None => VcrMode::Live,
            Some("REPLAYING") => VcrMode::Replaying,
            Some("RECORDING") => VcrMode::Recording,
            Some(other) => {
                return Err(Error::InvalidConfiguration(format!(
                    "{} must be REPLAYING or RECORDING, got {:?}",
                    VCR_MODE_ENV, other
                )))
            }
        };

        let mut configuration = Self::new(mode);

        match lookup(VCR_PATH_ENV) {
            Some(path) => configuration.set_cassette_dir(path),
            None if mode != VcrMode::Live => {
                return Err(Error::InvalidConfiguration(format!(
                    "{} is required when {} is set",
                    VCR_PATH_ENV, VCR_MODE_ENV
                )))
            }
            None => {}
        }

        if lookup(RELEASE_DIFF_ENV).is_some() {
            configuration.release_diff = Some(ReleaseDiff::default());
        }

        tracing::debug!(
            ?mode,
            cassette_dir = ?configuration.cassette_dir,
            release_diff = configuration.release_diff.is_some(),
            "loaded harness configuration"
        );

        Ok(configuration)
    }

    pub fn mode(&self) -> VcrMode {
        self.mode
    }

    pub fn set_cassette_dir<P: Into<PathBuf>>(&mut self, cassette_dir: P) {
        self.cassette_dir = Some(cassette_dir.into());
    }

    pub fn cassette_dir(&self) -> Option<&Path> {
        self.cassette_dir.as_deref()
    }

    pub fn set_release_diff<S1: Into<String>, S2: Into<String>>(
        &mut self,
        source_alias: S1,
        target_alias: S2,
    ) {
        self.release_diff = Some(ReleaseDiff {
            source_alias: source_alias.into(),
            target_alias: target_alias.into(),
        });
    }

    pub fn release_diff(&self) -> Option<&ReleaseDiff> {
        self.release_diff.as_ref()
    }

    /// `<cassette dir>/<test name>.md`
    pub fn cassette_path(&self, test_name: &str) -> Result<PathBuf, Error> {
        self.cassette_dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.md", test_name)))
            .ok_or_else(|| Error::InvalidConfiguration("no cassette directory configured".into()))
    }

    pub fn load_cassette(&self, test_name: &str) -> Result<Cassette, Error> {
        Cassette::load(self.cassette_path(test_name)?)
    }

    /// Applies the release diff to `test_case` when it is enabled, and
    /// returns the case unchanged otherwise.
    pub fn prepare_test_case<W: Write + ?Sized>(&self, test_case: TestCase, log: &mut W) -> TestCase {
        match &self.release_diff {
            Some(diff) => diff_steps::insert_diff_steps(
                test_case,
                log,
                &diff.source_alias,
                &diff.target_alias,
            ),
            None => test_case,
        }
    }
}
