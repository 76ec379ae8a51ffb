use crate::error::Error;

const FALLBACK_TOKEN: &str = "GITHUB_TOKEN";
const DOWNSTREAMS_TOKEN: &str = "GITHUB_TOKEN_DOWNSTREAMS";
const MAGIC_MODULES_TOKEN: &str = "GITHUB_TOKEN_MAGIC_MODULES";

/// Inputs of a comment-generation build step.
#[derive(Clone, PartialEq, Eq)]
pub struct GenerateCommentEnv {
    pub build_id: String,
    pub build_step: String,
    pub commit_sha: String,
    pub gopath: String,
    pub home: String,
    pub path: String,
    pub pr_number: u64,
    pub project_id: String,
    pub downstreams_token: String,
    pub magic_modules_token: String,
}

impl GenerateCommentEnv {
    pub fn from_env() -> Result<Self, Error> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.is_empty());
        let require = |key: &str| get(key).ok_or_else(|| Error::MissingVariable(key.to_string()));
        let token = |key: &str| {
            get(key)
                .or_else(|| get(FALLBACK_TOKEN))
                .ok_or_else(|| Error::MissingToken(key.to_string()))
        };

        let build_id = require("BUILD_ID")?;
        let build_step = require("BUILD_STEP")?;
        let commit_sha = require("COMMIT_SHA")?;
        let gopath = require("GOPATH")?;
        let home = require("HOME")?;
        let path = require("PATH")?;
        let pr_number = require("PR_NUMBER")?;
        let project_id = require("PROJECT_ID")?;

        let pr_number = pr_number
            .parse::<u64>()
            .map_err(|source| Error::InvalidPrNumber {
                value: pr_number.clone(),
                source,
            })?;

        Ok(GenerateCommentEnv {
            build_id,
            build_step,
            commit_sha,
            gopath,
            home,
            path,
            pr_number,
            project_id,
            downstreams_token: token(DOWNSTREAMS_TOKEN)?,
            magic_modules_token: token(MAGIC_MODULES_TOKEN)?,
        })
    }

    /// Cloud Build console page of this step.
    pub fn target_url(&self) -> String {
        format!(
            "https://console.cloud.google.com/cloud-build/builds;region=global/{};step={}?project={}",
            self.build_id, self.build_step, self.project_id
        )
    }
}

impl std::fmt::Debug for GenerateCommentEnv {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerateCommentEnv")
            .field("build_id", &self.build_id)
            .field("build_step", &self.build_step)
            .field("commit_sha", &self.commit_sha)
            .field("pr_number", &self.pr_number)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}
