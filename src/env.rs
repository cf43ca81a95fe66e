//! Defines the environment variables to read and the configuration built from them.

#![cfg(feature = "env")]

use std::{env, fmt::Debug, time::Duration};

use tracing::warn;

/// The token used to authenticate against GitHub REST API.
pub const GITHUB_TOKEN: &str = "GITHUB_TOKEN";
/// The owner of the repository hosting the workflow.
pub const OWNER: &str = "OWNER";
/// The name of the repository hosting the workflow.
pub const REPO: &str = "REPO";
/// The workflow id or workflow file name to dispatch.
pub const WORKFLOW_ID: &str = "WORKFLOW_ID";
/// The branch, tag or SHA to dispatch the workflow on.
pub const REF: &str = "REF";
/// The inputs of the dispatched workflow, as a JSON object.
pub const WORKFLOW_INPUTS: &str = "WORKFLOW_INPUTS";
/// The `owner/repo` of the repository running the current job, set by GitHub Actions.
pub const GITHUB_REPOSITORY: &str = "GITHUB_REPOSITORY";
/// The ref that triggered the current job, set by GitHub Actions.
pub const GITHUB_REF: &str = "GITHUB_REF";
/// The base URL of GitHub REST API, set by GitHub Actions.
pub const GITHUB_API_URL: &str = "GITHUB_API_URL";
/// The file collecting the outputs of the current step, set by GitHub Actions.
pub const GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";

/// The base URL of GitHub REST API on github.com.
pub const DEFAULT_API_URL: &str = "https://api.github.com";
/// How long to wait after dispatching before listing the runs.
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(30);
/// How far a run's creation time may be from the moment it is looked up.
pub const DEFAULT_MATCH_WINDOW: Duration = Duration::from_secs(45);

/// The configuration of a single dispatch, read once at start.
#[derive(Clone)]
pub struct Config {
    /// The GitHub token. A missing token fails the dispatch before any request is sent.
    pub token: Option<String>,
    /// The owner of the repository hosting the workflow.
    pub owner: String,
    /// The name of the repository hosting the workflow.
    pub repo: String,
    /// The workflow id or workflow file name. Empty if not configured.
    pub workflow_id: String,
    /// The branch, tag or SHA to dispatch the workflow on.
    pub git_ref: String,
    /// The raw JSON of the workflow inputs, parsed when the dispatch request is built.
    pub inputs: Option<String>,
    /// The base URL of GitHub REST API.
    pub api_url: String,
    /// How long to wait after dispatching before listing the runs.
    pub grace_period: Duration,
    /// How far a run's creation time may be from the moment it is looked up.
    pub match_window: Duration,
}

impl Config {
    /// Reads the configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Reads the configuration through an arbitrary lookup. Empty values count as unset.
    ///
    /// `owner` and `repo` fall back to [`GITHUB_REPOSITORY`], and `git_ref` falls back to [`GITHUB_REF`].
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        let (ambient_owner, ambient_repo) = var(GITHUB_REPOSITORY)
            .and_then(|repository| {
                repository
                    .split_once('/')
                    .map(|(owner, repo)| (owner.to_owned(), repo.to_owned()))
            })
            .unzip();

        let workflow_id = var(WORKFLOW_ID).unwrap_or_else(|| {
            warn!("{WORKFLOW_ID} not set in environment, the dispatch will likely fail");
            String::new()
        });

        Self {
            token: var(GITHUB_TOKEN),
            owner: var(OWNER).or(ambient_owner).unwrap_or_default(),
            repo: var(REPO).or(ambient_repo).unwrap_or_default(),
            workflow_id,
            git_ref: var(REF).or_else(|| var(GITHUB_REF)).unwrap_or_default(),
            inputs: var(WORKFLOW_INPUTS),
            api_url: var(GITHUB_API_URL).unwrap_or_else(|| DEFAULT_API_URL.to_owned()),
            grace_period: DEFAULT_GRACE_PERIOD,
            match_window: DEFAULT_MATCH_WINDOW,
        }
    }
}

impl Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("workflow_id", &self.workflow_id)
            .field("git_ref", &self.git_ref)
            .field("inputs", &self.inputs)
            .field("api_url", &self.api_url)
            .field("grace_period", &self.grace_period)
            .field("match_window", &self.match_window)
            .finish()
    }
}
