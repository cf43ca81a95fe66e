//! Workflow endpoints of GitHub REST API.

use std::error::Error as _;

use reqwest::{Method, RequestBuilder, StatusCode, header};
use tracing::{debug, error, info};

use crate::{
    env::Config,
    static_lazy_lock,
    workflow::{DispatchRequest, WorkflowRun, WorkflowRuns},
};

static_lazy_lock! {
    HTTP_CLIENT: reqwest::Client = reqwest::Client::new();
}

/// The number of latest runs searched for the dispatched one.
pub const RUNS_PER_PAGE: u8 = 5;

const USER_AGENT: &str = concat!("workflow-dispatch/", env!("CARGO_PKG_VERSION"));

/// A response from the list-runs endpoint. The runs are only parsed from `200 OK` responses.
#[derive(Debug, Clone, Default)]
pub struct ListRunsResponse {
    pub status: u16,
    pub workflow_runs: Vec<WorkflowRun>,
}

/// The endpoints needed to dispatch a workflow and find its run.
pub trait WorkflowApi {
    /// Creates a `workflow_dispatch` event and returns the status code of the response.
    ///
    /// # Errors
    ///
    /// Returns an error if no response is received.
    fn dispatch(
        &self,
        request: &DispatchRequest,
    ) -> impl Future<Output = anyhow::Result<u16>> + Send;

    /// Lists the latest runs of a workflow, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if no response is received, or a successful response cannot be parsed.
    fn list_runs(
        &self,
        owner: &str,
        repo: &str,
        workflow_id: &str,
        per_page: u8,
    ) -> impl Future<Output = anyhow::Result<ListRunsResponse>> + Send;
}

/// [`WorkflowApi`] backed by GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubApi {
    base_url: String,
    token: Option<String>,
}

impl GitHubApi {
    /// Creates a client for the API at `base_url`, authenticating with `token` if present.
    pub fn new(base_url: String, token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            token,
        }
    }

    /// Creates a client from the API URL and token of a [`Config`].
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.api_url.clone(), config.token.clone())
    }

    /// Builds a request for GitHub REST API.
    pub fn request_builder(&self, method: Method, url: &str) -> RequestBuilder {
        let builder = HTTP_CLIENT
            .request(method, url)
            .header(header::ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header(header::USER_AGENT, USER_AGENT);

        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    fn workflow_url(&self, owner: &str, repo: &str, workflow_id: &str) -> String {
        format!(
            "{}/repos/{owner}/{repo}/actions/workflows/{workflow_id}",
            self.base_url
        )
    }

    /// Builds the request creating a `workflow_dispatch` event.
    pub fn dispatch_request(&self, request: &DispatchRequest) -> RequestBuilder {
        let url = format!(
            "{}/dispatches",
            self.workflow_url(&request.owner, &request.repo, &request.workflow_id)
        );
        self.request_builder(Method::POST, &url)
            .json(&request.body())
    }

    /// Builds the request listing the latest runs of a workflow.
    pub fn list_runs_request(
        &self,
        owner: &str,
        repo: &str,
        workflow_id: &str,
        per_page: u8,
    ) -> RequestBuilder {
        let url = format!("{}/runs", self.workflow_url(owner, repo, workflow_id));
        self.request_builder(Method::GET, &url)
            .query(&[("per_page", per_page)])
    }
}

impl WorkflowApi for GitHubApi {
    async fn dispatch(&self, request: &DispatchRequest) -> anyhow::Result<u16> {
        debug!(
            "dispatching workflow {} of {}/{} on {}…",
            request.workflow_id, request.owner, request.repo, request.git_ref
        );

        match self.dispatch_request(request).send().await {
            Ok(response) => {
                let status = response.status();
                if status == StatusCode::NO_CONTENT {
                    info!("dispatched workflow {}", request.workflow_id);
                } else {
                    error!(
                        "failed to dispatch workflow {}: {status}",
                        request.workflow_id
                    );
                }
                Ok(status.as_u16())
            }
            Err(err) => {
                error!("failed to dispatch workflow {}: {err}", request.workflow_id);
                Err(err.into())
            }
        }
    }

    async fn list_runs(
        &self,
        owner: &str,
        repo: &str,
        workflow_id: &str,
        per_page: u8,
    ) -> anyhow::Result<ListRunsResponse> {
        match per_page {
            1 => debug!("fetching 1 run of workflow {workflow_id}…"),
            per_page => debug!("fetching {per_page} runs of workflow {workflow_id}…"),
        }

        let response = match self
            .list_runs_request(owner, repo, workflow_id, per_page)
            .send()
            .await
        {
            Ok(response) => response,
            Err(err) => {
                error!("failed to fetch runs of workflow {workflow_id}: {err}");
                return Err(err.into());
            }
        };

        let status = response.status();
        if status != StatusCode::OK {
            error!("failed to fetch runs of workflow {workflow_id}: {status}");
            return Ok(ListRunsResponse {
                status: status.as_u16(),
                workflow_runs: Vec::new(),
            });
        }

        match response.json::<WorkflowRuns>().await {
            Ok(runs) => {
                match runs.workflow_runs.len() {
                    1 => info!("fetched 1 run of workflow {workflow_id}"),
                    count => info!("fetched {count} runs of workflow {workflow_id}"),
                }
                Ok(ListRunsResponse {
                    status: status.as_u16(),
                    workflow_runs: runs.workflow_runs,
                })
            }
            Err(err) => {
                error!("failed to parse runs of workflow {workflow_id}: {err}");

                if let Some(source) = err.source() {
                    error!("{source}")
                }

                Err(err.into())
            }
        }
    }
}
