//! Data models of GitHub Actions workflow dispatches and runs.

#![cfg(feature = "workflow")]

use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::env::Config;

pub mod api;

/// The inputs passed to a dispatched workflow.
pub type Inputs = Map<String, Value>;

/// Represents a `workflow_dispatch` event to create.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchRequest {
    pub owner: String,
    pub repo: String,
    /// The workflow id or workflow file name.
    pub workflow_id: String,
    /// The branch, tag or SHA to run the workflow on.
    pub git_ref: String,
    pub inputs: Inputs,
}

impl DispatchRequest {
    /// Builds a request from a [`Config`], parsing its workflow inputs.
    ///
    /// # Errors
    ///
    /// Returns a [`serde_json::Error`] if the inputs are not a JSON object.
    pub fn from_config(config: &Config) -> Result<Self, serde_json::Error> {
        let inputs = match config.inputs.as_deref() {
            Some(json) => serde_json::from_str::<Inputs>(json)?,
            None => Inputs::new(),
        };

        Ok(Self {
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            workflow_id: config.workflow_id.clone(),
            git_ref: config.git_ref.clone(),
            inputs,
        })
    }

    /// The JSON body of the dispatch endpoint.
    pub fn body(&self) -> DispatchBody<'_> {
        DispatchBody {
            git_ref: &self.git_ref,
            inputs: &self.inputs,
        }
    }
}

/// The JSON body of the dispatch endpoint.
#[derive(Debug, Serialize)]
pub struct DispatchBody<'a> {
    #[serde(rename = "ref")]
    pub git_ref: &'a str,
    pub inputs: &'a Inputs,
}

/// Represents a GitHub Actions workflow run from GitHub REST API.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct WorkflowRun {
    pub id: u64,
    pub workflow_id: u64,
    pub head_branch: Option<String>,
    pub created_at: DateTime<Utc>,
    pub html_url: Option<String>,
}

impl Display for WorkflowRun {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.html_url {
            Some(html_url) => write!(f, "{} (at {html_url})", self.id),
            None => write!(f, "{}", self.id),
        }
    }
}

/// Represents workflow runs from GitHub REST API.
#[derive(Debug, Deserialize, Clone)]
pub struct WorkflowRuns {
    pub workflow_runs: Vec<WorkflowRun>,
}

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    fn config(inputs: Option<&str>) -> Config {
        let mut config = Config::from_lookup(|_| None);
        config.owner = String::from("octo");
        config.repo = String::from("hello");
        config.workflow_id = String::from("161335");
        config.git_ref = String::from("main");
        config.inputs = inputs.map(str::to_owned);
        config
    }

    #[test]
    fn builds_request_without_inputs() {
        let request = DispatchRequest::from_config(&config(None)).unwrap();

        assert_eq!(request.owner, "octo");
        assert_eq!(request.repo, "hello");
        assert_eq!(request.workflow_id, "161335");
        assert_eq!(request.git_ref, "main");
        assert!(request.inputs.is_empty());
        assert_eq!(
            serde_json::to_value(request.body()).unwrap(),
            json!({ "ref": "main", "inputs": {} })
        );
    }

    #[test]
    fn builds_request_with_inputs() {
        let request = DispatchRequest::from_config(&config(Some(
            r#"{"environment": "staging", "dry_run": true, "replicas": 3}"#,
        )))
        .unwrap();

        assert_eq!(
            serde_json::to_value(request.body()).unwrap(),
            json!({
                "ref": "main",
                "inputs": { "environment": "staging", "dry_run": true, "replicas": 3 }
            })
        );
    }

    #[test]
    fn rejects_malformed_inputs() {
        assert!(DispatchRequest::from_config(&config(Some("{\"environment\": "))).is_err());
        assert!(DispatchRequest::from_config(&config(Some("[1, 2]"))).is_err());
    }

    #[test]
    fn deserializes_runs() {
        let runs: WorkflowRuns = serde_json::from_value(json!({
            "total_count": 2,
            "workflow_runs": [
                {
                    "id": 30433642,
                    "name": "Build",
                    "workflow_id": 161335,
                    "head_branch": "main",
                    "status": "queued",
                    "created_at": "2020-01-22T19:33:08Z",
                    "html_url": "https://github.com/octo/hello/actions/runs/30433642"
                },
                {
                    "id": 30433643,
                    "workflow_id": 161335,
                    "head_branch": null,
                    "created_at": "2020-01-22T19:35:08Z"
                }
            ]
        }))
        .unwrap();

        let run = &runs.workflow_runs[0];
        assert_eq!(run.id, 30433642);
        assert_eq!(run.workflow_id, 161335);
        assert_eq!(run.head_branch.as_deref(), Some("main"));
        assert_eq!(run.created_at.to_rfc3339(), "2020-01-22T19:33:08+00:00");
        assert_eq!(
            run.to_string(),
            "30433642 (at https://github.com/octo/hello/actions/runs/30433642)"
        );

        let run = &runs.workflow_runs[1];
        assert_eq!(run.head_branch, None);
        assert_eq!(run.html_url, None);
        assert_eq!(run.to_string(), "30433643");
    }
}
