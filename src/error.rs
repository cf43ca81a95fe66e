//! Errors that end a dispatch.

use thiserror::Error;

/// The reason a dispatch failed. The [`Display`](std::fmt::Display) output is the message reported to GitHub Actions.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No GitHub token was configured. Nothing was sent.
    #[error("GITHUB_TOKEN is not set")]
    MissingToken,
    /// The workflow inputs are not a valid JSON object. Nothing was sent.
    #[error(transparent)]
    InvalidInputs(#[from] serde_json::Error),
    /// The dispatch endpoint answered with something other than `204 No Content`.
    #[error("Failed to trigger workflow. Status: {0}")]
    DispatchStatus(u16),
    /// The list-runs endpoint answered with something other than `200 OK`.
    #[error("Failed to get workflow runs. Status: {0}")]
    ListStatus(u16),
    /// None of the listed runs matched the dispatched one.
    #[error("No workflow run found after dispatch.")]
    NoRunFound,
    /// The request could not be completed, e.g. a connection failure.
    #[error(transparent)]
    Api(#[from] anyhow::Error),
}
