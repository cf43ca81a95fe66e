//! Dispatches a workflow and finds the run it created.
//!
//! GitHub does not return the id of the run created by a `workflow_dispatch` event. After a grace
//! period, the latest runs of the workflow are listed and the first one on the dispatched ref
//! created close enough to now is taken as the dispatched run.

#![cfg(feature = "workflow")]

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::{
    env::Config,
    error::DispatchError,
    report::Reporter,
    workflow::{
        DispatchRequest, WorkflowRun,
        api::{RUNS_PER_PAGE, WorkflowApi},
    },
};

const NO_CONTENT: u16 = 204;
const OK: u16 = 200;

/// Dispatches the configured workflow and returns the id of the run it created.
///
/// Every request is sent once. Informational messages go to `reporter`, while reporting the result
/// is left to the caller.
///
/// See: [`crate::report::finish`]
///
/// # Errors
///
/// Returns a [`DispatchError`] if the token is missing, the inputs are malformed, either endpoint
/// answers with an unexpected status or cannot be reached, or no listed run matches.
pub async fn run<A, R>(config: &Config, api: &A, reporter: &mut R) -> Result<u64, DispatchError>
where
    A: WorkflowApi + Sync,
    R: Reporter + Send,
{
    if config.token.is_none() {
        return Err(DispatchError::MissingToken);
    }

    let request = DispatchRequest::from_config(config)?;

    reporter.info(&format!(
        "Triggering workflow_dispatch for {} on ref {}",
        request.workflow_id, request.git_ref
    ));
    let status = api.dispatch(&request).await?;
    if status != NO_CONTENT {
        return Err(DispatchError::DispatchStatus(status));
    }
    reporter.info(&format!(
        "Workflow dispatched successfully. Status: {status}"
    ));

    debug!(
        "waiting {:?} for the run to be registered…",
        config.grace_period
    );
    tokio::time::sleep(config.grace_period).await;

    let response = api
        .list_runs(
            &request.owner,
            &request.repo,
            &request.workflow_id,
            RUNS_PER_PAGE,
        )
        .await?;
    if response.status != OK {
        return Err(DispatchError::ListStatus(response.status));
    }

    let triggered_time = Utc::now();
    let run = find_run(
        &response.workflow_runs,
        parse_workflow_id(&request.workflow_id),
        &request.git_ref,
        triggered_time,
        config.match_window,
    )
    .ok_or(DispatchError::NoRunFound)?;

    reporter.info(&format!(
        "Workflow run triggered successfully. Run ID: {}",
        run.id
    ));
    info!("found run {run}");

    Ok(run.id)
}

/// Reads the numeric id out of a configured workflow id, ignoring surrounding whitespace and
/// anything after the leading digits.
///
/// Workflow file names such as `deploy.yml` have no numeric id.
pub fn parse_workflow_id(workflow_id: &str) -> Option<u64> {
    let trimmed = workflow_id.trim_start();
    let digits = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .map_or(trimmed, |end| &trimmed[..end]);
    digits.parse().ok()
}

/// Finds the first run of `workflow_id` on `git_ref` created within `window` of `triggered_time`.
///
/// A `workflow_id` of [`None`] (e.g. a workflow file name) matches no run.
pub fn find_run<'a>(
    runs: &'a [WorkflowRun],
    workflow_id: Option<u64>,
    git_ref: &str,
    triggered_time: DateTime<Utc>,
    window: Duration,
) -> Option<&'a WorkflowRun> {
    runs.iter().find(|run| {
        Some(run.workflow_id) == workflow_id
            && run.head_branch.as_deref() == Some(git_ref)
            && is_created_within_window(triggered_time, run.created_at, window)
    })
}

/// Whether `created_time` is at most `window` away from `triggered_time`, in either direction.
///
/// Both instants are compared at millisecond precision.
pub fn is_created_within_window(
    triggered_time: DateTime<Utc>,
    created_time: DateTime<Utc>,
    window: Duration,
) -> bool {
    let difference = (created_time - triggered_time)
        .num_milliseconds()
        .unsigned_abs();
    u128::from(difference) <= window.as_millis()
}
