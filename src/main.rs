//! Dispatches a GitHub Actions workflow and sets the `run_id` output to the id of the created run.

use std::process::ExitCode;

use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt as _, util::SubscriberInitExt as _};
use workflow_dispatch::{
    dispatch,
    env::Config,
    report::{ActionsReporter, finish},
    workflow::api::GitHubApi,
};

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::from_env();
    debug!("loaded {config:?}");

    let api = GitHubApi::from_config(&config);
    let mut reporter = ActionsReporter::from_env();

    let result = dispatch::run(&config, &api, &mut reporter).await;
    finish(result, &mut reporter);

    reporter.exit_code()
}
