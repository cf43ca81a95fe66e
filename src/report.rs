//! Reports progress, failures and outputs to GitHub Actions through workflow commands.

#![cfg(feature = "env")]

use std::{
    env,
    fs::OpenOptions,
    io::{self, Stdout, Write},
    path::PathBuf,
    process::ExitCode,
};

use anyhow::Context as _;
use tracing::{error, info};

use crate::{env::GITHUB_OUTPUT, error::DispatchError};

/// The name of the output holding the id of the dispatched run.
pub const RUN_ID_OUTPUT: &str = "run_id";

/// Receives the messages and outputs of a dispatch.
pub trait Reporter {
    /// Reports an informational message.
    fn info(&mut self, message: &str);

    /// Reports the failure ending the dispatch.
    fn fail(&mut self, message: &str);

    /// Publishes an output for the following steps.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    fn set_output(&mut self, name: &str, value: &str) -> anyhow::Result<()>;
}

/// [`Reporter`] speaking to the GitHub Actions runner.
///
/// Messages and workflow commands are written to `out` regardless of the log filter. Outputs are
/// appended to the file named by [`GITHUB_OUTPUT`], or written as the legacy `::set-output`
/// command when it is not set. Failures are written as `::error::` commands.
#[derive(Debug)]
pub struct ActionsReporter<W = Stdout> {
    output_path: Option<PathBuf>,
    failed: bool,
    out: W,
}

impl ActionsReporter {
    /// Creates a reporter writing to stdout and outputs to `output_path`.
    pub fn new(output_path: Option<PathBuf>) -> Self {
        Self::with_writer(output_path, io::stdout())
    }

    /// Creates a reporter writing to stdout and outputs to the file named by [`GITHUB_OUTPUT`].
    pub fn from_env() -> Self {
        Self::new(
            env::var_os(GITHUB_OUTPUT)
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
        )
    }
}

impl<W> ActionsReporter<W>
where
    W: Write,
{
    /// Creates a reporter writing to `out` and outputs to `output_path`.
    pub fn with_writer(output_path: Option<PathBuf>, out: W) -> Self {
        Self {
            output_path,
            failed: false,
            out,
        }
    }

    /// The exit code of the process, failing if a failure has been reported.
    pub fn exit_code(&self) -> ExitCode {
        if self.failed {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }
}

impl<W> Reporter for ActionsReporter<W>
where
    W: Write,
{
    fn info(&mut self, message: &str) {
        info!("{message}");
        drop(writeln!(self.out, "{message}"));
    }

    fn fail(&mut self, message: &str) {
        self.failed = true;
        error!("{message}");
        drop(writeln!(self.out, "::error::{}", escape_data(message)));
    }

    fn set_output(&mut self, name: &str, value: &str) -> anyhow::Result<()> {
        match &self.output_path {
            Some(path) => {
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .with_context(|| format!("failed to open output file {path:?}"))?;
                writeln!(file, "{name}={value}")
                    .with_context(|| format!("failed to write output {name} to {path:?}"))?;
            }
            None => writeln!(
                self.out,
                "::set-output name={}::{}",
                escape_property(name),
                escape_data(value)
            )
            .with_context(|| format!("failed to write output {name}"))?,
        }
        Ok(())
    }
}

/// Reports the result of [`crate::dispatch::run`]: the run id as the [`RUN_ID_OUTPUT`] output, or the failure.
pub fn finish<R>(result: Result<u64, DispatchError>, reporter: &mut R)
where
    R: Reporter,
{
    match result {
        Ok(run_id) => {
            if let Err(err) = reporter.set_output(RUN_ID_OUTPUT, &run_id.to_string()) {
                reporter.fail(&format!("{err:#}"));
            }
        }
        Err(err) => reporter.fail(&err.to_string()),
    }
}

/// Escapes the data of a workflow command.
pub fn escape_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

/// Escapes a property of a workflow command.
pub fn escape_property(property: &str) -> String {
    escape_data(property).replace(':', "%3A").replace(',', "%2C")
}

/// [`Reporter`] remembering everything it receives.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct RecordingReporter {
    pub infos: Vec<String>,
    pub failures: Vec<String>,
    pub outputs: Vec<(String, String)>,
}

#[cfg(test)]
impl Reporter for RecordingReporter {
    fn info(&mut self, message: &str) {
        self.infos.push(message.to_owned());
    }

    fn fail(&mut self, message: &str) {
        self.failures.push(message.to_owned());
    }

    fn set_output(&mut self, name: &str, value: &str) -> anyhow::Result<()> {
        self.outputs.push((name.to_owned(), value.to_owned()));
        Ok(())
    }
}
