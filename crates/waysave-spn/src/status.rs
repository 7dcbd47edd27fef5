//! Job status checking against the SPN status endpoint

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use waysave_core::{Sleep, is_shutdown_requested};

use crate::response::{StatusResponse, status_line};
use crate::session::JobRecord;

/// Pause between status requests.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Transport for status checks.
pub trait StatusApi {
    fn job_status(&self, job_id: &str) -> anyhow::Result<StatusResponse>;
}

/// Where status lines go: a writer (print mode) or a status file.
pub enum StatusSink {
    Writer(Box<dyn Write>),
    File(File),
}

impl StatusSink {
    /// Print mode: lines go to stdout, flushed as they are written.
    pub fn stdout() -> Self {
        Self::Writer(Box::new(std::io::stdout()))
    }

    /// Open a status file for appending, creating it if needed.
    pub fn file(path: &Path) -> anyhow::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Cannot open status file {}", path.display()))?;
        Ok(Self::File(file))
    }

    pub fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        match self {
            Self::Writer(writer) => {
                writeln!(writer, "{line}")?;
                writer.flush()
            }
            Self::File(file) => writeln!(file, "{line}"),
        }
    }
}

#[derive(Debug, Default)]
pub struct CheckSummary {
    pub checked: usize,
    pub unknown: usize,
    pub interrupted: bool,
}

/// Check every job record in order, writing one status line per record.
///
/// Records without a job ID never produced a capture job; they are
/// reported as `unknown` without hitting the API.
pub fn check_all(
    api: &impl StatusApi,
    records: &[JobRecord],
    sink: &mut StatusSink,
    poll_interval: Duration,
    sleep: &mut impl Sleep,
) -> anyhow::Result<CheckSummary> {
    let mut summary = CheckSummary::default();
    for record in records {
        if is_shutdown_requested() {
            summary.interrupted = true;
            break;
        }
        log::info!("Checking {}", record.url);
        match record.job_id.as_deref() {
            None => {
                log::warn!("No job ID recorded for {}", record.url);
                sink.write_line(&format!("unknown {}", record.url))
                    .context("Cannot write status line")?;
                summary.unknown += 1;
            }
            Some(job_id) => {
                let resp = api.job_status(job_id)?;
                sink.write_line(&status_line(&resp, &record.url))
                    .context("Cannot write status line")?;
                summary.checked += 1;
                sleep.sleep(poll_interval);
            }
        }
    }
    Ok(summary)
}
