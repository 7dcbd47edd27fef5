//! Command orchestration: wires the live SPN clients into the drivers

use std::path::Path;
use std::process::ExitCode;
use std::time::Duration;

use waysave_core::SystemSleep;

use crate::api::{AvailabilityClient, Credentials, SpnClient};
use crate::save::{SaveOptions, submit_all};
use crate::session::{SessionLog, load_session, read_url_list};
use crate::availability;
use crate::status::{StatusSink, check_all};

/// Run the save command: submit a URL list, recording accepted jobs.
pub fn run_save(
    credentials: Credentials,
    url_list: &Path,
    session_file: Option<&Path>,
    opts: &SaveOptions,
) -> anyhow::Result<ExitCode> {
    let urls = read_url_list(url_list)?;
    log::info!(
        "save: {} URLs, delay={}s, retry_interval={}s",
        urls.len(),
        opts.delay.as_secs(),
        opts.retry_interval.as_secs()
    );

    let mut session = match session_file {
        Some(path) => Some(SessionLog::append(path)?),
        None => None,
    };
    let client = SpnClient::new(credentials);
    let summary = submit_all(&client, &urls, session.as_mut(), opts, &mut SystemSleep)?;

    if summary.interrupted {
        log::warn!(
            "Interrupted: {} of {} URLs accepted ({} retries)",
            summary.accepted,
            urls.len(),
            summary.retries
        );
        return Ok(ExitCode::from(130));
    }
    log::info!(
        "save completed: {} accepted, {} retries",
        summary.accepted,
        summary.retries
    );
    Ok(ExitCode::SUCCESS)
}

/// Run the check command: poll recorded jobs against the status endpoint.
pub fn run_check(
    credentials: Credentials,
    session_file: &Path,
    status_file: Option<&Path>,
    poll_interval: Duration,
) -> anyhow::Result<ExitCode> {
    let records = load_session(session_file)?;
    log::info!("check: {} job records", records.len());

    let mut sink = match status_file {
        Some(path) => StatusSink::file(path)?,
        None => StatusSink::stdout(),
    };
    let client = SpnClient::new(credentials);
    let summary = check_all(&client, &records, &mut sink, poll_interval, &mut SystemSleep)?;

    if summary.interrupted {
        log::warn!("Interrupted after {} checks", summary.checked);
        return Ok(ExitCode::from(130));
    }
    if summary.unknown > 0 {
        log::warn!("{} records had no job ID", summary.unknown);
    }
    log::info!("check completed: {} jobs checked", summary.checked);
    Ok(ExitCode::SUCCESS)
}

/// Run the available command: report snapshot freshness for a URL list.
pub fn run_available(url_list: &Path, delay: Duration) -> anyhow::Result<ExitCode> {
    let urls = read_url_list(url_list)?;
    log::info!("available: {} URLs", urls.len());

    let mut stdout = std::io::stdout().lock();
    availability::report_all(
        &AvailabilityClient,
        &urls,
        &mut stdout,
        delay,
        &mut SystemSleep,
    )?;
    Ok(ExitCode::SUCCESS)
}
