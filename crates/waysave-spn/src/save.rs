//! Sequential save-submission driver
//!
//! One URL at a time: submit, and on an API-level error (session limit
//! or otherwise) wait out the long retry interval and submit the same
//! URL again. Acceptance records the raw response line and moves on
//! after the inter-request delay.

use std::time::Duration;

use waysave_core::{Sleep, is_shutdown_requested};

use crate::response::SaveOutcome;
use crate::session::SessionLog;

/// Pause between accepted submissions.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(10);

/// Pause before resubmitting after an API-level error.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_secs(300);

/// Transport for save submissions. The live implementation is
/// [`SpnClient`](crate::api::SpnClient); tests script the outcomes.
pub trait SubmitApi {
    fn submit(&self, url: &str, capture_outlinks: bool) -> anyhow::Result<SaveOutcome>;
}

#[derive(Debug, Clone)]
pub struct SaveOptions {
    pub delay: Duration,
    pub retry_interval: Duration,
    pub no_outlinks_for: Option<String>,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            delay: DEFAULT_DELAY,
            retry_interval: DEFAULT_RETRY_INTERVAL,
            no_outlinks_for: None,
        }
    }
}

#[derive(Debug, Default)]
pub struct SaveSummary {
    pub accepted: usize,
    pub retries: usize,
    pub interrupted: bool,
}

/// Whether outlink capture should be requested for a URL.
pub fn capture_outlinks(url: &str, no_outlinks_marker: Option<&str>) -> bool {
    match no_outlinks_marker {
        None => true,
        Some(marker) => !url.contains(marker),
    }
}

/// An accepted capture job: the job ID plus the verbatim response line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AcceptedJob {
    pub job_id: String,
    pub raw: String,
}

/// Submission states for a single URL.
#[derive(Debug, Clone, PartialEq, Eq)]
enum SubmitState {
    Submitting,
    Retrying,
    Accepted(AcceptedJob),
}

/// Map a submission outcome to the next driver state.
fn next_state(outcome: SaveOutcome, url: &str) -> SubmitState {
    match outcome {
        SaveOutcome::Accepted { job_id, raw } => {
            log::info!("Got job ID {job_id} for {url}");
            SubmitState::Accepted(AcceptedJob { job_id, raw })
        }
        SaveOutcome::SessionLimit => {
            log::warn!("Session limit reached.");
            SubmitState::Retrying
        }
        SaveOutcome::ApiError { raw, .. } => {
            log::warn!("Save error for {url}: {raw}");
            SubmitState::Retrying
        }
        SaveOutcome::Unrecognized { raw } => {
            log::warn!("Unrecognized save response for {url}: {raw}");
            SubmitState::Retrying
        }
    }
}

/// Drive one URL through the submit/retry state machine.
///
/// API-level errors are retried indefinitely at `retry_interval`;
/// transport errors bubble up from the bounded HTTP adapter as `Err`.
/// Returns `Ok(None)` if shutdown was requested while retrying.
fn submit_until_accepted(
    api: &impl SubmitApi,
    url: &str,
    outlinks: bool,
    retry_interval: Duration,
    sleep: &mut impl Sleep,
    summary: &mut SaveSummary,
) -> anyhow::Result<Option<AcceptedJob>> {
    let mut state = SubmitState::Submitting;
    loop {
        state = match state {
            SubmitState::Submitting => next_state(api.submit(url, outlinks)?, url),
            SubmitState::Retrying => {
                if is_shutdown_requested() {
                    return Ok(None);
                }
                log::warn!("Waiting {}s to retry {url}", retry_interval.as_secs());
                summary.retries += 1;
                sleep.sleep(retry_interval);
                next_state(api.submit(url, outlinks)?, url)
            }
            SubmitState::Accepted(job) => return Ok(Some(job)),
        };
    }
}

/// Submit every URL in order, appending accepted records to the session
/// log if one is given.
pub fn submit_all(
    api: &impl SubmitApi,
    urls: &[String],
    mut session: Option<&mut SessionLog>,
    opts: &SaveOptions,
    sleep: &mut impl Sleep,
) -> anyhow::Result<SaveSummary> {
    let mut summary = SaveSummary::default();
    for url in urls {
        if is_shutdown_requested() {
            summary.interrupted = true;
            break;
        }
        let outlinks = capture_outlinks(url, opts.no_outlinks_for.as_deref());
        log::info!("Requesting save for {url} (outlinks={outlinks})");
        let job = match submit_until_accepted(
            api,
            url,
            outlinks,
            opts.retry_interval,
            sleep,
            &mut summary,
        )? {
            Some(job) => job,
            None => {
                summary.interrupted = true;
                break;
            }
        };
        if let Some(log_file) = session.as_mut() {
            log_file.append_line(&job.raw)?;
        }
        summary.accepted += 1;
        log::info!("Waiting {}s before next request.", opts.delay.as_secs());
        sleep.sleep(opts.delay);
    }
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    use crate::session::load_session;

    struct ScriptedApi {
        outcomes: RefCell<VecDeque<SaveOutcome>>,
        submitted: RefCell<Vec<(String, bool)>>,
    }

    impl ScriptedApi {
        fn new(outcomes: Vec<SaveOutcome>) -> Self {
            Self {
                outcomes: RefCell::new(outcomes.into()),
                submitted: RefCell::new(Vec::new()),
            }
        }
    }

    impl SubmitApi for ScriptedApi {
        fn submit(&self, url: &str, capture_outlinks: bool) -> anyhow::Result<SaveOutcome> {
            self.submitted
                .borrow_mut()
                .push((url.to_string(), capture_outlinks));
            Ok(self
                .outcomes
                .borrow_mut()
                .pop_front()
                .expect("script exhausted"))
        }
    }

    #[derive(Default)]
    struct RecordingSleep {
        slept: Vec<Duration>,
    }

    impl Sleep for RecordingSleep {
        fn sleep(&mut self, duration: Duration) {
            self.slept.push(duration);
        }
    }

    fn accepted(job_id: &str, url: &str) -> SaveOutcome {
        SaveOutcome::Accepted {
            job_id: job_id.to_string(),
            raw: format!(r#"{{"url":"{url}","job_id":"{job_id}"}}"#),
        }
    }

    #[test]
    fn capture_outlinks_no_marker() {
        assert!(capture_outlinks("https://example.com/page", None));
    }

    #[test]
    fn capture_outlinks_marker_matches() {
        assert!(!capture_outlinks(
            "https://example.com/page",
            Some("example.com")
        ));
    }

    #[test]
    fn capture_outlinks_marker_does_not_match() {
        assert!(capture_outlinks(
            "https://other.org/page",
            Some("example.com")
        ));
    }

    #[test]
    fn next_state_accepted() {
        let state = next_state(accepted("j1", "https://example.com/"), "https://example.com/");
        assert_eq!(
            state,
            SubmitState::Accepted(AcceptedJob {
                job_id: "j1".to_string(),
                raw: r#"{"url":"https://example.com/","job_id":"j1"}"#.to_string(),
            })
        );
    }

    #[test]
    fn next_state_errors_all_retry() {
        for outcome in [
            SaveOutcome::SessionLimit,
            SaveOutcome::ApiError {
                status_ext: Some("error:blocked-url".to_string()),
                raw: "{}".to_string(),
            },
            SaveOutcome::Unrecognized {
                raw: "<html>".to_string(),
            },
        ] {
            assert_eq!(next_state(outcome, "https://example.com/"), SubmitState::Retrying);
        }
    }

    #[test]
    fn session_limit_retries_then_accepts() {
        let url = "https://example.com/page".to_string();
        let api = ScriptedApi::new(vec![
            SaveOutcome::SessionLimit,
            SaveOutcome::SessionLimit,
            accepted("j1", &url),
        ]);
        let mut sleep = RecordingSleep::default();
        let opts = SaveOptions {
            delay: Duration::from_secs(10),
            retry_interval: Duration::from_secs(300),
            no_outlinks_for: None,
        };
        let session_file = tempfile::NamedTempFile::new().unwrap();
        let mut session = SessionLog::append(session_file.path()).unwrap();

        let summary = submit_all(
            &api,
            std::slice::from_ref(&url),
            Some(&mut session),
            &opts,
            &mut sleep,
        )
        .unwrap();

        assert_eq!(summary.accepted, 1);
        assert_eq!(summary.retries, 2);
        // Two retry waits, then the inter-request delay after acceptance
        assert_eq!(
            sleep.slept,
            vec![
                Duration::from_secs(300),
                Duration::from_secs(300),
                Duration::from_secs(10)
            ]
        );
        let records = load_session(session_file.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].job_id.as_deref(), Some("j1"));
    }

    #[test]
    fn unrecognized_response_is_retried() {
        let url = "https://example.com/page".to_string();
        let api = ScriptedApi::new(vec![
            SaveOutcome::Unrecognized {
                raw: "<html>".to_string(),
            },
            accepted("j1", &url),
        ]);
        let mut sleep = RecordingSleep::default();
        let summary = submit_all(
            &api,
            std::slice::from_ref(&url),
            None,
            &SaveOptions::default(),
            &mut sleep,
        )
        .unwrap();
        assert_eq!(summary.accepted, 1);
        assert_eq!(summary.retries, 1);
    }

    #[test]
    fn outlink_flag_passed_through() {
        let urls = vec![
            "https://example.com/page".to_string(),
            "https://other.org/page".to_string(),
        ];
        let api = ScriptedApi::new(vec![accepted("j1", &urls[0]), accepted("j2", &urls[1])]);
        let mut sleep = RecordingSleep::default();
        let opts = SaveOptions {
            no_outlinks_for: Some("example.com".to_string()),
            ..SaveOptions::default()
        };
        submit_all(&api, &urls, None, &opts, &mut sleep).unwrap();
        let submitted = api.submitted.borrow();
        assert_eq!(submitted[0], ("https://example.com/page".to_string(), false));
        assert_eq!(submitted[1], ("https://other.org/page".to_string(), true));
    }

    #[test]
    fn transport_error_propagates() {
        struct FailingApi;
        impl SubmitApi for FailingApi {
            fn submit(&self, _url: &str, _outlinks: bool) -> anyhow::Result<SaveOutcome> {
                anyhow::bail!("connect failure")
            }
        }
        let mut sleep = RecordingSleep::default();
        let result = submit_all(
            &FailingApi,
            &["https://example.com/".to_string()],
            None,
            &SaveOptions::default(),
            &mut sleep,
        );
        assert!(result.is_err());
        assert!(sleep.slept.is_empty());
    }
}
