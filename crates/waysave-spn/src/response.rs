//! SPN response parsing

use anyhow::Context;
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use serde::Deserialize;
use serde_json::Value;

/// `status_ext` value signalling the per-session concurrency cap.
pub const SESSION_LIMIT_EXT: &str = "error:user-session-limit";

/// Snapshot timestamps are `YYYYMMDDHHMMSS` in UTC.
const SNAPSHOT_TIMESTAMP_FORMAT: &str = "%Y%m%d%H%M%S";

/// Result of one save submission, as reported in the response JSON.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Capture job accepted. `raw` is the response body, kept verbatim
    /// for the session log.
    Accepted { job_id: String, raw: String },
    /// Per-session concurrency cap hit; retry after the long interval.
    SessionLimit,
    /// API-reported error other than the session limit.
    ApiError {
        status_ext: Option<String>,
        raw: String,
    },
    /// Response shape not recognized; treated as a retryable error.
    Unrecognized { raw: String },
}

/// Classify a save-endpoint response body.
pub fn parse_save_response(body: &str) -> SaveOutcome {
    let Ok(json) = serde_json::from_str::<Value>(body) else {
        return SaveOutcome::Unrecognized {
            raw: body.to_string(),
        };
    };
    if let Some(job_id) = json.get("job_id").and_then(Value::as_str) {
        return SaveOutcome::Accepted {
            job_id: job_id.to_string(),
            raw: body.to_string(),
        };
    }
    if json.get("status").and_then(Value::as_str) == Some("error") {
        let status_ext = json
            .get("status_ext")
            .and_then(Value::as_str)
            .map(String::from);
        if status_ext.as_deref() == Some(SESSION_LIMIT_EXT) {
            return SaveOutcome::SessionLimit;
        }
        return SaveOutcome::ApiError {
            status_ext,
            raw: body.to_string(),
        };
    }
    SaveOutcome::Unrecognized {
        raw: body.to_string(),
    }
}

/// Response from the job status endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    pub original_url: Option<String>,
}

pub fn parse_status_response(body: &str) -> anyhow::Result<StatusResponse> {
    serde_json::from_str(body).with_context(|| format!("Invalid status response: {body}"))
}

/// Status-file line for a checked job.
///
/// Successful captures report the `original_url` the archive resolved;
/// anything else falls back to the URL we submitted.
pub fn status_line(resp: &StatusResponse, record_url: &str) -> String {
    match (resp.status.as_str(), resp.original_url.as_deref()) {
        ("success", Some(original_url)) => format!("success {original_url}"),
        (status, _) => format!("{status} {record_url}"),
    }
}

/// Extract the age of the closest archived snapshot from an
/// availability response. Returns `None` if no snapshot is reported.
pub fn parse_availability(response: &Value) -> Option<TimeDelta> {
    let timestamp = response
        .get("archived_snapshots")?
        .get("closest")?
        .get("timestamp")?
        .as_str()?;
    snapshot_age(timestamp, Utc::now())
}

/// Age of a snapshot timestamp relative to `now`.
pub fn snapshot_age(timestamp: &str, now: DateTime<Utc>) -> Option<TimeDelta> {
    let taken = NaiveDateTime::parse_from_str(timestamp, SNAPSHOT_TIMESTAMP_FORMAT).ok()?;
    Some(now - taken.and_utc())
}
