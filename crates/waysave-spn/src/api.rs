//! Save Page Now API client
//!
//! Three endpoints: capture submission and job status (authenticated
//! POSTs against web.archive.org), and the unauthenticated Wayback
//! availability lookup. Transport failures go through the bounded
//! retry adapter in waysave-core; API-level errors are reported in the
//! response JSON and handled by the drivers.

use anyhow::Context;
use waysave_core::{HttpError, SHARED_RUNTIME, http_client, retry_with_backoff};

use crate::availability::AvailabilityApi;
use crate::response::{SaveOutcome, StatusResponse, parse_save_response, parse_status_response};
use crate::save::SubmitApi;
use crate::status::StatusApi;

pub const SAVE_ENDPOINT: &str = "https://web.archive.org/save";
pub const STATUS_ENDPOINT: &str = "https://web.archive.org/save/status";
pub const AVAILABILITY_ENDPOINT: &str = "https://archive.org/wayback/available";

/// Submissions are skipped server-side if a capture newer than this exists.
pub const IF_NOT_ARCHIVED_WITHIN: &str = "3d";

/// S3-style API credentials for archive.org.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub access_key: String,
    pub secret: String,
}

impl Credentials {
    /// Value for the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("LOW {}:{}", self.access_key, self.secret)
    }
}

/// Authenticated client for the save and status endpoints.
pub struct SpnClient {
    credentials: Credentials,
}

impl SpnClient {
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }

    /// POST a form to an SPN endpoint, returning the response body.
    fn post_form(&self, endpoint: &str, form: &[(&str, &str)]) -> Result<String, HttpError> {
        let result: Result<String, reqwest::Error> = SHARED_RUNTIME.handle().block_on(async {
            let resp = http_client()
                .post(endpoint)
                .header("Authorization", self.credentials.authorization())
                .header("Accept", "application/json")
                .form(form)
                .send()
                .await?
                .error_for_status()?;
            resp.text().await
        });
        result.map_err(|e| HttpError::from_reqwest(&e))
    }

    /// Submit one URL for capture. Returns the raw response body.
    fn save_request(&self, url: &str, capture_outlinks: bool) -> Result<String, HttpError> {
        let outlinks_flag = if capture_outlinks { "1" } else { "0" };
        let form = [
            ("url", url),
            ("capture_outlinks", outlinks_flag),
            ("skip_first_archive", "1"),
            ("if_not_archived_within", IF_NOT_ARCHIVED_WITHIN),
        ];
        retry_with_backoff("save", || self.post_form(SAVE_ENDPOINT, &form))
    }

    /// Query the status of a capture job. Returns the raw response body.
    fn status_request(&self, job_id: &str) -> Result<String, HttpError> {
        let form = [("job_id", job_id)];
        retry_with_backoff("status", || self.post_form(STATUS_ENDPOINT, &form))
    }
}

impl SubmitApi for SpnClient {
    fn submit(&self, url: &str, capture_outlinks: bool) -> anyhow::Result<SaveOutcome> {
        let body = self.save_request(url, capture_outlinks)?;
        log::debug!("Save response: {body}");
        Ok(parse_save_response(&body))
    }
}

impl StatusApi for SpnClient {
    fn job_status(&self, job_id: &str) -> anyhow::Result<StatusResponse> {
        let body = self.status_request(job_id)?;
        log::debug!("Status response: {body}");
        parse_status_response(&body)
    }
}

/// Client for the unauthenticated availability endpoint.
#[derive(Debug, Default)]
pub struct AvailabilityClient;

impl AvailabilityApi for AvailabilityClient {
    fn availability(&self, url: &str) -> anyhow::Result<serde_json::Value> {
        let body = retry_with_backoff("availability", || {
            let result: Result<String, reqwest::Error> = SHARED_RUNTIME.handle().block_on(async {
                let resp = http_client()
                    .get(AVAILABILITY_ENDPOINT)
                    .header("Accept", "application/json")
                    .query(&[("url", url)])
                    .send()
                    .await?
                    .error_for_status()?;
                resp.text().await
            });
            result.map_err(|e| HttpError::from_reqwest(&e))
        })?;
        log::debug!("Availability response: {body}");
        serde_json::from_str(&body).with_context(|| format!("Invalid availability JSON for {url}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authorization_header_format() {
        let creds = Credentials {
            access_key: "abc".to_string(),
            secret: "xyz".to_string(),
        };
        assert_eq!(creds.authorization(), "LOW abc:xyz");
    }
}
