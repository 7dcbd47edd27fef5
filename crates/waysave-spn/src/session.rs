//! URL lists and the append-only session log

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Load a newline-delimited URL list, in order, skipping blank lines.
pub fn read_url_list(path: &Path) -> anyhow::Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read URL list {}", path.display()))?;
    let urls: Vec<String> = content
        .lines()
        .map(str::trim_end)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();
    anyhow::ensure!(!urls.is_empty(), "No URLs found in {}", path.display());
    Ok(urls)
}

/// One line of the session log.
///
/// Lines are stored as the raw save-endpoint responses, so fields beyond
/// `url` and `job_id` are preserved through a load/store round trip.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    pub url: String,
    #[serde(default)]
    pub job_id: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Append-only JSON-lines log of accepted jobs, held open across a run.
pub struct SessionLog {
    file: File,
}

impl SessionLog {
    /// Open for appending, creating the file if needed.
    pub fn append(path: &Path) -> anyhow::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Cannot open session file {}", path.display()))?;
        Ok(Self { file })
    }

    pub fn append_line(&mut self, line: &str) -> anyhow::Result<()> {
        writeln!(self.file, "{line}").context("Cannot write session record")
    }
}

/// Load all job records from a session file.
pub fn load_session(path: &Path) -> anyhow::Result<Vec<JobRecord>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read session file {}", path.display()))?;
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Malformed job record at {}:{}", path.display(), i + 1))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_list_skips_blank_lines_preserves_order() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, "https://example.com/a").unwrap();
        writeln!(f).unwrap();
        writeln!(f, "https://example.com/b").unwrap();
        writeln!(f, "https://example.com/a").unwrap();
        let urls = read_url_list(f.path()).unwrap();
        // No dedup: duplicates are submitted again
        assert_eq!(
            urls,
            vec![
                "https://example.com/a",
                "https://example.com/b",
                "https://example.com/a"
            ]
        );
    }

    #[test]
    fn url_list_empty_is_error() {
        let f = tempfile::NamedTempFile::new().unwrap();
        assert!(read_url_list(f.path()).is_err());
    }

    #[test]
    fn job_record_preserves_extra_fields() {
        let line = r#"{"url":"https://example.com/","job_id":"spn2-abc","first_archive":true}"#;
        let record: JobRecord = serde_json::from_str(line).unwrap();
        assert_eq!(record.url, "https://example.com/");
        assert_eq!(record.job_id.as_deref(), Some("spn2-abc"));
        let out = serde_json::to_string(&record).unwrap();
        let reparsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(reparsed["first_archive"], true);
    }

    #[test]
    fn job_record_null_job_id() {
        let record: JobRecord =
            serde_json::from_str(r#"{"url":"https://example.com/","job_id":null}"#).unwrap();
        assert_eq!(record.job_id, None);
    }

    #[test]
    fn job_record_missing_job_id() {
        let record: JobRecord = serde_json::from_str(r#"{"url":"https://example.com/"}"#).unwrap();
        assert_eq!(record.job_id, None);
    }

    #[test]
    fn session_log_appends_and_loads_back() {
        let f = tempfile::NamedTempFile::new().unwrap();
        {
            let mut log = SessionLog::append(f.path()).unwrap();
            log.append_line(r#"{"url":"https://example.com/a","job_id":"j1"}"#)
                .unwrap();
            log.append_line(r#"{"url":"https://example.com/b","job_id":"j2"}"#)
                .unwrap();
        }
        let records = load_session(f.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].url, "https://example.com/a");
        assert_eq!(records[1].job_id.as_deref(), Some("j2"));
    }

    #[test]
    fn load_session_reports_malformed_line_number() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        writeln!(f, r#"{{"url":"https://example.com/a","job_id":"j1"}}"#).unwrap();
        writeln!(f, "not json").unwrap();
        let err = load_session(f.path()).unwrap_err();
        assert!(format!("{err:#}").contains(":2"));
    }
}
