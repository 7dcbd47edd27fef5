//! Archive availability reporting and freshness classification

use std::io::Write;
use std::time::Duration;

use chrono::TimeDelta;
use waysave_core::{Sleep, is_shutdown_requested};

use crate::response::parse_availability;

/// Pause between availability requests.
pub const DEFAULT_DELAY: Duration = Duration::from_secs(10);

/// Snapshots older than this are reported as stale.
const STALE_AFTER_DAYS: i64 = 30;

/// Transport for availability lookups.
pub trait AvailabilityApi {
    fn availability(&self, url: &str) -> anyhow::Result<serde_json::Value>;
}

/// How fresh the closest archived snapshot of a URL is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale,
    Missing,
}

impl Freshness {
    pub fn classify(age: Option<TimeDelta>) -> Self {
        match age {
            None => Self::Missing,
            Some(age) if age > TimeDelta::days(STALE_AFTER_DAYS) => Self::Stale,
            Some(_) => Self::Fresh,
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            Self::Fresh => "ok",
            Self::Stale => "stale",
            Self::Missing => "missing",
        }
    }
}

impl std::fmt::Display for Freshness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.flag())
    }
}

fn format_age(age: Option<TimeDelta>) -> String {
    match age {
        None => "-".to_string(),
        Some(age) => {
            // Clock skew can put a fresh snapshot slightly in the future
            let age = age.max(TimeDelta::zero());
            let days = age.num_days();
            let hours = age.num_hours() - days * 24;
            format!("{days}d{hours:02}h")
        }
    }
}

/// Report snapshot freshness for every URL, one line each:
/// `<flag> <url> <age>`.
pub fn report_all(
    api: &impl AvailabilityApi,
    urls: &[String],
    out: &mut impl Write,
    delay: Duration,
    sleep: &mut impl Sleep,
) -> anyhow::Result<()> {
    for url in urls {
        if is_shutdown_requested() {
            break;
        }
        let age = parse_availability(&api.availability(url)?);
        let freshness = Freshness::classify(age);
        writeln!(out, "{:<7} {} {}", freshness.flag(), url, format_age(age))?;
        out.flush()?;
        sleep.sleep(delay);
    }
    Ok(())
}
