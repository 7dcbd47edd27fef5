//! Waysave SPN - Save Page Now client and drivers
//!
//! This crate implements the three waysave operations: bulk save
//! submission, job status checking, and archive availability reporting.

pub mod api;
pub mod availability;
pub mod cli;
pub mod response;
pub mod runner;
pub mod save;
pub mod session;
pub mod status;

// Re-exports
pub use api::{AvailabilityClient, Credentials, SpnClient};
pub use availability::Freshness;
pub use cli::{AvailableArgs, CheckArgs, SaveArgs};
pub use response::{SaveOutcome, StatusResponse, parse_availability, parse_save_response};
pub use save::{SaveOptions, SaveSummary, SubmitApi};
pub use session::{JobRecord, SessionLog, load_session, read_url_list};
pub use status::{StatusApi, StatusSink};
